mod background;
mod error;
mod executor;
mod io;
mod pipeline;
mod process;

pub use background::reap_background;
pub use executor::Executor;
pub use io::{OutputSink, ShellIo};
