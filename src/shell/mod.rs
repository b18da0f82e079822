mod builtins;
mod executor;
mod history;
mod parser;
mod readline;
mod session;
mod shell;

pub use shell::Shell;
