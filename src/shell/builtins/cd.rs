use std::env;
use std::io::{self, Write};

use log::debug;

use super::{Builtin, Context};
use crate::shell::parser::ast::Command as ShellCommand;

pub struct Cd;

impl Builtin for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn help(&self) -> &'static str {
        "cd [directory] - Change the current directory. Without a directory, change to the home directory."
    }

    fn execute(&self, command: &ShellCommand, ctx: &mut Context<'_>) -> io::Result<bool> {
        let target = command.arguments.first().map(|s| s.as_str()).unwrap_or("~");
        let path = shellexpand::tilde(target);

        match env::set_current_dir(path.as_ref()) {
            Ok(()) => debug!("切换目录: {}", path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                writeln!(ctx.io.err, "cd: {}: No such file or directory", path)?;
            }
            Err(e) => writeln!(ctx.io.err, "cd: {}", e)?,
        }
        Ok(true)
    }
}
