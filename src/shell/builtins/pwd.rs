use std::env;
use std::io::{self, Write};

use super::{Builtin, Context};
use crate::shell::parser::ast::Command as ShellCommand;

pub struct Pwd;

impl Builtin for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn help(&self) -> &'static str {
        "pwd - Print the current working directory."
    }

    fn execute(&self, _command: &ShellCommand, ctx: &mut Context<'_>) -> io::Result<bool> {
        let current_dir = env::current_dir()?;
        writeln!(ctx.io.out, "{}", current_dir.display())?;
        Ok(true)
    }
}
