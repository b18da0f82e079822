use std::io::{self, Write};

use super::{Builtin, Context};
use crate::shell::parser::ast::Command as ShellCommand;

pub struct Clear;

impl Builtin for Clear {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn help(&self) -> &'static str {
        "clear - Clear the terminal screen."
    }

    fn execute(&self, _command: &ShellCommand, ctx: &mut Context<'_>) -> io::Result<bool> {
        writeln!(ctx.io.out, "\x1b[H\x1b[2J")?;
        ctx.io.out.flush()?;
        Ok(true)
    }
}
