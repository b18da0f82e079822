use std::io::{self, Write};

use super::{Builtin, Context};
use crate::shell::parser::ast::Command as ShellCommand;
use crate::utils::path::find_executable;

pub struct Type;

impl Builtin for Type {
    fn name(&self) -> &'static str {
        "type"
    }

    fn help(&self) -> &'static str {
        "type [command...] - Display whether each command is a builtin or an executable."
    }

    fn execute(&self, command: &ShellCommand, ctx: &mut Context<'_>) -> io::Result<bool> {
        for name in &command.arguments {
            if ctx.builtins.contains(name) {
                writeln!(ctx.io.out, "{} is a shell builtin", name)?;
            } else if let Some(path) = find_executable(name) {
                writeln!(ctx.io.out, "{} is {}", name, path.display())?;
            } else {
                writeln!(ctx.io.out, "{} not found", name)?;
            }
        }
        Ok(true)
    }
}
