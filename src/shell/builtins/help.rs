use std::io::{self, Write};

use super::{Builtin, Context};
use crate::shell::parser::ast::Command as ShellCommand;

pub struct Help;

impl Builtin for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    fn help(&self) -> &'static str {
        "help [command] - Display information about builtin commands."
    }

    fn execute(&self, command: &ShellCommand, ctx: &mut Context<'_>) -> io::Result<bool> {
        let Some(name) = command.arguments.first() else {
            let mut names: Vec<&str> = ctx.builtins.names().collect();
            names.sort_unstable();

            writeln!(ctx.io.out, "Available built-in commands:")?;
            for name in names {
                writeln!(ctx.io.out, "  {}", name)?;
            }
            writeln!(
                ctx.io.out,
                "\nType 'help <command>' for more information on a specific command."
            )?;
            return Ok(true);
        };

        match ctx.builtins.get(name) {
            Some(builtin) => writeln!(ctx.io.out, "{}", builtin.help())?,
            None => writeln!(ctx.io.out, "help: no help found for '{}'", name)?,
        }
        Ok(true)
    }
}
