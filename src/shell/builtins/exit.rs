use std::io;

use log::debug;

use super::{Builtin, Context};
use crate::shell::parser::ast::Command as ShellCommand;

pub struct Exit;

/// 非数字或超出 0..=255 的退出码一律视为 0
fn exit_code(argument: Option<&String>) -> i32 {
    argument
        .and_then(|arg| arg.parse::<i32>().ok())
        .filter(|code| (0..=255).contains(code))
        .unwrap_or(0)
}

impl Builtin for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn help(&self) -> &'static str {
        "exit [code] - Terminate the shell with an optional exit code (0-255)."
    }

    fn execute(&self, command: &ShellCommand, ctx: &mut Context<'_>) -> io::Result<bool> {
        let code = exit_code(command.arguments.first());
        debug!("请求退出, 退出码: {}", code);
        ctx.session.exit_code = Some(code);
        Ok(false)
    }
}
