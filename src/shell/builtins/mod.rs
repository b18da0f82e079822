use std::io;

use crate::shell::executor::ShellIo;
use crate::shell::parser::ast::Command as ShellCommand;
use crate::shell::session::Session;

mod cd;
mod clear;
mod echo;
mod exit;
mod help;
mod history;
mod pwd;
mod type_cmd;

/// 内建命令在进程内执行，所有输出都经过 [`Context::io`]
pub trait Builtin {
    fn name(&self) -> &'static str;

    fn help(&self) -> &'static str;

    /// 返回 `false` 表示 shell 应该退出
    fn execute(&self, command: &ShellCommand, ctx: &mut Context<'_>) -> io::Result<bool>;
}

pub struct Context<'a> {
    pub io: &'a mut ShellIo,
    pub session: &'a mut Session,
    pub builtins: &'a Builtins,
}

pub struct Builtins {
    commands: Vec<Box<dyn Builtin>>,
}

impl Builtins {
    pub fn new(commands: Vec<Box<dyn Builtin>>) -> Self {
        Self { commands }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Builtin> {
        self.commands
            .iter()
            .find(|command| command.name() == name)
            .map(|command| &**command)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|command| command.name())
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new(vec![
            Box::new(echo::Echo),
            Box::new(exit::Exit),
            Box::new(type_cmd::Type),
            Box::new(pwd::Pwd),
            Box::new(cd::Cd),
            Box::new(history::HistoryCmd),
            Box::new(help::Help),
            Box::new(clear::Clear),
        ])
    }
}
