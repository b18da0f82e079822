use std::io::{self, Write};

use super::{Builtin, Context};
use crate::shell::parser::ast::Command as ShellCommand;

pub struct Echo;

impl Builtin for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn help(&self) -> &'static str {
        "echo [-n] [args...] - Display the arguments. With -n no trailing newline is printed."
    }

    fn execute(&self, command: &ShellCommand, ctx: &mut Context<'_>) -> io::Result<bool> {
        let (newline, words) = match command.arguments.split_first() {
            Some((flag, rest)) if flag == "-n" => (false, rest),
            _ => (true, command.arguments.as_slice()),
        };

        write!(ctx.io.out, "{}", words.join(" "))?;
        if newline {
            writeln!(ctx.io.out)?;
        }
        ctx.io.out.flush()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::shell::builtins::testing::run;
    use crate::shell::session::Session;

    #[test]
    fn test_echo() {
        let mut session = Session::default();
        assert_eq!(
            run(&mut session, "echo hello   'big world'"),
            (true, "hello big world\n".to_string(), String::new())
        );
        assert_eq!(run(&mut session, "echo").1, "\n");
    }

    #[test]
    fn test_echo_without_newline() {
        let mut session = Session::default();
        assert_eq!(run(&mut session, "echo -n a b").1, "a b");
    }
}
