use std::io::{self, Write};
use std::path::Path;

use super::{Builtin, Context};
use crate::shell::parser::ast::Command as ShellCommand;

pub struct HistoryCmd;

impl HistoryCmd {
    fn with_file<F>(command: &ShellCommand, ctx: &mut Context<'_>, verb: &str, action: F) -> io::Result<bool>
    where
        F: FnOnce(&mut Context<'_>, &Path) -> io::Result<()>,
    {
        let Some(file) = command.arguments.get(1) else {
            writeln!(ctx.io.out, "Filename to {} history is required.", verb)?;
            return Ok(true);
        };
        if let Err(e) = action(ctx, Path::new(file)) {
            writeln!(ctx.io.err, "history: {}: {}", file, e)?;
        }
        Ok(true)
    }
}

impl Builtin for HistoryCmd {
    fn name(&self) -> &'static str {
        "history"
    }

    fn help(&self) -> &'static str {
        "history [n] | -c | -r file | -w file | -a file - Display or manage the command history. With n, show only the last n commands."
    }

    fn execute(&self, command: &ShellCommand, ctx: &mut Context<'_>) -> io::Result<bool> {
        match command.arguments.first().map(String::as_str) {
            Some("-c") | Some("--clear") => {
                ctx.session.history.clear();
                writeln!(ctx.io.out, "History cleared.")?;
                return Ok(true);
            }
            Some("-r") => {
                return Self::with_file(command, ctx, "read", |ctx, path| {
                    ctx.session.history.read_from(path).map(|_| ())
                });
            }
            Some("-w") => {
                return Self::with_file(command, ctx, "write", |ctx, path| {
                    ctx.session.history.write_to(path)
                });
            }
            Some("-a") => {
                return Self::with_file(command, ctx, "append", |ctx, path| {
                    ctx.session.history.append_to(path).map(|_| ())
                });
            }
            _ => {}
        }

        let entries = ctx.session.history.entries();
        if entries.is_empty() {
            writeln!(ctx.io.out, "No history available.")?;
            return Ok(true);
        }

        let start = command
            .arguments
            .first()
            .and_then(|arg| arg.parse::<usize>().ok())
            .filter(|count| *count > 0)
            .map(|count| entries.len().saturating_sub(count))
            .unwrap_or(0);

        for (index, line) in entries.iter().enumerate().skip(start) {
            writeln!(ctx.io.out, "    {}  {}", index + 1, line)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::shell::builtins::testing::run;
    use crate::shell::history::History;
    use crate::shell::session::Session;
    use std::fs;
    use tempfile::TempDir;

    fn session_with(lines: &[&str]) -> Session {
        let mut history = History::new(100);
        for line in lines {
            history.add(line);
        }
        Session::new(history)
    }

    #[test]
    fn test_lists_history() {
        let mut session = session_with(&["ls", "pwd", "history"]);
        assert_eq!(
            run(&mut session, "history").1,
            "    1  ls\n    2  pwd\n    3  history\n"
        );
        assert_eq!(
            run(&mut session, "history 2").1,
            "    2  pwd\n    3  history\n"
        );
    }

    #[test]
    fn test_empty_and_clear() {
        let mut session = session_with(&[]);
        assert_eq!(run(&mut session, "history").1, "No history available.\n");

        let mut session = session_with(&["ls"]);
        assert_eq!(run(&mut session, "history -c").1, "History cleared.\n");
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_file_flag_requires_name() {
        let mut session = session_with(&["ls"]);
        assert_eq!(
            run(&mut session, "history -w").1,
            "Filename to write history is required.\n"
        );
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_write_then_read_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("saved");
        let file_arg = file.to_str().unwrap();

        let mut session = session_with(&["echo a", "echo b"]);
        run(&mut session, &format!("history -w '{}'", file_arg));
        assert_eq!(fs::read_to_string(&file).unwrap(), "echo a\necho b\n");

        let mut fresh = session_with(&["first"]);
        run(&mut fresh, &format!("history -r '{}'", file_arg));
        assert_eq!(fresh.history.entries(), ["first", "echo a", "echo b"]);
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_read_missing_file_reports_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("absent");
        let mut session = session_with(&[]);

        let (_, _, err) = run(&mut session, &format!("history -r '{}'", file.display()));
        assert!(err.starts_with("history: "));
    }
}
