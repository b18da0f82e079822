use std::io::Write;
use std::path::Path;

use log::{debug, error};

use super::error::ExecError;
use super::io::{open_redirects, IoScope, ShellIo};
use super::process::{self, Bridges, StageOutput};
use crate::shell::builtins::{Builtins, Context};
use crate::shell::parser::ast::{Command as ShellCommand, Node};
use crate::shell::session::Session;
use crate::utils::path::find_executable;

pub struct Executor {
    pub(super) builtins: Builtins,
}

impl Executor {
    pub fn new(builtins: Builtins) -> Self {
        Self { builtins }
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    /// 执行一条命令或管道，返回 `false` 表示 shell 应该退出
    pub fn execute(&self, node: &Node, io: &mut ShellIo, session: &mut Session) -> bool {
        match node {
            Node::Pipeline(stages) => {
                // 管道的失败只报告，不会让 shell 退出
                self.execute_pipeline(stages, io, session);
                true
            }
            Node::Command(command) => self.execute_command(command, io, session),
        }
    }

    fn execute_command(&self, command: &ShellCommand, io: &mut ShellIo, session: &mut Session) -> bool {
        let (out, err) = match open_redirects(&command.redirects) {
            Ok(sinks) => sinks,
            Err(e) => {
                report(io, &e);
                return true;
            }
        };
        let mut scope = IoScope::replace(io, None, out, err);

        match self.dispatch(command, &mut scope, session, command.background) {
            Ok(keep_going) => keep_going,
            Err(ExecError::NotFound(name)) => {
                let _ = writeln!(scope.out, "{}: command not found", name);
                true
            }
            Err(e) => {
                report(&mut scope, &e);
                true
            }
        }
    }

    /// 内建命令直接调用，其余按 PATH 查找后启动进程
    pub(super) fn dispatch(
        &self,
        command: &ShellCommand,
        io: &mut ShellIo,
        session: &mut Session,
        background: bool,
    ) -> Result<bool, ExecError> {
        if let Some(builtin) = self.builtins.get(&command.program) {
            debug!("执行内建命令: {}", command);
            let mut ctx = Context {
                io,
                session,
                builtins: &self.builtins,
            };
            return builtin
                .execute(command, &mut ctx)
                .map_err(|source| ExecError::Builtin {
                    name: command.program.clone(),
                    source,
                });
        }

        let path = find_executable(&command.program)
            .ok_or_else(|| ExecError::NotFound(command.program.clone()))?;
        debug!("执行外部命令: {} ({})", command, path.display());
        self.run_external(&path, command, io, background)?;
        Ok(true)
    }

    fn run_external(
        &self,
        path: &Path,
        command: &ShellCommand,
        io: &mut ShellIo,
        background: bool,
    ) -> Result<(), ExecError> {
        let mut bridges = Bridges::new();
        let mut child = process::spawn(
            path,
            command,
            process::input_for(&io.input, background),
            StageOutput::Sink(&io.out),
            &io.err,
            &mut bridges,
        )
        .map_err(|e| ExecError::process(&command.program, e))?;

        if background {
            // 不维护任务表，也不等待
            debug!("后台运行: {} (pid {})", command.program, child.id());
            bridges.detach();
            return Ok(());
        }

        let bridged = bridges.join();
        let status = child
            .wait()
            .map_err(|e| ExecError::process(&command.program, e))?;
        debug!("{} 已退出: {}", command.program, status);
        bridged.map_err(|e| ExecError::process(&command.program, e))
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(Builtins::default())
    }
}

/// 把错误写到当前的错误槽位
pub(super) fn report(io: &mut ShellIo, e: &ExecError) {
    error!("{}", e);
    if let Err(write_err) = writeln!(io.err, "{}", e) {
        error!("无法输出错误信息: {}", write_err);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::shell::executor::OutputSink;
    use crate::shell::parser::parse_line;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn run_in(session: &mut Session, line: &str) -> (bool, String, String) {
        let executor = Executor::default();
        let mut io = ShellIo {
            out: OutputSink::buffer(),
            err: OutputSink::buffer(),
            ..ShellIo::terminal()
        };
        let node = match parse_line(line) {
            Ok(Some(node)) => node,
            other => panic!("bad test line {:?}: {:?}", line, other),
        };
        let keep_going = executor.execute(&node, &mut io, session);
        (keep_going, io.out.contents_lossy(), io.err.contents_lossy())
    }

    fn run(line: &str) -> (bool, String, String) {
        run_in(&mut Session::default(), line)
    }

    #[test]
    fn test_builtin_output() {
        assert_eq!(run("echo hello world"), (true, "hello world\n".into(), String::new()));
    }

    #[test]
    fn test_external_output() {
        let (keep_going, out, _) = run("printf '%s-%s' a b");
        assert!(keep_going);
        assert_eq!(out, "a-b");
    }

    #[test]
    fn test_command_not_found_goes_to_output() {
        let (keep_going, out, err) = run("no_such_command_xyz arg");
        assert!(keep_going);
        assert_eq!(out, "no_such_command_xyz: command not found\n");
        assert_eq!(err, "");
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_spawn_failure_reported() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("badexe");
        fs::write(&bad, "not a program\n").unwrap();
        fs::set_permissions(&bad, fs::Permissions::from_mode(0o755)).unwrap();
        let bad = bad.to_string_lossy().into_owned();

        let (keep_going, out, err) = run(&bad);
        assert!(keep_going);
        assert_eq!(out, "");
        assert!(err.starts_with(&format!("Error executing '{}': ", bad)));
    }

    #[test]
    fn test_background_command_does_not_wait() {
        let started = Instant::now();
        let (keep_going, out, err) = run("sleep 5 &");
        assert!(keep_going);
        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!((out.as_str(), err.as_str()), ("", ""));
    }

    #[test]
    fn test_exit_stops_shell() {
        let mut session = Session::default();
        let (keep_going, _, _) = run_in(&mut session, "exit 7");
        assert!(!keep_going);
        assert_eq!(session.exit_code, Some(7));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_redirect_builtin_and_restore() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.txt");
        let line = format!("echo saved > {}", target.display());

        let (_, out, _) = run(&line);
        assert_eq!(out, "");
        assert_eq!(fs::read_to_string(&target).unwrap(), "saved\n");
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_append_external() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("log.txt");

        run(&format!("echo first > {}", target.display()));
        run(&format!("printf 'second\\n' >> {}", target.display()));
        assert_eq!(fs::read_to_string(&target).unwrap(), "first\nsecond\n");
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_stdout_and_stderr_same_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("both.txt");
        let line = format!(
            "sh -c 'echo out; echo err >&2' > {} 2> {}",
            target.display(),
            target.display()
        );

        let (_, out, err) = run(&line);
        assert_eq!((out.as_str(), err.as_str()), ("", ""));
        assert_eq!(fs::read_to_string(&target).unwrap(), "out\nerr\n");
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_stderr_redirect_only() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("err.txt");
        let line = format!("cd /no/such/dir 2> {}", target.display());

        let (keep_going, out, err) = run(&line);
        assert!(keep_going);
        assert_eq!((out.as_str(), err.as_str()), ("", ""));
        assert!(fs::read_to_string(&target).unwrap().starts_with("cd: /no/such/dir"));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_bad_redirect_target_reported() {
        let dir = TempDir::new().unwrap();
        let line = format!("echo hi > {}/missing/out.txt", dir.path().display());

        let (keep_going, out, err) = run(&line);
        assert!(keep_going);
        assert_eq!(out, "");
        assert!(err.contains("missing/out.txt"));
    }
}
