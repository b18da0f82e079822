use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout};

use log::{debug, warn};

use super::error::ExecError;
use super::executor::{report, Executor};
use super::io::{open_redirects, InputSource, IoScope, OutputSink, ShellIo};
use super::process::{self, Bridges, StageInput, StageOutput};
use crate::shell::parser::ast::Command as ShellCommand;
use crate::shell::session::Session;
use crate::utils::path::find_executable;

impl Executor {
    pub(super) fn execute_pipeline(
        &self,
        stages: &[ShellCommand],
        io: &mut ShellIo,
        session: &mut Session,
    ) {
        if stages.iter().any(|stage| self.builtins.contains(&stage.program)) {
            debug!("混合管道, 共 {} 个阶段", stages.len());
            self.run_mixed_pipeline(stages, io, session);
        } else {
            debug!("外部命令管道, 共 {} 个阶段", stages.len());
            if let Err(e) = run_external_pipeline(stages, &*io) {
                report(io, &e);
            }
        }
    }

    /// 含内建命令的管道：逐个阶段执行，输出先收集到内存再交给下一阶段
    fn run_mixed_pipeline(&self, stages: &[ShellCommand], io: &mut ShellIo, session: &mut Session) {
        if stages.last().is_some_and(|stage| stage.background) {
            warn!("含内建命令的管道不支持后台运行, 按前台执行");
        }

        let mut captured: Option<Vec<u8>> = None;
        for (index, stage) in stages.iter().enumerate() {
            let last = index + 1 == stages.len();
            let input = captured.take().map(InputSource::buffer);
            let output = (!last).then(OutputSink::buffer);

            {
                let mut stage_io = IoScope::replace(io, input, output.clone(), None);
                self.run_mixed_stage(stage, &mut stage_io, session);
            }

            captured = output.map(|sink| sink.take_contents());
        }
    }

    fn run_mixed_stage(&self, stage: &ShellCommand, io: &mut ShellIo, session: &mut Session) {
        let (out, err) = match open_redirects(&stage.redirects) {
            Ok(sinks) => sinks,
            Err(e) => {
                report(io, &e);
                return;
            }
        };
        let mut scope = IoScope::replace(io, None, out, err);

        // 管道中的 exit 只结束这一阶段
        match self.dispatch(stage, &mut scope, session, false) {
            Ok(true) => {}
            Ok(false) => {
                debug!("忽略管道中的 {}", stage.program);
                session.exit_code = None;
            }
            Err(e) => report(&mut scope, &e),
        }
    }
}

/// 全部是外部命令的管道：相邻进程直接用系统管道连接，同时运行
fn run_external_pipeline(stages: &[ShellCommand], io: &ShellIo) -> Result<(), ExecError> {
    // 先解析所有路径，有一个找不到就什么都不启动
    let paths = stages
        .iter()
        .map(|stage| {
            find_executable(&stage.program).ok_or_else(|| ExecError::NotFound(stage.program.clone()))
        })
        .collect::<Result<Vec<PathBuf>, ExecError>>()?;

    let background = stages.last().is_some_and(|stage| stage.background);
    let mut children: Vec<Child> = Vec::with_capacity(stages.len());
    let mut bridges = Bridges::new();
    let mut upstream: Option<ChildStdout> = None;

    for (index, (stage, path)) in stages.iter().zip(&paths).enumerate() {
        let last = index + 1 == stages.len();
        let input = match (index, upstream.take()) {
            (0, _) => process::input_for(&io.input, background),
            (_, Some(pipe)) => StageInput::Upstream(pipe),
            // 上一阶段的输出已经重定向到文件
            (_, None) => StageInput::Null,
        };
        match spawn_stage(stage, path, input, last, io, &mut bridges) {
            Ok((child, stdout)) => {
                children.push(child);
                upstream = stdout;
            }
            Err(e) => {
                process::dispose(&mut children);
                bridges.detach();
                return Err(e);
            }
        }
    }

    if background {
        debug!(
            "后台管道: {:?}",
            children.iter().map(Child::id).collect::<Vec<_>>()
        );
        bridges.detach();
        return Ok(());
    }

    // 第一阶段：等待所有桥接线程结束
    let bridged = bridges.join();

    // 第二阶段：从最后一个进程开始倒序等待
    let mut result = Ok(());
    for (child, stage) in children.iter_mut().zip(stages).rev() {
        match child.wait() {
            Ok(status) => debug!("{} 已退出: {}", stage.program, status),
            Err(e) => {
                if result.is_ok() {
                    result = Err(ExecError::process(&stage.program, e));
                }
            }
        }
    }

    result?;
    bridged.map_err(|e| ExecError::process("pipeline", e))
}

/// 启动单个阶段，返回进程以及需要交给下一阶段的 stdout
fn spawn_stage(
    stage: &ShellCommand,
    path: &Path,
    input: StageInput<'_>,
    last: bool,
    io: &ShellIo,
    bridges: &mut Bridges,
) -> Result<(Child, Option<ChildStdout>), ExecError> {
    // 非末尾阶段的重定向同样生效
    let (out_file, err_file) = open_redirects(&stage.redirects)?;

    let output = match (&out_file, last) {
        (Some(file), _) => StageOutput::Sink(file),
        (None, true) => StageOutput::Sink(&io.out),
        (None, false) => StageOutput::Downstream,
    };
    let downstream = matches!(output, StageOutput::Downstream);
    let errors = err_file.as_ref().unwrap_or(&io.err);

    let mut child = process::spawn(path, stage, input, output, errors, bridges)
        .map_err(|e| ExecError::process(&stage.program, e))?;
    let stdout = if downstream { child.stdout.take() } else { None };
    Ok((child, stdout))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::shell::parser::parse_line;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    /// 有执行权限但不是合法程序的文件
    #[allow(clippy::unwrap_used)]
    fn bad_executable(dir: &TempDir) -> String {
        let path = dir.path().join("badexe");
        fs::write(&path, "not a program\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn run(line: &str) -> (String, String) {
        let executor = Executor::default();
        let mut session = Session::default();
        let mut io = ShellIo {
            out: OutputSink::buffer(),
            err: OutputSink::buffer(),
            ..ShellIo::terminal()
        };
        let node = match parse_line(line) {
            Ok(Some(node)) => node,
            other => panic!("bad test line {:?}: {:?}", line, other),
        };
        assert!(node.is_pipeline());
        assert!(executor.execute(&node, &mut io, &mut session));
        (io.out.contents_lossy(), io.err.contents_lossy())
    }

    #[test]
    fn test_external_pipeline() {
        let (out, err) = run("printf 'b\\na\\nb\\n' | sort | uniq");
        assert_eq!(out, "a\nb\n");
        assert_eq!(err, "");
    }

    #[test]
    fn test_builtin_feeds_external() {
        let (out, _) = run("echo one two three | wc -w");
        assert_eq!(out.trim(), "3");
    }

    #[test]
    fn test_external_feeds_builtin() {
        // echo 不读输入，上游的输出被丢弃
        let (out, _) = run("printf ignored | echo done");
        assert_eq!(out, "done\n");
    }

    #[test]
    fn test_pwd_through_pipe() {
        let (out, _) = run("pwd | wc -l");
        assert_eq!(out.trim(), "1");
    }

    #[test]
    fn test_missing_stage_spawns_nothing() {
        let (out, err) = run("printf x | no_such_command_xyz");
        assert_eq!(out, "");
        assert_eq!(err, "no_such_command_xyz: command not found\n");
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_spawn_failure_disposes_started_stages() {
        let dir = TempDir::new().unwrap();
        let bad = bad_executable(&dir);

        let started = Instant::now();
        let (out, err) = run(&format!("sleep 30 | {}", bad));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(out, "");
        assert!(err.starts_with(&format!("Error executing '{}': ", bad)));
    }

    #[test]
    fn test_background_pipeline_does_not_wait() {
        let started = Instant::now();
        let (out, err) = run("sleep 5 | sleep 5 &");
        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!((out.as_str(), err.as_str()), ("", ""));
    }

    #[test]
    fn test_missing_stage_in_mixed_pipeline() {
        let (out, err) = run("echo hi | no_such_command_xyz");
        assert_eq!(out, "");
        assert_eq!(err, "no_such_command_xyz: command not found\n");
    }

    #[test]
    fn test_stderr_of_middle_stage() {
        let (out, err) = run("sh -c 'echo data; echo warn >&2' | cat");
        assert_eq!(out, "data\n");
        assert_eq!(err, "warn\n");
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_middle_stage_redirect() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("mid.txt");
        let line = format!("printf abc | cat > {} | wc -c", target.display());

        let (out, _) = run(&line);
        assert_eq!(out.trim(), "0");
        assert_eq!(fs::read_to_string(&target).unwrap(), "abc");
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_last_stage_redirect() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("last.txt");
        let line = format!("echo hello | tr a-z A-Z > {}", target.display());

        let (out, _) = run(&line);
        assert_eq!(out, "");
        assert_eq!(fs::read_to_string(&target).unwrap(), "HELLO\n");
    }

    #[test]
    fn test_exit_in_pipeline_keeps_shell() {
        let executor = Executor::default();
        let mut session = Session::default();
        let mut io = ShellIo {
            out: OutputSink::buffer(),
            err: OutputSink::buffer(),
            ..ShellIo::terminal()
        };
        let node = match parse_line("exit 3 | cat") {
            Ok(Some(node)) => node,
            other => panic!("unexpected parse result: {:?}", other),
        };
        assert!(executor.execute(&node, &mut io, &mut session));
        assert_eq!(session.exit_code, None);
        assert_eq!(io.out.contents_lossy(), "");
    }
}
