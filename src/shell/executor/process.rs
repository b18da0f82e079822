use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{self, Child, ChildStdout, Stdio};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use super::io::{InputSource, OutputSink};
use crate::shell::parser::ast::Command as ShellCommand;

pub enum StageInput<'a> {
    Source(&'a InputSource),
    Upstream(ChildStdout),
    Null,
}

pub enum StageOutput<'a> {
    Sink(&'a OutputSink),
    /// 交给下一个进程，调用方取走 `child.stdout`
    Downstream,
}

/// 后台进程不读终端，避免和行编辑器抢输入
pub fn input_for(source: &InputSource, background: bool) -> StageInput<'_> {
    if background {
        StageInput::Null
    } else {
        StageInput::Source(source)
    }
}

/// 在子进程与内存缓冲之间搬运字节的线程
#[derive(Default)]
pub struct Bridges {
    handles: Vec<JoinHandle<io::Result<u64>>>,
}

impl Bridges {
    pub fn new() -> Self {
        Self::default()
    }

    fn copy_into<R>(&mut self, mut from: R, mut to: OutputSink)
    where
        R: Read + Send + 'static,
    {
        self.handles.push(thread::spawn(move || {
            let copied = io::copy(&mut from, &mut to)?;
            to.flush()?;
            Ok(copied)
        }));
    }

    fn feed<W>(&mut self, mut to: W, data: Vec<u8>)
    where
        W: Write + Send + 'static,
    {
        self.handles.push(thread::spawn(move || {
            match to.write_all(&data) {
                // 下游不读输入就退出是正常情况
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                other => other?,
            }
            // 写完立即关闭，让子进程看到 EOF
            drop(to);
            Ok(data.len() as u64)
        }));
    }

    /// 等待全部桥接完成，返回第一个错误
    pub fn join(self) -> io::Result<()> {
        let mut result = Ok(());
        for handle in self.handles {
            let outcome = handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("bridge thread panicked")));
            if let Err(e) = outcome {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    /// 后台命令不等待桥接线程
    pub fn detach(self) {
        debug!("分离 {} 个桥接线程", self.handles.len());
    }
}

fn sink_stdio(sink: &OutputSink) -> io::Result<Stdio> {
    Ok(match sink {
        OutputSink::Stdout => io::stdout().into(),
        OutputSink::Stderr => io::stderr().into(),
        OutputSink::File(file) => file.try_clone()?.into(),
        OutputSink::Buffer(_) => Stdio::piped(),
    })
}

pub fn spawn(
    path: &Path,
    command: &ShellCommand,
    input: StageInput<'_>,
    output: StageOutput<'_>,
    errors: &OutputSink,
    bridges: &mut Bridges,
) -> io::Result<Child> {
    let mut process = process::Command::new(path);
    process.args(&command.arguments);
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        process.arg0(&command.program);
    }

    let mut feed = None;
    match input {
        StageInput::Source(InputSource::Stdin) => {
            process.stdin(Stdio::inherit());
        }
        StageInput::Source(source) => {
            feed = Some(source.remaining());
            process.stdin(Stdio::piped());
        }
        StageInput::Upstream(pipe) => {
            process.stdin(Stdio::from(pipe));
        }
        StageInput::Null => {
            process.stdin(Stdio::null());
        }
    }

    let out_sink = match output {
        StageOutput::Sink(sink) => {
            process.stdout(sink_stdio(sink)?);
            Some(sink)
        }
        StageOutput::Downstream => {
            process.stdout(Stdio::piped());
            None
        }
    };
    process.stderr(sink_stdio(errors)?);

    // 先把内建命令缓冲在 stdout 里的内容刷出去，保证输出顺序
    io::stdout().flush()?;
    io::stderr().flush()?;

    let mut child = process.spawn()?;
    debug!("已启动进程 {} ({})", child.id(), path.display());

    if let Some(data) = feed {
        match child.stdin.take() {
            Some(stdin) => bridges.feed(stdin, data),
            None => warn!("进程 {} 没有可写的 stdin", child.id()),
        }
    }
    if let Some(sink) = out_sink.filter(|sink| matches!(sink, OutputSink::Buffer(_))) {
        if let Some(stdout) = child.stdout.take() {
            bridges.copy_into(stdout, sink.clone());
        }
    }
    if matches!(errors, OutputSink::Buffer(_)) {
        if let Some(stderr) = child.stderr.take() {
            bridges.copy_into(stderr, errors.clone());
        }
    }

    Ok(child)
}

/// 管道建立失败时清理已启动的进程
pub fn dispose(children: &mut [Child]) {
    for child in children.iter_mut().rev() {
        if let Err(e) = child.kill() {
            debug!("结束进程 {} 失败: {}", child.id(), e);
        }
        let _ = child.wait();
    }
}
