use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Write};
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

use super::error::ExecError;
use crate::shell::parser::ast::Redirects;

/// 输出槽位：终端、重定向文件或内存缓冲
#[derive(Debug, Clone)]
pub enum OutputSink {
    Stdout,
    Stderr,
    File(Arc<File>),
    Buffer(Arc<Mutex<Vec<u8>>>),
}

impl OutputSink {
    pub fn buffer() -> Self {
        OutputSink::Buffer(Arc::new(Mutex::new(Vec::new())))
    }

    /// 取出缓冲中的内容，非缓冲槽位返回空
    pub fn take_contents(&self) -> Vec<u8> {
        match self {
            OutputSink::Buffer(buf) => {
                std::mem::take(&mut *buf.lock().unwrap_or_else(PoisonError::into_inner))
            }
            _ => Vec::new(),
        }
    }

    pub fn contents_lossy(&self) -> String {
        match self {
            OutputSink::Buffer(buf) => {
                String::from_utf8_lossy(&buf.lock().unwrap_or_else(PoisonError::into_inner))
                    .into_owned()
            }
            _ => String::new(),
        }
    }
}

impl Write for OutputSink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match self {
            OutputSink::Stdout => io::stdout().write(data),
            OutputSink::Stderr => io::stderr().write(data),
            OutputSink::File(file) => (&**file).write(data),
            OutputSink::Buffer(buf) => {
                buf.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend_from_slice(data);
                Ok(data.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputSink::Stdout => io::stdout().flush(),
            OutputSink::Stderr => io::stderr().flush(),
            OutputSink::File(file) => (&**file).flush(),
            OutputSink::Buffer(_) => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum InputSource {
    Stdin,
    Buffer(Cursor<Vec<u8>>),
}

impl InputSource {
    pub fn buffer(data: Vec<u8>) -> Self {
        InputSource::Buffer(Cursor::new(data))
    }

    /// 缓冲中尚未读取的部分
    pub fn remaining(&self) -> Vec<u8> {
        match self {
            InputSource::Stdin => Vec::new(),
            InputSource::Buffer(cursor) => {
                let start = (cursor.position() as usize).min(cursor.get_ref().len());
                cursor.get_ref()[start..].to_vec()
            }
        }
    }
}

impl Read for InputSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            InputSource::Stdin => io::stdin().read(buf),
            InputSource::Buffer(cursor) => cursor.read(buf),
        }
    }
}

/// 内建命令与外部进程共用的输入 / 输出 / 错误槽位
#[derive(Debug, Clone)]
pub struct ShellIo {
    pub input: InputSource,
    pub out: OutputSink,
    pub err: OutputSink,
}

impl ShellIo {
    pub fn terminal() -> Self {
        Self {
            input: InputSource::Stdin,
            out: OutputSink::Stdout,
            err: OutputSink::Stderr,
        }
    }
}

impl Default for ShellIo {
    fn default() -> Self {
        Self::terminal()
    }
}

fn open_target(path: &str, append: bool) -> Result<Arc<File>, ExecError> {
    let mut options = OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    options
        .open(path)
        .map(Arc::new)
        .map_err(|source| ExecError::Redirect {
            path: path.to_string(),
            source,
        })
}

/// 打开重定向目标；stdout 与 stderr 指向同一路径时共用一个文件句柄
pub fn open_redirects(
    redirects: &Redirects,
) -> Result<(Option<OutputSink>, Option<OutputSink>), ExecError> {
    let out = match &redirects.stdout {
        Some(path) => Some(open_target(path, redirects.append_stdout)?),
        None => None,
    };
    let err = match (&redirects.stderr, &redirects.stdout, &out) {
        (Some(err_path), Some(out_path), Some(file)) if err_path == out_path => {
            Some(Arc::clone(file))
        }
        (Some(path), _, _) => Some(open_target(path, redirects.append_stderr)?),
        (None, _, _) => None,
    };
    if redirects.has_any() {
        debug!("打开重定向: {:?}", redirects);
    }
    Ok((out.map(OutputSink::File), err.map(OutputSink::File)))
}

/// 临时替换 [`ShellIo`] 槽位的作用域，离开时恢复原值。
///
/// 作用域持有 `&mut ShellIo`，嵌套只能按后进先出的顺序释放。
pub struct IoScope<'a> {
    io: &'a mut ShellIo,
    saved: Option<ShellIo>,
}

impl<'a> IoScope<'a> {
    /// 替换给定的槽位，`None` 表示沿用当前值
    pub fn replace(
        io: &'a mut ShellIo,
        input: Option<InputSource>,
        out: Option<OutputSink>,
        err: Option<OutputSink>,
    ) -> Self {
        let saved = io.clone();
        if let Some(input) = input {
            io.input = input;
        }
        if let Some(out) = out {
            io.out = out;
        }
        if let Some(err) = err {
            io.err = err;
        }
        Self {
            io,
            saved: Some(saved),
        }
    }
}

impl Deref for IoScope<'_> {
    type Target = ShellIo;

    fn deref(&self) -> &ShellIo {
        self.io
    }
}

impl DerefMut for IoScope<'_> {
    fn deref_mut(&mut self) -> &mut ShellIo {
        self.io
    }
}

impl Drop for IoScope<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            let _ = self.io.out.flush();
            let _ = self.io.err.flush();
            // 被替换的文件句柄在这里随 Arc 一起关闭
            *self.io = saved;
        }
    }
}
