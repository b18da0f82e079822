use log::{debug, error, warn};
use std::error::Error;
use std::io::Write;
use std::process;

use crate::shell::executor::{reap_background, Executor, ShellIo};
use crate::shell::history::History;
use crate::shell::parser::parse_line;
use crate::shell::readline::{ReadlineError, ReadlineManager, ShellHelper};
use crate::shell::session::Session;
use crate::utils::config::Config;
use crate::utils::theme::Theme;

pub struct Shell<'a> {
    theme: &'a Theme,
    readline: ReadlineManager,
    executor: Executor,
    session: Session,
    io: ShellIo,
}

impl<'a> Shell<'a> {
    pub fn new(config: &Config, theme: &'a Theme) -> Result<Self, Box<dyn Error>> {
        let executor = Executor::default();
        let helper = ShellHelper::new(executor.builtins().names().collect(), config.completion);
        let history = History::with_file(config.history_size, config.history_file.clone());

        Ok(Self {
            theme,
            readline: ReadlineManager::new(config, helper)?,
            executor,
            session: Session::new(history),
            io: ShellIo::terminal(),
        })
    }

    pub fn run(mut self) -> Result<(), Box<dyn Error>> {
        debug!("初始化 ripple...");
        self.session.history.load();
        debug!("ripple 准备就绪...");

        let code = self.run_loop()?;
        self.session.history.save();

        debug!("退出 ripple, 退出码 {}", code);
        process::exit(code)
    }

    /// 读取并执行命令，直到 EOF 或 `exit`，返回退出码
    fn run_loop(&mut self) -> Result<i32, Box<dyn Error>> {
        loop {
            reap_background();
            self.readline.sync_history(&self.session.history)?;
            std::io::stdout().flush()?;

            match self.readline.readline(&self.theme.styled_prompt()) {
                Ok(line) => {
                    if !self.handle_input(&line) {
                        return Ok(self.session.exit_code.unwrap_or(0));
                    }
                }
                Err(ReadlineError::Eof) => {
                    debug!("接收到 EOF，退出 ripple...");
                    return Ok(0);
                }
                Err(ReadlineError::Interrupted) => {
                    // 丢弃当前输入，重新显示提示符
                    debug!("接收到中断信号...");
                }
                Err(err) => {
                    error!("读取输入失败: {}", err);
                    return Err(err.into());
                }
            }
        }
    }

    /// 返回 `false` 表示应当退出
    fn handle_input(&mut self, line: &str) -> bool {
        // 空行不会被记录，语法错误的行照样记录，方便修改后重试
        self.session.history.add(line);

        let node = match parse_line(line) {
            Ok(Some(node)) => node,
            Ok(None) => return true,
            Err(e) => {
                warn!("解析失败: {} ({})", e, line);
                self.print_error(&format!("Error: {}", e));
                return true;
            }
        };

        self.executor
            .execute(&node, &mut self.io, &mut self.session)
    }

    fn print_error(&mut self, message: &str) {
        let styled = (self.theme.error_style)(message.to_string());
        if let Err(e) = writeln!(self.io.err, "{}", styled) {
            error!("无法输出错误信息: {}", e);
        }
    }
}
