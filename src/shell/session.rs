use super::history::History;

/// 跨命令保存的 shell 状态
#[derive(Debug)]
pub struct Session {
    pub history: History,
    /// `exit` 请求的退出码，读循环据此结束进程
    pub exit_code: Option<i32>,
}

impl Session {
    pub fn new(history: History) -> Self {
        Self {
            history,
            exit_code: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(History::new(1000))
    }
}
