use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Command(Command),
    Pipeline(Vec<Command>),
}

impl Node {
    #[cfg(test)]
    pub fn is_pipeline(&self) -> bool {
        matches!(self, Node::Pipeline(_))
    }

    pub fn stages(&self) -> &[Command] {
        match self {
            Node::Command(command) => std::slice::from_ref(command),
            Node::Pipeline(stages) => stages,
        }
    }

    /// 管道中 `index` 之后的下一个阶段
    #[cfg(test)]
    pub fn next_stage(&self, index: usize) -> Option<&Command> {
        self.stages().get(index + 1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub program: String,
    pub arguments: Vec<String>,
    pub redirects: Redirects,
    pub background: bool,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(&self.program).chain(self.arguments.iter());
        write!(f, "{}", shell_words::join(words))?;
        if let Some(target) = &self.redirects.stdout {
            let op = if self.redirects.append_stdout { ">>" } else { ">" };
            write!(f, " {} {}", op, shell_words::quote(target))?;
        }
        if let Some(target) = &self.redirects.stderr {
            let op = if self.redirects.append_stderr { "2>>" } else { "2>" };
            write!(f, " {} {}", op, shell_words::quote(target))?;
        }
        if self.background {
            write!(f, " &")?;
        }
        Ok(())
    }
}

/// 标准输出 / 标准错误的重定向目标
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redirects {
    pub stdout: Option<String>,
    pub append_stdout: bool,
    pub stderr: Option<String>,
    pub append_stderr: bool,
}

impl Redirects {
    pub fn has_stdout(&self) -> bool {
        self.stdout.is_some()
    }

    pub fn has_stderr(&self) -> bool {
        self.stderr.is_some()
    }

    pub fn has_any(&self) -> bool {
        self.has_stdout() || self.has_stderr()
    }
}
