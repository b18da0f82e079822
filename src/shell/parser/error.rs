use thiserror::Error;

/// 词法 / 语法解析错误，消息直接展示给用户
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unclosed double quotation mark")]
    UnclosedDoubleQuote,
    #[error("Unclosed single quotation mark")]
    UnclosedSingleQuote,
    #[error("Trailing escape character")]
    TrailingEscape,
    #[error("Tokens cannot be empty")]
    EmptyInput,
    #[error("Missing target for stdout redirection")]
    MissingStdoutTarget,
    #[error("Missing target for stdout append redirection")]
    MissingStdoutAppendTarget,
    #[error("Missing target for stderr redirection")]
    MissingStderrTarget,
    #[error("Missing target for stderr append redirection")]
    MissingStderrAppendTarget,
    #[error("Missing target for pipeline")]
    MissingPipelineTarget,
}
