use super::ast::{Command, Node, Redirects};
use super::error::ParseError;
use super::lexer::tokenize;

pub struct Parser<'a> {
    tokens: &'a [String],
    position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [String]) -> Self {
        Parser {
            tokens,
            position: 0,
        }
    }

    fn next_token(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token.as_str())
    }

    fn rest(&self) -> &'a [String] {
        &self.tokens[self.position.min(self.tokens.len())..]
    }

    pub fn parse_command(&mut self) -> Result<Node, ParseError> {
        let mut stages = Vec::new();
        self.parse_stage(&mut stages)?;

        Ok(if stages.len() == 1 {
            Node::Command(stages.pop().unwrap_or_default())
        } else {
            Node::Pipeline(stages)
        })
    }

    fn parse_stage(&mut self, stages: &mut Vec<Command>) -> Result<(), ParseError> {
        let mut command = Command {
            program: self.next_token().ok_or(ParseError::EmptyInput)?.to_string(),
            ..Command::default()
        };
        let mut redirects = Redirects::default();

        while let Some(token) = self.next_token() {
            match token {
                ">" | "1>" => {
                    redirects.stdout = Some(self.operand(ParseError::MissingStdoutTarget)?);
                    redirects.append_stdout = false;
                }
                ">>" | "1>>" => {
                    redirects.stdout =
                        Some(self.operand(ParseError::MissingStdoutAppendTarget)?);
                    redirects.append_stdout = true;
                }
                "2>" => {
                    redirects.stderr = Some(self.operand(ParseError::MissingStderrTarget)?);
                    redirects.append_stderr = false;
                }
                "2>>" => {
                    redirects.stderr =
                        Some(self.operand(ParseError::MissingStderrAppendTarget)?);
                    redirects.append_stderr = true;
                }
                "|" => {
                    if self.rest().is_empty() {
                        return Err(ParseError::MissingPipelineTarget);
                    }
                    command.redirects = redirects;
                    stages.push(command);
                    // 剩余的全部 token 交给下一阶段
                    return Parser::new(self.rest()).parse_stage(stages);
                }
                "&" => command.background = true,
                word => command.arguments.push(word.to_string()),
            }
        }

        command.redirects = redirects;
        stages.push(command);
        Ok(())
    }

    fn operand(&mut self, missing: ParseError) -> Result<String, ParseError> {
        self.next_token().map(str::to_string).ok_or(missing)
    }
}

pub fn parse_tokens(tokens: &[String]) -> Result<Node, ParseError> {
    Parser::new(tokens).parse_command()
}

/// 空行返回 `None`
pub fn parse_line(line: &str) -> Result<Option<Node>, ParseError> {
    let tokens = tokenize(line)?;
    if tokens.is_empty() {
        return Ok(None);
    }
    parse_tokens(&tokens).map(Some)
}
