use std::str::Chars;

use super::error::ParseError;

/// 把一行输入拆成单词，处理引号与转义。
///
/// 不认识任何语法符号：`>`、`|`、`&` 只是普通单词，由 [`super::parser::Parser`] 解释。
pub struct Lexer<'a> {
    input: Chars<'a>,
    current: String,
    words: Vec<String>,
    in_double_quotes: bool,
    in_single_quotes: bool,
    escaped: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.chars(),
            current: String::new(),
            words: Vec::new(),
            in_double_quotes: false,
            in_single_quotes: false,
            escaped: false,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<String>, ParseError> {
        while let Some(c) = self.input.next() {
            self.read_char(c);
        }

        if self.in_double_quotes {
            return Err(ParseError::UnclosedDoubleQuote);
        }
        if self.in_single_quotes {
            return Err(ParseError::UnclosedSingleQuote);
        }
        if self.escaped {
            return Err(ParseError::TrailingEscape);
        }

        self.finish_word();
        Ok(self.words)
    }

    fn read_char(&mut self, c: char) {
        // 单引号内一切都是字面量
        if self.in_single_quotes {
            if c == '\'' {
                self.in_single_quotes = false;
            } else {
                self.current.push(c);
            }
            return;
        }

        if self.escaped {
            self.escaped = false;
            // 双引号内只有 $ ` " \ 可以被转义，其余保留反斜杠
            if self.in_double_quotes && !matches!(c, '$' | '`' | '"' | '\\') {
                self.current.push('\\');
            }
            self.current.push(c);
            return;
        }

        match c {
            '\\' => self.escaped = true,
            '"' => self.in_double_quotes = !self.in_double_quotes,
            '\'' if !self.in_double_quotes => self.in_single_quotes = true,
            c if is_separator(c) && !self.in_double_quotes => self.finish_word(),
            c => self.current.push(c),
        }
    }

    fn finish_word(&mut self) {
        if !self.current.is_empty() {
            self.words.push(std::mem::take(&mut self.current));
        }
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    Lexer::new(line).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(input: &str) -> Vec<String> {
        match tokenize(input) {
            Ok(words) => words,
            Err(e) => panic!("tokenize({:?}) failed: {}", input, e),
        }
    }

    #[test]
    fn test_unquoted_words() {
        assert_eq!(words("arg1 arg2 arg3"), vec!["arg1", "arg2", "arg3"]);
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(words("  ls \t -la   "), vec!["ls", "-la"]);
        assert!(words("   ").is_empty());
    }

    #[test]
    fn test_single_quotes_are_literal() {
        assert_eq!(words("'arg1 arg2' arg3"), vec!["arg1 arg2", "arg3"]);
        assert_eq!(words(r#"'a\b "c"'"#), vec![r#"a\b "c""#]);
    }

    #[test]
    fn test_double_quotes() {
        assert_eq!(
            words(r#""arg1 arg2" "arg3 arg4" arg5"#),
            vec!["arg1 arg2", "arg3 arg4", "arg5"]
        );
        assert_eq!(words(r#""it's here""#), vec!["it's here"]);
    }

    #[test]
    fn test_adjacent_quotes_join_one_word() {
        assert_eq!(words(r#"foo"bar"'baz'"#), vec!["foobarbaz"]);
        assert_eq!(words("'hello''world'"), vec!["helloworld"]);
    }

    #[test]
    fn test_escape_outside_quotes() {
        assert_eq!(words(r"a\ b c"), vec!["a b", "c"]);
        assert_eq!(words(r#"\'\"x"#), vec![r#"'"x"#]);
        assert_eq!(words(r"\n"), vec!["n"]);
    }

    #[test]
    fn test_escape_inside_double_quotes() {
        assert_eq!(words(r#""a\"b""#), vec![r#"a"b"#]);
        assert_eq!(words(r#""a\\b""#), vec![r"a\b"]);
        assert_eq!(words(r#""\$HOME""#), vec!["$HOME"]);
        assert_eq!(words(r#""a\nb""#), vec![r"a\nb"]);
        assert_eq!(
            words(r#""/tmp/quz/'f \28\'""#),
            vec![r"/tmp/quz/'f \28\'"]
        );
    }

    #[test]
    fn test_operators_are_plain_words() {
        assert_eq!(
            words("echo hi > out.txt | wc &"),
            vec!["echo", "hi", ">", "out.txt", "|", "wc", "&"]
        );
        assert_eq!(words("'>' \\|"), vec![">", "|"]);
    }

    #[test]
    fn test_unclosed_double_quote() {
        assert_eq!(tokenize("\"arg1 arg2"), Err(ParseError::UnclosedDoubleQuote));
    }

    #[test]
    fn test_unclosed_single_quote() {
        assert_eq!(tokenize("'arg1 arg2"), Err(ParseError::UnclosedSingleQuote));
    }

    #[test]
    fn test_trailing_escape() {
        assert_eq!(tokenize("arg1 arg2\\"), Err(ParseError::TrailingEscape));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ParseError::UnclosedDoubleQuote.to_string(),
            "Unclosed double quotation mark"
        );
        assert_eq!(
            ParseError::UnclosedSingleQuote.to_string(),
            "Unclosed single quotation mark"
        );
        assert_eq!(ParseError::TrailingEscape.to_string(), "Trailing escape character");
    }
}
