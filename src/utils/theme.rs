use colored::Colorize;

pub struct Theme {
    pub prompt: String,
    pub error_style: Box<dyn Fn(String) -> String>,
    pub prompt_style: Box<dyn Fn(String) -> String>,
}

impl Theme {
    /// 提示符保持配置里的原文，只加颜色
    pub fn styled_prompt(&self) -> String {
        (self.prompt_style)(self.prompt.clone())
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            prompt: String::from("$ "),
            error_style: Box::new(|s| s.bright_red().to_string()),
            prompt_style: Box::new(|s| s.bright_cyan().to_string()),
        }
    }
}

pub fn load_theme(theme_name: &str, prompt: &str) -> Theme {
    let theme = match theme_name {
        "dark" => Theme {
            prompt: String::new(),
            error_style: Box::new(|s| s.red().to_string()),
            prompt_style: Box::new(|s| s.bright_purple().to_string()),
        },
        "plain" => Theme {
            prompt: String::new(),
            error_style: Box::new(|s| s),
            prompt_style: Box::new(|s| s),
        },
        _ => Theme::default(),
    };
    Theme {
        prompt: prompt.to_string(),
        ..theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_theme_keeps_text() {
        let theme = load_theme("plain", "ripple> ");
        assert_eq!(theme.styled_prompt(), "ripple> ");
        assert_eq!((theme.error_style)("Error: x".to_string()), "Error: x");
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let theme = load_theme("neon", "$ ");
        assert_eq!(theme.prompt, "$ ");
        assert!(theme.styled_prompt().contains("$ "));
    }
}
