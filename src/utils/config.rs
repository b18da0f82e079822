use dotenv::dotenv;
use rustyline::EditMode;
use std::env;
use std::path::PathBuf;

pub struct Config {
    pub name: String,
    pub config_dir: PathBuf,
    pub prompt: String,
    pub theme: String,
    pub editor_mode: String,
    pub history_file: PathBuf,
    pub history_size: usize,
    pub completion: bool,
    pub logger_level: String,
    pub logger_dir: PathBuf,
    pub logger_stderr: bool,
}

impl Config {
    fn get_config_dir() -> PathBuf {
        if let Ok(home) = env::var("HOME") {
            PathBuf::from(home).join(".config/ripple")
        } else {
            env::temp_dir().join("ripple")
        }
    }

    fn with_config_dir(config_dir: PathBuf) -> Self {
        Config {
            name: env!("CARGO_PKG_NAME").to_string(),
            prompt: String::from("$ "),
            theme: String::from("default"),
            editor_mode: String::from("emacs"),
            history_file: config_dir.join(".ripple_history"),
            history_size: 1000,
            completion: true,
            logger_level: String::from("info"),
            logger_dir: config_dir.join("logs"),
            logger_stderr: false,
            config_dir,
        }
    }

    pub fn new() -> Self {
        // 优先加载环境变量
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        Self::from_lookup(Self::get_config_dir(), |key| env::var(key).ok())
    }

    /// 在默认配置上叠加 `RIPPLE_*` 变量
    fn from_lookup<F>(config_dir: PathBuf, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::with_config_dir(config_dir);

        if let Some(prompt) = lookup("RIPPLE_PROMPT") {
            config.prompt = prompt;
        }

        if let Some(theme) = lookup("RIPPLE_THEME") {
            config.theme = theme;
        }

        if let Some(editor) = lookup("RIPPLE_EDITOR") {
            config.editor_mode = editor;
        }

        if let Some(history) = lookup("RIPPLE_HISTORY") {
            config.history_file = PathBuf::from(shellexpand::tilde(&history).as_ref());
        }

        if let Some(size) = lookup("RIPPLE_HISTORY_SIZE").and_then(|s| s.trim().parse().ok()) {
            config.history_size = size;
        }

        if let Some(completion) = lookup("RIPPLE_COMPLETION") {
            config.completion = parse_flag(&completion, true);
        }

        if let Some(level) = lookup("RIPPLE_LOG_LEVEL") {
            config.logger_level = level;
        }

        if let Some(dir) = lookup("RIPPLE_LOG_DIR") {
            config.logger_dir = PathBuf::from(shellexpand::tilde(&dir).as_ref());
        }

        if let Some(mirror) = lookup("RIPPLE_LOG_STDERR") {
            config.logger_stderr = parse_flag(&mirror, false);
        }

        config
    }

    pub fn get_edit_mode(&self) -> EditMode {
        match self.editor_mode.to_lowercase().as_str() {
            "vi" => EditMode::Vi,
            _ => EditMode::Emacs,
        }
    }
}

fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => true,
        "0" | "off" | "false" | "no" => false,
        _ => default,
    }
}
