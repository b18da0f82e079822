use crate::shell::history::History;
use crate::utils::config::Config;
use crate::utils::path::executables_with_prefix;
use log::debug;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
pub use rustyline::error::ReadlineError;
use rustyline::history::{FileHistory, History as _};
use rustyline::{CompletionType, Config as RLConfig, Editor};
use rustyline::{Helper, Highlighter, Hinter, Validator};

/// 第一个词补全命令名，其余位置补全文件名
#[derive(Helper, Highlighter, Hinter, Validator)]
pub struct ShellHelper {
    builtins: Vec<&'static str>,
    filenames: FilenameCompleter,
    enabled: bool,
}

impl ShellHelper {
    pub fn new(builtins: Vec<&'static str>, enabled: bool) -> Self {
        Self {
            builtins,
            filenames: FilenameCompleter::new(),
            enabled,
        }
    }

    fn complete_command(&self, prefix: &str) -> Vec<Pair> {
        let mut names: Vec<String> = self
            .builtins
            .iter()
            .filter(|name| name.starts_with(prefix))
            .map(|name| name.to_string())
            .collect();
        names.extend(executables_with_prefix(prefix));
        names.sort();
        names.dedup();
        names
            .into_iter()
            .map(|name| Pair {
                display: name.clone(),
                replacement: format!("{} ", name),
            })
            .collect()
    }
}

/// 光标所在单词的起点，以及它是否是一行的第一个词
fn word_start(line: &str, pos: usize) -> (usize, bool) {
    let before = &line[..pos];
    let start = before
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let first = before[..start].trim().is_empty();
    (start, first)
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if !self.enabled {
            return Ok((pos, Vec::new()));
        }
        let (start, first) = word_start(line, pos);
        let word = &line[start..pos];
        // 带路径的命令名按文件补全
        if first && !word.contains('/') {
            return Ok((start, self.complete_command(word)));
        }
        self.filenames.complete(line, pos, ctx)
    }
}

pub struct ReadlineManager {
    editor: Editor<ShellHelper, FileHistory>,
    synced_generation: Option<u64>,
}

impl ReadlineManager {
    pub fn new(config: &Config, helper: ShellHelper) -> Result<Self, ReadlineError> {
        let rl_config = RLConfig::builder()
            .history_ignore_space(true)
            .max_history_size(config.history_size.max(1))?
            .completion_type(CompletionType::List)
            .edit_mode(config.get_edit_mode())
            .auto_add_history(false)
            .build();

        let mut editor = Editor::with_config(rl_config)?;
        editor.set_helper(Some(helper));
        Ok(Self {
            editor,
            synced_generation: None,
        })
    }

    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        self.editor.readline(prompt)
    }

    /// shell 的历史记录变化后，重建编辑器里可上下翻动的历史
    pub fn sync_history(&mut self, history: &History) -> Result<(), ReadlineError> {
        if self.synced_generation == Some(history.generation()) {
            return Ok(());
        }
        let editor_history = self.editor.history_mut();
        editor_history.clear()?;
        for line in history.entries() {
            editor_history.add(line)?;
        }
        self.synced_generation = Some(history.generation());
        debug!("编辑器历史已同步: {} 条", history.len());
        Ok(())
    }
}
