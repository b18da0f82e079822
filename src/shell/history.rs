use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

/// 命令历史，启动时从文件加载，退出时写回
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    max_size: usize,
    file: Option<PathBuf>,
    /// `history -a` 上次追加到的位置
    appended: usize,
    generation: u64,
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_size: max_size.max(1),
            file: None,
            appended: 0,
            generation: 0,
        }
    }

    pub fn with_file(max_size: usize, file: PathBuf) -> Self {
        Self {
            file: Some(file),
            ..Self::new(max_size)
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 每次内容变化都会递增，供编辑器判断是否需要同步
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 连续重复的命令只记一次
    pub fn add(&mut self, line: &str) -> bool {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() || self.entries.last().map(String::as_str) == Some(line) {
            return false;
        }
        self.entries.push(line.to_string());
        self.truncate();
        self.generation += 1;
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.appended = 0;
        self.generation += 1;
    }

    fn truncate(&mut self) {
        if self.entries.len() > self.max_size {
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(..excess);
            self.appended = self.appended.saturating_sub(excess);
        }
    }

    /// 把文件中的每一行追加到历史中
    pub fn read_from(&mut self, path: &Path) -> io::Result<usize> {
        let content = fs::read_to_string(path)?;
        let before = self.entries.len();
        for line in content.lines() {
            self.add(line);
        }
        Ok(self.entries.len().saturating_sub(before))
    }

    pub fn write_to(&mut self, path: &Path) -> io::Result<()> {
        let mut content = self.entries.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(path, content)?;
        self.appended = self.entries.len();
        Ok(())
    }

    /// 只追加上次 `append_to` 之后新增的条目
    pub fn append_to(&mut self, path: &Path) -> io::Result<usize> {
        let start = self.appended.min(self.entries.len());
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        for line in &self.entries[start..] {
            writeln!(file, "{}", line)?;
        }
        self.appended = self.entries.len();
        Ok(self.entries.len() - start)
    }

    pub fn load(&mut self) {
        let Some(file) = self.file.clone() else {
            return;
        };
        match self.read_from(&file) {
            Ok(count) => {
                // 刚加载的内容已经在文件里了
                self.appended = self.entries.len();
                debug!("历史记录加载成功: {} 条", count);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("历史记录文件不存在: {}", file.display());
            }
            Err(e) => warn!("无法加载历史记录: {} {}", file.display(), e),
        }
    }

    pub fn save(&mut self) {
        let Some(file) = self.file.clone() else {
            return;
        };
        if let Some(parent) = file.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("无法创建历史记录目录: {} {}", parent.display(), e);
            }
        }
        match self.write_to(&file) {
            Ok(()) => debug!("历史记录保存成功"),
            Err(e) => warn!("保存历史记录失败: {} {}", file.display(), e),
        }
    }
}
