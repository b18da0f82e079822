use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use log::debug;
use once_cell::sync::Lazy;

static CACHE: Lazy<Mutex<PathCache>> = Lazy::new(|| Mutex::new(PathCache::new()));

/// 在 PATH 中查找可执行文件，结果缓存到 PATH 变化为止
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let search_path = env::var_os("PATH").unwrap_or_default();
    let search_path = search_path.to_string_lossy();
    CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .lookup(&search_path, name)
}

/// 命令名到绝对路径的缓存，`None` 表示已确认找不到
#[derive(Debug, Default)]
pub struct PathCache {
    search_path: String,
    entries: HashMap<String, Option<PathBuf>>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&mut self, search_path: &str, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }

        // 带路径分隔符的直接检查，不进缓存
        if name.contains(std::path::MAIN_SEPARATOR) || name.contains('/') {
            let path = PathBuf::from(name);
            return is_executable(&path).then_some(path);
        }

        if search_path != self.search_path {
            debug!("PATH 已变化，清空可执行文件缓存");
            self.entries.clear();
            self.search_path = search_path.to_string();
        }

        if let Some(cached) = self.entries.get(name) {
            return cached.clone();
        }

        let found = search(search_path, name);
        debug!("查找可执行文件: {} -> {:?}", name, found);
        self.entries.insert(name.to_string(), found.clone());
        found
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn search(search_path: &str, name: &str) -> Option<PathBuf> {
    env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .find_map(|dir| {
            let candidate = dir.join(name);
            if is_executable(&candidate) {
                return Some(candidate);
            }
            if cfg!(windows) {
                let candidate = dir.join(format!("{}.exe", name));
                if is_executable(&candidate) {
                    return Some(candidate);
                }
            }
            None
        })
}

/// PATH 中以 `prefix` 开头的可执行文件名，去重并排序
pub fn executables_with_prefix(prefix: &str) -> Vec<String> {
    let search_path = env::var_os("PATH").unwrap_or_default();
    let mut names: Vec<String> = env::split_paths(&search_path)
        .filter_map(|dir| fs::read_dir(dir).ok())
        .flat_map(|entries| entries.filter_map(Result::ok))
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            (name.starts_with(prefix) && is_executable(&entry.path())).then_some(name)
        })
        .collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    fs::metadata(path).map(|meta| meta.is_file()).unwrap_or(false)
}
