//! # Filesystem collaborator
//!
//! Generators never touch the disk directly. They go through [`FileSystem`],
//! which has two implementations:
//!
//! - [`OsFs`]: the real filesystem, rooted at the project folder
//! - [`MemFs`]: an in-memory tree used by tests
//!
//! Both apply the same overwrite policy in [`FileSystem::write_file`]: an
//! existing file whose content differs is only replaced when `force` is set
//! (per call or globally), or when the [`Prompt`] says yes.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

/// Result of a write request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Content was written (new file or replaced)
    Written,
    /// The file already held exactly this content
    Unchanged,
    /// The file exists, differs, and overwriting was declined
    Skipped,
}

/// Storage used by every generator
pub trait FileSystem {
    fn exists(&self, path: &Path) -> anyhow::Result<bool>;
    fn read_file(&self, path: &Path) -> anyhow::Result<String>;
    /// Write `content`, creating parent directories as needed
    fn write_file(&self, path: &Path, content: &str, force: bool) -> anyhow::Result<WriteOutcome>;
    fn mkdir(&self, path: &Path) -> anyhow::Result<()>;
    fn mkdir_all(&self, path: &Path) -> anyhow::Result<()>;
    /// Names of the immediate subdirectories of `path`, sorted
    fn list_dirs(&self, path: &Path) -> anyhow::Result<Vec<String>>;
}

/// Asks whether an existing file may be replaced
pub trait Prompt {
    fn confirm_overwrite(&self, path: &Path) -> bool;
}

/// Interactive prompt on standard input; anything but `y`/`yes` declines
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm_overwrite(&self, path: &Path) -> bool {
        let mut stderr = io::stderr();
        write!(
            stderr,
            "`{}` already exists, do you want to override it? [y/N] ",
            path.display()
        )
        .and_then(|()| stderr.flush())
        .ok();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Prompt with a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Prompt for FixedAnswer {
    fn confirm_overwrite(&self, _path: &Path) -> bool {
        self.0
    }
}

fn decide(
    path: &Path,
    current: Option<&str>,
    content: &str,
    force: bool,
    prompt: &dyn Prompt,
) -> WriteOutcome {
    match current {
        None => WriteOutcome::Written,
        Some(existing) if existing == content => WriteOutcome::Unchanged,
        Some(_) if force || prompt.confirm_overwrite(path) => WriteOutcome::Written,
        Some(_) => WriteOutcome::Skipped,
    }
}

/// Real filesystem rooted at the project folder
pub struct OsFs {
    root: PathBuf,
    force: bool,
    prompt: Box<dyn Prompt>,
}

impl OsFs {
    /// `force` applies to every write in addition to the per-call flag
    pub fn new(root: impl Into<PathBuf>, force: bool, prompt: Box<dyn Prompt>) -> Self {
        Self {
            root: root.into(),
            force,
            prompt,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl FileSystem for OsFs {
    fn exists(&self, path: &Path) -> anyhow::Result<bool> {
        Ok(self.resolve(path).exists())
    }

    fn read_file(&self, path: &Path) -> anyhow::Result<String> {
        let full = self.resolve(path);
        fs::read_to_string(&full).with_context(|| format!("failed to read {}", full.display()))
    }

    fn write_file(&self, path: &Path, content: &str, force: bool) -> anyhow::Result<WriteOutcome> {
        let full = self.resolve(path);
        let current = if full.exists() {
            Some(self.read_file(path)?)
        } else {
            None
        };
        let outcome = decide(
            path,
            current.as_deref(),
            content,
            force || self.force,
            self.prompt.as_ref(),
        );
        match outcome {
            WriteOutcome::Written => {
                if let Some(parent) = full.parent() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create directory {}", parent.display())
                    })?;
                }
                fs::write(&full, content)
                    .with_context(|| format!("failed to write {}", full.display()))?;
                debug!(path = %path.display(), bytes = content.len(), "file written");
            }
            WriteOutcome::Unchanged => debug!(path = %path.display(), "file unchanged"),
            WriteOutcome::Skipped => info!(path = %path.display(), "overwrite declined, file left as is"),
        }
        Ok(outcome)
    }

    fn mkdir(&self, path: &Path) -> anyhow::Result<()> {
        let full = self.resolve(path);
        fs::create_dir(&full).with_context(|| format!("failed to create {}", full.display()))
    }

    fn mkdir_all(&self, path: &Path) -> anyhow::Result<()> {
        let full = self.resolve(path);
        fs::create_dir_all(&full).with_context(|| format!("failed to create {}", full.display()))
    }

    fn list_dirs(&self, path: &Path) -> anyhow::Result<Vec<String>> {
        let full = self.resolve(path);
        let mut names = Vec::new();
        let entries =
            fs::read_dir(&full).with_context(|| format!("failed to list {}", full.display()))?;
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Lexically normalise a relative path: drop `.` and resolve `..`
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// In-memory filesystem
pub struct MemFs {
    files: RefCell<BTreeMap<PathBuf, String>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
    force: bool,
    prompt: Box<dyn Prompt>,
}

impl Default for MemFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemFs {
    /// Empty tree that declines every overwrite prompt
    pub fn new() -> Self {
        Self::with_policy(false, Box::new(FixedAnswer(false)))
    }

    pub fn with_policy(force: bool, prompt: Box<dyn Prompt>) -> Self {
        Self {
            files: RefCell::new(BTreeMap::new()),
            dirs: RefCell::new(BTreeSet::new()),
            force,
            prompt,
        }
    }

    /// Seed a file without going through the overwrite policy
    pub fn insert(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = normalize(path.as_ref());
        self.add_parents(&path);
        self.files.borrow_mut().insert(path, content.into());
    }

    /// Content of a file, if present
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(&normalize(path.as_ref())).cloned()
    }

    /// Every file path, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }

    fn add_parents(&self, path: &Path) {
        let mut dirs = self.dirs.borrow_mut();
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir.as_os_str().is_empty() {
                break;
            }
            dirs.insert(dir.to_path_buf());
            current = dir.parent();
        }
    }
}

impl FileSystem for MemFs {
    fn exists(&self, path: &Path) -> anyhow::Result<bool> {
        let path = normalize(path);
        Ok(self.files.borrow().contains_key(&path) || self.dirs.borrow().contains(&path))
    }

    fn read_file(&self, path: &Path) -> anyhow::Result<String> {
        self.files
            .borrow()
            .get(&normalize(path))
            .cloned()
            .with_context(|| format!("failed to read {}: no such file", path.display()))
    }

    fn write_file(&self, path: &Path, content: &str, force: bool) -> anyhow::Result<WriteOutcome> {
        let key = normalize(path);
        let current = self.files.borrow().get(&key).cloned();
        let outcome = decide(
            path,
            current.as_deref(),
            content,
            force || self.force,
            self.prompt.as_ref(),
        );
        if outcome == WriteOutcome::Written {
            self.add_parents(&key);
            self.files.borrow_mut().insert(key, content.to_string());
        }
        Ok(outcome)
    }

    fn mkdir(&self, path: &Path) -> anyhow::Result<()> {
        let path = normalize(path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !self.dirs.borrow().contains(parent) {
                anyhow::bail!("failed to create {}: parent does not exist", path.display());
            }
        }
        self.dirs.borrow_mut().insert(path);
        Ok(())
    }

    fn mkdir_all(&self, path: &Path) -> anyhow::Result<()> {
        let path = normalize(path);
        self.add_parents(&path);
        self.dirs.borrow_mut().insert(path);
        Ok(())
    }

    fn list_dirs(&self, path: &Path) -> anyhow::Result<Vec<String>> {
        let base = normalize(path);
        let names: BTreeSet<String> = self
            .dirs
            .borrow()
            .iter()
            .filter(|d| d.parent() == Some(base.as_path()))
            .filter_map(|d| d.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        Ok(names.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn test_memfs_overwrite_policy() {
        let fs = MemFs::new();
        let p = Path::new("foo/pkg/service/service.go");
        assert_eq!(fs.write_file(p, "a", false).unwrap(), WriteOutcome::Written);
        assert_eq!(fs.write_file(p, "a", false).unwrap(), WriteOutcome::Unchanged);
        assert_eq!(fs.write_file(p, "b", false).unwrap(), WriteOutcome::Skipped);
        assert_eq!(fs.get(p).as_deref(), Some("a"));
        assert_eq!(fs.write_file(p, "b", true).unwrap(), WriteOutcome::Written);
        assert_eq!(fs.get(p).as_deref(), Some("b"));
        assert!(fs.exists(Path::new("foo/pkg")).unwrap());
    }

    #[test]
    fn test_memfs_prompt_and_global_force() {
        let yes = MemFs::with_policy(false, Box::new(FixedAnswer(true)));
        yes.insert("a.go", "old");
        assert_eq!(
            yes.write_file(Path::new("a.go"), "new", false).unwrap(),
            WriteOutcome::Written
        );

        let forced = MemFs::with_policy(true, Box::new(FixedAnswer(false)));
        forced.insert("a.go", "old");
        assert_eq!(
            forced.write_file(Path::new("a.go"), "new", false).unwrap(),
            WriteOutcome::Written
        );
    }

    #[test]
    fn test_memfs_dirs() {
        let fs = MemFs::new();
        fs.insert("users/pkg/service/service.go", "package service\n");
        fs.mkdir_all(Path::new("orders/pkg")).unwrap();
        assert_eq!(
            fs.list_dirs(Path::new("")).unwrap(),
            vec!["orders".to_string(), "users".to_string()]
        );
        assert!(fs.mkdir(Path::new("missing/child")).is_err());
        assert!(fs.read_file(Path::new("nope.go")).is_err());
    }

    #[test]
    fn test_osfs_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let fs = OsFs::new(dir.path(), false, Box::new(FixedAnswer(false)));
        let p = Path::new("svc/pkg/service.go");
        assert_eq!(fs.write_file(p, "x", false).unwrap(), WriteOutcome::Written);
        assert_eq!(fs.read_file(p).unwrap(), "x");
        assert_eq!(fs.write_file(p, "y", false).unwrap(), WriteOutcome::Skipped);
        assert_eq!(fs.list_dirs(Path::new("")).unwrap(), vec!["svc".to_string()]);
    }
}
