//! In-memory collaborators for unit tests

use crate::config::{ConfigLocations, ConfigStore};
use crate::modules::ModuleContext;
use crate::project::FileSystem;
use crate::prompt::{Choice, Progress, Prompter, Validator};
use crate::runtime::{CommandExecutor, CommandOutcome, PackageManager};
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// `FileSystem` over a map of paths, counting successful writes
#[derive(Debug, Default)]
pub(crate) struct MemoryFileSystem {
    files: Mutex<BTreeMap<PathBuf, String>>,
    directories: Mutex<BTreeSet<PathBuf>>,
    writes: AtomicUsize,
    fail_all_writes: AtomicBool,
    failing_prefixes: Mutex<Vec<PathBuf>>,
}

impl MemoryFileSystem {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Seed a file without counting it as a write
    pub(crate) fn with_file(self, path: impl AsRef<Path>, contents: &str) -> Self {
        self.put_file(path, contents);
        self
    }

    pub(crate) fn put_file(&self, path: impl AsRef<Path>, contents: &str) {
        self.files
            .lock()
            .insert(path.as_ref().to_path_buf(), contents.to_string());
    }

    /// Every write and directory creation fails
    pub(crate) fn failing_writes(self) -> Self {
        self.fail_all_writes.store(true, Ordering::SeqCst);
        self
    }

    /// Writes below `prefix` fail
    pub(crate) fn fail_writes_under(&self, prefix: impl AsRef<Path>) {
        self.failing_prefixes
            .lock()
            .push(prefix.as_ref().to_path_buf());
    }

    pub(crate) fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.lock().get(path.as_ref()).cloned()
    }

    pub(crate) fn has_directory(&self, path: impl AsRef<Path>) -> bool {
        self.directories.lock().contains(path.as_ref())
    }

    pub(crate) fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_writable(&self, path: &Path) -> io::Result<()> {
        let denied = self.fail_all_writes.load(Ordering::SeqCst)
            || self
                .failing_prefixes
                .lock()
                .iter()
                .any(|prefix| path.starts_with(prefix));
        if denied {
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("write denied: {}", path.display()),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn exists(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path) || self.directories.lock().contains(path)
    }

    async fn read_file(&self, path: &Path) -> io::Result<String> {
        self.file(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{}", path.display()))
        })
    }

    async fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.check_writable(path)?;
        self.put_file(path, contents);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> io::Result<()> {
        match self.files.lock().remove(path) {
            Some(_) => Ok(()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}", path.display()),
            )),
        }
    }

    async fn create_directory(&self, path: &Path) -> io::Result<()> {
        if self.fail_all_writes.load(Ordering::SeqCst) {
            return self.check_writable(path);
        }
        let mut directories = self.directories.lock();
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            directories.insert(ancestor.to_path_buf());
        }
        Ok(())
    }
}

/// One scripted answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Answer {
    Confirm(bool),
    Select(String),
    MultiSelect(Vec<String>),
    Text(String),
    /// The prompt fails with an I/O error
    Fail,
}

impl Answer {
    pub(crate) fn select(value: &str) -> Self {
        Answer::Select(value.to_string())
    }

    pub(crate) fn multi(values: &[&str]) -> Self {
        Answer::MultiSelect(values.iter().map(|v| v.to_string()).collect())
    }

    pub(crate) fn text(value: &str) -> Self {
        Answer::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    Info,
    Success,
    Warning,
    Error,
}

/// `Prompter` replaying scripted answers.
///
/// When the script runs out every prompt takes its initial value.
#[derive(Debug, Default)]
pub(crate) struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    messages: Mutex<Vec<(Level, String)>>,
    notes: Mutex<Vec<(String, String)>>,
    rejected: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub(crate) fn push(&self, answers: impl IntoIterator<Item = Answer>) {
        self.answers.lock().extend(answers);
    }

    fn next(&self) -> Option<Answer> {
        self.answers.lock().pop_front()
    }

    fn messages_at(&self, level: Level) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub(crate) fn infos(&self) -> Vec<String> {
        self.messages_at(Level::Info)
    }

    pub(crate) fn errors(&self) -> Vec<String> {
        self.messages_at(Level::Error)
    }

    pub(crate) fn warnings(&self) -> Vec<String> {
        self.messages_at(Level::Warning)
    }

    pub(crate) fn messages(&self) -> Vec<(Level, String)> {
        self.messages.lock().clone()
    }

    pub(crate) fn notes(&self) -> Vec<(String, String)> {
        self.notes.lock().clone()
    }

    /// Text answers a validator turned down
    pub(crate) fn rejected(&self) -> Vec<String> {
        self.rejected.lock().clone()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.answers.lock().len()
    }

    fn record(&self, level: Level, message: &str) {
        self.messages.lock().push((level, message.to_string()));
    }
}

fn scripted_failure() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "scripted prompt failure")
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, message: &str, initial: bool) -> io::Result<bool> {
        match self.next() {
            None => Ok(initial),
            Some(Answer::Confirm(answer)) => Ok(answer),
            Some(Answer::Fail) => Err(scripted_failure()),
            Some(other) => panic!("expected a confirm answer for {message:?}, got {other:?}"),
        }
    }

    fn select(
        &self,
        message: &str,
        choices: &[Choice],
        initial: Option<&str>,
    ) -> io::Result<String> {
        match self.next() {
            None => Ok(initial
                .map(str::to_string)
                .or_else(|| choices.first().map(|c| c.value.clone()))
                .unwrap_or_default()),
            Some(Answer::Select(value)) => {
                assert!(
                    choices.iter().any(|c| c.value == value),
                    "{value:?} is not a choice of {message:?}"
                );
                Ok(value)
            }
            Some(Answer::Fail) => Err(scripted_failure()),
            Some(other) => panic!("expected a select answer for {message:?}, got {other:?}"),
        }
    }

    fn multiselect(
        &self,
        message: &str,
        choices: &[Choice],
        initial: &[String],
        _required: bool,
    ) -> io::Result<Vec<String>> {
        match self.next() {
            None => Ok(initial.to_vec()),
            Some(Answer::MultiSelect(values)) => {
                for value in &values {
                    assert!(
                        choices.iter().any(|c| &c.value == value),
                        "{value:?} is not a choice of {message:?}"
                    );
                }
                Ok(values)
            }
            Some(Answer::Fail) => Err(scripted_failure()),
            Some(other) => panic!("expected a multiselect answer for {message:?}, got {other:?}"),
        }
    }

    fn text(&self, message: &str, default: &str, validator: Validator) -> io::Result<String> {
        loop {
            match self.next() {
                None => return Ok(default.to_string()),
                Some(Answer::Text(value)) => match validator(&value) {
                    Ok(()) => return Ok(value),
                    Err(_) => self.rejected.lock().push(value),
                },
                Some(Answer::Fail) => return Err(scripted_failure()),
                Some(other) => panic!("expected a text answer for {message:?}, got {other:?}"),
            }
        }
    }

    fn note(&self, title: &str, body: &str) {
        self.notes.lock().push((title.to_string(), body.to_string()));
    }

    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    fn success(&self, message: &str) {
        self.record(Level::Success, message);
    }

    fn warning(&self, message: &str) {
        self.record(Level::Warning, message);
    }

    fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }

    fn spinner(&self, _message: &str) -> Box<dyn Progress> {
        Box::new(SilentProgress)
    }
}

struct SilentProgress;

impl Progress for SilentProgress {
    fn stop(&self, _message: &str) {}

    fn error(&self, _message: &str) {}
}

/// `CommandExecutor` that records commands and fails those matching a pattern
#[derive(Debug, Default)]
pub(crate) struct RecordingExecutor {
    commands: Mutex<Vec<String>>,
    failing: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    pub(crate) fn fail_on(&self, pattern: &str) {
        self.failing.lock().push(pattern.to_string());
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn execute(&self, command: &str, _cwd: &Path) -> Result<CommandOutcome> {
        self.commands.lock().push(command.to_string());
        let fails = self
            .failing
            .lock()
            .iter()
            .any(|pattern| command.contains(pattern.as_str()));
        if fails {
            Ok(CommandOutcome::failed("scripted command failure"))
        } else {
            Ok(CommandOutcome::succeeded())
        }
    }
}

/// Project rooted at `/project` with in-memory collaborators
pub(crate) struct Harness {
    pub(crate) root: PathBuf,
    pub(crate) fs: Arc<MemoryFileSystem>,
    pub(crate) prompter: ScriptedPrompter,
    pub(crate) executor: RecordingExecutor,
    pub(crate) store: ConfigStore,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let root = PathBuf::from("/project");
        let fs = Arc::new(MemoryFileSystem::new());
        let store = ConfigStore::new(ConfigLocations::new(&root, ".devkit", "devkit"), fs.clone());
        Self {
            root,
            fs,
            prompter: ScriptedPrompter::default(),
            executor: RecordingExecutor::default(),
            store,
        }
    }

    pub(crate) fn with_file(self, path: impl AsRef<Path>, contents: &str) -> Self {
        self.fs.put_file(path, contents);
        self
    }

    pub(crate) fn answers(self, answers: impl IntoIterator<Item = Answer>) -> Self {
        self.prompter.push(answers);
        self
    }

    pub(crate) fn context(&self) -> ModuleContext<'_> {
        ModuleContext {
            project_root: &self.root,
            fs: self.fs.as_ref(),
            prompter: &self.prompter,
            executor: &self.executor,
            store: &self.store,
            package_manager: PackageManager::Npm,
        }
    }
}
