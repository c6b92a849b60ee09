use anyhow::Result;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::new_debouncer;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

/// What part of the repository moved under us
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitChangeKind {
    /// HEAD changed — branch switch or new commit
    Branch,
    /// The index (staging area) changed
    Index,
    /// Refs moved — fetches, resets, ref updates
    Refs,
}

impl GitChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            GitChangeKind::Branch => "branch",
            GitChangeKind::Index => "index",
            GitChangeKind::Refs => "refs",
        }
    }
}

/// Events emitted by the repo watcher
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// Something changed in .git — time to refresh the change list
    GitChanged(GitChangeKind),
}

/// A debounced watcher over a repository's .git directory. Dropping it
/// stops the watch.
pub struct RepoWatcher {
    _watcher: notify_debouncer_mini::Debouncer<RecommendedWatcher>,
}

impl RepoWatcher {
    /// Start watching `repo_root/.git`. Classified change events are sent
    /// to the provided sender, debounced by `debounce_ms` milliseconds.
    pub fn new(repo_root: &Path, debounce_ms: u64, tx: mpsc::Sender<WatchEvent>) -> Result<Self> {
        let git_dir = repo_root.join(".git");
        if !git_dir.exists() {
            anyhow::bail!("Not a git repository: {}", repo_root.display());
        }

        let mut debouncer = new_debouncer(
            Duration::from_millis(debounce_ms),
            move |result: std::result::Result<
                Vec<notify_debouncer_mini::DebouncedEvent>,
                notify::Error,
            >| {
                if let Ok(events) = result {
                    let kind = events
                        .iter()
                        .filter_map(|e| classify(&e.path.to_string_lossy()))
                        .last();
                    if let Some(kind) = kind {
                        let _ = tx.send(WatchEvent::GitChanged(kind));
                    }
                }
            },
        )?;

        debouncer.watcher().watch(&git_dir, RecursiveMode::Recursive)?;

        Ok(RepoWatcher {
            _watcher: debouncer,
        })
    }
}

/// Classify a path inside .git. Paths that are pure noise (object packs,
/// temp files) return None and never trigger a refresh.
fn classify(path: &str) -> Option<GitChangeKind> {
    if path.ends_with("/index") || path.ends_with("/index.lock") {
        return Some(GitChangeKind::Index);
    }
    // FETCH_HEAD/ORIG_HEAD are ref bookkeeping, not branch switches; they
    // must be matched before the plain HEAD check below.
    if path.contains("FETCH_HEAD")
        || path.contains("ORIG_HEAD")
        || path.contains("/logs/")
        || path.contains("/refs/")
    {
        return Some(GitChangeKind::Refs);
    }
    if path.ends_with("/HEAD") {
        return Some(GitChangeKind::Branch);
    }
    None
}
