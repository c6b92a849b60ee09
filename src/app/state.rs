use super::filter::{self, FilterState, FilteredSummary, Summary};
use super::tree::{self, FileTreeNode};
use crate::config::BlConfig;
use crate::git::{self, ChangedFile, FileDiff, RepoInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ── Enums ──

/// Diff pane layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Unified,
    Split,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Unified => ViewMode::Split,
            ViewMode::Split => ViewMode::Unified,
        }
    }
}

/// Whether keys navigate or type into the search field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// A directory entry for the repository browser
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub is_git_repo: bool,
}

/// Active overlay popup state
#[derive(Debug, Clone)]
pub enum OverlayData {
    DirectoryBrowser {
        current_path: String,
        entries: Vec<DirEntry>,
        selected: usize,
    },
    BranchPicker {
        branches: Vec<String>,
        selected: usize,
    },
}

// ── Effects & completions ──

/// I/O the navigation engine asks the event loop to perform. Handlers
/// mutate stores and return these; the loop runs gateway calls on worker
/// threads and feeds the results back through [`GatewayEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadRepoInfo {
        seq: u64,
        repo_path: String,
    },
    LoadChangedFiles {
        seq: u64,
        repo_path: String,
        base_branch: String,
    },
    LoadDiff {
        seq: u64,
        repo_path: String,
        file_path: String,
        base_branch: String,
    },
    OpenEditor {
        repo_path: String,
        file_path: String,
    },
    StartWatch {
        repo_path: String,
    },
    StopWatch,
}

/// Completion of a gateway call. Every dispatched effect produces exactly
/// one completion, success or failure — that is what guarantees the
/// loading flag always clears.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    RepoInfoLoaded {
        seq: u64,
        result: Result<RepoInfo, String>,
    },
    FilesLoaded {
        seq: u64,
        result: Result<Vec<ChangedFile>, String>,
    },
    DiffLoaded {
        seq: u64,
        path: String,
        result: Result<FileDiff, String>,
    },
}

// ── Derived state ──

/// Outputs of the filter pipeline, cached against a revision counter.
/// Recomputed as a unit whenever any filter input has changed since the
/// cache was built.
#[derive(Debug, Default)]
pub struct Derived {
    rev: u64,
    pub filtered: Vec<ChangedFile>,
    pub tree: Vec<FileTreeNode>,
    pub summary: Summary,
    pub filtered_summary: FilteredSummary,
}

// ── Application state ──

/// The full store set, owned by the event loop and passed by reference to
/// the key handlers and the renderer.
pub struct App {
    // Repository stores
    pub repo_path: Option<String>,
    pub repo_info: Option<RepoInfo>,
    pub base_branch: Option<String>,
    files: Vec<ChangedFile>,

    // Selection stores
    pub selected: Option<String>,
    pub current_diff: Option<FileDiff>,

    // UI stores
    pub error: Option<String>,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub overlay: Option<OverlayData>,
    pub show_line_numbers: bool,
    pub diff_scroll: u16,
    pub watching: bool,
    pub should_quit: bool,

    // Tree collapse pulses, consumed once per loop turn after the handlers
    pub collapse_pulse: bool,
    pub expand_pulse: bool,
    collapsed_dirs: HashSet<String>,

    // Filter stores
    filters: FilterState,

    // In-flight gateway calls; any Some means loading
    pending_repo: Option<u64>,
    pending_files: Option<u64>,
    pending_diff: Option<u64>,
    seq: u64,

    // Derived cache
    rev: u64,
    derived: Derived,

    // Transient status message
    pub notice: Option<String>,
    notice_ticks: u8,

    // One-shot base branch override (--base), applied on the next repo open
    base_override: Option<String>,
}

impl App {
    pub fn new(config: &BlConfig) -> Self {
        App {
            repo_path: None,
            repo_info: None,
            base_branch: None,
            files: Vec::new(),
            selected: None,
            current_diff: None,
            error: None,
            view_mode: config.display.view_mode,
            input_mode: InputMode::Normal,
            overlay: None,
            show_line_numbers: config.display.line_numbers,
            diff_scroll: 0,
            watching: config.watch.enabled,
            should_quit: false,
            collapse_pulse: false,
            expand_pulse: false,
            collapsed_dirs: HashSet::new(),
            filters: FilterState {
                search: String::new(),
                show_added: config.filters.show_added,
                show_modified: config.filters.show_modified,
                show_deleted: config.filters.show_deleted,
                show_cosmetic: config.filters.show_cosmetic,
            },
            pending_repo: None,
            pending_files: None,
            pending_diff: None,
            seq: 0,
            rev: 1,
            derived: Derived::default(),
            notice: None,
            notice_ticks: 0,
            base_override: None,
        }
    }

    /// Override the detected default base for the next repo open
    pub fn set_base_override(&mut self, base: Option<String>) {
        self.base_override = base;
    }

    // ── Store access ──

    pub fn files(&self) -> &[ChangedFile] {
        &self.files
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn search(&self) -> &str {
        &self.filters.search
    }

    /// The externally observable loading flag: true while any gateway call
    /// is in flight
    pub fn loading(&self) -> bool {
        self.pending_repo.is_some() || self.pending_files.is_some() || self.pending_diff.is_some()
    }

    /// Derived stores, recomputed on access when any input changed since
    /// the last computation. The single recompute site of the pipeline.
    pub fn derived(&mut self) -> &Derived {
        if self.derived.rev != self.rev {
            let filtered = filter::filter_files(&self.files, &self.filters);
            self.derived = Derived {
                rev: self.rev,
                tree: tree::build_tree(&filtered),
                summary: filter::summarize(&self.files),
                filtered_summary: filter::summarize_filtered(&filtered),
                filtered,
            };
        }
        &self.derived
    }

    /// Read the derived cache without refreshing it. Valid in render code,
    /// which runs after the loop has called [`App::derived`] for the turn.
    pub fn derived_cached(&self) -> &Derived {
        &self.derived
    }

    /// Mark the derived cache stale. Called by every setter that feeds the
    /// filter pipeline.
    fn bump(&mut self) {
        self.rev = self.rev.wrapping_add(1);
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    // ── Filter setters ──

    pub fn set_files(&mut self, files: Vec<ChangedFile>) {
        self.files = files;
        self.bump();
    }

    pub fn search_push(&mut self, c: char) {
        self.filters.search.push(c);
        self.bump();
    }

    pub fn search_pop(&mut self) {
        self.filters.search.pop();
        self.bump();
    }

    pub fn search_clear(&mut self) {
        if !self.filters.search.is_empty() {
            self.filters.search.clear();
            self.bump();
        }
    }

    pub fn toggle_added(&mut self) -> Vec<Effect> {
        self.filters.show_added = !self.filters.show_added;
        self.bump();
        self.reconcile()
    }

    pub fn toggle_modified(&mut self) -> Vec<Effect> {
        self.filters.show_modified = !self.filters.show_modified;
        self.bump();
        self.reconcile()
    }

    pub fn toggle_deleted(&mut self) -> Vec<Effect> {
        self.filters.show_deleted = !self.filters.show_deleted;
        self.bump();
        self.reconcile()
    }

    pub fn toggle_cosmetic(&mut self) -> Vec<Effect> {
        self.filters.show_cosmetic = !self.filters.show_cosmetic;
        self.bump();
        self.reconcile()
    }

    // ── Selection ──

    fn selected_pos(&mut self) -> Option<usize> {
        let selected = self.selected.clone()?;
        self.derived()
            .filtered
            .iter()
            .position(|f| f.path == selected)
    }

    /// Select by index into the filtered list. Out-of-range indices clamp;
    /// an empty list is a no-op. Dispatches the diff load for the chosen
    /// file.
    pub fn select_index(&mut self, idx: isize) -> Vec<Effect> {
        let len = self.derived().filtered.len();
        if len == 0 {
            return Vec::new();
        }
        let clamped = idx.clamp(0, len as isize - 1) as usize;
        let path = self.derived().filtered[clamped].path.clone();
        self.selected = Some(path.clone());

        let (repo_path, base_branch) = match (self.repo_path.clone(), self.base_branch.clone()) {
            (Some(repo), Some(base)) => (repo, base),
            _ => return Vec::new(),
        };
        let seq = self.next_seq();
        self.pending_diff = Some(seq);
        vec![Effect::LoadDiff {
            seq,
            repo_path,
            file_path: path,
            base_branch,
        }]
    }

    pub fn select_next(&mut self) -> Vec<Effect> {
        let idx = self.selected_pos().map(|p| p as isize).unwrap_or(-1);
        self.select_index(idx + 1)
    }

    pub fn select_prev(&mut self) -> Vec<Effect> {
        let idx = self.selected_pos().map(|p| p as isize).unwrap_or(-1);
        self.select_index(idx - 1)
    }

    /// Clear selection and the current diff without touching the gateway
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.current_diff = None;
    }

    /// After a filter change: if the selected path fell out of the
    /// filtered list, re-select the first visible file, or clear when
    /// nothing is left. Reads the freshly recomputed list.
    pub fn reconcile(&mut self) -> Vec<Effect> {
        let selected = match self.selected.clone() {
            Some(path) => path,
            None => return Vec::new(),
        };
        let still_visible = self
            .derived()
            .filtered
            .iter()
            .any(|f| f.path == selected);
        if still_visible {
            return Vec::new();
        }
        if self.derived().filtered.is_empty() {
            self.clear_selection();
            Vec::new()
        } else {
            self.select_index(0)
        }
    }

    // ── Async sequences ──

    /// Start opening a repository: record the path and fetch its metadata.
    /// The rest of the sequence continues in [`App::apply`].
    pub fn open_repo(&mut self, folder: String) -> Vec<Effect> {
        self.repo_path = Some(folder.clone());
        let seq = self.next_seq();
        self.pending_repo = Some(seq);
        vec![Effect::LoadRepoInfo {
            seq,
            repo_path: folder,
        }]
    }

    /// Re-fetch the change list. No-op until a repo and base branch are
    /// set.
    pub fn refresh(&mut self) -> Vec<Effect> {
        let (repo_path, base_branch) = match (self.repo_path.clone(), self.base_branch.clone()) {
            (Some(repo), Some(base)) => (repo, base),
            _ => return Vec::new(),
        };
        let seq = self.next_seq();
        self.pending_files = Some(seq);
        vec![Effect::LoadChangedFiles {
            seq,
            repo_path,
            base_branch,
        }]
    }

    /// Switch the base branch and re-run the refresh sequence
    pub fn set_base_branch(&mut self, name: String) -> Vec<Effect> {
        self.base_branch = Some(name);
        self.refresh()
    }

    /// Apply a gateway completion. Completions whose sequence number is
    /// not the latest dispatched for their slot are discarded —
    /// last-dispatched-wins under overlapping loads.
    pub fn apply(&mut self, event: GatewayEvent) -> Vec<Effect> {
        match event {
            GatewayEvent::RepoInfoLoaded { seq, result } => {
                if self.pending_repo != Some(seq) {
                    return Vec::new();
                }
                self.pending_repo = None;
                match result {
                    Ok(info) => {
                        self.error = None;
                        let base = self
                            .base_override
                            .take()
                            .unwrap_or_else(|| info.default_base.clone());
                        self.base_branch = Some(base);
                        self.repo_info = Some(info);
                        let mut effects = self.refresh();
                        if self.watching {
                            if let Some(repo_path) = self.repo_path.clone() {
                                effects.push(Effect::StartWatch { repo_path });
                            }
                        }
                        effects
                    }
                    Err(msg) => {
                        self.error = Some(msg);
                        Vec::new()
                    }
                }
            }
            GatewayEvent::FilesLoaded { seq, result } => {
                if self.pending_files != Some(seq) {
                    return Vec::new();
                }
                self.pending_files = None;
                match result {
                    Ok(files) => {
                        self.error = None;
                        let count = files.len();
                        self.set_files(files);
                        self.clear_selection();
                        self.notify(format!(
                            "{} changed file{}",
                            count,
                            if count == 1 { "" } else { "s" }
                        ));
                    }
                    Err(msg) => self.error = Some(msg),
                }
                Vec::new()
            }
            GatewayEvent::DiffLoaded { seq, path, result } => {
                if self.pending_diff != Some(seq) {
                    return Vec::new();
                }
                self.pending_diff = None;
                match result {
                    Ok(diff) => {
                        // The selection may have been cleared while the
                        // load was in flight; don't resurrect it.
                        if self.selected.as_deref() == Some(path.as_str()) {
                            self.current_diff = Some(diff);
                            self.diff_scroll = 0;
                        }
                    }
                    Err(msg) => {
                        // Keep the previous diff — the pane never goes
                        // blank on a transient failure.
                        self.notify(format!("Diff load failed: {}", msg));
                    }
                }
                Vec::new()
            }
        }
    }

    // ── Tree collapse ──

    /// Consume the collapse/expand pulses. Called once per loop turn so a
    /// pulse takes effect on the next render and then clears.
    pub fn apply_pulses(&mut self) {
        if self.collapse_pulse {
            self.collapse_pulse = false;
            self.derived();
            let mut dirs = HashSet::new();
            collect_dirs(&self.derived.tree, &mut dirs);
            self.collapsed_dirs = dirs;
        }
        if self.expand_pulse {
            self.expand_pulse = false;
            self.collapsed_dirs.clear();
        }
    }

    pub fn is_expanded(&self, node: &FileTreeNode) -> bool {
        node.expanded && !self.collapsed_dirs.contains(&node.path)
    }

    // ── Overlays ──

    pub fn open_directory_browser(&mut self) {
        let start = self
            .repo_path
            .clone()
            .or_else(|| {
                std::env::current_dir()
                    .ok()
                    .map(|p| p.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| "/".to_string());
        self.overlay = Some(OverlayData::DirectoryBrowser {
            entries: list_dirs(&start),
            current_path: start,
            selected: 0,
        });
    }

    pub fn open_branch_picker(&mut self) {
        let info = match &self.repo_info {
            Some(info) => info,
            None => return,
        };
        let branches: Vec<String> = info
            .branches
            .iter()
            .filter(|b| !b.is_remote)
            .map(|b| b.name.clone())
            .collect();
        if branches.is_empty() {
            return;
        }
        let selected = self
            .base_branch
            .as_ref()
            .and_then(|base| branches.iter().position(|name| name == base))
            .unwrap_or(0);
        self.overlay = Some(OverlayData::BranchPicker { branches, selected });
    }

    pub fn overlay_next(&mut self) {
        match &mut self.overlay {
            Some(OverlayData::DirectoryBrowser {
                entries, selected, ..
            }) => {
                if *selected + 1 < entries.len() {
                    *selected += 1;
                }
            }
            Some(OverlayData::BranchPicker { branches, selected }) => {
                if *selected + 1 < branches.len() {
                    *selected += 1;
                }
            }
            None => {}
        }
    }

    pub fn overlay_prev(&mut self) {
        match &mut self.overlay {
            Some(OverlayData::DirectoryBrowser { selected, .. })
            | Some(OverlayData::BranchPicker { selected, .. }) => {
                *selected = selected.saturating_sub(1);
            }
            None => {}
        }
    }

    /// Close the overlay without applying anything — the cancelled-dialog
    /// path, leaving every store untouched
    pub fn overlay_close(&mut self) {
        self.overlay = None;
    }

    /// Step the directory browser up to the parent directory
    pub fn overlay_go_up(&mut self) {
        if let Some(OverlayData::DirectoryBrowser {
            current_path,
            entries,
            selected,
        }) = &mut self.overlay
        {
            if let Some(parent) = Path::new(current_path.as_str()).parent() {
                *current_path = parent.to_string_lossy().to_string();
                *entries = list_dirs(current_path);
                *selected = 0;
            }
        }
    }

    /// Confirm the overlay selection: descend into a directory, choose a
    /// repository, or switch the base branch
    pub fn overlay_select(&mut self) -> Vec<Effect> {
        match self.overlay.clone() {
            Some(OverlayData::DirectoryBrowser {
                current_path,
                entries,
                selected,
            }) => {
                let entry = match entries.get(selected) {
                    Some(entry) => entry.clone(),
                    None => return Vec::new(),
                };
                let chosen = PathBuf::from(&current_path)
                    .join(&entry.name)
                    .to_string_lossy()
                    .to_string();
                if entry.is_git_repo {
                    self.overlay = None;
                    self.open_repo(chosen)
                } else {
                    self.overlay = Some(OverlayData::DirectoryBrowser {
                        entries: list_dirs(&chosen),
                        current_path: chosen,
                        selected: 0,
                    });
                    Vec::new()
                }
            }
            Some(OverlayData::BranchPicker { branches, selected }) => {
                self.overlay = None;
                match branches.get(selected) {
                    Some(name) => self.set_base_branch(name.clone()),
                    None => Vec::new(),
                }
            }
            None => Vec::new(),
        }
    }

    // ── Notifications ──

    pub fn notify(&mut self, msg: impl Into<String>) {
        self.notice = Some(msg.into());
        self.notice_ticks = 30;
    }

    /// Advance the notification timer; called every loop tick
    pub fn tick(&mut self) {
        if self.notice.is_some() {
            if self.notice_ticks == 0 {
                self.notice = None;
            } else {
                self.notice_ticks -= 1;
            }
        }
    }
}

fn collect_dirs(nodes: &[FileTreeNode], out: &mut HashSet<String>) {
    for node in nodes {
        if node.is_directory {
            out.insert(node.path.clone());
            collect_dirs(&node.children, out);
        }
    }
}

/// List the subdirectories of a path for the repository browser, git
/// repositories flagged. Unreadable directories yield an empty listing.
fn list_dirs(path: &str) -> Vec<DirEntry> {
    let mut entries: Vec<DirEntry> = match std::fs::read_dir(path) {
        Ok(read) => read
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().to_string();
                if name.starts_with('.') {
                    return None;
                }
                let is_git_repo = git::is_git_repo(&e.path().to_string_lossy());
                Some(DirEntry { name, is_git_repo })
            })
            .collect(),
        Err(_) => Vec::new(),
    };
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}
