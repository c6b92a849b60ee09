use crate::git::{ChangedFile, FileStatus};

// ── Filter state ──

/// Visibility filters for the file tree. Pure UI state — never sent to
/// the repository gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub search: String,
    pub show_added: bool,
    pub show_modified: bool,
    pub show_deleted: bool,
    pub show_cosmetic: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            show_added: true,
            show_modified: true,
            show_deleted: true,
            show_cosmetic: true,
        }
    }
}

// ── Matching ──

/// Ordered-subsequence fuzzy match, case-insensitive: every character of
/// `search` must appear in `path` in order, not necessarily contiguously.
/// An empty search matches everything.
pub fn fuzzy_match(path: &str, search: &str) -> bool {
    let path_lower = path.to_lowercase();
    let search_lower = search.to_lowercase();

    let mut needle = search_lower.chars();
    let mut next = match needle.next() {
        Some(c) => c,
        None => return true,
    };
    for c in path_lower.chars() {
        if c == next {
            next = match needle.next() {
                Some(c) => c,
                None => return true,
            };
        }
    }
    false
}

/// Decide whether one file is visible under the current filters.
/// Rules short-circuit in order: cosmetic gate, status toggles, search.
/// Statuses other than added/modified/deleted are never hidden by the
/// status toggles.
pub fn passes(file: &ChangedFile, filters: &FilterState) -> bool {
    if !filters.show_cosmetic && file.is_cosmetic {
        return false;
    }

    match file.status {
        FileStatus::Added if !filters.show_added => return false,
        FileStatus::Modified if !filters.show_modified => return false,
        FileStatus::Deleted if !filters.show_deleted => return false,
        _ => {}
    }

    fuzzy_match(&file.path, &filters.search)
}

/// Apply the filters to a change set, preserving the input order
pub fn filter_files(files: &[ChangedFile], filters: &FilterState) -> Vec<ChangedFile> {
    files
        .iter()
        .filter(|f| passes(f, filters))
        .cloned()
        .collect()
}

// ── Aggregates ──

/// Totals over the full, unfiltered change set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub file_count: usize,
    pub additions: u64,
    pub deletions: u64,
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
    pub cosmetic: usize,
}

/// Totals over the filtered view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredSummary {
    pub file_count: usize,
    pub additions: u64,
    pub deletions: u64,
}

pub fn summarize(files: &[ChangedFile]) -> Summary {
    Summary {
        file_count: files.len(),
        additions: files.iter().map(|f| f.additions as u64).sum(),
        deletions: files.iter().map(|f| f.deletions as u64).sum(),
        added: files.iter().filter(|f| f.status == FileStatus::Added).count(),
        modified: files
            .iter()
            .filter(|f| f.status == FileStatus::Modified)
            .count(),
        deleted: files
            .iter()
            .filter(|f| f.status == FileStatus::Deleted)
            .count(),
        cosmetic: files.iter().filter(|f| f.is_cosmetic).count(),
    }
}

pub fn summarize_filtered(files: &[ChangedFile]) -> FilteredSummary {
    FilteredSummary {
        file_count: files.len(),
        additions: files.iter().map(|f| f.additions as u64).sum(),
        deletions: files.iter().map(|f| f.deletions as u64).sum(),
    }
}
