use super::cosmetic::is_cosmetic_change;
use super::repo::{run_git, try_run_git};
use super::types::{ChangedFile, DiffHunk, DiffLine, FileDiff, FileStatus, LineType};
use anyhow::{Context, Result};
use std::path::Path;

/// One file block parsed out of raw `git diff` output
#[derive(Debug, Clone)]
pub(crate) struct ParsedFile {
    pub path: String,
    pub status: FileStatus,
    pub is_binary: bool,
    pub hunks: Vec<DiffHunk>,
}

// ── Gateway operations ──

/// Resolve the merge base between HEAD and the base branch, trying the
/// local branch name first and `origin/<base>` as a fallback.
fn resolve_merge_base(repo_root: &str, base_branch: &str) -> Result<String> {
    if let Some(oid) = try_run_git(repo_root, &["merge-base", base_branch, "HEAD"]) {
        return Ok(oid);
    }
    let remote = format!("origin/{}", base_branch);
    try_run_git(repo_root, &["merge-base", &remote, "HEAD"])
        .with_context(|| format!("Could not find branch '{}'", base_branch))
}

/// List every file differing between the working tree and the merge base
/// with the base branch, untracked files included. Sorted by path.
pub fn get_changed_files(repo_path: &str, base_branch: &str) -> Result<Vec<ChangedFile>> {
    let merge_base = resolve_merge_base(repo_path, base_branch)?;
    let raw = run_git(
        repo_path,
        &["diff", &merge_base, "--no-color", "--no-ext-diff"],
    )
    .context("Failed to diff against base branch")?;

    let mut files = changed_files_from_diff(&parse_diff(&raw));

    // Untracked files don't appear in the tree-to-worktree diff; report
    // them as additions with empty counts, matching status output.
    let untracked = run_git(repo_path, &["ls-files", "--others", "--exclude-standard"])
        .context("Failed to list untracked files")?;
    for path in untracked.lines().filter(|l| !l.is_empty()) {
        if !files.iter().any(|f| f.path == path) {
            files.push(ChangedFile {
                path: path.to_string(),
                status: FileStatus::Added,
                additions: 0,
                deletions: 0,
                is_cosmetic: false,
            });
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Full diff for a single file against the merge base with the base branch.
/// Untracked files produce a synthetic all-additions hunk.
pub fn get_file_diff(repo_path: &str, file_path: &str, base_branch: &str) -> Result<FileDiff> {
    let merge_base = resolve_merge_base(repo_path, base_branch)?;
    let raw = run_git(
        repo_path,
        &[
            "diff",
            &merge_base,
            "--no-color",
            "--no-ext-diff",
            "--",
            file_path,
        ],
    )
    .context(format!("Failed to diff {}", file_path))?;

    let parsed = parse_diff(&raw);
    let (mut hunks, mut is_binary) = match parsed.into_iter().next() {
        Some(file) => (file.hunks, file.is_binary),
        None => (Vec::new(), false),
    };

    // Nothing in the diff: the file may be untracked — read it directly
    if hunks.is_empty() && !is_binary {
        let full_path = Path::new(repo_path).join(file_path);
        if full_path.exists() {
            let content =
                std::fs::read(&full_path).context(format!("Failed to read {}", file_path))?;
            if content.iter().take(8000).any(|&b| b == 0) {
                is_binary = true;
            } else if let Some(hunk) = synth_untracked_hunk(&String::from_utf8_lossy(&content)) {
                hunks.push(hunk);
            }
        }
    }

    for hunk in hunks.iter_mut() {
        hunk.is_cosmetic = is_cosmetic_change(&hunk.lines);
    }
    let all_cosmetic = !hunks.is_empty() && hunks.iter().all(|h| h.is_cosmetic);

    Ok(FileDiff {
        path: file_path.to_string(),
        hunks,
        is_binary,
        is_cosmetic: all_cosmetic,
    })
}

/// Build the change-set entries from parsed diff output: per-file line
/// counts plus the whole-file cosmetic classification over every changed
/// line in the file.
pub(crate) fn changed_files_from_diff(parsed: &[ParsedFile]) -> Vec<ChangedFile> {
    parsed
        .iter()
        .map(|file| {
            let changed: Vec<DiffLine> = file
                .hunks
                .iter()
                .flat_map(|h| h.lines.iter())
                .filter(|l| l.line_type != LineType::Context)
                .cloned()
                .collect();
            let additions = changed
                .iter()
                .filter(|l| l.line_type == LineType::Add)
                .count() as u32;
            let deletions = changed
                .iter()
                .filter(|l| l.line_type == LineType::Delete)
                .count() as u32;
            ChangedFile {
                path: file.path.clone(),
                status: file.status,
                additions,
                deletions,
                is_cosmetic: !changed.is_empty() && is_cosmetic_change(&changed),
            }
        })
        .collect()
}

/// Synthesize the all-additions hunk shown for an untracked file
fn synth_untracked_hunk(text: &str) -> Option<DiffHunk> {
    let lines: Vec<DiffLine> = text
        .lines()
        .enumerate()
        .map(|(i, line)| DiffLine {
            content: line.to_string(),
            line_type: LineType::Add,
            old_lineno: None,
            new_lineno: Some(i as u32 + 1),
        })
        .collect();

    if lines.is_empty() {
        return None;
    }
    Some(DiffHunk {
        old_start: 0,
        old_lines: 0,
        new_start: 1,
        new_lines: lines.len() as u32,
        lines,
        is_cosmetic: false,
    })
}

// ── Parser ──

/// Parse raw unified diff output into per-file blocks
pub(crate) fn parse_diff(raw: &str) -> Vec<ParsedFile> {
    let mut files: Vec<ParsedFile> = Vec::new();
    let mut current_file: Option<ParsedFile> = None;
    let mut current_hunk: Option<DiffHunk> = None;
    let mut old_line: u32 = 0;
    let mut new_line: u32 = 0;

    for line in raw.lines() {
        // New file block: diff --git a/path b/path
        if line.starts_with("diff --git") {
            if let Some(hunk) = current_hunk.take() {
                if let Some(ref mut file) = current_file {
                    file.hunks.push(hunk);
                }
            }
            if let Some(file) = current_file.take() {
                files.push(file);
            }

            let path = line.split(" b/").last().unwrap_or("").to_string();
            current_file = Some(ParsedFile {
                path,
                status: FileStatus::Modified, // refined by header lines below
                is_binary: false,
                hunks: Vec::new(),
            });
            continue;
        }

        if let Some(ref mut file) = current_file {
            if line.starts_with("new file") {
                file.status = FileStatus::Added;
                continue;
            }
            if line.starts_with("deleted file") {
                file.status = FileStatus::Deleted;
                continue;
            }
            if line.starts_with("rename from ") {
                file.status = FileStatus::Renamed;
                continue;
            }
            if line.starts_with("copy from ") {
                file.status = FileStatus::Copied;
                continue;
            }
            if line.starts_with("Binary files ") || line.starts_with("GIT binary patch") {
                file.is_binary = true;
                continue;
            }
            // Skip remaining header lines (index, ---, +++, modes, similarity)
            if line.starts_with("index ")
                || line.starts_with("--- ")
                || line.starts_with("+++ ")
                || line.starts_with("similarity index")
                || line.starts_with("rename to")
                || line.starts_with("copy to")
                || line.starts_with("old mode")
                || line.starts_with("new mode")
            {
                continue;
            }
        }

        // Hunk header: @@ -old_start,old_count +new_start,new_count @@
        if line.starts_with("@@") {
            if let Some(hunk) = current_hunk.take() {
                if let Some(ref mut file) = current_file {
                    file.hunks.push(hunk);
                }
            }
            if let Some(parsed) = parse_hunk_header(line) {
                old_line = parsed.old_start;
                new_line = parsed.new_start;
                current_hunk = Some(parsed);
            }
            continue;
        }

        // Hunk content lines
        if let Some(ref mut hunk) = current_hunk {
            if let Some(content) = line.strip_prefix('+') {
                hunk.lines.push(DiffLine {
                    content: content.to_string(),
                    line_type: LineType::Add,
                    old_lineno: None,
                    new_lineno: Some(new_line),
                });
                new_line += 1;
            } else if let Some(content) = line.strip_prefix('-') {
                hunk.lines.push(DiffLine {
                    content: content.to_string(),
                    line_type: LineType::Delete,
                    old_lineno: Some(old_line),
                    new_lineno: None,
                });
                old_line += 1;
            } else if line.starts_with(' ') || line.is_empty() {
                let content = if line.is_empty() {
                    String::new()
                } else {
                    line[1..].to_string()
                };
                hunk.lines.push(DiffLine {
                    content,
                    line_type: LineType::Context,
                    old_lineno: Some(old_line),
                    new_lineno: Some(new_line),
                });
                old_line += 1;
                new_line += 1;
            }
            // Skip "\ No newline at end of file"
        }
    }

    // Don't forget the last hunk/file
    if let Some(hunk) = current_hunk {
        if let Some(ref mut file) = current_file {
            file.hunks.push(hunk);
        }
    }
    if let Some(file) = current_file {
        files.push(file);
    }

    files
}

/// Parse a hunk header like "@@ -10,4 +10,15 @@ fn foo()"
fn parse_hunk_header(line: &str) -> Option<DiffHunk> {
    let after_first = line.strip_prefix("@@ ")?;
    let end_idx = after_first.find(" @@")?;
    let range_str = &after_first[..end_idx];

    let parts: Vec<&str> = range_str.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }

    let (old_start, old_lines) = parse_range(parts[0].trim_start_matches('-'))?;
    let (new_start, new_lines) = parse_range(parts[1].trim_start_matches('+'))?;

    Some(DiffHunk {
        old_start,
        old_lines,
        new_start,
        new_lines,
        lines: Vec::new(),
        is_cosmetic: false,
    })
}

/// Parse "start,count" or just "start" (count defaults to 1)
fn parse_range(s: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_diff() {
        let raw = r#"diff --git a/src/main.rs b/src/main.rs
index abc123..def456 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,4 @@ fn main()
 fn main() {
+    println!("hello");
     let x = 1;
 }
"#;
        let files = parse_diff(raw);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/main.rs");
        assert_eq!(files[0].status, FileStatus::Modified);
        assert_eq!(files[0].hunks.len(), 1);
        assert_eq!(files[0].hunks[0].lines.len(), 4);
    }

    #[test]
    fn parse_new_file() {
        let raw = r#"diff --git a/new.rs b/new.rs
new file mode 100644
index 0000000..abc1234
--- /dev/null
+++ b/new.rs
@@ -0,0 +1,2 @@
+fn hello() {}
+fn world() {}
"#;
        let files = parse_diff(raw);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].status, FileStatus::Added);
        assert_eq!(files[0].hunks[0].lines.len(), 2);
    }

    #[test]
    fn parse_rename() {
        let raw = "diff --git a/old.rs b/new.rs\nsimilarity index 95%\nrename from old.rs\nrename to new.rs\n";
        let files = parse_diff(raw);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "new.rs");
        assert_eq!(files[0].status, FileStatus::Renamed);
    }

    #[test]
    fn parse_binary_file() {
        let raw = "diff --git a/logo.png b/logo.png\nindex abc..def 100644\nBinary files a/logo.png and b/logo.png differ\n";
        let files = parse_diff(raw);
        assert_eq!(files.len(), 1);
        assert!(files[0].is_binary);
        assert!(files[0].hunks.is_empty());
    }

    #[test]
    fn parse_hunk_header_with_context() {
        let hunk = parse_hunk_header("@@ -10,4 +10,15 @@ impl Foo").unwrap();
        assert_eq!(hunk.old_start, 10);
        assert_eq!(hunk.old_lines, 4);
        assert_eq!(hunk.new_start, 10);
        assert_eq!(hunk.new_lines, 15);
    }

    #[test]
    fn parse_hunk_header_single_line_range() {
        let hunk = parse_hunk_header("@@ -3 +3 @@").unwrap();
        assert_eq!(hunk.old_lines, 1);
        assert_eq!(hunk.new_lines, 1);
    }

    #[test]
    fn line_numbers_track_hunk_position() {
        let raw = r#"diff --git a/a.rs b/a.rs
index 1..2 100644
--- a/a.rs
+++ b/a.rs
@@ -5,3 +5,3 @@
 ctx
-old
+new
"#;
        let files = parse_diff(raw);
        let lines = &files[0].hunks[0].lines;
        assert_eq!(lines[0].old_lineno, Some(5));
        assert_eq!(lines[0].new_lineno, Some(5));
        assert_eq!(lines[1].old_lineno, Some(6));
        assert_eq!(lines[1].new_lineno, None);
        assert_eq!(lines[2].old_lineno, None);
        assert_eq!(lines[2].new_lineno, Some(6));
    }

    #[test]
    fn changed_files_counts_and_cosmetic_flag() {
        let raw = r#"diff --git a/code.rs b/code.rs
index 1..2 100644
--- a/code.rs
+++ b/code.rs
@@ -1,2 +1,2 @@
-let x = 1;
+let x = 2;
diff --git a/notes.rs b/notes.rs
index 3..4 100644
--- a/notes.rs
+++ b/notes.rs
@@ -1,1 +1,2 @@
 fn f() {}
+// a remark
"#;
        let files = changed_files_from_diff(&parse_diff(raw));
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].additions, 1);
        assert_eq!(files[0].deletions, 1);
        assert!(!files[0].is_cosmetic);
        assert_eq!(files[1].additions, 1);
        assert_eq!(files[1].deletions, 0);
        assert!(files[1].is_cosmetic);
    }

    #[test]
    fn synth_untracked_hunk_numbers_all_lines() {
        let hunk = synth_untracked_hunk("one\ntwo\n").unwrap();
        assert_eq!(hunk.new_start, 1);
        assert_eq!(hunk.new_lines, 2);
        assert_eq!(hunk.lines[0].new_lineno, Some(1));
        assert_eq!(hunk.lines[1].new_lineno, Some(2));
        assert!(hunk.lines.iter().all(|l| l.line_type == LineType::Add));
    }

    #[test]
    fn synth_untracked_hunk_empty_file() {
        assert!(synth_untracked_hunk("").is_none());
    }
}
