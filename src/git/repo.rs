use super::types::{BranchInfo, RepoInfo};
use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

// ── Process helpers ──

/// Run a git command in a repo and return trimmed stdout, failing with
/// git's stderr on a non-zero exit.
pub(crate) fn run_git(repo_root: &str, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_root)
        .output()
        .context(format!("Failed to run git in '{}'", repo_root))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("git {} failed: {}", args.join(" "), stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Run a git command, returning stdout only on success. Probe variant for
/// commands where failure is an expected answer.
pub(crate) fn try_run_git(repo_root: &str, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_root)
        .output()
        .ok()?;
    if output.status.success() {
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        None
    }
}

/// Check if a path is a git repository
pub fn is_git_repo(path: &str) -> bool {
    Path::new(path).join(".git").exists()
}

// ── Repo info ──

/// Load repository metadata: root path, current branch, branch list, and
/// the default base branch for diffing.
pub fn get_repo_info(repo_path: &str) -> Result<RepoInfo> {
    let root = run_git(repo_path, &["rev-parse", "--show-toplevel"])
        .context(format!("Not a git repository: {}", repo_path))?;

    let current_branch = run_git(&root, &["rev-parse", "--abbrev-ref", "HEAD"])
        .context("Failed to determine current branch")?;

    let raw = run_git(
        &root,
        &[
            "for-each-ref",
            "--format=%(refname)%09%(HEAD)",
            "refs/heads",
            "refs/remotes",
        ],
    )
    .context("Failed to list branches")?;

    let branches = parse_branches(&raw);
    let default_base = pick_default_base(&branches, &current_branch);

    Ok(RepoInfo {
        path: root,
        current_branch,
        branches,
        default_base,
    })
}

/// Parse `for-each-ref` output: one `refs/...<TAB>mark` line per branch,
/// where the mark is `*` for the checked-out branch.
fn parse_branches(raw: &str) -> Vec<BranchInfo> {
    let mut branches = Vec::new();
    for line in raw.lines() {
        let (refname, mark) = match line.split_once('\t') {
            Some(pair) => pair,
            None => (line, ""),
        };
        let (name, is_remote) = if let Some(short) = refname.strip_prefix("refs/heads/") {
            (short, false)
        } else if let Some(short) = refname.strip_prefix("refs/remotes/") {
            (short, true)
        } else {
            continue;
        };
        // Skip the symbolic remote HEAD pointer (e.g. origin/HEAD)
        if is_remote && name.ends_with("/HEAD") {
            continue;
        }
        branches.push(BranchInfo {
            name: name.to_string(),
            is_current: mark.trim() == "*",
            is_remote,
        });
    }
    branches
}

/// Pick the default base branch: a local `main`, else a local `master`,
/// else the first local branch that is not checked out, else the current
/// branch itself.
fn pick_default_base(branches: &[BranchInfo], current: &str) -> String {
    if branches.iter().any(|b| b.name == "main" && !b.is_remote) {
        return "main".to_string();
    }
    if branches.iter().any(|b| b.name == "master" && !b.is_remote) {
        return "master".to_string();
    }
    branches
        .iter()
        .find(|b| !b.is_remote && !b.is_current)
        .map(|b| b.name.clone())
        .unwrap_or_else(|| current.to_string())
}

// ── Editor ──

/// Open a file from the repo in the system's default editor/viewer.
/// Fire-and-forget: the spawned process is not waited on.
pub fn open_in_editor(repo_path: &str, file_path: &str) -> Result<()> {
    let full_path = Path::new(repo_path).join(file_path);

    #[cfg(target_os = "macos")]
    let mut cmd = {
        let mut c = Command::new("open");
        c.arg("-t").arg(&full_path);
        c
    };

    #[cfg(target_os = "windows")]
    let mut cmd = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]).arg(&full_path);
        c
    };

    #[cfg(all(unix, not(target_os = "macos")))]
    let mut cmd = {
        let mut c = Command::new("xdg-open");
        c.arg(&full_path);
        c
    };

    cmd.spawn()
        .context(format!("Failed to open {}", full_path.display()))?;
    Ok(())
}
