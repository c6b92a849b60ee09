use super::types::{DiffLine, LineType};

// ── Line-level checks ──

/// Check if a line is a comment based on common patterns.
/// Blank lines count as cosmetic too.
fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return true;
    }

    trimmed.starts_with("//")        // C, C++, JS, TS, Rust, Go, Java
        || trimmed.starts_with('#')  // Python, Ruby, Shell, YAML
        || trimmed.starts_with("--") // SQL, Lua, Haskell
        || trimmed.starts_with(';')  // Lisp, Assembly, INI
        || trimmed.starts_with('*')  // block comment continuation
        || trimmed.starts_with("/*")
        || trimmed.starts_with("*/")
        || trimmed.starts_with('\'') // VB
        || trimmed.starts_with("\"\"\"")
        || trimmed.starts_with("'''")
        || trimmed.starts_with("<!--")
        || trimmed.starts_with("-->")
        || trimmed.to_lowercase().starts_with("rem ") // Batch
}

/// Check if two lines differ only in whitespace
fn is_whitespace_only_change(old: &str, new: &str) -> bool {
    strip_whitespace(old) == strip_whitespace(new)
}

/// Check if two lines differ only in indentation (leading whitespace)
fn is_indentation_only_change(old: &str, new: &str) -> bool {
    old.trim_start() == new.trim_start() && old != new
}

/// Check if two lines differ only in trailing whitespace
fn is_trailing_whitespace_change(old: &str, new: &str) -> bool {
    old.trim_end() == new.trim_end() && old != new
}

/// Check if two lines differ only in case
fn is_case_only_change(old: &str, new: &str) -> bool {
    old.to_lowercase() == new.to_lowercase() && old != new
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Check if a block of lines was merely reflowed (line wrapping, attribute
/// reordering across lines): the concatenated content matches once all
/// whitespace is removed.
fn is_formatting_only_change(old_lines: &[&str], new_lines: &[&str]) -> bool {
    strip_whitespace(&old_lines.join("")) == strip_whitespace(&new_lines.join(""))
}

// ── Hunk-level classification ──

/// Classify a hunk as cosmetic: nothing in it changes program meaning.
/// The heuristics are intentionally conservative — any unmatched pair of
/// changed lines makes the whole hunk non-cosmetic.
pub fn is_cosmetic_change(lines: &[DiffLine]) -> bool {
    let additions: Vec<&str> = lines
        .iter()
        .filter(|l| l.line_type == LineType::Add)
        .map(|l| l.content.as_str())
        .collect();

    let deletions: Vec<&str> = lines
        .iter()
        .filter(|l| l.line_type == LineType::Delete)
        .map(|l| l.content.as_str())
        .collect();

    // Pure additions or pure deletions: cosmetic iff every line is a
    // comment or blank.
    if additions.is_empty() && !deletions.is_empty() {
        return deletions.iter().all(|l| is_comment_line(l));
    }
    if deletions.is_empty() && !additions.is_empty() {
        return additions.iter().all(|l| is_comment_line(l));
    }

    // Reflow across a different number of lines
    if is_formatting_only_change(&deletions, &additions) {
        return true;
    }

    // Balanced hunks: compare line pairs
    if additions.len() == deletions.len() {
        for (old, new) in deletions.iter().zip(additions.iter()) {
            if is_comment_line(old) && is_comment_line(new) {
                continue;
            }
            if is_whitespace_only_change(old, new)
                || is_indentation_only_change(old, new)
                || is_trailing_whitespace_change(old, new)
                || is_case_only_change(old, new)
            {
                continue;
            }
            return false;
        }
        return true;
    }

    // Unbalanced and not a reflow: cosmetic only when both sides are
    // entirely comments
    additions.iter().all(|l| is_comment_line(l)) && deletions.iter().all(|l| is_comment_line(l))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(content: &str) -> DiffLine {
        DiffLine {
            content: content.to_string(),
            line_type: LineType::Add,
            old_lineno: None,
            new_lineno: Some(1),
        }
    }

    fn del(content: &str) -> DiffLine {
        DiffLine {
            content: content.to_string(),
            line_type: LineType::Delete,
            old_lineno: Some(1),
            new_lineno: None,
        }
    }

    // ── is_comment_line ──

    #[test]
    fn blank_line_is_cosmetic() {
        assert!(is_comment_line("   "));
    }

    #[test]
    fn slash_comment_is_cosmetic() {
        assert!(is_comment_line("  // updated docs"));
    }

    #[test]
    fn hash_comment_is_cosmetic() {
        assert!(is_comment_line("# shell comment"));
    }

    #[test]
    fn code_line_is_not_cosmetic() {
        assert!(!is_comment_line("let x = 1;"));
    }

    #[test]
    fn batch_rem_comment_case_insensitive() {
        assert!(is_comment_line("REM legacy"));
    }

    // ── is_cosmetic_change ──

    #[test]
    fn comment_only_additions_are_cosmetic() {
        let lines = vec![add("// new note"), add("")];
        assert!(is_cosmetic_change(&lines));
    }

    #[test]
    fn comment_only_deletions_are_cosmetic() {
        let lines = vec![del("# old note")];
        assert!(is_cosmetic_change(&lines));
    }

    #[test]
    fn code_addition_is_not_cosmetic() {
        let lines = vec![add("return 42;")];
        assert!(!is_cosmetic_change(&lines));
    }

    #[test]
    fn indentation_change_is_cosmetic() {
        let lines = vec![del("let x = 1;"), add("    let x = 1;")];
        assert!(is_cosmetic_change(&lines));
    }

    #[test]
    fn trailing_whitespace_change_is_cosmetic() {
        let lines = vec![del("let x = 1;   "), add("let x = 1;")];
        assert!(is_cosmetic_change(&lines));
    }

    #[test]
    fn case_only_change_is_cosmetic() {
        let lines = vec![del("SELECT * FROM t"), add("select * from t")];
        assert!(is_cosmetic_change(&lines));
    }

    #[test]
    fn real_change_in_pair_is_not_cosmetic() {
        let lines = vec![del("let x = 1;"), add("let x = 2;")];
        assert!(!is_cosmetic_change(&lines));
    }

    #[test]
    fn line_wrap_reflow_is_cosmetic() {
        // One long line rewrapped onto two — same content without whitespace
        let lines = vec![
            del("foo(bar, baz, qux);"),
            add("foo(bar,"),
            add("    baz, qux);"),
        ];
        assert!(is_cosmetic_change(&lines));
    }

    #[test]
    fn unbalanced_code_change_is_not_cosmetic() {
        let lines = vec![del("foo();"), add("foo();"), add("bar();")];
        assert!(!is_cosmetic_change(&lines));
    }

    #[test]
    fn mixed_pairs_all_cosmetic_kinds_pass() {
        let lines = vec![
            del("// old"),
            del("  call();"),
            add("// new"),
            add("call();"),
        ];
        assert!(is_cosmetic_change(&lines));
    }

    #[test]
    fn context_lines_are_ignored() {
        let lines = vec![
            DiffLine {
                content: "fn main() {".to_string(),
                line_type: LineType::Context,
                old_lineno: Some(1),
                new_lineno: Some(1),
            },
            add("// note"),
        ];
        assert!(is_cosmetic_change(&lines));
    }
}
