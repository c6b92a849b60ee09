use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::styles;
use crate::app::{App, ViewMode};
use crate::git::{DiffHunk, DiffLine, LineType};

/// Render the diff panel (right side)
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut title = String::from(" DIFF ");
    if let Some(ref diff) = app.current_diff {
        let additions: usize = diff
            .hunks
            .iter()
            .flat_map(|h| h.lines.iter())
            .filter(|l| l.line_type == LineType::Add)
            .count();
        let deletions: usize = diff
            .hunks
            .iter()
            .flat_map(|h| h.lines.iter())
            .filter(|l| l.line_type == LineType::Delete)
            .count();
        title = format!(" {} (+{} -{})", diff.path, additions, deletions);
        if diff.is_cosmetic {
            title.push_str(" · cosmetic");
        }
        title.push(' ');
    }
    if app.loading() {
        title.push_str("· loading… ");
    }

    let block = Block::default()
        .title(Span::styled(
            title,
            ratatui::style::Style::default().fg(styles::MUTED),
        ))
        .borders(Borders::NONE)
        .style(styles::default_style());

    let Some(diff) = app.current_diff.as_ref() else {
        let hint = if app.repo_path.is_none() {
            "  press o to open a repository"
        } else {
            "  j/k to select a file, Enter to view its diff"
        };
        let empty = Paragraph::new(Line::from(Span::styled(
            hint,
            ratatui::style::Style::default().fg(styles::DIM),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    };

    if diff.is_binary {
        let msg = Paragraph::new(Line::from(Span::styled(
            "  (binary file)",
            ratatui::style::Style::default().fg(styles::MUTED),
        )))
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let lines = match app.view_mode {
        ViewMode::Unified => unified_lines(app, diff.hunks.as_slice()),
        ViewMode::Split => split_lines(app, diff.hunks.as_slice(), area.width),
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((app.diff_scroll, 0));
    f.render_widget(paragraph, area);
}

fn hunk_header(hunk: &DiffHunk) -> Line<'static> {
    let mut text = format!(
        "@@ -{},{} +{},{} @@",
        hunk.old_start, hunk.old_lines, hunk.new_start, hunk.new_lines
    );
    if hunk.is_cosmetic {
        text.push_str(" (cosmetic)");
    }
    Line::from(Span::styled(text, styles::hunk_header_style()))
}

// ── Unified layout ──

fn unified_lines(app: &App, hunks: &[DiffHunk]) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    for hunk in hunks {
        out.push(hunk_header(hunk));
        for line in &hunk.lines {
            out.push(unified_line(app, hunk, line));
        }
        out.push(Line::from(""));
    }
    out
}

fn unified_line(app: &App, hunk: &DiffHunk, line: &DiffLine) -> Line<'static> {
    let (prefix, style) = match line.line_type {
        LineType::Add => ("+", styles::add_style()),
        LineType::Delete => ("-", styles::del_style()),
        LineType::Context => (" ", styles::default_style()),
    };
    let style = if hunk.is_cosmetic && line.line_type != LineType::Context {
        styles::cosmetic_style()
    } else {
        style
    };

    let mut spans = Vec::new();
    if app.show_line_numbers {
        let old = line
            .old_lineno
            .map(|n| n.to_string())
            .unwrap_or_default();
        let new = line
            .new_lineno
            .map(|n| n.to_string())
            .unwrap_or_default();
        spans.push(Span::styled(
            format!("{:>4} {:>4} ", old, new),
            ratatui::style::Style::default().fg(styles::DIM),
        ));
    }
    spans.push(Span::styled(format!("{}{}", prefix, line.content), style));
    Line::from(spans)
}

// ── Split layout ──

/// Pair hunk lines into side-by-side rows: context lines mirror, delete
/// runs line up with the add run that follows them, leftovers pad with an
/// empty cell.
pub(crate) fn pair_rows(lines: &[DiffLine]) -> Vec<(Option<DiffLine>, Option<DiffLine>)> {
    let mut rows = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        match lines[i].line_type {
            LineType::Context => {
                rows.push((Some(lines[i].clone()), Some(lines[i].clone())));
                i += 1;
            }
            LineType::Delete => {
                let del_start = i;
                while i < lines.len() && lines[i].line_type == LineType::Delete {
                    i += 1;
                }
                let add_start = i;
                while i < lines.len() && lines[i].line_type == LineType::Add {
                    i += 1;
                }
                let dels = &lines[del_start..add_start];
                let adds = &lines[add_start..i];
                for k in 0..dels.len().max(adds.len()) {
                    rows.push((dels.get(k).cloned(), adds.get(k).cloned()));
                }
            }
            LineType::Add => {
                rows.push((None, Some(lines[i].clone())));
                i += 1;
            }
        }
    }
    rows
}

fn split_lines(app: &App, hunks: &[DiffHunk], width: u16) -> Vec<Line<'static>> {
    let col_width = (width.saturating_sub(3) / 2) as usize;
    let mut out = Vec::new();
    for hunk in hunks {
        out.push(hunk_header(hunk));
        for (old, new) in pair_rows(&hunk.lines) {
            out.push(split_row(app, hunk, old, new, col_width));
        }
        out.push(Line::from(""));
    }
    out
}

fn split_row(
    app: &App,
    hunk: &DiffHunk,
    old: Option<DiffLine>,
    new: Option<DiffLine>,
    col_width: usize,
) -> Line<'static> {
    let mut spans = Vec::new();
    spans.push(side_span(app, hunk, old.as_ref(), false, col_width));
    spans.push(Span::styled(
        " │ ",
        ratatui::style::Style::default().fg(styles::BORDER),
    ));
    spans.push(side_span(app, hunk, new.as_ref(), true, col_width));
    Line::from(spans)
}

fn side_span(
    app: &App,
    hunk: &DiffHunk,
    line: Option<&DiffLine>,
    is_new_side: bool,
    col_width: usize,
) -> Span<'static> {
    let Some(line) = line else {
        return Span::raw(" ".repeat(col_width));
    };

    let style = match line.line_type {
        LineType::Add => styles::add_style(),
        LineType::Delete => styles::del_style(),
        LineType::Context => styles::default_style(),
    };
    let style = if hunk.is_cosmetic && line.line_type != LineType::Context {
        styles::cosmetic_style()
    } else {
        style
    };

    let number = if is_new_side {
        line.new_lineno
    } else {
        line.old_lineno
    };
    let gutter = if app.show_line_numbers {
        format!("{:>4} ", number.map(|n| n.to_string()).unwrap_or_default())
    } else {
        String::new()
    };

    let text = format!("{}{}", gutter, line.content);
    Span::styled(format!("{:<w$.w$}", text, w = col_width), style)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(content: &str) -> DiffLine {
        DiffLine {
            content: content.to_string(),
            line_type: LineType::Context,
            old_lineno: Some(1),
            new_lineno: Some(1),
        }
    }

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

    #[test]
    fn context_lines_mirror_both_sides() {
        let rows = pair_rows(&[ctx("same")]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0.as_ref().unwrap().content, "same");
        assert_eq!(rows[0].1.as_ref().unwrap().content, "same");
    }

    #[test]
    fn delete_run_pairs_with_following_add_run() {
        let rows = pair_rows(&[del("old1"), del("old2"), add("new1"), add("new2")]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0.as_ref().unwrap().content, "old1");
        assert_eq!(rows[0].1.as_ref().unwrap().content, "new1");
        assert_eq!(rows[1].0.as_ref().unwrap().content, "old2");
        assert_eq!(rows[1].1.as_ref().unwrap().content, "new2");
    }

    #[test]
    fn unbalanced_runs_pad_with_empty_cells() {
        let rows = pair_rows(&[del("gone"), add("one"), add("two")]);
        assert_eq!(rows.len(), 2);
        assert!(rows[1].0.is_none());
        assert_eq!(rows[1].1.as_ref().unwrap().content, "two");
    }

    #[test]
    fn pure_addition_sits_on_the_new_side() {
        let rows = pair_rows(&[ctx("keep"), add("fresh")]);
        assert_eq!(rows.len(), 2);
        assert!(rows[1].0.is_none());
        assert_eq!(rows[1].1.as_ref().unwrap().content, "fresh");
    }
}
