use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::path::Path;

use super::styles;
use crate::app::{App, InputMode, ViewMode};

/// Render the single-row status bar at the bottom
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let line = if app.input_mode == InputMode::Search {
        search_line(app)
    } else {
        status_line(app)
    };

    let bar = Paragraph::new(line).style(ratatui::style::Style::default().bg(styles::PANEL));
    f.render_widget(bar, area);
}

fn search_line(app: &App) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" /{}", app.search()),
            ratatui::style::Style::default().fg(styles::BRIGHT),
        ),
        Span::styled("▌", ratatui::style::Style::default().fg(styles::CYAN)),
        Span::styled(
            "  Enter apply · Esc clear",
            ratatui::style::Style::default().fg(styles::DIM),
        ),
    ])
}

fn status_line(app: &App) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();

    // Repo + branches
    if let Some(ref repo_path) = app.repo_path {
        let name = Path::new(repo_path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| repo_path.clone());
        spans.push(Span::styled(
            format!(" {} ", name),
            ratatui::style::Style::default()
                .fg(styles::BRIGHT)
                .add_modifier(ratatui::style::Modifier::BOLD),
        ));
        if let (Some(info), Some(base)) = (&app.repo_info, &app.base_branch) {
            spans.push(Span::styled(
                format!("{} → {} ", info.current_branch, base),
                ratatui::style::Style::default().fg(styles::CYAN),
            ));
        }
    } else {
        spans.push(Span::styled(
            " branchlens ",
            ratatui::style::Style::default().fg(styles::MUTED),
        ));
    }

    // Change-set totals — always the unfiltered summary
    let derived = app.derived_cached();
    let summary = &derived.summary;
    if summary.file_count > 0 {
        spans.push(Span::styled(
            format!(
                "· {} files +{} -{} ",
                summary.file_count, summary.additions, summary.deletions
            ),
            ratatui::style::Style::default().fg(styles::TEXT),
        ));
        spans.push(Span::styled(
            format!(
                "({}A {}M {}D {}·) ",
                summary.added, summary.modified, summary.deleted, summary.cosmetic
            ),
            ratatui::style::Style::default().fg(styles::DIM),
        ));
        let shown = derived.filtered_summary.file_count;
        if shown != summary.file_count {
            spans.push(Span::styled(
                format!("· {} shown ", shown),
                ratatui::style::Style::default().fg(styles::YELLOW),
            ));
        }
    }

    // Visibility toggles
    let filters = app.filters();
    spans.push(Span::raw("· "));
    for (label, on) in [
        ("1+", filters.show_added),
        ("2~", filters.show_modified),
        ("3-", filters.show_deleted),
        ("4·", filters.show_cosmetic),
    ] {
        let style = if on {
            ratatui::style::Style::default().fg(styles::MUTED)
        } else {
            ratatui::style::Style::default()
                .fg(styles::DIM)
                .add_modifier(ratatui::style::Modifier::CROSSED_OUT)
        };
        spans.push(Span::styled(format!("{} ", label), style));
    }

    // View mode / watch / loading
    let mode = match app.view_mode {
        ViewMode::Unified => "UNIFIED",
        ViewMode::Split => "SPLIT",
    };
    spans.push(Span::styled(
        format!("· {} ", mode),
        ratatui::style::Style::default().fg(styles::MUTED),
    ));
    if app.watching {
        spans.push(Span::styled(
            "⦿ ",
            ratatui::style::Style::default().fg(styles::GREEN),
        ));
    }
    if app.loading() {
        spans.push(Span::styled(
            "… ",
            ratatui::style::Style::default().fg(styles::YELLOW),
        ));
    }

    // Error wins over the transient notice
    if let Some(ref err) = app.error {
        spans.push(Span::styled(
            format!(" ✗ {}", err),
            ratatui::style::Style::default().fg(styles::RED),
        ));
    } else if let Some(ref notice) = app.notice {
        spans.push(Span::styled(
            format!(" {}", notice),
            ratatui::style::Style::default().fg(styles::YELLOW),
        ));
    }

    Line::from(spans)
}
