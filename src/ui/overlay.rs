use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use super::styles;
use crate::app::{DirEntry, OverlayData};

/// Render the active overlay popup on top of the main UI
pub fn render_overlay(f: &mut Frame, area: Rect, overlay: &OverlayData) {
    match overlay {
        OverlayData::DirectoryBrowser {
            current_path,
            entries,
            selected,
        } => render_directory_browser(f, area, current_path, entries, *selected),
        OverlayData::BranchPicker { branches, selected } => {
            render_branch_picker(f, area, branches, *selected)
        }
    }
}

fn render_directory_browser(
    f: &mut Frame,
    area: Rect,
    current_path: &str,
    entries: &[DirEntry],
    selected: usize,
) {
    let popup_height = (entries.len() as u16 + 2)
        .min(area.height.saturating_sub(6))
        .max(5);
    let popup_width = 70u16.min(area.width.saturating_sub(6));
    let popup = centered_rect(popup_width, popup_height, area);

    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(Span::styled(
            format!(" {} (Enter=open, Backspace=up, Esc=cancel) ", current_path),
            ratatui::style::Style::default().fg(styles::CYAN),
        ))
        .borders(Borders::ALL)
        .border_style(ratatui::style::Style::default().fg(styles::CYAN))
        .style(ratatui::style::Style::default().bg(styles::PANEL));

    if entries.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  (no subdirectories)",
            ratatui::style::Style::default().fg(styles::MUTED),
        )))
        .block(block);
        f.render_widget(empty, popup);
        return;
    }

    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let is_sel = idx == selected;
            let marker = if is_sel { "▶ " } else { "  " };
            let name_style = if entry.is_git_repo {
                ratatui::style::Style::default().fg(styles::GREEN)
            } else {
                ratatui::style::Style::default().fg(styles::TEXT)
            };
            let suffix = if entry.is_git_repo { "  (git)" } else { "/" };

            let line = Line::from(vec![
                Span::styled(marker, ratatui::style::Style::default().fg(styles::CYAN)),
                Span::styled(format!("{}{}", entry.name, suffix), name_style),
            ]);
            let style = if is_sel {
                styles::selected_style()
            } else {
                ratatui::style::Style::default().bg(styles::PANEL)
            };
            ListItem::new(line).style(style)
        })
        .collect();

    f.render_widget(List::new(items).block(block), popup);
}

fn render_branch_picker(f: &mut Frame, area: Rect, branches: &[String], selected: usize) {
    let popup_height = (branches.len() as u16 + 2).min(area.height.saturating_sub(6));
    let popup_width = 50u16.min(area.width.saturating_sub(6));
    let popup = centered_rect(popup_width, popup_height, area);

    f.render_widget(Clear, popup);

    let items: Vec<ListItem> = branches
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let is_sel = idx == selected;
            let marker = if is_sel { "▶ " } else { "  " };
            let line = Line::from(vec![
                Span::styled(marker, ratatui::style::Style::default().fg(styles::CYAN)),
                Span::styled(
                    name.clone(),
                    if is_sel {
                        ratatui::style::Style::default().fg(styles::BRIGHT)
                    } else {
                        ratatui::style::Style::default().fg(styles::TEXT)
                    },
                ),
            ]);
            let style = if is_sel {
                styles::selected_style()
            } else {
                ratatui::style::Style::default().bg(styles::PANEL)
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let block = Block::default()
        .title(Span::styled(
            " BASE BRANCH (Enter=select, Esc=close) ",
            ratatui::style::Style::default().fg(styles::CYAN),
        ))
        .borders(Borders::ALL)
        .border_style(ratatui::style::Style::default().fg(styles::CYAN))
        .style(ratatui::style::Style::default().bg(styles::PANEL));

    f.render_widget(List::new(items).block(block), popup);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
