use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use super::styles;
use crate::app::tree::FileTreeNode;
use crate::app::App;
use crate::git::FileStatus;

/// One visible row of the tree pane
struct Row<'a> {
    depth: usize,
    node: &'a FileTreeNode,
}

/// Flatten the tree into rows, skipping the children of collapsed
/// directories
fn flatten<'a>(app: &App, nodes: &'a [FileTreeNode], depth: usize, out: &mut Vec<Row<'a>>) {
    for node in nodes {
        out.push(Row { depth, node });
        if node.is_directory && app.is_expanded(node) {
            flatten(app, &node.children, depth + 1, out);
        }
    }
}

/// Render the file tree panel (left side)
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let derived = app.derived_cached();

    let total = derived.summary.file_count;
    let visible = derived.filtered_summary.file_count;
    let narrowed = visible != total || !app.search().is_empty();
    let count_label = if narrowed {
        format!("{}/{}", visible, total)
    } else {
        format!("{}", total)
    };
    let title = format!(" FILES ({}) ", count_label);

    let block = Block::default()
        .title(Span::styled(
            title,
            ratatui::style::Style::default().fg(styles::MUTED),
        ))
        .borders(Borders::RIGHT)
        .border_style(ratatui::style::Style::default().fg(styles::BORDER))
        .style(ratatui::style::Style::default().bg(styles::SURFACE));

    if app.repo_path.is_none() {
        let hints = vec![
            ListItem::new(Line::from(Span::styled(
                "  no repository open",
                ratatui::style::Style::default().fg(styles::MUTED),
            ))),
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(Span::styled(
                "  o  open repository",
                ratatui::style::Style::default().fg(styles::DIM),
            ))),
            ListItem::new(Line::from(Span::styled(
                "  q  quit",
                ratatui::style::Style::default().fg(styles::DIM),
            ))),
        ];
        f.render_widget(List::new(hints).block(block), area);
        return;
    }

    let mut rows = Vec::new();
    flatten(app, &derived.tree, 0, &mut rows);

    if rows.is_empty() {
        let msg = if total == 0 {
            "  no changes against base"
        } else {
            "  nothing matches the filters"
        };
        let empty = vec![ListItem::new(Line::from(Span::styled(
            msg,
            ratatui::style::Style::default().fg(styles::MUTED),
        )))];
        f.render_widget(List::new(empty).block(block), area);
        return;
    }

    // Keep the selected row in view: center it once the list outgrows the
    // viewport
    let viewport_height = area.height.saturating_sub(1) as usize;
    let selected_pos = rows
        .iter()
        .position(|row| {
            row.node.file.is_some() && app.selected.as_deref() == Some(row.node.path.as_str())
        })
        .unwrap_or(0);
    let scroll = if rows.len() <= viewport_height {
        0
    } else if selected_pos < viewport_height / 2 {
        0
    } else if selected_pos > rows.len().saturating_sub(viewport_height / 2) {
        rows.len().saturating_sub(viewport_height)
    } else {
        selected_pos.saturating_sub(viewport_height / 2)
    };
    let end = (scroll + viewport_height).min(rows.len());

    let items: Vec<ListItem> = rows[scroll..end]
        .iter()
        .map(|row| {
            let indent = "  ".repeat(row.depth);

            if row.node.is_directory {
                let marker = if app.is_expanded(row.node) { "▾" } else { "▸" };
                let line = Line::from(vec![
                    Span::raw(format!(" {}", indent)),
                    Span::styled(
                        format!("{} {}/", marker, row.node.name),
                        ratatui::style::Style::default().fg(styles::MUTED),
                    ),
                ]);
                return ListItem::new(line).style(styles::surface_style());
            }

            let file = match row.node.file.as_ref() {
                Some(file) => file,
                None => {
                    let line = Line::from(Span::raw(format!(" {}{}", indent, row.node.name)));
                    return ListItem::new(line).style(styles::surface_style());
                }
            };
            let is_selected = app.selected.as_deref() == Some(row.node.path.as_str());

            let symbol_style = match file.status {
                FileStatus::Added => styles::status_added(),
                FileStatus::Deleted => styles::status_deleted(),
                FileStatus::Modified => styles::status_modified(),
                _ => styles::status_other(),
            };

            let name_style = if is_selected {
                styles::selected_style()
            } else if file.is_cosmetic {
                styles::cosmetic_style()
            } else {
                ratatui::style::Style::default().fg(styles::TEXT)
            };

            let mut spans = vec![
                Span::raw(format!(" {}", indent)),
                Span::styled(format!("{} ", file.status.symbol()), symbol_style),
                Span::styled(row.node.name.clone(), name_style),
            ];
            if file.is_cosmetic {
                spans.push(Span::styled(
                    " ·",
                    ratatui::style::Style::default().fg(styles::DIM),
                ));
            }
            if area.width > 26 {
                spans.push(Span::styled(
                    format!("  +{} -{}", file.additions, file.deletions),
                    ratatui::style::Style::default().fg(styles::DIM),
                ));
            }

            let line_style = if is_selected {
                styles::selected_style()
            } else {
                styles::surface_style()
            };
            ListItem::new(Line::from(spans)).style(line_style)
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}
