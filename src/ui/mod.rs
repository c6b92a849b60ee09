mod diff_view;
mod file_tree;
mod overlay;
mod status_bar;
mod styles;

use crate::app::App;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

/// Render the entire UI: file tree left, diff right, status bar bottom,
/// overlay popups on top
pub fn draw(f: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // main content
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(34), // file tree
            Constraint::Min(1),     // diff view
        ])
        .split(outer[0]);

    file_tree::render(f, main[0], app);
    diff_view::render(f, main[1], app);
    status_bar::render(f, outer[1], app);

    if let Some(ref overlay_data) = app.overlay {
        overlay::render_overlay(f, f.area(), overlay_data);
    }
}
