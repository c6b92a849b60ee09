use ratatui::style::{Color, Modifier, Style};

// ── Base colors ──
pub const BG: Color = Color::Rgb(14, 14, 16);
pub const SURFACE: Color = Color::Rgb(22, 22, 25);
pub const PANEL: Color = Color::Rgb(28, 28, 32);
pub const BORDER: Color = Color::Rgb(45, 45, 50);

pub const TEXT: Color = Color::Rgb(198, 198, 204);
pub const DIM: Color = Color::Rgb(100, 100, 108);
pub const MUTED: Color = Color::Rgb(134, 134, 142);
pub const BRIGHT: Color = Color::Rgb(230, 230, 236);

// ── Accents ──
pub const BLUE: Color = Color::Rgb(99, 160, 255);
pub const CYAN: Color = Color::Rgb(56, 206, 230);
pub const GREEN: Color = Color::Rgb(88, 218, 134);
pub const YELLOW: Color = Color::Rgb(245, 200, 66);
pub const RED: Color = Color::Rgb(244, 108, 108);
pub const PURPLE: Color = Color::Rgb(172, 148, 250);

// ── Diff colors ──
pub const ADD_BG: Color = Color::Rgb(18, 58, 38);
pub const ADD_TEXT: Color = Color::Rgb(126, 234, 162);
pub const DEL_BG: Color = Color::Rgb(64, 20, 26);
pub const DEL_TEXT: Color = Color::Rgb(250, 146, 146);
pub const HUNK_BG: Color = Color::Rgb(30, 30, 58);

// ── Composed styles ──

pub fn default_style() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn surface_style() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn selected_style() -> Style {
    Style::default().fg(BLUE).bg(Color::Rgb(28, 42, 62))
}

pub fn add_style() -> Style {
    Style::default().fg(ADD_TEXT).bg(ADD_BG)
}

pub fn del_style() -> Style {
    Style::default().fg(DEL_TEXT).bg(DEL_BG)
}

pub fn hunk_header_style() -> Style {
    Style::default().fg(PURPLE).bg(HUNK_BG)
}

/// Dimmed rendering for cosmetic-only changes
pub fn cosmetic_style() -> Style {
    Style::default().fg(DIM).add_modifier(Modifier::ITALIC)
}

pub fn status_added() -> Style {
    Style::default().fg(GREEN).add_modifier(Modifier::BOLD)
}

pub fn status_deleted() -> Style {
    Style::default().fg(RED).add_modifier(Modifier::BOLD)
}

pub fn status_modified() -> Style {
    Style::default().fg(YELLOW).add_modifier(Modifier::BOLD)
}

pub fn status_other() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}
