use super::state::{App, Effect, InputMode};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Route a key event to the right handler. Overlays take priority, then
/// the search input, then normal navigation. Returns the gateway effects
/// for the event loop to execute.
pub fn handle_key(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    if app.overlay.is_some() {
        return handle_overlay_input(app, key);
    }
    match app.input_mode {
        InputMode::Search => handle_search_input(app, key),
        InputMode::Normal => handle_normal_input(app, key),
    }
}

fn handle_normal_input(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    match key.code {
        // Quit
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            Vec::new()
        }
        KeyCode::Char('q') => {
            app.should_quit = true;
            Vec::new()
        }

        // File navigation
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Enter => {
            if app.selected.is_none() {
                app.select_index(0)
            } else {
                Vec::new()
            }
        }
        KeyCode::Esc => {
            app.clear_selection();
            Vec::new()
        }

        // Repository actions
        KeyCode::Char('o') => {
            app.open_directory_browser();
            Vec::new()
        }
        KeyCode::Char('r') => {
            if app.repo_info.is_some() {
                app.refresh()
            } else {
                Vec::new()
            }
        }
        KeyCode::Char('b') => {
            app.open_branch_picker();
            Vec::new()
        }
        KeyCode::Char('e') => open_editor(app),
        KeyCode::Char('w') => toggle_watch(app),

        // Search focus — the query itself is untouched
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            Vec::new()
        }

        // View mode
        KeyCode::Char('v') => {
            app.view_mode = app.view_mode.toggled();
            Vec::new()
        }

        // Visibility toggles, each followed by selection reconciliation
        KeyCode::Char('1') => app.toggle_added(),
        KeyCode::Char('2') => app.toggle_modified(),
        KeyCode::Char('3') => app.toggle_deleted(),
        KeyCode::Char('4') => app.toggle_cosmetic(),

        // Tree collapse pulses
        KeyCode::Char('[') => {
            app.collapse_pulse = true;
            Vec::new()
        }
        KeyCode::Char(']') => {
            app.expand_pulse = true;
            Vec::new()
        }

        // Diff pane scrolling
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.diff_scroll = app.diff_scroll.saturating_add(10);
            Vec::new()
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.diff_scroll = app.diff_scroll.saturating_sub(10);
            Vec::new()
        }
        KeyCode::PageDown => {
            app.diff_scroll = app.diff_scroll.saturating_add(20);
            Vec::new()
        }
        KeyCode::PageUp => {
            app.diff_scroll = app.diff_scroll.saturating_sub(20);
            Vec::new()
        }

        _ => Vec::new(),
    }
}

/// While the search field is focused every key edits the query; only
/// Escape blurs and clears it, and Enter confirms and re-snaps the
/// selection against the narrowed list.
fn handle_search_input(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_clear();
            Vec::new()
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.reconcile()
        }
        KeyCode::Char(c) => {
            app.search_push(c);
            Vec::new()
        }
        KeyCode::Backspace => {
            app.search_pop();
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn handle_overlay_input(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.overlay_next();
            Vec::new()
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.overlay_prev();
            Vec::new()
        }
        KeyCode::Enter => app.overlay_select(),
        KeyCode::Backspace => {
            app.overlay_go_up();
            Vec::new()
        }
        KeyCode::Esc | KeyCode::Char('q') => {
            app.overlay_close();
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn open_editor(app: &mut App) -> Vec<Effect> {
    match (app.repo_path.clone(), app.selected.clone()) {
        (Some(repo_path), Some(file_path)) => vec![Effect::OpenEditor {
            repo_path,
            file_path,
        }],
        _ => Vec::new(),
    }
}

fn toggle_watch(app: &mut App) -> Vec<Effect> {
    if app.watching {
        app.watching = false;
        app.notify("Watch stopped");
        vec![Effect::StopWatch]
    } else {
        match app.repo_path.clone() {
            Some(repo_path) => {
                app.watching = true;
                app.notify("Watching for changes...");
                vec![Effect::StartWatch { repo_path }]
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{GatewayEvent, ViewMode};
    use crate::config::BlConfig;
    use crate::git::{BranchInfo, ChangedFile, FileStatus, RepoInfo};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn make_file(path: &str, status: FileStatus) -> ChangedFile {
        ChangedFile {
            path: path.to_string(),
            status,
            additions: 1,
            deletions: 0,
            is_cosmetic: false,
        }
    }

    fn open_app() -> App {
        let mut app = App::new(&BlConfig::default());
        app.repo_path = Some("/repo".to_string());
        app.base_branch = Some("main".to_string());
        app.repo_info = Some(RepoInfo {
            path: "/repo".to_string(),
            current_branch: "feature".to_string(),
            branches: vec![BranchInfo {
                name: "main".to_string(),
                is_current: false,
                is_remote: false,
            }],
            default_base: "main".to_string(),
        });
        app.set_files(vec![
            make_file("a.rs", FileStatus::Modified),
            make_file("b.rs", FileStatus::Added),
            make_file("c.rs", FileStatus::Deleted),
        ]);
        app
    }

    #[test]
    fn j_from_no_selection_picks_first_file() {
        let mut app = open_app();
        let effects = handle_key(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.selected.as_deref(), Some("a.rs"));
        assert!(matches!(effects[0], Effect::LoadDiff { .. }));
    }

    #[test]
    fn arrow_keys_mirror_j_and_k() {
        let mut app = open_app();
        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, key(KeyCode::Down));
        assert_eq!(app.selected.as_deref(), Some("b.rs"));
        handle_key(&mut app, key(KeyCode::Up));
        assert_eq!(app.selected.as_deref(), Some("a.rs"));
    }

    #[test]
    fn enter_selects_first_only_when_nothing_selected() {
        let mut app = open_app();
        let effects = handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.selected.as_deref(), Some("a.rs"));
        assert_eq!(effects.len(), 1);

        handle_key(&mut app, key(KeyCode::Char('j')));
        let effects = handle_key(&mut app, key(KeyCode::Enter));
        assert!(effects.is_empty());
        assert_eq!(app.selected.as_deref(), Some("b.rs"));
    }

    #[test]
    fn escape_clears_selection_without_gateway_calls() {
        let mut app = open_app();
        handle_key(&mut app, key(KeyCode::Char('j')));
        let effects = handle_key(&mut app, key(KeyCode::Esc));
        assert!(effects.is_empty());
        assert!(app.selected.is_none());
        assert!(app.current_diff.is_none());
    }

    #[test]
    fn digit_toggle_reconciles_selection() {
        let mut app = open_app();
        // select c.rs (deleted), then hide deleted files
        handle_key(&mut app, key(KeyCode::Char('j')));
        handle_key(&mut app, key(KeyCode::Char('j')));
        handle_key(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.selected.as_deref(), Some("c.rs"));

        let effects = handle_key(&mut app, key(KeyCode::Char('3')));
        assert!(!app.filters().show_deleted);
        assert_eq!(app.selected.as_deref(), Some("a.rs"));
        assert!(!effects.is_empty());
    }

    #[test]
    fn slash_focuses_search_without_touching_the_query() {
        let mut app = open_app();
        handle_key(&mut app, key(KeyCode::Char('/')));
        assert_eq!(app.input_mode, InputMode::Search);
        handle_key(&mut app, key(KeyCode::Char('a')));
        handle_key(&mut app, key(KeyCode::Enter));

        handle_key(&mut app, key(KeyCode::Char('/')));
        assert_eq!(app.search(), "a");
    }

    #[test]
    fn search_mode_swallows_navigation_keys() {
        let mut app = open_app();
        handle_key(&mut app, key(KeyCode::Char('/')));
        let effects = handle_key(&mut app, key(KeyCode::Char('j')));
        assert!(effects.is_empty());
        assert!(app.selected.is_none());
        assert_eq!(app.search(), "j");
    }

    #[test]
    fn escape_in_search_blurs_and_clears() {
        let mut app = open_app();
        handle_key(&mut app, key(KeyCode::Char('/')));
        handle_key(&mut app, key(KeyCode::Char('x')));
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.search(), "");
    }

    #[test]
    fn confirmed_search_reconciles_filtered_out_selection() {
        let mut app = open_app();
        handle_key(&mut app, key(KeyCode::Char('j'))); // a.rs
        handle_key(&mut app, key(KeyCode::Char('/')));
        handle_key(&mut app, key(KeyCode::Char('b')));
        let effects = handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.selected.as_deref(), Some("b.rs"));
        assert!(!effects.is_empty());
    }

    #[test]
    fn v_toggles_view_mode_back_and_forth() {
        let mut app = open_app();
        handle_key(&mut app, key(KeyCode::Char('v')));
        assert_eq!(app.view_mode, ViewMode::Split);
        handle_key(&mut app, key(KeyCode::Char('v')));
        assert_eq!(app.view_mode, ViewMode::Unified);
    }

    #[test]
    fn brackets_set_the_tree_pulses() {
        let mut app = open_app();
        handle_key(&mut app, key(KeyCode::Char('[')));
        assert!(app.collapse_pulse);
        handle_key(&mut app, key(KeyCode::Char(']')));
        assert!(app.expand_pulse);
    }

    #[test]
    fn r_refreshes_only_with_a_repo_open() {
        let mut app = App::new(&BlConfig::default());
        assert!(handle_key(&mut app, key(KeyCode::Char('r'))).is_empty());

        let mut app = open_app();
        let effects = handle_key(&mut app, key(KeyCode::Char('r')));
        assert!(matches!(effects[0], Effect::LoadChangedFiles { .. }));
    }

    #[test]
    fn o_then_escape_cancels_without_state_changes() {
        let mut app = open_app();
        handle_key(&mut app, key(KeyCode::Char('o')));
        assert!(app.overlay.is_some());
        let effects = handle_key(&mut app, key(KeyCode::Esc));
        assert!(effects.is_empty());
        assert!(app.overlay.is_none());
        assert_eq!(app.repo_path.as_deref(), Some("/repo"));
        assert_eq!(app.files().len(), 3);
    }

    #[test]
    fn e_opens_selected_file_in_editor() {
        let mut app = open_app();
        assert!(handle_key(&mut app, key(KeyCode::Char('e'))).is_empty());

        handle_key(&mut app, key(KeyCode::Char('j')));
        let effects = handle_key(&mut app, key(KeyCode::Char('e')));
        assert!(matches!(
            &effects[0],
            Effect::OpenEditor { file_path, .. } if file_path == "a.rs"
        ));
    }

    #[test]
    fn w_toggles_watching() {
        let mut app = open_app();
        assert!(app.watching);
        let effects = handle_key(&mut app, key(KeyCode::Char('w')));
        assert!(!app.watching);
        assert_eq!(effects, vec![Effect::StopWatch]);
        let effects = handle_key(&mut app, key(KeyCode::Char('w')));
        assert!(app.watching);
        assert!(matches!(effects[0], Effect::StartWatch { .. }));
    }

    #[test]
    fn q_requests_quit() {
        let mut app = open_app();
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn rapid_reselection_is_last_dispatched_wins() {
        let mut app = open_app();
        let first = handle_key(&mut app, key(KeyCode::Char('j')));
        let second = handle_key(&mut app, key(KeyCode::Char('j')));
        let (s1, p1) = match &first[0] {
            Effect::LoadDiff { seq, file_path, .. } => (*seq, file_path.clone()),
            other => panic!("unexpected effect {:?}", other),
        };
        let (s2, p2) = match &second[0] {
            Effect::LoadDiff { seq, file_path, .. } => (*seq, file_path.clone()),
            other => panic!("unexpected effect {:?}", other),
        };

        // Completions arrive out of order; only the later dispatch lands
        app.apply(GatewayEvent::DiffLoaded {
            seq: s2,
            path: p2.clone(),
            result: Ok(crate::git::FileDiff {
                path: p2.clone(),
                hunks: Vec::new(),
                is_binary: false,
                is_cosmetic: false,
            }),
        });
        app.apply(GatewayEvent::DiffLoaded {
            seq: s1,
            path: p1.clone(),
            result: Ok(crate::git::FileDiff {
                path: p1,
                hunks: Vec::new(),
                is_binary: false,
                is_cosmetic: false,
            }),
        });
        assert_eq!(app.current_diff.as_ref().unwrap().path, p2);
    }
}
