use crate::app::ViewMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub filters: FilterDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Diff layout at startup: "unified" or "split"
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default = "default_true")]
    pub line_numbers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Watch the repository's .git directory and refresh on changes
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

/// Initial visibility toggles for the file tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterDefaults {
    #[serde(default = "default_true")]
    pub show_added: bool,
    #[serde(default = "default_true")]
    pub show_modified: bool,
    #[serde(default = "default_true")]
    pub show_deleted: bool,
    #[serde(default = "default_true")]
    pub show_cosmetic: bool,
}

fn default_true() -> bool {
    true
}

fn default_debounce() -> u64 {
    500
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::default(),
            line_numbers: true,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: default_debounce(),
        }
    }
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            show_added: true,
            show_modified: true,
            show_deleted: true,
            show_cosmetic: true,
        }
    }
}

/// Load config by merging global defaults with per-repo overrides.
/// Priority: per-repo `.branchlens.toml` > global
/// `~/.config/branchlens/config.toml` > built-in defaults. Merging is deep:
/// individual fields within sections override independently.
pub fn load(repo_root: Option<&str>) -> BlConfig {
    let global = dirs::config_dir().map(|d| d.join("branchlens/config.toml"));
    let local = repo_root.map(|r| PathBuf::from(r).join(".branchlens.toml"));
    load_from(global, local)
}

fn load_from(global_path: Option<PathBuf>, local_path: Option<PathBuf>) -> BlConfig {
    let read_table = |path: Option<PathBuf>| {
        path.and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|c| toml::from_str::<toml::Value>(&c).ok())
            .and_then(|v| match v {
                toml::Value::Table(t) => Some(t),
                _ => None,
            })
    };

    let global_table = read_table(global_path);
    let local_table = read_table(local_path);

    let merged = match (global_table, local_table) {
        (Some(mut global), Some(local)) => {
            deep_merge(&mut global, local);
            toml::Value::Table(global)
        }
        (Some(global), None) => toml::Value::Table(global),
        (None, Some(local)) => toml::Value::Table(local),
        (None, None) => return BlConfig::default(),
    };

    merged.try_into().unwrap_or_default()
}

/// Recursively merge `overlay` into `base`. Overlay values win; nested
/// tables are merged recursively.
fn deep_merge(
    base: &mut toml::map::Map<String, toml::Value>,
    overlay: toml::map::Map<String, toml::Value>,
) {
    for (key, value) in overlay {
        match (base.get_mut(&key), &value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table.clone());
            }
            _ => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_all_visible_and_unified() {
        let config = BlConfig::default();
        assert_eq!(config.display.view_mode, ViewMode::Unified);
        assert!(config.watch.enabled);
        assert_eq!(config.watch.debounce_ms, 500);
        assert!(config.filters.show_cosmetic);
    }

    #[test]
    fn missing_files_yield_defaults() {
        let config = load_from(None, None);
        assert!(config.filters.show_added);
    }

    #[test]
    fn local_overrides_global_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("config.toml");
        let local = dir.path().join(".branchlens.toml");

        let mut f = std::fs::File::create(&global).unwrap();
        writeln!(f, "[watch]\nenabled = false\ndebounce_ms = 900").unwrap();
        let mut f = std::fs::File::create(&local).unwrap();
        writeln!(f, "[watch]\nenabled = true").unwrap();

        let config = load_from(Some(global), Some(local));
        // Local flips enabled; the global debounce survives the merge
        assert!(config.watch.enabled);
        assert_eq!(config.watch.debounce_ms, 900);
    }

    #[test]
    fn view_mode_parses_from_lowercase() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("config.toml");
        std::fs::write(&global, "[display]\nview_mode = \"split\"\n").unwrap();

        let config = load_from(Some(global), None);
        assert_eq!(config.display.view_mode, ViewMode::Split);
    }

    #[test]
    fn invalid_toml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("config.toml");
        std::fs::write(&global, "not [valid toml").unwrap();

        let config = load_from(Some(global), None);
        assert!(config.watch.enabled);
    }
}
