use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GhrConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// [server] section: where the review service lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout; unset waits as long as the review takes
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Start panels in rendered mode (false = raw Markdown)
    #[serde(default = "default_true")]
    pub rendered: bool,
    #[serde(default = "default_true")]
    pub wrap_lines: bool,
}

/// [export] section: downloads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Download directory; defaults to the user's Downloads folder
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Wrap rendered downloads in a complete HTML document
    #[serde(default)]
    pub standalone_html: bool,
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rendered: true,
            wrap_lines: true,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Global config location: `~/.config/ghr/config.toml`
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ghr/config.toml"))
}

/// Load config by merging global defaults with per-directory overrides.
/// Priority: `./.ghr-config.toml` > `~/.config/ghr/config.toml` > built-in defaults.
/// Merging is deep: individual fields within sections override independently.
pub fn load_config(work_dir: &Path) -> GhrConfig {
    let local_path = work_dir.join(".ghr-config.toml");
    load_layered(global_config_path().as_deref(), &local_path)
}

fn load_layered(global_path: Option<&Path>, local_path: &Path) -> GhrConfig {
    let global_table = global_path.and_then(read_table);
    let local_table = read_table(local_path);

    let merged = match (global_table, local_table) {
        (Some(mut global), Some(local)) => {
            deep_merge(&mut global, local);
            global
        }
        (Some(global), None) => global,
        (None, Some(local)) => local,
        (None, None) => return GhrConfig::default(),
    };

    let parsed = toml::to_string(&merged)
        .map_err(|e| e.to_string())
        .and_then(|s| toml::from_str::<GhrConfig>(&s).map_err(|e| e.to_string()));
    match parsed {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring invalid config: {}", e);
            GhrConfig::default()
        }
    }
}

fn read_table(path: &Path) -> Option<toml::Table> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<toml::Table>(&content) {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

/// Recursively merge `overlay` into `base`. Overlay values win; nested tables are merged recursively.
fn deep_merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(overlay_table) => match base.get_mut(&key) {
                Some(toml::Value::Table(base_table)) => deep_merge(base_table, overlay_table),
                _ => {
                    base.insert(key, toml::Value::Table(overlay_table));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_when_no_files_exist() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_layered(None, &dir.path().join(".ghr-config.toml"));
        assert_eq!(config, GhrConfig::default());
        assert_eq!(config.server.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.server.timeout(), None);
        assert!(config.display.rendered);
        assert!(!config.export.standalone_html);
    }

    #[test]
    fn local_overrides_global_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let global = write(
            dir.path(),
            "global.toml",
            "[server]\nbase_url = \"https://reviews.example.com\"\ntimeout_secs = 90\n\n[display]\nrendered = false\n",
        );
        let local = write(dir.path(), "local.toml", "[server]\ntimeout_secs = 30\n");

        let config = load_layered(Some(&global), &local);
        assert_eq!(config.server.base_url, "https://reviews.example.com");
        assert_eq!(config.server.timeout(), Some(Duration::from_secs(30)));
        assert!(!config.display.rendered);
        assert!(config.display.wrap_lines);
    }

    #[test]
    fn local_only_config_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let local = write(
            dir.path(),
            ".ghr-config.toml",
            "[export]\ndir = \"/tmp/reviews\"\nstandalone_html = true\n",
        );

        let config = load_layered(None, &local);
        assert_eq!(config.export.dir, Some(PathBuf::from("/tmp/reviews")));
        assert!(config.export.standalone_html);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let local = write(dir.path(), "bad.toml", "[display]\nrendered = \"yes please\"\n");
        assert_eq!(load_layered(None, &local), GhrConfig::default());

        let broken = write(dir.path(), "broken.toml", "[server\nbase_url = ");
        assert_eq!(load_layered(None, &broken), GhrConfig::default());
    }

    /// Shared buffer the fmt layer writes into
    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
        }
    }

    fn load_capturing_logs(global: Option<&Path>, local: &Path) -> (GhrConfig, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let config = tracing::subscriber::with_default(subscriber, || load_layered(global, local));
        (config, logs.text())
    }

    #[test]
    fn invalid_config_is_reported_in_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let local = write(dir.path(), "bad.toml", "[display]\nrendered = \"yes please\"\n");
        let (config, logs) = load_capturing_logs(None, &local);
        assert_eq!(config, GhrConfig::default());
        assert!(logs.contains("WARN"), "got: {logs}");
        assert!(logs.contains("Ignoring invalid config"), "got: {logs}");

        let broken = write(dir.path(), "broken.toml", "[server\nbase_url = ");
        let (config, logs) = load_capturing_logs(Some(&broken), &dir.path().join("missing.toml"));
        assert_eq!(config, GhrConfig::default());
        assert!(logs.contains("Failed to parse"), "got: {logs}");
        assert!(logs.contains("broken.toml"), "got: {logs}");
    }

    #[test]
    fn deep_merge_replaces_scalars_and_merges_tables() {
        let mut base: toml::Table = toml::from_str("a = 1\n[t]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Table = toml::from_str("a = 5\n[t]\ny = 3\n").unwrap();

        deep_merge(&mut base, overlay);
        assert_eq!(base["a"].as_integer(), Some(5));
        assert_eq!(base["t"]["x"].as_integer(), Some(1));
        assert_eq!(base["t"]["y"].as_integer(), Some(3));
    }
}
