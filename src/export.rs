use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::review::{Clipboard, FileSink};

// ── Clipboard ──

/// System clipboard. Tries `arboard` first and falls back to the platform
/// clipboard command when no clipboard server is reachable (SSH, bare TTY).
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                tracing::debug!("arboard unavailable, using clipboard command: {}", e);
                None
            }
        };
        Self { inner }
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        if let Some(clipboard) = self.inner.as_mut() {
            match clipboard.set_text(text.to_string()) {
                Ok(()) => return Ok(()),
                Err(e) => tracing::debug!("arboard write failed, trying command: {}", e),
            }
        }
        copy_with_command(text)
    }
}

fn copy_with_command(text: &str) -> Result<()> {
    let (cmd, args): (&str, Vec<&str>) = if cfg!(target_os = "macos") {
        ("pbcopy", vec![])
    } else if cfg!(target_os = "windows") {
        ("clip", vec![])
    } else {
        // Linux: xclip if installed, else xsel
        if std::process::Command::new("which")
            .arg("xclip")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
        {
            ("xclip", vec!["-selection", "clipboard"])
        } else {
            ("xsel", vec!["--clipboard", "--input"])
        }
    };

    let mut child = std::process::Command::new(cmd)
        .args(&args)
        .stdin(std::process::Stdio::piped())
        .spawn()
        .with_context(|| format!("no clipboard available ({} not found)", cmd))?;

    if let Some(ref mut stdin) = child.stdin {
        stdin.write_all(text.as_bytes())?;
    }

    let status = child.wait().context("Clipboard command failed")?;
    if !status.success() {
        anyhow::bail!("{} exited with {}", cmd, status);
    }
    Ok(())
}

// ── Downloads ──

/// Writes downloads into a directory. Existing files are never overwritten:
/// a numbered name is picked instead, the way browsers do.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DirectorySink {
    fn save(&mut self, filename: &str, mime_type: &str, content: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create {}", self.dir.display()))?;
        let path = unique_path(&self.dir, filename);
        std::fs::write(&path, content)
            .with_context(|| format!("Cannot write {}", path.display()))?;
        tracing::debug!(path = %path.display(), mime_type, bytes = content.len(), "download written");
        Ok(path)
    }
}

/// First of `name.ext`, `name (1).ext`, `name (2).ext`, ... that does not exist in `dir`
fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    };
    (1..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Default download directory: the user's Downloads folder, else the cwd
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());

        let path = sink
            .save("repo-review.md", "text/markdown", b"# Review\n")
            .unwrap();

        assert_eq!(path, dir.path().join("repo-review.md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Review\n");
    }

    #[test]
    fn never_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());

        let first = sink.save("user-review.html", "text/html", b"one").unwrap();
        let second = sink.save("user-review.html", "text/html", b"two").unwrap();
        let third = sink.save("user-review.html", "text/html", b"three").unwrap();

        assert_eq!(first, dir.path().join("user-review.html"));
        assert_eq!(second, dir.path().join("user-review (1).html"));
        assert_eq!(third, dir.path().join("user-review (2).html"));
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "one");
        assert_eq!(std::fs::read_to_string(&third).unwrap(), "three");
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports/reviews");
        let mut sink = DirectorySink::new(&nested);

        let path = sink.save("repo-review.md", "text/markdown", b"x").unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    #[test]
    fn unique_path_handles_names_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes"), "").unwrap();
        assert_eq!(unique_path(dir.path(), "notes"), dir.path().join("notes (1)"));
    }
}
