//! File helpers for config and payload files

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Expand `~` and make relative paths absolute against the working directory.
///
/// ```text
/// expand_path("~/.fieldscope/fieldscope.json") // -> /home/user/.fieldscope/fieldscope.json
/// expand_path("payloads/req.json")             // -> /current/dir/payloads/req.json
/// expand_path("/etc/fieldscope.json")          // -> unchanged
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    let expanded = match path.strip_prefix('~') {
        Some("") => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => dirs::home_dir()
            .map(|home| home.join(&rest[1..]))
            .unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    };

    if expanded.is_absolute() {
        return expanded;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(&expanded))
        .unwrap_or(expanded)
}

/// Read a payload file, refusing anything over `limit` bytes before reading it.
pub fn read_payload(path: &Path, limit: usize) -> Result<Vec<u8>> {
    let size = fs::metadata(path)
        .with_context(|| format!("Failed to stat payload file: {}", path.display()))?
        .len();
    if size > limit as u64 {
        anyhow::bail!(
            "Payload file {} is {} bytes, over the {} byte limit",
            path.display(),
            size,
            limit
        );
    }
    fs::read(path).with_context(|| format!("Failed to read payload file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_expand_path_absolute_unchanged() {
        #[cfg(unix)]
        assert_eq!(expand_path("/etc/fieldscope.json"), PathBuf::from("/etc/fieldscope.json"));
    }

    #[test]
    fn test_expand_path_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
            assert_eq!(expand_path("~/cfg.json"), home.join("cfg.json"));
        }
    }

    #[test]
    fn test_expand_path_relative() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("payloads/req.json"), cwd.join("payloads/req.json"));
        assert_eq!(expand_path("  req.json  "), cwd.join("req.json"));
    }

    #[test]
    fn test_expand_path_tilde_user_not_expanded() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("~other/x"), cwd.join("~other/x"));
    }

    #[test]
    fn test_read_payload_within_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"max_tokens":10}"#).unwrap();
        let bytes = read_payload(file.path(), 1024).unwrap();
        assert_eq!(bytes, br#"{"max_tokens":10}"#);
    }

    #[test]
    fn test_read_payload_over_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[b' '; 64]).unwrap();
        let err = read_payload(file.path(), 16).unwrap_err();
        assert!(err.to_string().contains("over the 16 byte limit"));
    }

    #[test]
    fn test_read_payload_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_payload(&dir.path().join("absent.json"), 16).is_err());
    }
}
