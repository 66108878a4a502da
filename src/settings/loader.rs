//! Settings loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use super::Settings;

/// Error type for settings loading.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Load settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = fs::read_to_string(path).map_err(SettingsError::Io)?;
    toml::from_str(&content).map_err(SettingsError::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_partial_settings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"address = "http://10.0.0.5:2019""#).unwrap();

        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.address, "http://10.0.0.5:2019");
        assert_eq!(settings.log_level, "info");
        assert!(settings.socket.is_none());
    }

    #[test]
    fn test_load_socket_settings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "socket = \"/run/caddy/admin.sock\"\nlog_level = \"debug\"").unwrap();

        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.socket.as_deref(), Some(Path::new("/run/caddy/admin.sock")));
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "address = [").unwrap();

        let err = load_settings(file.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
        assert!(err.to_string().starts_with("Parse error:"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
