use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("no platform config directory")]
    NoConfigDir,

    #[error("config I/O on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("unsupported opcode: {0}")]
    UnsupportedOpcode(u64),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("connect timed out after {0}s")]
    ConnectTimeout(u64),

    #[error("presence client has shut down")]
    ClientClosed,
}

#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Presence(#[from] PresenceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::Io {
            path: PathBuf::from("/etc/folio/config.toml"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err
            .to_string()
            .starts_with("config I/O on /etc/folio/config.toml: "));

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("presence.user_id is empty".into());
        assert_eq!(
            err.to_string(),
            "config validation error: presence.user_id is empty"
        );
    }

    #[test]
    fn presence_error_display() {
        let err = PresenceError::MalformedFrame("expected value at line 1".into());
        assert_eq!(err.to_string(), "malformed frame: expected value at line 1");

        let err = PresenceError::UnsupportedOpcode(7);
        assert_eq!(err.to_string(), "unsupported opcode: 7");

        let err = PresenceError::ConnectTimeout(15);
        assert_eq!(err.to_string(), "connect timed out after 15s");

        let err = PresenceError::ClientClosed;
        assert_eq!(err.to_string(), "presence client has shut down");
    }

    #[test]
    fn folio_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: FolioError = config_err.into();
        assert!(matches!(err, FolioError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn folio_error_from_presence() {
        let presence_err = PresenceError::Transport("connection refused".into());
        let err: FolioError = presence_err.into();
        assert!(matches!(err, FolioError::Presence(_)));
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[test]
    fn folio_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FolioError = io_err.into();
        assert!(matches!(err, FolioError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn folio_error_other() {
        let err = FolioError::Other("something went wrong".into());
        assert_eq!(err.to_string(), "something went wrong");
    }
}
