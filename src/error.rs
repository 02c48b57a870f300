use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("payload {size} unavailable: cannot read {}: {source}", path.display())]
    PayloadUnavailable {
        size: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("round trip mismatch: {algorithm} at {size} did not decrypt to its input")]
    RoundTripMismatch { algorithm: String, size: String },
    #[error("cipher {algorithm}: {message}")]
    Cipher { algorithm: String, message: String },
    #[error("persist {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed campaign: {0}")]
    MalformedCampaign(String),
    #[error("config: {0}")]
    Config(String),
    #[error("render: {0}")]
    Render(String),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors that invalidate the whole campaign.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Persistence { .. } | Error::Render(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trip_mismatch_names_cell() {
        let err = Error::RoundTripMismatch {
            algorithm: "ASCON-128".into(),
            size: "0.4MB".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ASCON-128"), "got: {msg}");
        assert!(msg.contains("0.4MB"), "got: {msg}");
    }

    #[test]
    fn display_payload_unavailable() {
        let err = Error::PayloadUnavailable {
            size: "2.7MB".into(),
            path: PathBuf::from("assets/image.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("payload 2.7MB unavailable"), "got: {msg}");
        assert!(msg.contains("assets/image.jpg"), "got: {msg}");
    }

    #[test]
    fn display_persistence_error() {
        let err = Error::Persistence {
            path: PathBuf::from("/out/perfResult.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().starts_with("persist /out/perfResult.json"), "got: {err}");
    }

    #[test]
    fn display_malformed_campaign() {
        let err = Error::MalformedCampaign("run 1 has 3 observations".into());
        assert_eq!(err.to_string(), "malformed campaign: run 1 has 3 observations");
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::other("test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn persistence_and_render_are_recoverable() {
        let persist = Error::Persistence {
            path: PathBuf::from("x"),
            source: std::io::Error::other("disk full"),
        };
        assert!(!persist.is_fatal());
        assert!(!Error::Render("surface".into()).is_fatal());
        assert!(
            Error::RoundTripMismatch {
                algorithm: "AES-128".into(),
                size: "1MB".into()
            }
            .is_fatal()
        );
    }
}
