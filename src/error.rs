//! Error types shared by the device and cloud tiers
//!
//! Every failure the core can surface is one of these kinds. The cloud routes
//! map them onto HTTP status codes; the daemon logs them and keeps going.

use std::path::PathBuf;
use thiserror::Error;

/// InkSight error kinds
#[derive(Debug, Error)]
pub enum Error {
    /// Scene stream could not be decoded
    #[error("failed to decode scene file: {0}")]
    CodecRead(String),

    /// Scene stream could not be encoded
    #[error("failed to encode scene file: {0}")]
    CodecWrite(String),

    /// Filesystem read failed
    #[error("failed to read {path}: {source}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem write failed
    #[error("failed to write {path}: {source}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No API key provided
    #[error("missing API key; provide the X-API-Key header")]
    AuthMissing,

    /// API key not in the configured set
    #[error("invalid API key")]
    AuthInvalid,

    /// Requested resource does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Resource belongs to another tenant
    #[error("access denied")]
    Forbidden,

    /// Request failed validation
    #[error("{0}")]
    BadRequest(String),

    /// Upload exceeds the configured size limit
    #[error("{0}")]
    TooLarge(String),

    /// Query parameter outside its allowed range
    #[error("{0}")]
    Validation(String),

    /// Operation attempted before its precondition held
    #[error("{0}")]
    Precondition(String),

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status code this error maps to
    pub fn status_code(&self) -> u16 {
        match self {
            Error::CodecRead(_) | Error::CodecWrite(_) => 500,
            Error::IoRead { .. } | Error::IoWrite { .. } => 500,
            Error::AuthMissing | Error::AuthInvalid => 401,
            Error::NotFound(_) => 404,
            Error::Forbidden => 403,
            Error::BadRequest(_) => 400,
            Error::TooLarge(_) => 413,
            Error::Validation(_) => 422,
            Error::Precondition(_) => 400,
            Error::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::AuthMissing.status_code(), 401);
        assert_eq!(Error::AuthInvalid.status_code(), 401);
        assert_eq!(Error::NotFound("job".into()).status_code(), 404);
        assert_eq!(Error::Forbidden.status_code(), 403);
        assert_eq!(Error::BadRequest("bad".into()).status_code(), 400);
        assert_eq!(Error::TooLarge("big".into()).status_code(), 413);
        assert_eq!(Error::Validation("limit".into()).status_code(), 422);
        assert_eq!(Error::Precondition("not done".into()).status_code(), 400);
        assert_eq!(Error::CodecRead("truncated".into()).status_code(), 500);
    }

    #[test]
    fn test_display_is_human_readable() {
        let err = Error::CodecRead("unexpected end of stream".into());
        assert!(err.to_string().contains("unexpected end of stream"));
    }
}
