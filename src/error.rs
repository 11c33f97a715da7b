//! Error types for circle detection

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the detection pipeline and the service façade.
///
/// Every failure is returned to the immediate caller; nothing is retried
/// internally and no partial detection list accompanies an error.
#[derive(Debug, Error)]
pub enum Error {
    /// A parameter is missing, non-positive or inconsistent, or a referenced
    /// image source name is empty or unknown.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The image source could not supply a frame, or the color image is
    /// absent from the supplied set.
    #[error("image unavailable: {0}")]
    ImageUnavailable(String),

    /// The input cannot be interpreted as a 2-D pixel grid.
    #[error("image format error: {0}")]
    ImageFormat(String),

    /// The numeric detection routine could not execute.
    #[error("detection engine error: {0}")]
    DetectionEngine(String),

    /// A diagnostic artifact could not be written to disk.
    #[error("failed to write diagnostic artifact '{path}': {source}")]
    DiagnosticWrite {
        /// Target file of the artifact
        path: PathBuf,
        /// Encoder or I/O failure reported by `image`
        #[source]
        source: image::ImageError,
    },

    /// A non-file diagnostic sink rejected an artifact.
    #[error("diagnostic sink failed: {0}")]
    DiagnosticSink(String),
}

impl Error {
    /// True for the diagnostic-only error kinds.
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Error::DiagnosticWrite { .. } | Error::DiagnosticSink(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_kinds() {
        assert!(Error::DiagnosticSink("full".into()).is_diagnostic());
        assert!(!Error::InvalidConfig("dp".into()).is_diagnostic());
        assert!(!Error::DetectionEngine("boom".into()).is_diagnostic());
    }

    #[test]
    fn test_display() {
        let err = Error::InvalidConfig("min_radius needs to be set (def 35)".into());
        assert_eq!(
            err.to_string(),
            "invalid config: min_radius needs to be set (def 35)"
        );
    }

    #[test]
    fn test_diagnostic_write_keeps_path_and_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = Error::DiagnosticWrite {
            path: PathBuf::from("out/blurred.jpg"),
            source: image::ImageError::IoError(io),
        };
        assert!(err.is_diagnostic());
        assert!(err.to_string().contains("out/blurred.jpg"));
        assert!(err.source().is_some());
    }
}
