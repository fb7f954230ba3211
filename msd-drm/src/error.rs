use thiserror::Error;

/// The errors that may occur while unwrapping a DRM container.
#[derive(Debug, Error)]
pub enum DrmError {
    /// The header bytes do not match the layout a vendor candidate expects.
    /// The dispatcher treats this as "try the next candidate".
    #[error("{0}")]
    Format(String),

    /// A length prefixed chunk declared a non positive size. Callers fall back
    /// to an alternate metadata source instead of aborting.
    #[error("failed to load {0} chunk")]
    CorruptChunk(&'static str),

    /// A key signature or zero check failed while unwrapping key material.
    #[error("key validation failed ({0})")]
    KeyValidation(String),

    /// The container was recognized but uses a revision this crate does not
    /// implement. Never retried with another candidate.
    #[error("unsupported variant ({0})")]
    UnsupportedVariant(String),

    /// An offset fell outside the logical payload of a buffer.
    #[error("offset {offset} is out of bounds for buffer of length {len}")]
    OutOfBounds { offset: u64, len: usize },

    /// Every vendor candidate for an extension rejected the file. Carries one
    /// `(candidate, cause)` pair per attempt.
    #[error("no vendor accepted the file: {}", format_attempts(.0))]
    NoMatch(Vec<(&'static str, String)>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DrmError {
    /// Returns true if another vendor candidate may still accept the file.
    pub fn is_vendor_mismatch(&self) -> bool {
        matches!(self, Self::Format(_) | Self::KeyValidation(_))
    }
}

fn format_attempts(attempts: &[(&'static str, String)]) -> String {
    attempts
        .iter()
        .map(|(vendor, cause)| format!("{} ({})", vendor, cause))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_classes() {
        assert!(DrmError::Format("file header is unexpected".to_owned()).is_vendor_mismatch());
        assert!(DrmError::KeyValidation("zero check".to_owned()).is_vendor_mismatch());
        assert!(!DrmError::CorruptChunk("key").is_vendor_mismatch());
        assert!(!DrmError::UnsupportedVariant("stag".to_owned()).is_vendor_mismatch());
    }

    #[test]
    fn no_match_lists_every_attempt() {
        let e = DrmError::NoMatch(vec![
            ("ximalaya", "ID3 header is too small".to_owned()),
            ("xiami", "file header is unexpected".to_owned()),
        ]);
        let text = e.to_string();
        assert!(text.contains("ximalaya (ID3 header is too small)"));
        assert!(text.contains("xiami (file header is unexpected)"));
    }
}
