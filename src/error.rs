//! Error types for the SAML core.
//!
//! Construction errors (bad metadata, bad certificates) are raised through
//! [`SamlError`]. Assertion validation never raises: `Assertion::valid`
//! returns `bool` and logs its reasoning via `tracing` (see
//! `assertion::Assertion::valid`). Certificate verification warnings are
//! likewise never raised: they are non-fatal and delivered through
//! `cert::VerificationObserver`.

use thiserror::Error;

/// Errors that can abort construction of a descriptor, certificate, or
/// protocol message.
#[derive(Error, Debug)]
pub enum SamlError {
    /// `IdPDescriptor::from_url` received a non-success response.
    #[error("metadata fetch failed: HTTP {status}: {message}")]
    MetadataFetchFailed { status: u16, message: String },

    /// The metadata document was malformed or missing a required element
    /// (no `entityID`, no `IDPSSODescriptor`, ...).
    #[error("metadata parse failed: {reason}")]
    MetadataParseFailed { reason: String },

    /// A certificate body could not be parsed as PEM or DER.
    #[error("invalid certificate: {reason}")]
    InvalidCertificate { reason: String },

    /// The XML document could not be parsed at all.
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// A required field was absent from a descriptor under construction.
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// A value that must be a syntactically valid URL was not.
    #[error("invalid URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },
}

/// Result alias used throughout the crate, named the way the corpus names
/// its per-module result aliases (`JobResult<T>`, `SSOResult<T>`).
pub type SamlResult<T> = Result<T, SamlError>;

impl From<quick_xml::Error> for SamlError {
    fn from(err: quick_xml::Error) -> Self {
        SamlError::MalformedXml(err.to_string())
    }
}

impl From<url::ParseError> for SamlError {
    fn from(err: url::ParseError) -> Self {
        SamlError::InvalidUrl {
            value: String::new(),
            reason: err.to_string(),
        }
    }
}

impl From<base64::DecodeError> for SamlError {
    fn from(err: base64::DecodeError) -> Self {
        SamlError::InvalidCertificate {
            reason: format!("base64 decode error: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        let err = SamlError::MetadataFetchFailed {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "metadata fetch failed: HTTP 503: Service Unavailable"
        );

        let err = SamlError::MissingRequiredField("entity_id");
        assert_eq!(err.to_string(), "missing required field: entity_id");
    }

    #[test]
    fn base64_errors_convert_to_invalid_certificate() {
        let decode_err = base64::Engine::decode(
            &base64::engine::general_purpose::STANDARD,
            "not valid base64!!",
        )
        .unwrap_err();
        let err: SamlError = decode_err.into();
        assert!(matches!(err, SamlError::InvalidCertificate { .. }));
    }
}
