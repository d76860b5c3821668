//! Outbound protocol messages and the inbound Assertion.
//!
//! Every outbound message shares the same envelope (issuer, destination,
//! a freshly generated `ID`, and the current instant) the way the
//! teacher's `generate_authn_request` stamps those four fields by hand
//! into each request; here they're factored into [`Envelope`] once rather
//! than repeated per message type.

pub mod artifact_resolve;
pub mod assertion;
pub mod authn_request;
pub mod logout_request;
pub mod logout_response;

pub use artifact_resolve::ArtifactResolve;
pub use assertion::Assertion;
pub use authn_request::AuthnRequest;
pub use logout_request::LogoutRequest;
pub use logout_response::LogoutResponse;

use chrono::{DateTime, Utc};

/// `issuer`, `destination`, `id`, `issue_instant`: present on every
/// outbound message per §6.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub issuer: String,
    pub destination: String,
    pub id: String,
    pub issue_instant: DateTime<Utc>,
}

impl Envelope {
    pub fn new(issuer: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            destination: destination.into(),
            id: fresh_id(),
            issue_instant: Utc::now(),
        }
    }
}

/// Serialization contract every outbound message satisfies.
pub trait ProtocolMessage {
    fn envelope(&self) -> &Envelope;
    fn to_xml(&self) -> String;
}

pub(crate) fn fresh_id() -> String {
    format!("_{}", uuid::Uuid::new_v4().simple())
}

pub(crate) fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub(crate) fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique_and_non_numeric_leading() {
        let a = fresh_id();
        let b = fresh_id();
        assert_ne!(a, b);
        assert!(a.starts_with('_'));
    }

    #[test]
    fn xml_escape_covers_the_five_entities() {
        assert_eq!(xml_escape("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }
}
