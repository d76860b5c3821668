//! Core of a SAML 2.0 Service Provider: IdP metadata parsing, SP metadata
//! and protocol-message construction, and inbound Assertion validation.
//!
//! Transport (HTTP, SOAP) and wire-level binding mechanics (deflate,
//! XML-DSig) are external collaborators, see [`metadata::idp::MetadataTransport`]
//! and the [`binding`] module for the interfaces they must satisfy.

pub mod binding;
pub mod cert;
pub mod config;
pub mod error;
pub mod metadata;
pub mod protocol;
pub mod xml;

pub use cert::Certificate;
pub use error::{SamlError, SamlResult};
pub use metadata::{IdpDescriptor, IdpQuirks, MetadataTransport, SpDescriptor, TlsOptions};
pub use metadata::sp::SpDescriptorBuilder;
pub use protocol::{ArtifactResolve, Assertion, AuthnRequest, LogoutRequest, LogoutResponse, ProtocolMessage};
