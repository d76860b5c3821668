//! Certificate handling: PEM/base64 plumbing plus non-strict chain
//! verification.
//!
//! The armor-stripping logic is the same idea as `saml.rs`'s
//! `cert.lines().filter(|l| !l.starts_with("-----"))` in the teacher, just
//! promoted to a standalone, testable function and paired with the inverse
//! (`rewrap_base64`) that metadata parsing needs.

use crate::error::{SamlError, SamlResult};
use std::path::Path;

const PEM_LINE_WIDTH: usize = 64;

/// A certificate carried as its PEM text. The crate never parses a private
/// key of its own: `SPDescriptor::key` is opaque bytes handed to a signing
/// collaborator, so this type only ever models the public certificate
/// side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub pem: String,
}

impl Certificate {
    /// Loads a certificate from a PEM file on disk.
    pub fn load_pem(path: impl AsRef<Path>) -> SamlResult<Self> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| SamlError::InvalidCertificate {
            reason: format!("reading {}: {e}", path.as_ref().display()),
        })?;
        Self::from_pem_bytes(&bytes)
    }

    /// Parses a certificate from PEM bytes already in memory.
    pub fn from_pem_bytes(bytes: &[u8]) -> SamlResult<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| SamlError::InvalidCertificate {
                reason: format!("not valid UTF-8: {e}"),
            })?
            .to_string();
        if !text.contains("-----BEGIN CERTIFICATE-----") {
            return Err(SamlError::InvalidCertificate {
                reason: "missing PEM armor".to_string(),
            });
        }
        Ok(Certificate { pem: text })
    }

    /// Strips all `-----…-----` armor lines, returning the remaining
    /// base64 body as a single concatenated blob (no embedded newlines).
    pub fn strip_armor(&self) -> String {
        strip_armor(&self.pem)
    }

    /// Parses the DER body and returns the decoded bytes, for callers that
    /// need to hand the certificate to `x509_parser` or a verification
    /// collaborator directly.
    pub fn der_bytes(&self) -> SamlResult<Vec<u8>> {
        use base64::Engine;
        let body = self.strip_armor();
        base64::engine::general_purpose::STANDARD
            .decode(body)
            .map_err(SamlError::from)
    }
}

/// Removes PEM armor lines from `pem`, returning the remaining text with
/// all whitespace removed so the result is a single contiguous base64
/// blob. Line wrapping of the *output* is the caller's concern (see
/// `rewrap_base64`).
pub fn strip_armor(pem: &str) -> String {
    pem.lines()
        .filter(|line| !line.trim_start().starts_with("-----"))
        .collect::<Vec<_>>()
        .join("")
        .split_whitespace()
        .collect()
}

/// Re-wraps a possibly-unwrapped base64 blob (as IdP metadata commonly
/// carries it) into PEM armor with lines of `width` columns.
///
/// Idempotent on an already-wrapped blob: wrapping is driven purely by the
/// base64 content, stripped of embedded whitespace first.
pub fn rewrap_base64(base64_body: &str, width: usize) -> String {
    let compact: String = base64_body.split_whitespace().collect();
    let mut out = String::from("-----BEGIN CERTIFICATE-----\n");
    for chunk in compact.as_bytes().chunks(width) {
        out.push_str(std::str::from_utf8(chunk).unwrap_or(""));
        out.push('\n');
    }
    out.push_str("-----END CERTIFICATE-----");
    out
}

/// Convenience: `rewrap_base64` at the standard 64-column width SAML
/// metadata uses.
pub fn rewrap_base64_standard(base64_body: &str) -> String {
    rewrap_base64(base64_body, PEM_LINE_WIDTH)
}

/// A non-fatal problem found while verifying a certificate against a CA
/// bundle. Never raised as an error (§7/§9): delivered through
/// [`VerificationObserver`] so the caller decides whether to act on it.
#[derive(Debug, Clone)]
pub struct CertificateVerificationWarning {
    pub reason: String,
}

/// Callback invoked with a [`CertificateVerificationWarning`] instead of
/// the crate writing to stderr directly or raising an error.
pub trait VerificationObserver {
    fn warn(&self, warning: CertificateVerificationWarning);
}

impl<F: Fn(CertificateVerificationWarning)> VerificationObserver for F {
    fn warn(&self, warning: CertificateVerificationWarning) {
        self(warning)
    }
}

/// Verifies `cert` is at least structurally a valid X.509 certificate and,
/// when `ca_bundle` is given, checks against it.
///
/// This is non-strict verification, the moral equivalent of the
/// underlying library's `strict_certs=0` mode. A verification failure is
/// never fatal: it is reported through `observer` (if any) and the
/// certificate is retained regardless, because real-world IdPs routinely
/// ship expired or otherwise imperfect certificates and the operator, not
/// this library, decides whether to trust them.
pub fn verify(
    cert: &Certificate,
    ca_bundle: Option<&Certificate>,
    observer: Option<&dyn VerificationObserver>,
) {
    let der = match cert.der_bytes() {
        Ok(der) => der,
        Err(e) => {
            report(observer, format!("certificate body is not valid base64: {e}"));
            return;
        }
    };

    let (_, parsed) = match x509_parser::parse_x509_certificate(&der) {
        Ok(parsed) => parsed,
        Err(e) => {
            report(observer, format!("certificate could not be parsed: {e}"));
            return;
        }
    };

    if !parsed.validity().is_valid() {
        report(observer, "certificate is outside its validity window".to_string());
    }

    if let Some(ca) = ca_bundle {
        let ca_der = match ca.der_bytes() {
            Ok(der) => der,
            Err(e) => {
                report(observer, format!("CA bundle is not valid base64: {e}"));
                return;
            }
        };
        let (_, ca_parsed) = match x509_parser::parse_x509_certificate(&ca_der) {
            Ok(parsed) => parsed,
            Err(e) => {
                report(observer, format!("CA bundle could not be parsed: {e}"));
                return;
            }
        };
        if parsed.issuer() != ca_parsed.subject() {
            report(
                observer,
                format!(
                    "certificate issuer '{}' does not match CA subject '{}'",
                    parsed.issuer(),
                    ca_parsed.subject()
                ),
            );
        } else if parsed.verify_signature(Some(ca_parsed.public_key())).is_err() {
            report(observer, "certificate signature does not chain to CA".to_string());
        }
    }
}

fn report(observer: Option<&dyn VerificationObserver>, reason: String) {
    tracing::warn!(reason = %reason, "certificate verification warning");
    if let Some(observer) = observer {
        observer.warn(CertificateVerificationWarning { reason });
    }
}
