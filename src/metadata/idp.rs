//! Parses an IdP's `EntityDescriptor` into an [`IdpDescriptor`].

use crate::cert::{self, Certificate, VerificationObserver};
use crate::error::{SamlError, SamlResult};
use crate::xml::{self, Namespaces};
use regex::Regex;
use std::collections::HashMap;

/// Fetches raw bytes from a URL. The crate never depends on an HTTP
/// client directly (§1); a caller supplies one of these to
/// [`IdpDescriptor::from_url`], which honors `tls` when making the
/// request.
pub trait MetadataTransport {
    fn fetch(&self, url: &str, tls: &TlsOptions) -> Result<Vec<u8>, TransportError>;
}

/// A failed fetch, carrying enough detail to build a
/// [`SamlError::MetadataFetchFailed`].
#[derive(Debug, Clone)]
pub struct TransportError {
    pub status: u16,
    pub message: String,
}

/// TLS knobs passed through to the caller's [`MetadataTransport`]. The
/// core never terminates TLS itself; this is just a typed place to carry
/// the settings a transport implementation needs.
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    pub verify_peer: bool,
    pub ca_bundle_path: Option<String>,
}

/// Per-IdP interoperability quirks (§6). Both default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdpQuirks {
    pub sls_force_lcase_url_encoding: bool,
    pub sls_double_encoded_response: bool,
}

impl IdpQuirks {
    /// Reads `{prefix}_SLS_FORCE_LCASE_URL_ENCODING` and
    /// `{prefix}_SLS_DOUBLE_ENCODED_RESPONSE` from the environment, so a
    /// deployment can flip per-IdP quirks without a recompile.
    pub fn from_env(prefix: &str) -> Self {
        let flag = |suffix: &str| -> bool {
            std::env::var(format!("{prefix}_{suffix}"))
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false)
        };
        Self {
            sls_force_lcase_url_encoding: flag("SLS_FORCE_LCASE_URL_ENCODING"),
            sls_double_encoded_response: flag("SLS_DOUBLE_ENCODED_RESPONSE"),
        }
    }
}

/// An Identity Provider's metadata, parsed once and treated as read-only
/// thereafter.
#[derive(Debug, Clone)]
pub struct IdpDescriptor {
    pub entity_id: String,
    pub sso_urls: HashMap<String, String>,
    pub slo_urls: HashMap<String, String>,
    pub artifact_urls: HashMap<String, String>,
    pub certs: HashMap<String, Certificate>,
    pub formats: HashMap<String, String>,
    pub default_format: String,
    pub cacert: Option<Certificate>,
    pub quirks: IdpQuirks,
}

impl IdpDescriptor {
    /// Parses `xml_bytes` as an `EntityDescriptor`/`IDPSSODescriptor`.
    /// When `cacert` is given, each certificate found is checked against
    /// it; a failed check is reported through `observer` and never aborts
    /// construction (§4.2/§9).
    pub fn from_xml(
        xml_bytes: &[u8],
        cacert: Option<Certificate>,
        quirks: IdpQuirks,
        observer: Option<&dyn VerificationObserver>,
    ) -> SamlResult<Self> {
        let doc = xml::strip_comments(xml_bytes)?;

        let entity_id = doc
            .root
            .attr("entityID")
            .ok_or(SamlError::MissingRequiredField("entityID"))?
            .to_string();

        let idp_sso = doc
            .root
            .child_ns(Namespaces::MD, "IDPSSODescriptor")
            .ok_or_else(|| SamlError::MetadataParseFailed {
                reason: "no IDPSSODescriptor element".to_string(),
            })?;

        let sso_urls = collect_endpoints(idp_sso, "SingleSignOnService");
        let slo_urls = collect_endpoints(idp_sso, "SingleLogoutService");
        let artifact_urls = collect_endpoints(idp_sso, "ArtifactResolutionService");

        let (formats, default_format) = collect_formats(idp_sso);

        let mut certs = HashMap::new();
        for key_descriptor in idp_sso.children_ns(Namespaces::MD, "KeyDescriptor") {
            let usage = key_descriptor.attr("use").unwrap_or("signing").to_string();
            let Some(cert_el) = key_descriptor.first_descendant_local("X509Certificate") else {
                continue;
            };
            let body: String = cert_el.text_trimmed().split_whitespace().collect();
            let pem = cert::rewrap_base64_standard(&body);
            certs.insert(usage, Certificate { pem });
        }

        if let Some(ca) = &cacert {
            for cert in certs.values() {
                cert::verify(cert, Some(ca), observer);
            }
        }

        tracing::info!(entity_id = %entity_id, "parsed IdP metadata");

        Ok(IdpDescriptor {
            entity_id,
            sso_urls,
            slo_urls,
            artifact_urls,
            certs,
            formats,
            default_format,
            cacert,
            quirks,
        })
    }

    /// Fetches metadata over `transport` and delegates to [`from_xml`].
    pub fn from_url(
        url: &str,
        cacert: Option<Certificate>,
        tls_options: TlsOptions,
        quirks: IdpQuirks,
        transport: &dyn MetadataTransport,
        observer: Option<&dyn VerificationObserver>,
    ) -> SamlResult<Self> {
        let bytes = transport
            .fetch(url, &tls_options)
            .map_err(|e| SamlError::MetadataFetchFailed {
                status: e.status,
                message: e.message,
            })?;
        Self::from_xml(&bytes, cacert, quirks, observer)
    }

    pub fn sso_url(&self, binding: &str) -> Option<&str> {
        self.sso_urls.get(binding).map(String::as_str)
    }

    pub fn slo_url(&self, binding: &str) -> Option<&str> {
        self.slo_urls.get(binding).map(String::as_str)
    }

    pub fn artifact_url(&self, binding: &str) -> Option<&str> {
        self.artifact_urls.get(binding).map(String::as_str)
    }

    pub fn cert(&self, usage: &str) -> Option<&Certificate> {
        self.certs.get(usage)
    }

    /// Resolves the symbolic binding short names this crate recognizes.
    /// Any other short name resolves to `None`.
    pub fn binding(short_name: &str) -> Option<&'static str> {
        match short_name {
            "redirect" => Some("urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect"),
            "soap" => Some("urn:oasis:names:tc:SAML:2.0:bindings:SOAP"),
            _ => None,
        }
    }

    /// Full NameID-format URI for `short_name`; with no argument, the
    /// default. `None` when no formats are known at all (shouldn't
    /// happen in practice since construction always inserts at least
    /// `unspecified`).
    pub fn format(&self, short_name: Option<&str>) -> Option<&str> {
        let key = short_name.unwrap_or(&self.default_format);
        self.formats.get(key).map(String::as_str)
    }
}

fn collect_endpoints(idp_sso: &xml::Element, local_name: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for el in idp_sso.children_ns(Namespaces::MD, local_name) {
        if let (Some(binding), Some(location)) = (el.attr("Binding"), el.attr("Location")) {
            if let Err(e) = url::Url::parse(location) {
                tracing::warn!(binding, location, error = %e, "skipping endpoint with unparseable Location");
                continue;
            }
            out.insert(binding.to_string(), location.to_string());
        }
    }
    out
}

fn collect_formats(idp_sso: &xml::Element) -> (HashMap<String, String>, String) {
    let re = Regex::new(r"^urn:oasis:names:tc:SAML:(?:2\.0|1\.1):nameid-format:(.*)$").unwrap();
    let mut formats = HashMap::new();
    let mut default_format = String::new();

    for el in idp_sso.children_ns(Namespaces::MD, "NameIDFormat") {
        let text = el.text_trimmed();
        match re.captures(&text) {
            Some(caps) => {
                let short = caps[1].to_string();
                if default_format.is_empty() {
                    default_format = short.clone();
                }
                formats.insert(short, text);
            }
            None => {
                tracing::warn!(uri = %text, "skipping NameIDFormat that doesn't match the expected URN shape");
            }
        }
    }

    if formats.is_empty() {
        formats.insert(
            "unspecified".to_string(),
            "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified".to_string(),
        );
        default_format = "unspecified".to_string();
    }

    (formats, default_format)
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="https://idp.example/">
        <md:IDPSSODescriptor>
            <md:KeyDescriptor use="signing">
                <ds:KeyInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#">
                    <ds:X509Data><ds:X509Certificate>TUlJQkZ6Q0J3UUl=</ds:X509Certificate></ds:X509Data>
                </ds:KeyInfo>
            </md:KeyDescriptor>
            <md:NameIDFormat>urn:oasis:names:tc:SAML:2.0:nameid-format:transient</md:NameIDFormat>
            <md:SingleSignOnService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect" Location="https://idp.example/sso"/>
        </md:IDPSSODescriptor>
    </md:EntityDescriptor>"#;

    #[test]
    fn parses_sso_url_format_and_cert() {
        let idp = IdpDescriptor::from_xml(METADATA.as_bytes(), None, IdpQuirks::default(), None).unwrap();
        assert_eq!(
            idp.sso_url("urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect"),
            Some("https://idp.example/sso")
        );
        assert_eq!(
            idp.format(None),
            Some("urn:oasis:names:tc:SAML:2.0:nameid-format:transient")
        );
        assert_eq!(idp.default_format, "transient");
        let cert = idp.cert("signing").unwrap();
        assert!(cert.pem.starts_with("-----BEGIN CERTIFICATE-----\n"));
        assert!(cert.pem.ends_with("-----END CERTIFICATE-----"));
    }

    #[test]
    fn missing_nameid_format_defaults_to_unspecified() {
        let xml = r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="https://idp.example/">
            <md:IDPSSODescriptor/>
        </md:EntityDescriptor>"#;
        let idp = IdpDescriptor::from_xml(xml.as_bytes(), None, IdpQuirks::default(), None).unwrap();
        assert_eq!(
            idp.format(None),
            Some("urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified")
        );
        assert_eq!(idp.default_format, "unspecified");
    }

    #[test]
    fn key_descriptor_missing_use_defaults_to_signing() {
        let xml = r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="https://idp.example/">
            <md:IDPSSODescriptor>
                <md:KeyDescriptor>
                    <ds:KeyInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#">
                        <ds:X509Data><ds:X509Certificate>QUJD</ds:X509Certificate></ds:X509Data>
                    </ds:KeyInfo>
                </md:KeyDescriptor>
            </md:IDPSSODescriptor>
        </md:EntityDescriptor>"#;
        let idp = IdpDescriptor::from_xml(xml.as_bytes(), None, IdpQuirks::default(), None).unwrap();
        assert!(idp.cert("signing").is_some());
    }

    #[test]
    fn missing_entity_id_is_an_error() {
        let xml = r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata">
            <md:IDPSSODescriptor/>
        </md:EntityDescriptor>"#;
        let err = IdpDescriptor::from_xml(xml.as_bytes(), None, IdpQuirks::default(), None).unwrap_err();
        assert!(matches!(err, SamlError::MissingRequiredField("entityID")));
    }

    #[test]
    fn from_url_maps_transport_failure_to_metadata_fetch_failed() {
        struct FailingTransport;
        impl MetadataTransport for FailingTransport {
            fn fetch(&self, _url: &str, _tls: &TlsOptions) -> Result<Vec<u8>, TransportError> {
                Err(TransportError { status: 503, message: "down".to_string() })
            }
        }
        let err = IdpDescriptor::from_url(
            "https://idp.example/metadata",
            None,
            TlsOptions::default(),
            IdpQuirks::default(),
            &FailingTransport,
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SamlError::MetadataFetchFailed { status: 503, .. }
        ));
    }
}
