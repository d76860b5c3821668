//! Binding contracts: the interfaces the HTTP-Redirect, HTTP-POST and SOAP
//! bindings must satisfy, and the parameter bundles the SP descriptor hands
//! them.
//!
//! None of the actual wire mechanics (deflate compression, XML-DSig
//! signing, an HTTP client) live here. Per the crate's scope those are
//! external collaborators. What lives here is the contract a binding
//! implementation is built against, mirroring the "narrow interface
//! injected into the core" design used for fetch-bytes/verify-chain
//! elsewhere in this crate.

use crate::cert::Certificate;
use crate::error::SamlResult;

/// What an HTTP-Redirect binding (SSO or SLO) needs from the SP/IdP pair to
/// do its job: the IdP's signing certificate to verify an inbound message
/// against, and the two Azure-AD-style quirk flags read off the IdP's
/// metadata/config.
#[derive(Debug, Clone)]
pub struct RedirectBindingParams {
    pub idp_cert: Option<Certificate>,
    pub query_param: &'static str,
    pub force_lcase_url_encoding: bool,
    pub double_encoded_response: bool,
}

/// Contract a HTTP-Redirect binding implementation satisfies: encode an
/// outbound message (deflate, sign with the SP key, base64, URL-encode per
/// the quirk flags) and decode/verify an inbound one.
pub trait RedirectBinding {
    fn encode(&self, message_xml: &[u8], relay_state: Option<&str>) -> SamlResult<String>;
    fn decode(&self, param_value: &str) -> SamlResult<Vec<u8>>;
}

/// What a SOAP binding (used for ArtifactResolve) needs: the IdP's
/// artifact-resolution URL and signing certificate, and a caller-supplied
/// user-agent label for request logging.
#[derive(Debug, Clone)]
pub struct SoapBindingParams {
    pub user_agent: String,
    pub idp_url: String,
    pub idp_cert: Option<Certificate>,
}

/// Contract a SOAP binding implementation satisfies: wrap `request_xml` in
/// a SOAP envelope, sign it, post it to `idp_url`, and verify the response
/// against `idp_cert`.
pub trait SoapBinding {
    fn call(&self, request_xml: &[u8]) -> SamlResult<Vec<u8>>;
}

/// HTTP-POST binding needs nothing parameterized from the SP beyond
/// "is there a certificate to verify against" (supplied per-call by the
/// caller, since the signing certificate used for a POST response is
/// looked up from the `Assertion`'s issuer after parsing, not known ahead
/// of time).
#[derive(Debug, Clone, Default)]
pub struct PostBindingParams;

/// Contract a HTTP-POST binding implementation satisfies: base64-decode
/// the posted body and, if a certificate is supplied, verify the XML-DSig
/// signature over it. Never raises: signature failure is reported as
/// `Ok(false)`.
pub trait PostBinding {
    fn handle_response(&self, raw_body: &str, cert: Option<&Certificate>) -> SamlResult<bool>;
}
