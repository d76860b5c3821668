//! Namespace prefixes fixed by the SAML 2.0 schemas, used to build fully
//! qualified lookups against [`super::Element`] without re-declaring the
//! URNs at every call site.

/// The namespace URIs this crate ever matches against, pre-bound to the
/// prefixes the SAML specs themselves use. Not an XPath evaluator, just
/// a constant table plus lookup, since `Element::children_ns` /
/// `descendants_ns` already do the matching.
#[derive(Debug, Clone, Copy)]
pub struct Namespaces;

impl Namespaces {
    pub const MD: &'static str = "urn:oasis:names:tc:SAML:2.0:metadata";
    pub const DS: &'static str = "http://www.w3.org/2000/09/xmldsig#";
    pub const SAML: &'static str = "urn:oasis:names:tc:SAML:2.0:assertion";
    pub const SAMLP: &'static str = "urn:oasis:names:tc:SAML:2.0:protocol";

    /// Resolves one of the four fixed prefixes to its namespace URI, for
    /// callers that only have the prefix string (e.g. read from config or
    /// a test fixture) rather than a compile-time constant.
    pub fn for_prefix(prefix: &str) -> Option<&'static str> {
        match prefix {
            "md" => Some(Self::MD),
            "ds" => Some(Self::DS),
            "saml" => Some(Self::SAML),
            "samlp" => Some(Self::SAMLP),
            _ => None,
        }
    }
}
