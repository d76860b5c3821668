//! Inbound `saml:Assertion` parsing and validation.

use crate::error::SamlResult;
use crate::xml::{self, Element, Namespaces, XmlDocument};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A parsed, read-only view of an inbound assertion. Construction can
/// fail (malformed XML); validation never does, see [`Assertion::valid`].
#[derive(Debug)]
pub struct Assertion {
    pub issuer: String,
    pub destination: String,
    pub attributes: HashMap<String, Vec<String>>,
    pub session: Option<String>,
    pub nameid: String,
    pub audience: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub in_response_to: Option<String>,
    pub response_status: String,
    /// Retained parsed XML so bindings can perform signature verification
    /// or other post-hoc inspection after `valid()` has run.
    pub xpath: XmlDocument,
}

impl Assertion {
    /// Parses `xml_bytes` into an [`Assertion`]. Comments are stripped
    /// first (§4.1) to defeat signature-wrapping attacks that rely on a
    /// comment splitting a signed text node.
    pub fn from_xml(xml_bytes: &[u8]) -> SamlResult<Self> {
        let doc = xml::strip_comments(xml_bytes)?;
        let assertion_el = locate_assertion(&doc);

        let issuer = assertion_el
            .child_ns(Namespaces::SAML, "Issuer")
            .map(|e| e.text_trimmed())
            .unwrap_or_default();

        let destination = if doc.root.local_name == "Response" {
            doc.root.attr("Destination").unwrap_or_default().to_string()
        } else {
            String::new()
        };

        let response_status = if doc.root.local_name == "Response" {
            doc.root
                .child_ns(Namespaces::SAMLP, "Status")
                .and_then(|status| status.child_ns(Namespaces::SAMLP, "StatusCode"))
                .and_then(|code| code.attr("Value"))
                .unwrap_or_default()
                .to_string()
        } else {
            String::new()
        };

        let session = assertion_el
            .first_descendant_local("AuthnStatement")
            .and_then(|el| el.attr("SessionIndex"))
            .map(str::to_string);

        let nameid = assertion_el
            .first_descendant_local("NameID")
            .map(|e| e.text_trimmed())
            .unwrap_or_default();

        let audience = assertion_el
            .first_descendant_local("Audience")
            .map(|e| e.text_trimmed())
            .unwrap_or_default();

        let in_response_to = assertion_el
            .first_descendant_local("SubjectConfirmationData")
            .and_then(|el| el.attr("InResponseTo"))
            .map(str::to_string);

        let conditions = assertion_el.first_descendant_local("Conditions");
        let now = Utc::now();
        let not_before = conditions
            .and_then(|c| c.attr("NotBefore"))
            .and_then(parse_xsd_datetime)
            .unwrap_or(now);
        let not_after = conditions
            .and_then(|c| c.attr("NotOnOrAfter"))
            .and_then(parse_xsd_datetime)
            .unwrap_or_else(|| now + chrono::Duration::seconds(1000));

        let attributes = parse_attributes(assertion_el);

        Ok(Assertion {
            issuer,
            destination,
            attributes,
            session,
            nameid,
            audience,
            not_before,
            not_after,
            in_response_to,
            response_status,
            xpath: doc,
        })
    }

    /// `true` iff the assertion is usable for the caller's purposes right
    /// now. Never returns an error: rejection reasons are logged at
    /// `debug` level rather than raised, since a rejected assertion is an
    /// expected outcome of normal operation, not a programming error.
    pub fn valid(&self, audience: &str, in_response_to: Option<&str>) -> bool {
        let now = Utc::now();
        self.valid_at(audience, in_response_to, now)
    }

    fn valid_at(&self, audience: &str, in_response_to: Option<&str>, now: DateTime<Utc>) -> bool {
        if audience.is_empty() || audience != self.audience {
            tracing::debug!(
                expected = %self.audience,
                got = %audience,
                "assertion rejected: audience mismatch"
            );
            return false;
        }
        if let Some(expected) = in_response_to {
            if self.in_response_to.as_deref() != Some(expected) {
                tracing::debug!(
                    expected,
                    got = ?self.in_response_to,
                    "assertion rejected: in_response_to mismatch"
                );
                return false;
            }
        }
        if now < self.not_before {
            tracing::debug!(not_before = %self.not_before, now = %now, "assertion rejected: not yet valid");
            return false;
        }
        if now >= self.not_after {
            tracing::debug!(not_after = %self.not_after, now = %now, "assertion rejected: expired");
            return false;
        }
        true
    }

    /// `attributes["CN"][0]`, if present.
    pub fn name(&self) -> &str {
        self.attributes
            .get("CN")
            .and_then(|values| values.first())
            .map(String::as_str)
            .unwrap_or("not present")
    }
}

/// The source's parser only reads a single `AuthnStatement`'s
/// `SessionIndex` (open question in §9). This picks the first one in
/// document order, which `first_descendant_local` already guarantees by
/// walking children depth-first in tree order.
fn locate_assertion(doc: &XmlDocument) -> &Element {
    if doc.root.local_name == "Response" {
        if let Some(assertion) = doc.root.first_descendant_local("Assertion") {
            return assertion;
        }
    }
    &doc.root
}

fn parse_attributes(assertion_el: &Element) -> HashMap<String, Vec<String>> {
    let mut attributes = HashMap::new();
    let mut statements = Vec::new();
    assertion_el.descendants_ns(Namespaces::SAML, "AttributeStatement", &mut statements);
    for statement in statements {
        for attribute in statement.children_ns(Namespaces::SAML, "Attribute") {
            let Some(name) = attribute.attr("Name") else {
                continue;
            };
            let mut values = Vec::new();
            attribute.descendants_local("AttributeValue", &mut values);
            let values = values.iter().map(|v| v.text_trimmed()).collect();
            attributes.insert(name.to_string(), values);
        }
    }
    attributes
}

fn parse_xsd_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
