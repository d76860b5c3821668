//! Minimal namespace-aware XML DOM used by the metadata and protocol
//! parsers.
//!
//! The crate deliberately does not depend on a full DOM/XPath engine.
//! `quick-xml` (already the corpus's choice for SAML-adjacent XML work,
//! see `accuscene-transfer`, `harborgrid-justin-caddy`, and
//! `armature-auth`'s `saml` feature) gives us a streaming event reader; we
//! fold its events into a small tree here and expose the handful of
//! namespace/local-name queries §4.1 actually needs, rather than pulling in
//! a general-purpose XPath implementation for a handful of fixed lookups.

mod xpath;

use crate::error::{SamlError, SamlResult};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

pub use xpath::Namespaces;

/// A parsed, comment-free XML document.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    pub root: Element,
}

/// One element in the parsed tree. Comment nodes are never materialized:
/// they are dropped while folding the event stream, which is what
/// `strip_comments` means in practice for a streaming parser: the comments
/// never make it into the tree further stages inspect.
#[derive(Debug, Clone)]
pub struct Element {
    pub local_name: String,
    /// Resolved namespace URI for this element, if any `xmlns`/`xmlns:prefix`
    /// declaration was in scope.
    pub namespace: Option<String>,
    /// Attribute local names (namespace prefix stripped) to their values.
    pub attrs: HashMap<String, String>,
    pub children: Vec<Element>,
    /// Concatenation of direct text nodes (not descendants').
    pub text: String,
}

impl Element {
    /// Attribute lookup by local name, ignoring any namespace prefix on the
    /// attribute itself (SAML metadata attributes such as `Binding`,
    /// `Location`, `use` are unprefixed in practice).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn text_trimmed(&self) -> String {
        self.text.trim().to_string()
    }

    /// Direct children matching a namespace URI + local name.
    pub fn children_ns<'a, 'b, 'c>(
        &'a self,
        ns: &'b str,
        local_name: &'c str,
    ) -> impl Iterator<Item = &'a Element> + use<'a, 'b, 'c> {
        self.children
            .iter()
            .filter(move |c| c.local_name == local_name && c.namespace.as_deref() == Some(ns))
    }

    /// First direct child matching a namespace URI + local name.
    pub fn child_ns(&self, ns: &str, local_name: &str) -> Option<&Element> {
        self.children_ns(ns, local_name).next()
    }

    /// Direct children matched purely by local name, ignoring namespace.
    pub fn children_local<'a, 'b>(&'a self, local_name: &'b str) -> impl Iterator<Item = &'a Element> + use<'a, 'b> {
        self.children.iter().filter(move |c| c.local_name == local_name)
    }

    /// All descendants (any depth) matching a namespace URI + local name,
    /// in document order.
    pub fn descendants_ns<'a>(&'a self, ns: &str, local_name: &str, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.local_name == local_name && child.namespace.as_deref() == Some(ns) {
                out.push(child);
            }
            child.descendants_ns(ns, local_name, out);
        }
    }

    /// Descendants matched purely by `local-name()`, ignoring namespace.
    /// Used where the spec explicitly calls for `local-name()` matching
    /// (`X509Certificate`, `AttributeValue`) because some XPath engines
    /// mis-handle namespace-qualified predicates there.
    pub fn descendants_local<'a>(&'a self, local_name: &str, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.local_name == local_name {
                out.push(child);
            }
            child.descendants_local(local_name, out);
        }
    }

    /// First descendant (any depth) matched by local name only.
    pub fn first_descendant_local(&self, local_name: &str) -> Option<&Element> {
        let mut out = Vec::new();
        self.descendants_local(local_name, &mut out);
        out.into_iter().next()
    }
}

/// Parses `xml` into a comment-free [`XmlDocument`].
///
/// This is `strip_comments` from §4.1: comments are simply never copied
/// into the tree, which has the same effect against signature-wrapping
/// attacks (a comment inserted to split a signed text node cannot
/// reassemble once the tree is built, because it was never there).
struct Frame {
    local_name: String,
    namespace: Option<String>,
    attrs: HashMap<String, String>,
    children: Vec<Element>,
    text: String,
    ns_scope: HashMap<String, String>,
}

fn build_frame(
    ns_scope_parent: &HashMap<String, String>,
    e: &quick_xml::events::BytesStart,
) -> SamlResult<Frame> {
    let mut ns_scope = ns_scope_parent.clone();
    let mut raw_attrs: Vec<(String, String)> = Vec::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map(|v| v.to_string())
            .unwrap_or_default();
        if key == "xmlns" {
            ns_scope.insert(String::new(), value);
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            ns_scope.insert(prefix.to_string(), value);
        } else {
            raw_attrs.push((key, value));
        }
    }

    let qname = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let (prefix, local_name) = split_qname(&qname);
    let namespace = ns_scope.get(prefix.unwrap_or("")).cloned();

    let mut attrs = HashMap::new();
    for (key, value) in raw_attrs {
        let (_, local) = split_qname(&key);
        attrs.insert(local.to_string(), value);
    }

    Ok(Frame {
        local_name: local_name.to_string(),
        namespace,
        attrs,
        children: Vec::new(),
        text: String::new(),
        ns_scope,
    })
}

pub fn strip_comments(xml_bytes: &[u8]) -> SamlResult<XmlDocument> {
    let mut reader = Reader::from_reader(xml_bytes);
    reader.trim_text(false);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            // Comments are matched but intentionally ignored: they never
            // enter the tree.
            Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Start(e) => {
                let empty = HashMap::new();
                let ns_scope_parent = stack.last().map(|f| &f.ns_scope).unwrap_or(&empty);
                let frame = build_frame(ns_scope_parent, &e)?;
                stack.push(frame);
            }
            Event::Empty(e) => {
                // `Event::Empty` (a self-closing tag) never gets a matching
                // `Event::End`, so close it immediately instead of pushing
                // it onto the open-element stack.
                let empty = HashMap::new();
                let ns_scope_parent = stack.last().map(|f| &f.ns_scope).unwrap_or(&empty);
                let frame = build_frame(ns_scope_parent, &e)?;
                let element = Element {
                    local_name: frame.local_name,
                    namespace: frame.namespace,
                    attrs: frame.attrs,
                    children: frame.children,
                    text: frame.text,
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::End(_) => {
                if let Some(frame) = stack.pop() {
                    let element = Element {
                        local_name: frame.local_name,
                        namespace: frame.namespace,
                        attrs: frame.attrs,
                        children: frame.children,
                        text: frame.text,
                    };
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(element);
                    } else {
                        root = Some(element);
                    }
                }
            }
            Event::Text(t) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&t.unescape().unwrap_or_default());
                }
            }
            Event::CData(t) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(t.as_ref()));
                }
            }
            _ => {}
        }
        buf.clear();
    }

    let root = root.ok_or_else(|| SamlError::MalformedXml("empty document".to_string()))?;
    Ok(XmlDocument { root })
}

fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_at_every_depth() {
        let xml = br#"<a><!-- top --><b><!-- nested -->text<!-- trailing --></b></a>"#;
        let doc = strip_comments(xml).unwrap();
        assert_eq!(doc.root.local_name, "a");
        assert_eq!(doc.root.children.len(), 1);
        let b = &doc.root.children[0];
        assert_eq!(b.local_name, "b");
        assert_eq!(b.text_trimmed(), "text");
    }

    #[test]
    fn resolves_declared_namespaces() {
        let xml = br#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="https://idp.example/">
            <md:IDPSSODescriptor/>
        </md:EntityDescriptor>"#;
        let doc = strip_comments(xml).unwrap();
        assert_eq!(
            doc.root.namespace.as_deref(),
            Some("urn:oasis:names:tc:SAML:2.0:metadata")
        );
        assert_eq!(doc.root.attr("entityID"), Some("https://idp.example/"));
        let idp = doc
            .root
            .child_ns("urn:oasis:names:tc:SAML:2.0:metadata", "IDPSSODescriptor");
        assert!(idp.is_some());
    }

    #[test]
    fn local_name_lookup_ignores_namespace_and_prefix() {
        let xml = br#"<saml:Attribute xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" Name="CN">
            <saml:AttributeValue>Alice</saml:AttributeValue>
        </saml:Attribute>"#;
        let doc = strip_comments(xml).unwrap();
        let value = doc.root.first_descendant_local("AttributeValue").unwrap();
        assert_eq!(value.text_trimmed(), "Alice");
    }
}
