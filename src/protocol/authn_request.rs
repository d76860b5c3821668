use super::{format_instant, xml_escape, Envelope, ProtocolMessage};

/// Outbound `samlp:AuthnRequest`.
#[derive(Debug, Clone)]
pub struct AuthnRequest {
    pub envelope: Envelope,
    pub acs_url: String,
    pub protocol_binding: String,
    pub nameid_format: String,
}

impl AuthnRequest {
    pub fn new(issuer: &str, destination: &str, acs_url: &str, nameid_format: &str) -> Self {
        Self {
            envelope: Envelope::new(issuer, destination),
            acs_url: acs_url.to_string(),
            protocol_binding: "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST".to_string(),
            nameid_format: nameid_format.to_string(),
        }
    }
}

impl ProtocolMessage for AuthnRequest {
    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn to_xml(&self) -> String {
        format!(
            r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="{id}" Version="2.0" IssueInstant="{issue_instant}" Destination="{destination}" AssertionConsumerServiceURL="{acs_url}" ProtocolBinding="{binding}"><saml:Issuer>{issuer}</saml:Issuer><samlp:NameIDPolicy Format="{nameid_format}" AllowCreate="true"/></samlp:AuthnRequest>"#,
            id = self.envelope.id,
            issue_instant = format_instant(&self.envelope.issue_instant),
            destination = xml_escape(&self.envelope.destination),
            acs_url = xml_escape(&self.acs_url),
            binding = self.protocol_binding,
            issuer = xml_escape(&self.envelope.issuer),
            nameid_format = self.nameid_format,
        )
    }
}
