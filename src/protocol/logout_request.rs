use super::{format_instant, xml_escape, Envelope, ProtocolMessage};

/// Outbound `samlp:LogoutRequest`, built for a specific subject and,
/// optionally, a specific SSO session.
#[derive(Debug, Clone)]
pub struct LogoutRequest {
    pub envelope: Envelope,
    pub nameid: String,
    pub nameid_format: String,
    pub session_index: Option<String>,
}

impl LogoutRequest {
    pub fn new(
        issuer: &str,
        destination: &str,
        nameid: &str,
        nameid_format: &str,
        session_index: Option<String>,
    ) -> Self {
        Self {
            envelope: Envelope::new(issuer, destination),
            nameid: nameid.to_string(),
            nameid_format: nameid_format.to_string(),
            session_index,
        }
    }
}

impl ProtocolMessage for LogoutRequest {
    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn to_xml(&self) -> String {
        let session_index = self
            .session_index
            .as_deref()
            .map(|s| format!("<samlp:SessionIndex>{}</samlp:SessionIndex>", xml_escape(s)))
            .unwrap_or_default();
        format!(
            r#"<samlp:LogoutRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="{id}" Version="2.0" IssueInstant="{issue_instant}" Destination="{destination}"><saml:Issuer>{issuer}</saml:Issuer><saml:NameID Format="{nameid_format}">{nameid}</saml:NameID>{session_index}</samlp:LogoutRequest>"#,
            id = self.envelope.id,
            issue_instant = format_instant(&self.envelope.issue_instant),
            destination = xml_escape(&self.envelope.destination),
            issuer = xml_escape(&self.envelope.issuer),
            nameid_format = self.nameid_format,
            nameid = xml_escape(&self.nameid),
            session_index = session_index,
        )
    }
}
