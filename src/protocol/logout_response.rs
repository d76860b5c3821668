use super::{format_instant, xml_escape, Envelope, ProtocolMessage};

/// Outbound `samlp:LogoutResponse`, answering the IdP's (or another
/// SP's, in IdP-initiated SLO) `LogoutRequest`.
#[derive(Debug, Clone)]
pub struct LogoutResponse {
    pub envelope: Envelope,
    pub status: String,
    pub in_response_to: String,
}

impl LogoutResponse {
    pub fn new(issuer: &str, destination: &str, status: &str, in_response_to: &str) -> Self {
        Self {
            envelope: Envelope::new(issuer, destination),
            status: status.to_string(),
            in_response_to: in_response_to.to_string(),
        }
    }

    /// `true` when `status` is the SAML success status URI.
    pub fn is_success(&self) -> bool {
        self.status == "urn:oasis:names:tc:SAML:2.0:status:Success"
    }
}

impl ProtocolMessage for LogoutResponse {
    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn to_xml(&self) -> String {
        format!(
            r#"<samlp:LogoutResponse xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="{id}" Version="2.0" IssueInstant="{issue_instant}" Destination="{destination}" InResponseTo="{in_response_to}"><saml:Issuer>{issuer}</saml:Issuer><samlp:Status><samlp:StatusCode Value="{status}"/></samlp:Status></samlp:LogoutResponse>"#,
            id = self.envelope.id,
            issue_instant = format_instant(&self.envelope.issue_instant),
            destination = xml_escape(&self.envelope.destination),
            in_response_to = xml_escape(&self.in_response_to),
            issuer = xml_escape(&self.envelope.issuer),
            status = self.status,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_success_matches_saml_success_uri_only() {
        let resp = LogoutResponse::new(
            "https://sp.example/",
            "https://idp.example/slo",
            "urn:oasis:names:tc:SAML:2.0:status:Success",
            "req-1",
        );
        assert!(resp.is_success());

        let resp = LogoutResponse::new(
            "https://sp.example/",
            "https://idp.example/slo",
            "urn:oasis:names:tc:SAML:2.0:status:Requester",
            "req-1",
        );
        assert!(!resp.is_success());
    }

    #[test]
    fn carries_in_response_to() {
        let resp = LogoutResponse::new(
            "https://sp.example/",
            "https://idp.example/slo",
            "urn:oasis:names:tc:SAML:2.0:status:Success",
            "req-42",
        );
        assert!(resp.to_xml().contains(r#"InResponseTo="req-42""#));
    }
}
