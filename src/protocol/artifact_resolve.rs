use super::{format_instant, xml_escape, Envelope, ProtocolMessage};

/// Outbound `samlp:ArtifactResolve`, sent over the SOAP binding to trade a
/// HTTP-Artifact binding's opaque artifact for the real message.
#[derive(Debug, Clone)]
pub struct ArtifactResolve {
    pub envelope: Envelope,
    pub artifact: String,
}

impl ArtifactResolve {
    pub fn new(issuer: &str, destination: &str, artifact: &str) -> Self {
        Self {
            envelope: Envelope::new(issuer, destination),
            artifact: artifact.to_string(),
        }
    }
}

impl ProtocolMessage for ArtifactResolve {
    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn to_xml(&self) -> String {
        format!(
            r#"<samlp:ArtifactResolve xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="{id}" Version="2.0" IssueInstant="{issue_instant}" Destination="{destination}"><saml:Issuer>{issuer}</saml:Issuer><samlp:Artifact>{artifact}</samlp:Artifact></samlp:ArtifactResolve>"#,
            id = self.envelope.id,
            issue_instant = format_instant(&self.envelope.issue_instant),
            destination = xml_escape(&self.envelope.destination),
            issuer = xml_escape(&self.envelope.issuer),
            artifact = xml_escape(&self.artifact),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_the_artifact_verbatim() {
        let req = ArtifactResolve::new(
            "https://sp.example/",
            "https://idp.example/artifact",
            "AAQAAM...",
        );
        assert!(req
            .to_xml()
            .contains("<samlp:Artifact>AAQAAM...</samlp:Artifact>"));
    }
}
