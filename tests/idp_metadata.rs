use saml_sp::metadata::idp::IdpQuirks;
use saml_sp::IdpDescriptor;

const METADATA: &str = r#"<?xml version="1.0"?>
<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="https://idp.example/">
    <md:IDPSSODescriptor protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol">
        <md:KeyDescriptor use="signing">
            <ds:KeyInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#">
                <ds:X509Data><ds:X509Certificate>TUlJQkZ6Q0J3UUlDQVFBd0RRWUpLb1pJaHZjTkFRRUw=</ds:X509Certificate></ds:X509Data>
            </ds:KeyInfo>
        </md:KeyDescriptor>
        <md:NameIDFormat>urn:oasis:names:tc:SAML:2.0:nameid-format:transient</md:NameIDFormat>
        <md:SingleSignOnService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect" Location="https://idp.example/sso"/>
    </md:IDPSSODescriptor>
</md:EntityDescriptor>"#;

#[test]
fn metadata_parse_end_to_end() {
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

    let cert = idp.cert("signing").expect("signing cert present");
    assert!(cert.pem.starts_with("-----BEGIN CERTIFICATE-----\n"));
    assert!(cert.pem.trim_end().ends_with("-----END CERTIFICATE-----"));
    let body_line = cert.pem.lines().nth(1).unwrap();
    assert!(body_line.len() <= 64);
}

#[test]
fn missing_nameid_format_falls_back_to_unspecified() {
    let xml = r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="https://idp.example/">
        <md:IDPSSODescriptor>
            <md:SingleSignOnService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect" Location="https://idp.example/sso"/>
        </md:IDPSSODescriptor>
    </md:EntityDescriptor>"#;
    let idp = IdpDescriptor::from_xml(xml.as_bytes(), None, IdpQuirks::default(), None).unwrap();
    assert_eq!(
        idp.format(None),
        Some("urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified")
    );
}

#[test]
fn missing_idp_sso_descriptor_is_a_parse_error() {
    let xml = r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="https://idp.example/"/>"#;
    let result = IdpDescriptor::from_xml(xml.as_bytes(), None, IdpQuirks::default(), None);
    assert!(result.is_err());
}
