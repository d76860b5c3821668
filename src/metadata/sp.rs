//! SP identity/endpoint configuration, SP metadata emission, and the
//! factory methods that build outbound messages and binding parameter
//! bundles.

use crate::binding::{PostBindingParams, RedirectBindingParams, SoapBindingParams};
use crate::cert::Certificate;
use crate::error::{SamlError, SamlResult};
use crate::metadata::idp::IdpDescriptor;
use crate::protocol::{ArtifactResolve, AuthnRequest, LogoutRequest, LogoutResponse};

/// SP identity and endpoint configuration. Constructed once, then treated
/// as read-only, the same lifecycle as [`IdpDescriptor`].
#[derive(Debug, Clone)]
pub struct SpDescriptor {
    pub id: String,
    pub url: String,
    pub cert: Certificate,
    pub key: Vec<u8>,
    pub cacert: Option<Certificate>,
    pub slo_url_soap: String,
    pub slo_url_redirect: String,
    pub slo_url_post: String,
    pub acs_url_post: String,
    pub acs_url_artifact: String,
    pub error_url: String,
    pub org_name: String,
    pub org_display_name: String,
    pub org_contact: String,
    pub org_url: Option<String>,
    pub authnreq_signed: bool,
    pub want_assertions_signed: bool,
}

impl SpDescriptor {
    /// Base64 body of `cert` with PEM armor stripped, used verbatim in
    /// emitted metadata.
    pub fn cert_text(&self) -> String {
        self.cert.strip_armor()
    }

    fn org_url(&self) -> &str {
        self.org_url.as_deref().unwrap_or(&self.url)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }

    /// Emits the SP's `EntityDescriptor` XML. Element and attribute order
    /// matches §4.4 exactly; IdPs are known to observe it.
    pub fn metadata(&self) -> Vec<u8> {
        let authnreq_signed = if self.authnreq_signed { "1" } else { "0" };
        let want_assertions_signed = if self.want_assertions_signed { "1" } else { "0" };

        let xml = format!(
            r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" xmlns:ds="http://www.w3.org/2000/09/xmldsig#" entityID="{entity_id}">
<md:SPSSODescriptor AuthnRequestsSigned="{authnreq_signed}" WantAssertionsSigned="{want_assertions_signed}" errorURL="{error_url}" protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol">
<md:KeyDescriptor use="signing"><ds:KeyInfo><ds:X509Data><ds:X509Certificate>{cert}</ds:X509Certificate></ds:X509Data></ds:KeyInfo></md:KeyDescriptor>
<md:SingleLogoutService Binding="urn:oasis:names:tc:SAML:2.0:bindings:SOAP" Location="{slo_soap}"/>
<md:SingleLogoutService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect" Location="{slo_redirect}"/>
<md:SingleLogoutService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" Location="{slo_post}"/>
<md:AssertionConsumerService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" Location="{acs_post}" index="1" isDefault="true"/>
<md:AssertionConsumerService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact" Location="{acs_artifact}" index="2" isDefault="false"/>
<md:Organization>
<md:OrganizationName xml:lang="en">{org_name}</md:OrganizationName>
<md:OrganizationDisplayName xml:lang="en">{org_display_name}</md:OrganizationDisplayName>
<md:OrganizationURL xml:lang="en">{org_url}</md:OrganizationURL>
</md:Organization>
<md:ContactPerson contactType="other">
<md:Company>{org_display_name}</md:Company>
<md:EmailAddress>{org_contact}</md:EmailAddress>
</md:ContactPerson>
</md:SPSSODescriptor>
</md:EntityDescriptor>"#,
            entity_id = self.id,
            authnreq_signed = authnreq_signed,
            want_assertions_signed = want_assertions_signed,
            error_url = self.endpoint(&self.error_url),
            cert = self.cert_text(),
            slo_soap = self.endpoint(&self.slo_url_soap),
            slo_redirect = self.endpoint(&self.slo_url_redirect),
            slo_post = self.endpoint(&self.slo_url_post),
            acs_post = self.endpoint(&self.acs_url_post),
            acs_artifact = self.endpoint(&self.acs_url_artifact),
            org_name = self.org_name,
            org_display_name = self.org_display_name,
            org_url = self.org_url(),
            org_contact = self.org_contact,
        );
        xml.into_bytes()
    }

    pub fn authn_request(&self, destination: &str, nameid_format: &str) -> AuthnRequest {
        AuthnRequest::new(&self.id, destination, &self.endpoint(&self.acs_url_post), nameid_format)
    }

    pub fn logout_request(
        &self,
        destination: &str,
        nameid: &str,
        nameid_format: &str,
        session: Option<String>,
    ) -> LogoutRequest {
        LogoutRequest::new(&self.id, destination, nameid, nameid_format, session)
    }

    pub fn logout_response(&self, destination: &str, status: &str, response_to: &str) -> LogoutResponse {
        LogoutResponse::new(&self.id, destination, status, response_to)
    }

    pub fn artifact_request(&self, destination: &str, artifact: &str) -> ArtifactResolve {
        ArtifactResolve::new(&self.id, destination, artifact)
    }

    pub fn sso_redirect_binding(&self, idp: &IdpDescriptor) -> RedirectBindingParams {
        RedirectBindingParams {
            idp_cert: idp.cert("signing").cloned(),
            query_param: "SAMLRequest",
            force_lcase_url_encoding: idp.quirks.sls_force_lcase_url_encoding,
            double_encoded_response: idp.quirks.sls_double_encoded_response,
        }
    }

    pub fn slo_redirect_binding(&self, idp: &IdpDescriptor) -> RedirectBindingParams {
        RedirectBindingParams {
            idp_cert: idp.cert("signing").cloned(),
            query_param: "SAMLResponse",
            force_lcase_url_encoding: idp.quirks.sls_force_lcase_url_encoding,
            double_encoded_response: idp.quirks.sls_double_encoded_response,
        }
    }

    pub fn soap_binding(&self, user_agent: &str, idp_url: &str, idp_cert: Option<Certificate>) -> SoapBindingParams {
        SoapBindingParams {
            user_agent: user_agent.to_string(),
            idp_url: idp_url.to_string(),
            idp_cert,
        }
    }

    pub fn post_binding(&self) -> PostBindingParams {
        PostBindingParams
    }
}

/// Builder mirroring §4.4's construction rules: loads the signing
/// certificate from disk, requires the non-optional fields, and defaults
/// `authnreq_signed`/`want_assertions_signed` to `true`.
#[derive(Debug, Clone, Default)]
pub struct SpDescriptorBuilder {
    pub id: Option<String>,
    pub url: Option<String>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
    pub cacert_path: Option<String>,
    pub slo_url_soap: Option<String>,
    pub slo_url_redirect: Option<String>,
    pub slo_url_post: Option<String>,
    pub acs_url_post: Option<String>,
    pub acs_url_artifact: Option<String>,
    pub error_url: Option<String>,
    pub org_name: Option<String>,
    pub org_display_name: Option<String>,
    pub org_contact: Option<String>,
    pub org_url: Option<String>,
    pub authnreq_signed: Option<bool>,
    pub want_assertions_signed: Option<bool>,
}

impl SpDescriptorBuilder {
    pub fn build(self) -> SamlResult<SpDescriptor> {
        let required = |value: Option<String>, field: &'static str| value.ok_or(SamlError::MissingRequiredField(field));

        let cert_path = required(self.cert_path, "cert_path")?;
        let key_path = required(self.key_path, "key_path")?;
        let cert = Certificate::load_pem(&cert_path)?;
        let key = std::fs::read(&key_path).map_err(|e| SamlError::InvalidCertificate {
            reason: format!("reading key {cert_path}: {e}"),
        })?;
        let cacert = self
            .cacert_path
            .map(Certificate::load_pem)
            .transpose()?;

        Ok(SpDescriptor {
            id: required(self.id, "id")?,
            url: required(self.url, "url")?,
            cert,
            key,
            cacert,
            slo_url_soap: self.slo_url_soap.unwrap_or_default(),
            slo_url_redirect: self.slo_url_redirect.unwrap_or_default(),
            slo_url_post: self.slo_url_post.unwrap_or_default(),
            acs_url_post: required(self.acs_url_post, "acs_url_post")?,
            acs_url_artifact: self.acs_url_artifact.unwrap_or_default(),
            error_url: self.error_url.unwrap_or_default(),
            org_name: required(self.org_name, "org_name")?,
            org_display_name: required(self.org_display_name, "org_display_name")?,
            org_contact: required(self.org_contact, "org_contact")?,
            org_url: self.org_url,
            authnreq_signed: self.authnreq_signed.unwrap_or(true),
            want_assertions_signed: self.want_assertions_signed.unwrap_or(true),
        })
    }
}
