//! Environment-driven convenience wiring, in the same spirit as the
//! teacher's `Config::from_env`: a plain struct populated with
//! `std::env::var` and `unwrap_or_else` defaults, no config-file
//! framework. Neither [`SpSettings`] nor [`IdpQuirks`] is required to use
//! the rest of the crate; `SpDescriptorBuilder`/`IdpDescriptor::from_xml`
//! remain first-class and are what the test suite uses directly.

use crate::error::SamlResult;
pub use crate::metadata::idp::IdpQuirks;
use crate::metadata::sp::{SpDescriptor, SpDescriptorBuilder};

/// Reads `SAML_SP_*` environment variables and builds an [`SpDescriptor`].
pub struct SpSettings;

impl SpSettings {
    pub fn from_env() -> SamlResult<SpDescriptor> {
        let var = |name: &str| std::env::var(name).ok();
        let bool_var = |name: &str| {
            std::env::var(name)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .ok()
        };

        SpDescriptorBuilder {
            id: var("SAML_SP_ENTITY_ID"),
            url: var("SAML_SP_URL"),
            cert_path: var("SAML_SP_CERT_PATH"),
            key_path: var("SAML_SP_KEY_PATH"),
            cacert_path: var("SAML_SP_CACERT_PATH"),
            slo_url_soap: var("SAML_SP_SLO_URL_SOAP"),
            slo_url_redirect: var("SAML_SP_SLO_URL_REDIRECT"),
            slo_url_post: var("SAML_SP_SLO_URL_POST"),
            acs_url_post: var("SAML_SP_ACS_URL_POST"),
            acs_url_artifact: var("SAML_SP_ACS_URL_ARTIFACT"),
            error_url: var("SAML_SP_ERROR_URL"),
            org_name: var("SAML_SP_ORG_NAME"),
            org_display_name: var("SAML_SP_ORG_DISPLAY_NAME"),
            org_contact: var("SAML_SP_ORG_CONTACT"),
            org_url: None,
            authnreq_signed: bool_var("SAML_SP_AUTHNREQ_SIGNED"),
            want_assertions_signed: bool_var("SAML_SP_WANT_ASSERTIONS_SIGNED"),
        }
        .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // `std::env` is process-global; serialize these tests so they don't
    // race each other's env var mutations.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn missing_required_vars_is_an_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        for key in [
            "SAML_SP_ENTITY_ID",
            "SAML_SP_URL",
            "SAML_SP_CERT_PATH",
            "SAML_SP_KEY_PATH",
        ] {
            std::env::remove_var(key);
        }
        assert!(SpSettings::from_env().is_err());
    }

    #[test]
    fn idp_quirks_from_env_defaults_to_false() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("TEST_IDP_SLS_FORCE_LCASE_URL_ENCODING");
        std::env::remove_var("TEST_IDP_SLS_DOUBLE_ENCODED_RESPONSE");
        let quirks = IdpQuirks::from_env("TEST_IDP");
        assert!(!quirks.sls_force_lcase_url_encoding);
        assert!(!quirks.sls_double_encoded_response);
    }

    #[test]
    fn idp_quirks_from_env_reads_true() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("TEST_IDP2_SLS_FORCE_LCASE_URL_ENCODING", "true");
        let quirks = IdpQuirks::from_env("TEST_IDP2");
        assert!(quirks.sls_force_lcase_url_encoding);
        std::env::remove_var("TEST_IDP2_SLS_FORCE_LCASE_URL_ENCODING");
    }
}
