use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;
use toptranslation_api::{bind_identifier, ClientError, Config, Endpoint, ENDPOINTS};

fn settings_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"[staging]
api_domain = api.stage.example.com
api_version = 2
document_domain = files.stage.example.com
access_token = stage-token
timeout = 10

[production]
api_domain = api.example.com
api_version = 1
document_domain = files.example.com
"#
    )
    .unwrap();
    file
}

#[test]
fn profile_values_are_loaded_from_the_file() {
    let file = settings_file();
    let config = Config::builder("staging").file(file.path()).build().unwrap();

    assert_eq!(config.api_url(), "https://api.stage.example.com");
    assert_eq!(config.api_version(), "v2");
    assert_eq!(config.document_url(), "https://files.stage.example.com");
    assert_eq!(config.access_token(), Some("stage-token"));
    assert_eq!(config.timeout(), Duration::from_secs(10));
}

#[test]
fn profiles_in_one_file_are_independent() {
    let file = settings_file();
    let config = Config::builder("production")
        .file(file.path())
        .build()
        .unwrap();

    assert_eq!(config.api_url(), "https://api.example.com");
    assert!(config.access_token().is_none());
    // unset in the profile, so the built-in default applies
    assert_eq!(config.timeout(), Duration::from_secs(45));
}

#[test]
fn explicit_overrides_beat_the_file() {
    let file = settings_file();
    let config = Config::builder("staging")
        .file(file.path())
        .api_domain("api.other.example.com")
        .access_token("override-token")
        .build()
        .unwrap();

    assert_eq!(config.api_url(), "https://api.other.example.com");
    assert_eq!(config.access_token(), Some("override-token"));
    // untouched settings still come from the profile
    assert_eq!(config.api_version(), "v2");
}

#[test]
fn unknown_profile_is_rejected() {
    let file = settings_file();
    let result = Config::builder("nonexistent").file(file.path()).build();
    assert!(matches!(
        result,
        Err(ClientError::MissingProfile { site }) if site == "nonexistent"
    ));
}

#[test]
fn missing_explicit_file_is_rejected() {
    let result = Config::builder("staging")
        .file("/nonexistent/toptranslation.ini")
        .build();
    assert!(matches!(result, Err(ClientError::ConfigFileNotFound { .. })));
}

#[test]
fn every_endpoint_resolves_to_a_well_formed_url() {
    let file = settings_file();
    for site in ["staging", "production"] {
        let config = Config::builder(site).file(file.path()).build().unwrap();
        for endpoint in ENDPOINTS {
            let url = bind_identifier(&config.url(endpoint), "abc123");
            assert!(
                url.starts_with(&format!("{}/{}/", config.api_url(), config.api_version())),
                "{endpoint} must resolve under the versioned base, got {url}"
            );
            assert!(
                !url.contains('{') && !url.contains('}'),
                "{endpoint} left an unbound placeholder in {url}"
            );
        }
    }
}

#[test]
fn document_store_endpoints_resolve_without_a_version_segment() {
    let file = settings_file();
    let config = Config::builder("staging").file(file.path()).build().unwrap();

    assert_eq!(
        config.document_store_url(Endpoint::UploadDocument),
        "https://files.stage.example.com/documents"
    );
}
