use super::*;
use crate::error::DiscoveryError;
use crate::testing::{DISCOVER_URL, MockReply, MockTransport, RESOURCE_BASE};

fn resolver(mock: &Arc<MockTransport>) -> WellKnownResolver {
    WellKnownResolver::new(RESOURCE_BASE, "https://hoss.local", mock.clone())
}

#[tokio::test]
async fn fetches_from_discovered_host_without_authorization() {
    let mock = MockTransport::new();
    mock.on_discover("https://idp.example.com");
    mock.on("https://idp.example.com/jwks", MockReply::Json(200, serde_json::json!({ "keys": [] })));

    let resp = resolver(&mock).get_well_known("jwks").await.unwrap();
    assert!(resp.is_success());

    let sent = mock.requests();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].url, DISCOVER_URL);
    assert_eq!(sent[1].url, "https://idp.example.com/jwks");
    assert_eq!(sent[1].method, Method::Get);
    assert!(sent[1].body.is_none());
    assert!(!sent[1].headers.contains_key("authorization"));
    assert_eq!(sent[1].headers["origin"], "https://hoss.local");
}

#[tokio::test]
async fn every_call_rediscovers() {
    let mock = MockTransport::new();
    mock.on_discover("https://idp-a.example.com");
    mock.on_discover("https://idp-b.example.com");

    let resolver = resolver(&mock);
    let first = resolver.get_well_known("jwks").await.unwrap();
    let second = resolver.get_well_known("jwks").await.unwrap();

    assert_eq!(first.url, "https://idp-a.example.com/jwks");
    assert_eq!(second.url, "https://idp-b.example.com/jwks");
    assert_eq!(mock.requests_to(DISCOVER_URL).len(), 2);
}

#[tokio::test]
async fn discovery_failure_rejects_without_metadata_call() {
    let mock = MockTransport::new();
    mock.on(DISCOVER_URL, MockReply::Fail);

    let err = resolver(&mock).get_well_known("jwks").await.unwrap_err();
    assert!(matches!(err, ApiError::Discovery(DiscoveryError::Transport(_))));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn non_success_metadata_is_returned() {
    let mock = MockTransport::new();
    mock.on_discover("https://idp.example.com");
    mock.on("https://idp.example.com/jwks", MockReply::Raw(500, "boom".into()));

    let resp = resolver(&mock).get_well_known("jwks").await.unwrap();
    assert_eq!(resp.status.as_u16(), 500);
    assert_eq!(resp.text(), "boom");
}

#[tokio::test]
async fn openid_configuration_is_parsed() {
    let mock = MockTransport::new();
    mock.on_discover("https://hoss.local/auth/v1");
    mock.on(
        "https://hoss.local/auth/v1/.well-known/openid-configuration",
        MockReply::Json(
            200,
            serde_json::json!({
                "issuer": "https://hoss.local/auth/v1",
                "authorization_endpoint": "https://hoss.local/auth/v1/auth",
                "jwks_uri": "https://hoss.local/auth/v1/keys",
                "scopes_supported": ["openid", "email", "profile", "groups"],
                "response_types_supported": ["id_token"],
                "claims_supported": ["sub", "email"],
            }),
        ),
    );

    let cfg = resolver(&mock).fetch_openid_configuration().await.unwrap();
    assert_eq!(cfg.issuer, "https://hoss.local/auth/v1");
    assert_eq!(cfg.jwks_uri.as_deref(), Some("https://hoss.local/auth/v1/keys"));
    assert_eq!(cfg.scope(), "openid email profile groups");
    assert_eq!(cfg.response_types_supported, vec!["id_token"]);
    assert_eq!(cfg.extra["claims_supported"], serde_json::json!(["sub", "email"]));
    assert!(cfg.token_endpoint.is_none());
}

#[tokio::test]
async fn openid_configuration_non_success_is_status_error() {
    let mock = MockTransport::new();
    mock.on_discover("https://idp.example.com");

    let err = resolver(&mock).fetch_openid_configuration().await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, .. }));
}
