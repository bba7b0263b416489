use super::*;

#[test]
fn parse_keeps_scheme_host_and_port() {
    let loc = PageLocation::parse("https://console.example.com:8443/ui/").unwrap();
    assert_eq!(loc.scheme, "https");
    assert_eq!(loc.hostname, "console.example.com");
    assert_eq!(loc.port, Some(8443));
}

#[test]
fn parse_drops_default_port() {
    let loc = PageLocation::parse("https://console.example.com:443/").unwrap();
    assert_eq!(loc.port, None);
    assert_eq!(loc.origin(), "https://console.example.com");
}

#[test]
fn parse_rejects_relative_and_hostless() {
    assert!(matches!(PageLocation::parse("/ui/"), Err(ApiError::InvalidLocation { .. })));
    assert!(matches!(PageLocation::parse("data:text/plain,hi"), Err(ApiError::InvalidLocation { .. })));
}

#[test]
fn bases_use_hostname_but_origin_keeps_port() {
    let loc = PageLocation::parse("http://localhost:8080/ui/").unwrap();
    let cfg = EndpointConfig::from_location(&loc);
    assert_eq!(cfg.resource_base, "http://localhost/core/v1");
    assert_eq!(cfg.auth_base, "http://localhost/auth/v1");
    assert_eq!(cfg.origin, "http://localhost:8080");
}

#[tokio::test]
async fn auth_base_is_written_at_most_once() {
    let loc = PageLocation::parse("https://hoss.local").unwrap();
    let endpoints = Endpoints::new(EndpointConfig::from_location(&loc));
    assert!(!endpoints.is_discovered().await);

    assert!(endpoints.set_auth_base("https://auth.example.com/v1".into()).await);
    assert!(!endpoints.set_auth_base("https://other.example.com".into()).await);

    let snap = endpoints.snapshot().await;
    assert_eq!(snap.auth_base, "https://auth.example.com/v1");
    assert_eq!(snap.resource_base, "https://hoss.local/core/v1");
    assert!(endpoints.is_discovered().await);
}

#[tokio::test]
async fn clones_share_state() {
    let loc = PageLocation::parse("https://hoss.local").unwrap();
    let a = Endpoints::new(EndpointConfig::from_location(&loc));
    let b = a.clone();
    a.set_auth_base("https://auth.example.com".into()).await;
    assert_eq!(b.snapshot().await.auth_base, "https://auth.example.com");
}
