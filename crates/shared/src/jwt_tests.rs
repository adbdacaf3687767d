//! Unit tests for session tokens.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::Claims;
use crate::config::JwtConfig;
use crate::jwt::{JwtError, JwtService};

fn create_test_service() -> JwtService {
    JwtService::new(JwtConfig {
        secret: "test-secret-key-for-testing".to_string(),
        token_expiry_secs: 3600,
    })
}

#[test]
fn test_claims_new_sets_correct_fields() {
    let user_id = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::hours(1);

    let claims = Claims::new(user_id, "admin@hospital.com", "admin", "hospital-1", expires_at);

    assert_eq!(claims.user_id(), user_id);
    assert_eq!(claims.email, "admin@hospital.com");
    assert_eq!(claims.role, "admin");
    assert_eq!(claims.hospital_id(), "hospital-1");
    assert!(claims.iat <= Utc::now().timestamp());
    assert_eq!(claims.exp, expires_at.timestamp());
    assert_eq!(claims.iss, "hospifin");
}

#[test]
fn test_generate_and_validate_round_trip() {
    let service = create_test_service();
    let user_id = Uuid::new_v4();

    let token = service
        .generate_session_token(user_id, "finance@hospital.com", "finance", "hospital-1")
        .unwrap();
    let claims = service.validate_token(&token).unwrap();

    assert_eq!(claims.user_id(), user_id);
    assert_eq!(claims.role, "finance");
    assert_eq!(claims.hospital_id(), "hospital-1");
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[test]
fn test_invalid_token() {
    let service = create_test_service();
    assert!(service.validate_token("invalid.token.here").is_err());
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let other = JwtService::new(JwtConfig {
        secret: "another-secret".to_string(),
        token_expiry_secs: 3600,
    });
    let token = other
        .generate_session_token(Uuid::new_v4(), "a@b.c", "viewer", "hospital-1")
        .unwrap();

    let result = create_test_service().validate_token(&token);
    assert!(matches!(result, Err(JwtError::Invalid)));
}

#[test]
fn test_expired_token_is_rejected() {
    let service = JwtService::new(JwtConfig {
        secret: "test-secret-key-for-testing".to_string(),
        token_expiry_secs: -3600,
    });
    let token = service
        .generate_session_token(Uuid::new_v4(), "a@b.c", "viewer", "hospital-1")
        .unwrap();

    assert!(matches!(service.validate_token(&token), Err(JwtError::Expired)));
}

#[test]
fn test_debug_hides_secret() {
    let rendered = format!("{:?}", create_test_service());
    assert!(!rendered.contains("test-secret-key-for-testing"));
    assert!(rendered.contains("[hidden]"));
}

#[test]
fn test_token_from_other_issuer_is_rejected() {
    let service = create_test_service();
    let mut claims = Claims::new(
        Uuid::new_v4(),
        "a@b.c",
        "viewer",
        "hospital-1",
        Utc::now() + Duration::hours(1),
    );
    claims.iss = "someone-else".to_string();
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"test-secret-key-for-testing"),
    )
    .unwrap();

    assert!(matches!(service.validate_token(&token), Err(JwtError::Invalid)));
}

#[test]
fn test_expires_in_reports_configured_lifetime() {
    assert_eq!(create_test_service().token_expires_in(), 3600);
}
