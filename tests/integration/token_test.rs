//! Integration tests for signed, expiring tokens.

use std::sync::Arc;

use chrono::Duration;

use warden::config::TokenConfig;
use warden::traits::{Clock, ManualClock};
use warden::{TokenCodec, TokenManager};

fn manager_at(seconds: i64) -> (TokenManager, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::at(seconds));
    let manager = TokenManager::with_clock("integration-secret", clock.clone())
        .expect("Failed to build token manager");
    (manager, clock)
}

#[test]
fn test_password_reset_flow() {
    let (manager, clock) = manager_at(1_700_000_000);
    let token = manager.generate_token(b"reset:alice@example.com");

    clock.advance(Duration::minutes(30));
    let (expired, payload) = manager.verify_token(&token, Duration::hours(1)).into_parts();
    assert!(!expired);
    assert_eq!(payload.as_deref(), Some(&b"reset:alice@example.com"[..]));

    clock.advance(Duration::hours(1));
    assert_eq!(
        manager.verify_token(&token, Duration::hours(1)).into_parts(),
        (true, None)
    );
}

#[test]
fn test_window_at_least_age_is_valid() {
    for window in [10, 11, 3600] {
        let (manager, clock) = manager_at(0);
        let token = manager.generate_token(b"p");
        clock.advance(Duration::seconds(10));
        assert!(
            manager.verify_token(&token, Duration::seconds(window)).is_valid(),
            "window {window}"
        );
    }
}

#[test]
fn test_binary_payload_survives() {
    let (manager, _) = manager_at(42);
    let payload: Vec<u8> = (0..=255).collect();
    let token = manager.generate_token(&payload);
    assert_eq!(
        manager.verify_token(&token, Duration::seconds(0)).payload,
        Some(payload)
    );
}

#[test]
fn test_byte_and_text_secrets_interoperate() {
    let clock = Arc::new(ManualClock::at(100));
    let text = TokenManager::with_clock("shared", clock.clone()).unwrap();
    let bytes = TokenManager::with_clock(b"shared".to_vec(), clock.clone()).unwrap();

    let token = text.generate_token(b"hello");
    assert!(bytes.verify_token(&token, Duration::seconds(1)).is_valid());
}

#[test]
fn test_timestamp_comes_from_clock() {
    let clock = Arc::new(ManualClock::at(1_234_567));
    let manager = TokenManager::with_clock("k", clock.clone()).unwrap();
    let codec = TokenCodec::new("k").unwrap();

    let token = manager.generate_token(b"x");
    let (issued_at, _) = codec.decode(&token).unwrap();
    assert_eq!(issued_at, clock.now().timestamp());
}

#[test]
fn test_config_built_manager_verifies_its_own_tokens() {
    let config = TokenConfig {
        secret_key: "from-config".to_string(),
        salt: "confirm-email".to_string(),
    };
    let manager = TokenManager::from_config(&config).unwrap();
    let token = manager.generate_token(b"bob");
    assert!(manager.verify_token(&token, Duration::minutes(1)).is_valid());

    let codec = TokenCodec::with_salt("from-config", "confirm-email").unwrap();
    assert_eq!(codec.decode(&token).unwrap().1, b"bob".to_vec());
}

#[test]
fn test_truncated_and_extended_tokens_are_invalid() {
    let (manager, _) = manager_at(0);
    let token = manager.generate_token(b"payload");
    let extended = format!("{token}A");
    let dotted = format!("{token}.A");
    let candidates: [&str; 4] = [&token[..token.len() - 1], &extended, &dotted, ""];
    for candidate in candidates {
        assert_eq!(
            manager.verify_token(candidate, Duration::days(1)).into_parts(),
            (false, None),
            "{candidate}"
        );
    }
}
