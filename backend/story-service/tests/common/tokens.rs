//! Bearer tokens for HTTP tests

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use story_service::middleware::{Claims, JwtValidator};
use uuid::Uuid;

pub const TEST_SECRET: &str = "story-service-test-secret";

pub fn validator() -> JwtValidator {
    JwtValidator::hs256(TEST_SECRET.as_bytes(), None)
}

pub fn bearer(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        iss: None,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("failed to sign test token");
    format!("Bearer {}", token)
}
