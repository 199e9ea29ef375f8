//! HS256 access/refresh tokens.
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::domain::{AuthUser, Claims, TokenKind};
use super::errors::AuthError;

pub fn issue(secret: &str, user: &AuthUser, kind: TokenKind, ttl: Duration) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        token_type: kind,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        jti: Uuid::new_v4().simple().to_string(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Signature and expiry check. Any failure is `InvalidToken`.
pub fn decode_claims(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
}

/// Decode and require a given token type; returns the subject id.
pub fn expect_kind(secret: &str, token: &str, kind: TokenKind) -> Result<(Uuid, Claims), AuthError> {
    let claims = decode_claims(secret, token)?;
    if claims.token_type != kind {
        return Err(AuthError::InvalidToken);
    }
    let id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
    Ok((id, claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::user::Role;

    fn user() -> AuthUser { AuthUser { id: Uuid::new_v4(), username: "ana".into(), role: Role::Citizen } }

    #[test]
    fn issued_token_carries_claims() {
        let u = user();
        let t = issue("k", &u, TokenKind::Refresh, Duration::hours(24)).unwrap();
        let c = decode_claims("k", &t).unwrap();
        assert_eq!(c.sub, u.id.to_string());
        assert_eq!(c.username, "ana");
        assert_eq!(c.token_type, TokenKind::Refresh);
        assert_eq!(c.exp - c.iat, 24 * 3600);
    }

    #[test]
    fn wrong_secret_or_kind_is_invalid() {
        let u = user();
        let t = issue("k", &u, TokenKind::Access, Duration::hours(1)).unwrap();
        assert!(matches!(decode_claims("other", &t), Err(AuthError::InvalidToken)));
        assert!(matches!(expect_kind("k", &t, TokenKind::Refresh), Err(AuthError::InvalidToken)));
        assert_eq!(expect_kind("k", &t, TokenKind::Access).unwrap().0, u.id);
    }

    #[test]
    fn expired_token_is_invalid() {
        let t = issue("k", &user(), TokenKind::Access, Duration::seconds(-5)).unwrap();
        assert!(matches!(decode_claims("k", &t), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(decode_claims("k", "not-a-jwt"), Err(AuthError::InvalidToken)));
    }
}
