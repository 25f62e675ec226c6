use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded in the short-lived signed access token. Validation is
/// stateless: signature plus expiry, no store lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: i64,    // expiration time
    pub iat: i64,    // issued at
}

impl Claims {
    pub fn new(user_id: Uuid, expire_minutes: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::minutes(expire_minutes as i64);

        Self {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

fn parse_algorithm(name: &str) -> anyhow::Result<Algorithm> {
    name.parse::<Algorithm>()
        .map_err(|_| anyhow::anyhow!("Unsupported JWT algorithm: {}", name))
}

pub fn create_access_token(
    user_id: Uuid,
    secret: &str,
    algorithm: &str,
    expire_minutes: u64,
) -> anyhow::Result<String> {
    let claims = Claims::new(user_id, expire_minutes);
    let token = encode(
        &Header::new(parse_algorithm(algorithm)?),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

pub fn verify_access_token(token: &str, secret: &str, algorithm: &str) -> anyhow::Result<Claims> {
    let validation = Validation::new(parse_algorithm(algorithm)?);
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// Opaque long-lived refresh token. Random, server-tracked, single-use.
pub fn generate_refresh_token() -> Uuid {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_verify_roundtrip() {
        let user_id = Uuid::new_v4();
        let token =
            create_access_token(user_id, "secret", "HS256", 15).expect("create token");
        let claims = verify_access_token(&token, "secret", "HS256").expect("verify token");
        assert_eq!(claims.sub, user_id.to_string());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token =
            create_access_token(Uuid::new_v4(), "secret", "HS256", 15).expect("create token");
        assert!(verify_access_token(&token, "other-secret", "HS256").is_err());
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        assert!(create_access_token(Uuid::new_v4(), "secret", "HS9000", 15).is_err());
    }

    #[test]
    fn refresh_tokens_are_unique() {
        assert_ne!(generate_refresh_token(), generate_refresh_token());
    }
}
