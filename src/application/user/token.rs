use crate::application::ServiceSettings;
use crate::domain::UserId;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// アクセストークンのクレーム
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub exp: usize,
}

/// アクセストークンを発行する（HS256）
pub fn issue_access_token(
    settings: &ServiceSettings,
    user_id: UserId,
    now: DateTime<Utc>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = now + Duration::hours(settings.jwt_expiration_hours);

    let claims = AccessClaims {
        sub: user_id.value(),
        exp: expiration.timestamp().max(0) as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
}

/// アクセストークンを検証し、ユーザーIDを取り出す
///
/// 署名と有効期限を検証する。
pub fn decode_access_token(
    secret: &str,
    token: &str,
) -> Result<UserId, jsonwebtoken::errors::Error> {
    let data = jsonwebtoken::decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(UserId::from_uuid(data.claims.sub))
}
