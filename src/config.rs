use std::env;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::application::ServiceSettings;

/// アクセストークンの有効期間として受け付ける範囲（時間、最長1年）
const JWT_EXPIRATION_HOURS_RANGE: RangeInclusive<i64> = 1..=8760;

/// 設定読み込みのエラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("environment variable {name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Telegram Bot の接続情報
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// 起動時に作成する管理者ユーザー
#[derive(Debug, Clone)]
pub struct SuperuserConfig {
    pub email: String,
    pub password: String,
}

/// サーバー設定
///
/// 任意項目が未設定の場合、main はインメモリ実装・モック実装に切り替える。
#[derive(Debug, Clone)]
pub struct Config {
    /// 未設定ならインメモリストアで起動する
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub public_base_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    /// 未設定ならモックの決済プロバイダーを使う
    pub stripe_secret_key: Option<String>,
    /// 未設定ならモックの通知サービスを使う
    pub telegram: Option<TelegramConfig>,
    pub overdue_check_interval_secs: u64,
    pub superuser: Option<SuperuserConfig>,
}

impl Config {
    /// 環境変数（と `.env`）から設定を読み込む
    ///
    /// 必須: `JWT_SECRET`
    ///
    /// 任意（デフォルト値）:
    /// - `DATABASE_URL`
    /// - `DATABASE_MAX_CONNECTIONS` (5)
    /// - `HOST` (0.0.0.0)
    /// - `PORT` (3000)
    /// - `PUBLIC_BASE_URL` (http://localhost:{PORT})
    /// - `JWT_EXPIRATION_HOURS` (24、1〜8760)
    /// - `STRIPE_SECRET_KEY`
    /// - `BOT_TOKEN` と `CHAT_ID`（両方そろった場合のみ有効）
    /// - `OVERDUE_CHECK_INTERVAL_SECS` (86400)
    /// - `SUPERUSER_EMAIL` と `SUPERUSER_PASSWORD`
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = parse_or("PORT", 3000)?;
        let public_base_url = optional("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        let telegram = match (optional("BOT_TOKEN"), optional("CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            _ => None,
        };

        let superuser = match (optional("SUPERUSER_EMAIL"), optional("SUPERUSER_PASSWORD")) {
            (Some(email), Some(password)) => Some(SuperuserConfig { email, password }),
            _ => None,
        };

        Ok(Config {
            database_url: optional("DATABASE_URL"),
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            public_base_url,
            jwt_secret: optional("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            jwt_expiration_hours: parse_in_range(
                "JWT_EXPIRATION_HOURS",
                24,
                JWT_EXPIRATION_HOURS_RANGE,
            )?,
            stripe_secret_key: optional("STRIPE_SECRET_KEY"),
            telegram,
            overdue_check_interval_secs: parse_or("OVERDUE_CHECK_INTERVAL_SECS", 86_400)?,
            superuser,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            public_base_url: self.public_base_url.clone(),
            jwt_secret: self.jwt_secret.clone(),
            jwt_expiration_hours: self.jwt_expiration_hours,
        }
    }
}

/// 空文字列は未設定として扱う
fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn parse_in_range<T>(
    name: &'static str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + ToString,
{
    let value = parse_or(name, default)?;
    if !range.contains(&value) {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_uses_default_when_unset() {
        let value: u16 = parse_or("RUSTY_LIBRARY_RENTAL_TEST_UNSET_PORT", 3000).unwrap();
        assert_eq!(value, 3000);
    }

    #[test]
    fn test_parse_in_range_uses_default_when_unset() {
        let value = parse_in_range(
            "RUSTY_LIBRARY_RENTAL_TEST_UNSET_HOURS",
            24,
            JWT_EXPIRATION_HOURS_RANGE,
        )
        .unwrap();
        assert_eq!(value, 24);
    }

    #[test]
    fn test_parse_in_range_rejects_out_of_range_values() {
        // SAFETY: このテスト専用の変数名で、他のテストは参照しない
        unsafe {
            env::set_var("RUSTY_LIBRARY_RENTAL_TEST_JWT_HOURS", "9223372036854775807");
        }
        let too_large = parse_in_range(
            "RUSTY_LIBRARY_RENTAL_TEST_JWT_HOURS",
            24,
            JWT_EXPIRATION_HOURS_RANGE,
        );
        assert!(matches!(
            too_large,
            Err(ConfigError::Invalid { name: "RUSTY_LIBRARY_RENTAL_TEST_JWT_HOURS", .. })
        ));

        for value in ["-1", "0", "8761"] {
            unsafe {
                env::set_var("RUSTY_LIBRARY_RENTAL_TEST_JWT_HOURS", value);
            }
            let result = parse_in_range(
                "RUSTY_LIBRARY_RENTAL_TEST_JWT_HOURS",
                24,
                JWT_EXPIRATION_HOURS_RANGE,
            );
            assert!(result.is_err(), "{value} should be rejected");
        }

        unsafe {
            env::set_var("RUSTY_LIBRARY_RENTAL_TEST_JWT_HOURS", "8760");
        }
        let longest = parse_in_range(
            "RUSTY_LIBRARY_RENTAL_TEST_JWT_HOURS",
            24,
            JWT_EXPIRATION_HOURS_RANGE,
        );
        assert_eq!(longest.unwrap(), 8760);

        unsafe {
            env::remove_var("RUSTY_LIBRARY_RENTAL_TEST_JWT_HOURS");
        }
    }

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::Missing("JWT_SECRET").to_string(),
            "environment variable JWT_SECRET is required"
        );
        let invalid = ConfigError::Invalid {
            name: "PORT",
            value: "abc".to_string(),
        };
        assert!(invalid.to_string().contains("PORT"));
    }
}
