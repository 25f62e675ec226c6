use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::env;

/// Run-mode selector. Test mode switches the server onto the dedicated
/// test database so integration runs never touch development data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Dev,
    Test,
    Prod,
}

impl Mode {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.to_ascii_uppercase().as_str() {
            "DEV" => Ok(Mode::Dev),
            "TEST" => Ok(Mode::Test),
            "PROD" => Ok(Mode::Prod),
            other => Err(anyhow!("Invalid MODE value: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mode: Mode,
    pub database_url: String,
    pub test_database_url: Option<String>,
    pub secret_key: String,
    pub algorithm: String,
    pub access_token_expire_minutes: u64,
    pub refresh_token_expire_days: u64,
    pub cookie_secure: bool,
    pub frontend_base_url: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mode = Mode::parse(&env::var("MODE").unwrap_or_else(|_| "DEV".to_string()))?;

        let database_url = env::var("DATABASE_URL").or_else(|_| postgres_url_from_parts(""))?;
        let test_database_url = env::var("TEST_DATABASE_URL")
            .ok()
            .or_else(|| postgres_url_from_parts("TEST_").ok());

        let secret_key = env::var("SECRET_KEY")
            .unwrap_or_else(|_| "change-this-secret-before-deploying".to_string());
        let algorithm = env::var("ALGORITHM").unwrap_or_else(|_| "HS256".to_string());

        let access_token_expire_minutes = env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .unwrap_or(15);
        let refresh_token_expire_days = env::var("REFRESH_TOKEN_EXPIRE_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        let frontend_base_url = env::var("FRONTEND_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());

        Ok(Config {
            mode,
            database_url,
            test_database_url,
            secret_key,
            algorithm,
            access_token_expire_minutes,
            refresh_token_expire_days,
            cookie_secure,
            frontend_base_url,
        })
    }

    /// The connection string the server should actually use for this run.
    pub fn effective_database_url(&self) -> &str {
        match (self.mode, &self.test_database_url) {
            (Mode::Test, Some(url)) => url,
            _ => &self.database_url,
        }
    }

    pub fn access_token_max_age_secs(&self) -> u64 {
        self.access_token_expire_minutes * 60
    }

    pub fn refresh_token_max_age_secs(&self) -> u64 {
        self.refresh_token_expire_days * 24 * 60 * 60
    }
}

fn postgres_url_from_parts(prefix: &str) -> anyhow::Result<String> {
    let var = |name: &str| env::var(format!("{}{}", prefix, name));
    Ok(format!(
        "postgres://{}:{}@{}:{}/{}",
        var("POSTGRES_USER")?,
        var("POSTGRES_PASSWORD")?,
        var("POSTGRES_HOST")?,
        var("POSTGRES_PORT")?,
        var("POSTGRES_DB")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parse_accepts_any_casing() {
        assert_eq!(Mode::parse("dev").unwrap(), Mode::Dev);
        assert_eq!(Mode::parse("TEST").unwrap(), Mode::Test);
        assert_eq!(Mode::parse("Prod").unwrap(), Mode::Prod);
        assert!(Mode::parse("staging").is_err());
    }

    #[test]
    fn effective_database_url_prefers_test_url_in_test_mode() {
        let config = Config {
            mode: Mode::Test,
            database_url: "postgres://main".into(),
            test_database_url: Some("postgres://test".into()),
            secret_key: "secret".into(),
            algorithm: "HS256".into(),
            access_token_expire_minutes: 15,
            refresh_token_expire_days: 30,
            cookie_secure: false,
            frontend_base_url: "http://127.0.0.1:3000".into(),
        };
        assert_eq!(config.effective_database_url(), "postgres://test");

        let config = Config {
            mode: Mode::Dev,
            ..config
        };
        assert_eq!(config.effective_database_url(), "postgres://main");
    }

    #[test]
    fn token_max_ages_derive_from_ttls() {
        let config = Config {
            mode: Mode::Dev,
            database_url: "postgres://main".into(),
            test_database_url: None,
            secret_key: "secret".into(),
            algorithm: "HS256".into(),
            access_token_expire_minutes: 15,
            refresh_token_expire_days: 30,
            cookie_secure: true,
            frontend_base_url: "http://127.0.0.1:3000".into(),
        };
        assert_eq!(config.access_token_max_age_secs(), 900);
        assert_eq!(config.refresh_token_max_age_secs(), 2_592_000);
    }
}
