use chrono_tz::Tz;
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use url::Url;

/// Zone used when none is configured.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Hong_Kong;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub api_base_url: Url,
    pub auth_token: Option<String>,
    pub debug: bool,
    pub timezone: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // CLASS_EDITOR_API_BASE_URL, CLASS_EDITOR_AUTH_TOKEN, ...
            .add_source(Environment::with_prefix("CLASS_EDITOR"))
            .set_default("api_base_url", "http://localhost:8000/")?
            .set_default("debug", false)?
            .set_default("timezone", DEFAULT_TIMEZONE.name())?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.tz()?;
        Ok(settings)
    }

    /// The zone "today" is computed in.
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|err| ConfigError::Message(format!("invalid timezone {}: {err}", self.timezone)))
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        for key in [
            "CLASS_EDITOR_API_BASE_URL",
            "CLASS_EDITOR_AUTH_TOKEN",
            "CLASS_EDITOR_DEBUG",
            "CLASS_EDITOR_TIMEZONE",
        ] {
            // SAFETY: tests touching the environment are serialized.
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.api_base_url.as_str(), "http://localhost:8000/");
        assert_eq!(settings.auth_token, None);
        assert!(!settings.debug);
        assert_eq!(settings.tz().unwrap(), DEFAULT_TIMEZONE);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("CLASS_EDITOR_API_BASE_URL", "https://api.example.com/v2/");
            std::env::set_var("CLASS_EDITOR_AUTH_TOKEN", "secret");
            std::env::set_var("CLASS_EDITOR_TIMEZONE", "Europe/Warsaw");
        }
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.api_base_url.as_str(), "https://api.example.com/v2/");
        assert_eq!(settings.auth_token.as_deref(), Some("secret"));
        assert_eq!(settings.tz().unwrap(), chrono_tz::Europe::Warsaw);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_unknown_timezone_is_rejected() {
        clear_env();
        unsafe { std::env::set_var("CLASS_EDITOR_TIMEZONE", "Mars/Olympus") };
        assert!(Settings::from_env().is_err());
        clear_env();
    }
}
