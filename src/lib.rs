pub mod client;
pub mod discount;
pub mod draft;
pub mod error;
pub mod form;
pub mod models;
pub mod notify;
pub mod schedule;
pub mod sessions;
pub mod settings;
pub mod term;
pub mod validation;

pub use client::{ApiError, ProviderClient};
pub use draft::ClassDraft;
pub use error::{FormError, ValidationError};
pub use form::{ClassForm, Dialog, FormMode, Section};
pub use notify::{Navigator, NoticeLevel, Notifier, Route};
pub use settings::Settings;

/// Installs the global log subscriber. A second call leaves the first in place.
pub fn init_tracing(settings: &Settings) {
    let env_filter = if settings.debug { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;

    #[test]
    fn test_init_tracing_twice() {
        let settings = Settings {
            api_base_url: Url::parse("http://localhost:8000/").unwrap(),
            auth_token: None,
            debug: true,
            timezone: "Asia/Hong_Kong".to_string(),
        };
        init_tracing(&settings);
        init_tracing(&settings);
    }
}
