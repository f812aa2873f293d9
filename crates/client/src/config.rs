//! Client configuration.
//!
//! Read from the environment; a `.env` file in the working directory is
//! honored through `dotenvy`.

use std::time::Duration;

pub const API_URL_ENV: &str = "BILLBOOK_API_URL";
pub const AUTH_TOKEN_ENV: &str = "BILLBOOK_AUTH_TOKEN";
pub const PER_PAGE_ENV: &str = "BILLBOOK_PER_PAGE";
pub const SEARCH_DEBOUNCE_ENV: &str = "BILLBOOK_SEARCH_DEBOUNCE_MS";
pub const SEARCH_MIN_CHARS_ENV: &str = "BILLBOOK_SEARCH_MIN_CHARS";

const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Path of the invoice resource below the API root.
pub const INVOICES_PATH: &str = "/accounting/invoices";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub auth_token: Option<String>,
    pub per_page: u32,
    pub search_debounce: Duration,
    pub search_min_chars: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            per_page: 15,
            search_debounce: Duration::from_millis(500),
            search_min_chars: 2,
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}

impl ClientConfig {
    /// Load `.env` (if any) and then read the environment.
    pub fn load() -> Self {
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(error = %err, "no .env file loaded");
        }
        Self::from_env()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_url = match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => {
                tracing::warn!("{API_URL_ENV} not set; using {DEFAULT_API_URL}");
                defaults.api_url
            }
        };
        let auth_token = std::env::var(AUTH_TOKEN_ENV)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Self {
            api_url,
            auth_token,
            per_page: parsed::<u32>(PER_PAGE_ENV)
                .filter(|n| *n > 0)
                .unwrap_or(defaults.per_page),
            search_debounce: parsed::<u64>(SEARCH_DEBOUNCE_ENV)
                .map(Duration::from_millis)
                .unwrap_or(defaults.search_debounce),
            search_min_chars: parsed(SEARCH_MIN_CHARS_ENV).unwrap_or(defaults.search_min_chars),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.search_debounce = debounce;
        self
    }

    pub fn with_search_min_chars(mut self, min_chars: usize) -> Self {
        self.search_min_chars = min_chars;
        self
    }

    /// Absolute URL of the invoice resource.
    pub fn invoices_url(&self) -> String {
        format!("{}{INVOICES_PATH}", self.api_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_mobile_client() {
        let config = ClientConfig::default();
        assert_eq!(config.per_page, 15);
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert_eq!(config.search_min_chars, 2);
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn builder_overrides_and_url_join() {
        let config = ClientConfig::default()
            .with_api_url("https://erp.example.com/api/")
            .with_token("secret")
            .with_per_page(0)
            .with_search_debounce(Duration::ZERO)
            .with_search_min_chars(3);
        assert_eq!(config.invoices_url(), "https://erp.example.com/api/accounting/invoices");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.per_page, 1);
        assert_eq!(config.search_min_chars, 3);
    }
}
