//! Runtime configuration for the web server.
//!
//! Values come from command-line flags with environment fallbacks (see
//! `main.rs`); this module only assembles them into typed settings.

use std::str::FromStr;
use std::time::Duration;

use crate::i18n::{Locale, LocaleResolver, Strategy};
use crate::relay::RelayConfig;
use crate::theme::Theme;

/// Default locale strategy order.
pub const DEFAULT_STRATEGIES: &str = "url,cookie,base";

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub host: String,
    pub port: u16,
    pub base_locale: Locale,
    pub strategies: Vec<Strategy>,
    pub locale_cookie: String,
    pub default_theme: Theme,
    pub relay: RelayConfig,
}

impl SiteConfig {
    pub fn locale_resolver(&self) -> LocaleResolver {
        LocaleResolver::new(self.strategies.clone(), self.base_locale)
            .with_cookie_name(self.locale_cookie.clone())
    }
}

/// Parses a comma-separated strategy list such as `url,cookie,base`.
pub fn parse_strategies(input: &str) -> Result<Vec<Strategy>, String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Strategy::from_str)
        .collect()
}

pub fn relay_config(endpoint: String, access_key: String, timeout_secs: u64) -> RelayConfig {
    RelayConfig {
        endpoint,
        timeout: Duration::from_secs(timeout_secs.max(1)),
        ..RelayConfig::new(access_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategies() {
        assert_eq!(
            parse_strategies(DEFAULT_STRATEGIES).unwrap(),
            vec![Strategy::Url, Strategy::Cookie, Strategy::BaseLocale]
        );
        assert_eq!(
            parse_strategies(" preferred , base,").unwrap(),
            vec![Strategy::PreferredLanguage, Strategy::BaseLocale]
        );
        assert!(parse_strategies("url,session").is_err());
    }

    #[test]
    fn test_locale_resolver_from_config() {
        let config = SiteConfig {
            host: "127.0.0.1".into(),
            port: 8080,
            base_locale: Locale::En,
            strategies: vec![Strategy::Cookie],
            locale_cookie: "lang".into(),
            default_theme: Theme::Dark,
            relay: relay_config("http://x".into(), "k".into(), 10),
        };
        let resolver = config.locale_resolver();
        assert_eq!(resolver.base(), Locale::En);
        assert_eq!(resolver.cookie_name(), "lang");
        assert_eq!(resolver.strategies(), &[Strategy::Cookie]);
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let relay = relay_config("http://x".into(), "k".into(), 0);
        assert_eq!(relay.timeout, Duration::from_secs(1));
    }
}
