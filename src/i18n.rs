//! Internationalization (i18n) support for folio.
//!
//! Provides the supported locale set, locale normalization, the ordered
//! strategy chain that picks the locale for an incoming request, and the
//! path helpers that move between localized and canonical URLs.
//!
//! Supported languages: es (base), en.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Placeholder in the document template that receives the active locale.
pub const LANG_PLACEHOLDER: &str = "%lang%";

/// Default name of the cookie that remembers the visitor's locale.
pub const LOCALE_COOKIE: &str = "locale";

// ---------------------------------------------------------------------------
// Locale
// ---------------------------------------------------------------------------

/// A locale the site ships translations for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Spanish, the base locale.
    #[default]
    Es,
    /// English.
    En,
}

impl Locale {
    /// All supported locales, base locale first.
    pub const ALL: [Locale; 2] = [Locale::Es, Locale::En];

    /// Returns the language tag, as used in URLs and `lang` attributes.
    pub fn as_str(self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_locale(s).ok_or_else(|| {
            format!(
                "Unsupported locale '{}'. Valid: {}",
                s,
                Locale::ALL.map(Locale::as_str).join(", ")
            )
        })
    }
}

/// Normalizes a locale string to one of the supported locales.
///
/// Accepts common formats: "en-US", "es_ES.UTF-8", "EN", etc.
/// Returns `None` if the language is not supported.
pub fn normalize_locale(input: &str) -> Option<Locale> {
    let lower = input.trim().to_lowercase();
    // Strip encoding suffix (e.g. ".utf-8")
    let tag = lower.split('.').next().unwrap_or(&lower);
    let primary = tag.split(['-', '_']).next().unwrap_or(tag);

    match primary {
        "es" => Some(Locale::Es),
        "en" => Some(Locale::En),
        _ => None,
    }
}

/// Looks up a message in `locale`.
pub fn tr(key: &str, locale: Locale) -> String {
    t!(key, locale = locale.as_str()).into_owned()
}

/// Matches a single URL path segment against the supported tags.
///
/// Unlike [`normalize_locale`] this is exact: `/en-us/` is not a locale
/// prefix, only `/en/` is.
fn locale_segment(segment: &str) -> Option<Locale> {
    Locale::ALL
        .into_iter()
        .find(|l| l.as_str().eq_ignore_ascii_case(segment))
}

/// Detects the locale for command-line use.
///
/// Priority:
/// 1. `FOLIO_LANG` environment variable
/// 2. System locale (via `sys-locale` crate)
/// 3. Fallback to `base`
pub fn detect_system_locale(base: Locale) -> Locale {
    if let Ok(lang) = std::env::var("FOLIO_LANG")
        && let Some(locale) = normalize_locale(&lang)
    {
        return locale;
    }

    if let Some(locale_str) = sys_locale::get_locale()
        && let Some(locale) = normalize_locale(&locale_str)
    {
        return locale;
    }

    base
}

// ---------------------------------------------------------------------------
// Strategy chain
// ---------------------------------------------------------------------------

/// One source of locale information, tried in configured order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Leading locale segment of the request path.
    Url,
    /// The locale cookie.
    Cookie,
    /// First supported tag of the `Accept-Language` header.
    PreferredLanguage,
    /// The configured base locale. Always yields.
    BaseLocale,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "url" => Ok(Self::Url),
            "cookie" => Ok(Self::Cookie),
            "preferred" | "preferred-language" | "accept-language" => {
                Ok(Self::PreferredLanguage)
            }
            "base" | "base-locale" => Ok(Self::BaseLocale),
            _ => Err(format!(
                "Unknown locale strategy '{}'. Valid: url, cookie, preferred, base",
                s
            )),
        }
    }
}

/// Everything the resolver looks at, borrowed from the request.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocaleSignals<'a> {
    pub path: &'a str,
    pub cookie: Option<&'a str>,
    pub accept_language: Option<&'a str>,
}

/// Outcome of locale negotiation for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub locale: Locale,
    /// The strategy that produced `locale`.
    pub strategy: Strategy,
    /// Request path with any locale prefix removed.
    pub canonical_path: String,
}

/// Picks a locale for each request by walking an ordered strategy list.
#[derive(Debug, Clone)]
pub struct LocaleResolver {
    strategies: Vec<Strategy>,
    base: Locale,
    cookie_name: String,
}

impl Default for LocaleResolver {
    fn default() -> Self {
        Self::new(
            vec![Strategy::Url, Strategy::Cookie, Strategy::BaseLocale],
            Locale::default(),
        )
    }
}

impl LocaleResolver {
    pub fn new(strategies: Vec<Strategy>, base: Locale) -> Self {
        Self {
            strategies,
            base,
            cookie_name: LOCALE_COOKIE.to_string(),
        }
    }

    /// Overrides the name of the locale cookie.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn base(&self) -> Locale {
        self.base
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Resolves the locale for a request. Total: falls back to the base
    /// locale when no strategy yields.
    pub fn resolve(&self, signals: &LocaleSignals<'_>) -> Resolution {
        let (locale, strategy) = self
            .strategies
            .iter()
            .find_map(|&strategy| self.try_strategy(strategy, signals).map(|l| (l, strategy)))
            .unwrap_or((self.base, Strategy::BaseLocale));

        Resolution {
            locale,
            strategy,
            canonical_path: canonicalize_path(signals.path),
        }
    }

    fn try_strategy(&self, strategy: Strategy, signals: &LocaleSignals<'_>) -> Option<Locale> {
        match strategy {
            Strategy::Url => path_locale(signals.path),
            Strategy::Cookie => signals.cookie.and_then(normalize_locale),
            Strategy::PreferredLanguage => signals.accept_language.and_then(preferred_locale),
            Strategy::BaseLocale => Some(self.base),
        }
    }
}

/// Returns the locale named by the first path segment, if any.
pub fn path_locale(path: &str) -> Option<Locale> {
    path.trim_start_matches('/')
        .split('/')
        .next()
        .and_then(locale_segment)
}

/// Picks the first supported language from an `Accept-Language` value.
///
/// Quality weights are ignored; entries are taken in header order.
pub fn preferred_locale(header: &str) -> Option<Locale> {
    header
        .split(',')
        .map(|entry| entry.split(';').next().unwrap_or("").trim())
        .find_map(normalize_locale)
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Strips every leading locale segment from `path`.
///
/// `/en/about` becomes `/about`, `/en` becomes `/`. Repeated prefixes
/// (`/en/es/about`) are all removed so the result is always canonical.
pub fn canonicalize_path(path: &str) -> String {
    let mut rest = path;
    loop {
        let trimmed = rest.trim_start_matches('/');
        let (segment, tail) = match trimmed.find('/') {
            Some(idx) => (&trimmed[..idx], &trimmed[idx..]),
            None => (trimmed, ""),
        };
        if segment.is_empty() || locale_segment(segment).is_none() {
            break;
        }
        rest = tail;
    }

    if rest.is_empty() {
        "/".to_string()
    } else if rest.starts_with('/') {
        rest.to_string()
    } else {
        format!("/{}", rest)
    }
}

/// Builds the public URL of a canonical path in `locale`.
///
/// The base locale is served unprefixed, every other locale under `/{tag}`.
pub fn localize_path(canonical: &str, locale: Locale, base: Locale) -> String {
    let canonical = canonicalize_path(canonical);
    if locale == base {
        canonical
    } else if canonical == "/" {
        format!("/{}", locale)
    } else {
        format!("/{}{}", locale, canonical)
    }
}

/// Builds a language-switcher URL: always prefixed, base locale included.
///
/// An explicit `/{tag}` lets the `Url` strategy win over a cookie left by
/// an earlier visit, so choosing a language also updates the cookie.
pub fn switcher_path(canonical: &str, locale: Locale) -> String {
    let canonical = canonicalize_path(canonical);
    if canonical == "/" {
        format!("/{}", locale)
    } else {
        format!("/{}{}", locale, canonical)
    }
}

/// Writes the active locale into a rendered document.
///
/// Only the first occurrence of [`LANG_PLACEHOLDER`] is replaced; a
/// document without the token is returned unchanged.
pub fn localize_document(html: &str, locale: Locale) -> String {
    html.replacen(LANG_PLACEHOLDER, locale.as_str(), 1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(path: &str) -> LocaleSignals<'_> {
        LocaleSignals {
            path,
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_locale() {
        assert_eq!(normalize_locale("en-US"), Some(Locale::En));
        assert_eq!(normalize_locale("es_ES.UTF-8"), Some(Locale::Es));
        assert_eq!(normalize_locale("EN"), Some(Locale::En));
        assert_eq!(normalize_locale("de"), None);
        assert_eq!(normalize_locale(""), None);
    }

    #[test]
    fn test_url_prefix_wins_for_every_locale() {
        let resolver = LocaleResolver::default();
        for locale in Locale::ALL {
            let path = format!("/{}/projects", locale);
            let res = resolver.resolve(&LocaleSignals {
                path: &path,
                cookie: Some("es"),
                accept_language: None,
            });
            assert_eq!(res.locale, locale);
            assert_eq!(res.strategy, Strategy::Url);
            assert_eq!(res.canonical_path, "/projects");
        }
    }

    #[test]
    fn test_cookie_used_without_prefix() {
        let resolver = LocaleResolver::default();
        let res = resolver.resolve(&LocaleSignals {
            path: "/about",
            cookie: Some("en"),
            accept_language: None,
        });
        assert_eq!(res.locale, Locale::En);
        assert_eq!(res.strategy, Strategy::Cookie);
        assert_eq!(res.canonical_path, "/about");
    }

    #[test]
    fn test_garbage_falls_back_to_base() {
        let resolver = LocaleResolver::new(vec![Strategy::Url, Strategy::Cookie], Locale::En);
        let res = resolver.resolve(&LocaleSignals {
            path: "/xx/about",
            cookie: Some("klingon"),
            accept_language: Some("fr-FR"),
        });
        assert_eq!(res.locale, Locale::En);
        assert_eq!(res.strategy, Strategy::BaseLocale);
        assert_eq!(res.canonical_path, "/xx/about");
    }

    #[test]
    fn test_preferred_language_strategy() {
        let resolver = LocaleResolver::new(
            vec![Strategy::Url, Strategy::PreferredLanguage, Strategy::BaseLocale],
            Locale::Es,
        );
        let res = resolver.resolve(&LocaleSignals {
            path: "/",
            cookie: None,
            accept_language: Some("fr-CH, fr;q=0.9, en;q=0.8, es;q=0.7"),
        });
        assert_eq!(res.locale, Locale::En);
        assert_eq!(res.strategy, Strategy::PreferredLanguage);
    }

    #[test]
    fn test_empty_chain_still_resolves() {
        let resolver = LocaleResolver::new(Vec::new(), Locale::En);
        assert_eq!(resolver.resolve(&signals("/es")).locale, Locale::En);
    }

    #[test]
    fn test_canonicalize_path() {
        assert_eq!(canonicalize_path("/en/about"), "/about");
        assert_eq!(canonicalize_path("/es"), "/");
        assert_eq!(canonicalize_path("/en/"), "/");
        assert_eq!(canonicalize_path("/"), "/");
        assert_eq!(canonicalize_path(""), "/");
        assert_eq!(canonicalize_path("/english/page"), "/english/page");
        assert_eq!(canonicalize_path("/about/en"), "/about/en");
        assert_eq!(canonicalize_path("/EN/contact"), "/contact");
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        for path in [
            "/",
            "/about",
            "/en/about",
            "/en/es/about",
            "/es/en",
            "//en//x",
            "/static/site.css",
        ] {
            let once = canonicalize_path(path);
            assert_eq!(canonicalize_path(&once), once, "not idempotent for {}", path);
        }
    }

    #[test]
    fn test_localize_path_inverse() {
        assert_eq!(localize_path("/about", Locale::En, Locale::Es), "/en/about");
        assert_eq!(localize_path("/", Locale::En, Locale::Es), "/en");
        assert_eq!(localize_path("/about", Locale::Es, Locale::Es), "/about");
        assert_eq!(localize_path("/en/about", Locale::Es, Locale::Es), "/about");

        for path in ["/", "/projects", "/es/skills"] {
            for locale in Locale::ALL {
                let localized = localize_path(path, locale, Locale::Es);
                assert_eq!(canonicalize_path(&localized), canonicalize_path(path));
            }
        }
    }

    #[test]
    fn test_switcher_path_always_prefixed() {
        assert_eq!(switcher_path("/about", Locale::Es), "/es/about");
        assert_eq!(switcher_path("/", Locale::Es), "/es");
        assert_eq!(switcher_path("/en/projects", Locale::Es), "/es/projects");

        let resolver = LocaleResolver::default();
        for locale in Locale::ALL {
            let link = switcher_path("/skills", locale);
            let res = resolver.resolve(&LocaleSignals {
                path: &link,
                cookie: Some("en"),
                accept_language: None,
            });
            assert_eq!(res.locale, locale);
            assert_eq!(res.strategy, Strategy::Url);
            assert_eq!(res.canonical_path, "/skills");
        }
    }

    #[test]
    fn test_localize_document_replaces_once() {
        let html = "<html lang=\"%lang%\"><body>%lang%</body></html>";
        let out = localize_document(html, Locale::En);
        assert_eq!(out, "<html lang=\"en\"><body>%lang%</body></html>");

        let single = "<html lang=\"%lang%\"></html>";
        let out = localize_document(single, Locale::Es);
        assert_eq!(out, "<html lang=\"es\"></html>");
        assert!(!out.contains(LANG_PLACEHOLDER));
    }

    #[test]
    fn test_localize_document_without_token() {
        let html = "<html><body>hola</body></html>";
        assert_eq!(localize_document(html, Locale::En), html);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("URL".parse::<Strategy>(), Ok(Strategy::Url));
        assert_eq!("accept-language".parse::<Strategy>(), Ok(Strategy::PreferredLanguage));
        assert!("header".parse::<Strategy>().is_err());
    }
}
