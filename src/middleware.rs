//! Locale negotiation middleware.
//!
//! On the way in, the request's locale is resolved through the configured
//! [`LocaleResolver`] chain and the URI is rewritten to its canonical,
//! locale-free path so routes are declared once. The result is stored in the
//! request extensions and exposed to handlers through [`RequestLocale`].
//!
//! On the way out, HTML responses get the `%lang%` placeholder replaced with
//! the resolved locale, and every response carries `Content-Language`.

use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    body::{BoxBody, MessageBody, to_bytes},
    cookie::{Cookie, SameSite, time::Duration as CookieDuration},
    dev::{Payload, ServiceRequest, ServiceResponse},
    http::{
        Uri,
        header::{self, HeaderValue},
    },
    middleware::Next,
    web,
};
use std::future::{Ready, ready};

use crate::i18n::{
    Locale, LocaleResolver, LocaleSignals, Strategy, canonicalize_path, localize_document,
    normalize_locale,
};

/// The locale negotiated for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLocale {
    pub locale: Locale,
    /// Request path with any locale prefix removed.
    pub canonical_path: String,
}

impl FromRequest for RequestLocale {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(found) = req.extensions().get::<RequestLocale>() {
            return ready(Ok(found.clone()));
        }

        // Not behind the middleware: use the base locale.
        let locale = req
            .app_data::<web::Data<LocaleResolver>>()
            .map(|r| r.base())
            .unwrap_or_default();
        ready(Ok(RequestLocale {
            locale,
            canonical_path: canonicalize_path(req.path()),
        }))
    }
}

/// Resolves the request locale and localizes the response.
///
/// Install with `actix_web::middleware::from_fn(negotiate_locale)`.
pub async fn negotiate_locale(
    mut req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let resolver = req
        .app_data::<web::Data<LocaleResolver>>()
        .cloned()
        .unwrap_or_else(|| web::Data::new(LocaleResolver::default()));

    let path = req.path().to_string();
    let cookie = req
        .cookie(resolver.cookie_name())
        .map(|c| c.value().to_string());
    let accept_language = req
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let resolution = resolver.resolve(&LocaleSignals {
        path: &path,
        cookie: cookie.as_deref(),
        accept_language: accept_language.as_deref(),
    });
    let locale = resolution.locale;

    if resolution.canonical_path != path {
        rewrite_path(&mut req, &resolution.canonical_path);
    }

    log::debug!(
        "Locale {} via {:?} for {} -> {}",
        locale,
        resolution.strategy,
        path,
        resolution.canonical_path
    );

    req.extensions_mut().insert(RequestLocale {
        locale,
        canonical_path: resolution.canonical_path,
    });

    let mut res = next.call(req).await?.map_into_boxed_body();

    res.headers_mut().insert(
        header::CONTENT_LANGUAGE,
        HeaderValue::from_static(locale.as_str()),
    );

    // An explicit URL locale becomes the remembered one.
    if resolution.strategy == Strategy::Url
        && cookie.as_deref().and_then(normalize_locale) != Some(locale)
    {
        let cookie = Cookie::build(resolver.cookie_name().to_string(), locale.as_str())
            .path("/")
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::days(400))
            .finish();
        if let Err(e) = res.response_mut().add_cookie(&cookie) {
            log::warn!("Failed to set locale cookie: {}", e);
        }
    }

    if is_html(&res) {
        localize_body(res, locale).await
    } else {
        Ok(res)
    }
}

/// Points the request at `path`, keeping the query string.
fn rewrite_path(req: &mut ServiceRequest, path: &str) {
    let target = match req.query_string() {
        "" => path.to_string(),
        query => format!("{}?{}", path, query),
    };

    match target.parse::<Uri>() {
        Ok(uri) => {
            req.match_info_mut().get_mut().update(&uri);
            req.head_mut().uri = uri;
        }
        Err(e) => log::warn!("Cannot rewrite request path to '{}': {}", target, e),
    }
}

fn is_html(res: &ServiceResponse<BoxBody>) -> bool {
    res.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"))
}

/// Buffers an HTML body and writes the locale into it.
async fn localize_body(
    res: ServiceResponse<BoxBody>,
    locale: Locale,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let (req, res) = res.into_parts();
    let (res, body) = res.into_parts();

    let bytes = to_bytes(body)
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

    let body = match std::str::from_utf8(&bytes) {
        Ok(html) => BoxBody::new(localize_document(html, locale)),
        Err(_) => BoxBody::new(bytes),
    };

    Ok(ServiceResponse::new(req, res.set_body(body)))
}
