//! HTTP routes for the folio server.
//!
//! Two surfaces share the same locale negotiation:
//! - HTML pages (`/`, `/about`, `/experience`, `/projects`, `/skills`,
//!   `/contact`), reachable unprefixed or under any locale prefix;
//! - a small JSON API under `/api` documented with OpenAPI via `utoipa`.
//!
//! Swagger UI is available at `/swagger-ui/`.

use actix_web::{HttpResponse, Responder, http::StatusCode, web};
use utoipa::OpenApi;

use crate::catalog::{
    Catalog, Certificate, Education, Profile, Project, Skill, Skills, Technology, WorkExperience,
};
use crate::contact::{self, ContactForm, ContactOutcome, ContactResponse};
use crate::export;
use crate::i18n::{Locale, LocaleResolver};
use crate::middleware::RequestLocale;
use crate::relay::MailRelay;
use crate::render::{self, Assets, ContactView, PageContext};
use crate::theme::Theme;

/// Shared application state.
///
/// Wrapped in `web::Data` (an `Arc`) and shared by all handlers. Nothing in
/// it is mutated after start-up.
pub struct AppState {
    pub catalog: Catalog,
    pub relay: MailRelay,
    pub default_theme: Theme,
}

// ---------------------------------------------------------------------------
// OpenAPI definition
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    info(
        title = "folio API",
        version = "0.1.0",
        description = "Portfolio content and contact form relay. Every path may be \
            prefixed with a locale segment (`/en/api/...`) to localize messages.",
        license(name = "MIT")
    ),
    paths(get_catalog, get_project, submit_contact_api),
    components(schemas(
        Catalog,
        Profile,
        Technology,
        WorkExperience,
        Education,
        Project,
        Skills,
        Skill,
        Certificate,
        ContactForm,
        ContactResponse,
        Locale,
    )),
    tags(
        (name = "content", description = "Static portfolio content"),
        (name = "contact", description = "Contact form relay"),
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// Get the portfolio content.
///
/// Translatable fields are message keys; the profile summary is given
/// per locale.
#[utoipa::path(
    get,
    path = "/api/catalog",
    tag = "content",
    responses(
        (status = 200, description = "Portfolio content", body = Catalog),
    )
)]
pub async fn get_catalog(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(&data.catalog)
}

/// Get one project by id.
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "content",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = Project),
        (status = 404, description = "No project with this id"),
    )
)]
pub async fn get_project(path: web::Path<String>, data: web::Data<AppState>) -> impl Responder {
    let id = path.into_inner();
    match data.catalog.project(&id) {
        Some(project) => HttpResponse::Ok().json(project),
        None => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Project '{}' not found", id)
        })),
    }
}

/// Submit the contact form.
///
/// The message is validated and relayed once to the email relay. Error
/// messages are in the negotiated locale.
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "contact",
    request_body = ContactForm,
    responses(
        (status = 200, description = "Message relayed", body = ContactResponse),
        (status = 400, description = "Invalid input; per-field errors", body = ContactResponse),
        (status = 500, description = "Relay failed; general error", body = ContactResponse),
    )
)]
pub async fn submit_contact_api(
    loc: RequestLocale,
    body: web::Json<ContactForm>,
    data: web::Data<AppState>,
) -> impl Responder {
    let form = body.into_inner();
    let outcome = contact::submit(&data.relay, &form, loc.locale).await;
    let status = status_of(&outcome);
    HttpResponse::build(status).json(outcome.into_response(form))
}

fn status_of(outcome: &ContactOutcome) -> StatusCode {
    StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

// ---------------------------------------------------------------------------
// Page Handlers
// ---------------------------------------------------------------------------

fn page_context(
    loc: RequestLocale,
    data: &AppState,
    resolver: &LocaleResolver,
) -> PageContext {
    PageContext {
        locale: loc.locale,
        base: resolver.base(),
        canonical_path: loc.canonical_path,
        default_theme: data.default_theme,
    }
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

macro_rules! catalog_page {
    ($name:ident, $render:path) => {
        pub async fn $name(
            loc: RequestLocale,
            data: web::Data<AppState>,
            resolver: web::Data<LocaleResolver>,
        ) -> HttpResponse {
            let ctx = page_context(loc, &data, &resolver);
            html(StatusCode::OK, $render(&ctx, &data.catalog))
        }
    };
}

catalog_page!(home_page, render::home);
catalog_page!(about_page, render::about);
catalog_page!(experience_page, render::experience);
catalog_page!(projects_page, render::projects);
catalog_page!(skills_page, render::skills);

pub async fn contact_page(
    loc: RequestLocale,
    data: web::Data<AppState>,
    resolver: web::Data<LocaleResolver>,
) -> HttpResponse {
    let ctx = page_context(loc, &data, &resolver);
    html(StatusCode::OK, render::contact(&ctx, &ContactView::default()))
}

/// Form post from the contact page; re-renders it with the outcome.
pub async fn contact_form_post(
    loc: RequestLocale,
    form: web::Form<ContactForm>,
    data: web::Data<AppState>,
    resolver: web::Data<LocaleResolver>,
) -> HttpResponse {
    let form = form.into_inner();
    let ctx = page_context(loc, &data, &resolver);
    let outcome = contact::submit(&data.relay, &form, ctx.locale).await;
    let status = status_of(&outcome);

    let view = match outcome {
        ContactOutcome::Sent => ContactView {
            sent: true,
            ..Default::default()
        },
        ContactOutcome::Invalid(errors) => ContactView {
            form,
            errors,
            sent: false,
        },
        ContactOutcome::Failed(message) => ContactView {
            form,
            errors: [(contact::GENERAL_ERROR.to_string(), message)].into(),
            sent: false,
        },
    };

    html(status, render::contact(&ctx, &view))
}

pub async fn not_found_page(
    loc: RequestLocale,
    data: web::Data<AppState>,
    resolver: web::Data<LocaleResolver>,
) -> HttpResponse {
    let ctx = page_context(loc, &data, &resolver);
    html(StatusCode::NOT_FOUND, render::not_found(&ctx))
}

/// The résumé as plain text in the request locale.
pub async fn cv_download(loc: RequestLocale, data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"cv-{}.txt\"", loc.locale),
        ))
        .body(export::format_plain(&data.catalog, loc.locale))
}

/// Serves a file embedded under `assets/`.
pub async fn static_asset(path: web::Path<String>) -> HttpResponse {
    let path = path.into_inner();
    match Assets::get(&path) {
        Some(file) => HttpResponse::Ok()
            .content_type(content_type_for(&path))
            .insert_header(("Cache-Control", "public, max-age=3600"))
            .body(file.data.into_owned()),
        None => HttpResponse::NotFound().finish(),
    }
}

fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or("") {
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "html" => "text/html; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Configures all routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/catalog", web::get().to(get_catalog))
            .route("/projects/{id}", web::get().to(get_project))
            .route("/contact", web::post().to(submit_contact_api)),
    )
    .route("/static/{path:.*}", web::get().to(static_asset))
    .route("/cv", web::get().to(cv_download))
    .route("/", web::get().to(home_page))
    .route("/about", web::get().to(about_page))
    .route("/experience", web::get().to(experience_page))
    .route("/projects", web::get().to(projects_page))
    .route("/skills", web::get().to(skills_page))
    .route("/contact", web::get().to(contact_page))
    .route("/contact", web::post().to(contact_form_post));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
