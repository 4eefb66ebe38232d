//! # folio: Localized Portfolio Server
//!
//! folio serves a personal portfolio (profile, work history, education,
//! projects, skills, certificates) in Spanish and English, and relays the
//! site's contact form to an external email API.
//!
//! ## Features
//!
//! - **Locale negotiation**: every page is reachable unprefixed (base
//!   locale) or under `/{locale}/`. The locale is picked by a configurable
//!   strategy chain (URL segment, cookie, `Accept-Language`, base) and
//!   written into the served document's `lang` attribute.
//!
//! - **Contact relay**: server-side validation with localized per-field
//!   messages, then a single POST to the relay API (Web3Forms).
//!
//! - **Theme preference**: a reactive light/dark store synchronized with
//!   persistent storage (`folio theme`).
//!
//! - **Catalog export**: the portfolio as a colored résumé or JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default: http://0.0.0.0:8080)
//! FOLIO_RELAY_ACCESS_KEY=... folio serve
//!
//! # Toggle the stored theme preference
//! folio theme --toggle
//!
//! # Print the résumé in English
//! folio export --locale en
//! ```
//!
//! ## Routes
//!
//! | Method | Path                 | Description                       |
//! |--------|----------------------|-----------------------------------|
//! | GET    | `/`                  | Home page                         |
//! | GET    | `/about`             | About, education, interests       |
//! | GET    | `/experience`        | Work history timeline             |
//! | GET    | `/projects`          | Projects, newest first            |
//! | GET    | `/skills`            | Skills and certificates           |
//! | GET    | `/contact`           | Contact form                      |
//! | POST   | `/contact`           | Contact form submission (HTML)    |
//! | GET    | `/cv`                | Résumé download (plain text)      |
//! | GET    | `/api/catalog`       | Portfolio content (JSON)          |
//! | GET    | `/api/projects/{id}` | One project (JSON)                |
//! | POST   | `/api/contact`       | Contact form submission (JSON)    |
//! | GET    | `/static/{path}`     | Embedded assets                   |
//! | GET    | `/swagger-ui/`       | Swagger UI documentation          |
//!
//! Any path may carry a locale prefix, e.g. `/en/projects`.

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, middleware::from_fn, web};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::rc::Rc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use folio::api::{self, ApiDoc, AppState};
use folio::catalog::Catalog;
use folio::config::{DEFAULT_STRATEGIES, SiteConfig, parse_strategies, relay_config};
use folio::export;
use folio::i18n::{self, Locale};
use folio::middleware;
use folio::relay::{DEFAULT_RELAY_ENDPOINT, MailRelay};
use folio::theme::{self, ClassList, FileStorage, Theme, ThemeStore};

/// folio: a localized portfolio server.
///
/// Serves the portfolio pages and JSON API, and relays contact messages
/// to an external email API.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Localized portfolio server with a contact-form relay")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, env = "FOLIO_PORT", default_value_t = 8080)]
        port: u16,

        /// Host address to bind to.
        #[arg(long, env = "FOLIO_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Locale used when no other signal is present.
        #[arg(long, env = "FOLIO_BASE_LOCALE", default_value = "es")]
        base_locale: Locale,

        /// Locale strategies in priority order: url, cookie, preferred, base.
        #[arg(long, env = "FOLIO_LOCALE_STRATEGIES", default_value = DEFAULT_STRATEGIES)]
        strategies: String,

        /// Name of the cookie that remembers the visitor's locale.
        #[arg(long, env = "FOLIO_LOCALE_COOKIE", default_value = i18n::LOCALE_COOKIE)]
        locale_cookie: String,

        /// Theme rendered before the visitor's preference is known.
        #[arg(long, env = "FOLIO_DEFAULT_THEME", default_value = "light")]
        default_theme: Theme,

        /// Email relay submission endpoint.
        #[arg(long, env = "FOLIO_RELAY_ENDPOINT", default_value = DEFAULT_RELAY_ENDPOINT)]
        relay_endpoint: String,

        /// Access key sent with every relay submission.
        #[arg(long, env = "FOLIO_RELAY_ACCESS_KEY", hide_env_values = true)]
        relay_access_key: String,

        /// Upper bound, in seconds, on one relay call.
        #[arg(long, env = "FOLIO_RELAY_TIMEOUT_SECS", default_value_t = 10)]
        relay_timeout_secs: u64,
    },

    /// Show or toggle the stored light/dark preference.
    Theme {
        /// Directory holding the preferences file.
        #[arg(long, env = "FOLIO_DATA_DIR", default_value = "data")]
        data_dir: String,

        /// Flip the preference and persist it.
        #[arg(short, long)]
        toggle: bool,
    },

    /// Export the portfolio content.
    Export {
        /// Output format: text or json.
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Locale of the text export (defaults to FOLIO_LANG / system).
        #[arg(short, long)]
        locale: Option<Locale>,

        /// Write output to a file instead of stdout.
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            host,
            base_locale,
            strategies,
            locale_cookie,
            default_theme,
            relay_endpoint,
            relay_access_key,
            relay_timeout_secs,
        } => {
            let strategies = parse_strategies(&strategies)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
            let config = SiteConfig {
                host,
                port,
                base_locale,
                strategies,
                locale_cookie,
                default_theme,
                relay: relay_config(relay_endpoint, relay_access_key, relay_timeout_secs),
            };
            run_server(config).await
        }
        Commands::Theme { data_dir, toggle } => {
            run_theme(&data_dir, toggle);
            Ok(())
        }
        Commands::Export {
            format,
            locale,
            output,
        } => {
            let fmt = export::ExportFormat::from_str(&format)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
            let locale = locale.unwrap_or_else(|| i18n::detect_system_locale(Locale::default()));

            export::run_export(fmt, locale, output.as_deref()).map_err(std::io::Error::other)
        }
    }
}

/// Prints the stored theme, toggling it first if asked.
fn run_theme(data_dir: &str, toggle: bool) {
    let path = PathBuf::from(data_dir).join("preferences.json");
    let document = ClassList::default();
    let mut store = ThemeStore::new(
        Rc::new(FileStorage::new(&path)),
        Rc::new(document.clone()),
        Theme::default(),
    );

    if toggle {
        let current = store.toggle();
        log::info!("Theme switched to {} ({})", current, path.display());
    }

    println!("{}", store.get());
    if document.contains(theme::DARK_CLASS) {
        println!("<html class=\"{}\">", document.to_attr());
    }
}

/// Starts the HTTP server with all routes and Swagger UI.
async fn run_server(config: SiteConfig) -> std::io::Result<()> {
    let openapi = ApiDoc::openapi();

    let catalog = Catalog::load().map_err(std::io::Error::other)?;
    let relay = MailRelay::new(config.relay.clone()).map_err(std::io::Error::other)?;

    let resolver = web::Data::new(config.locale_resolver());
    let state = web::Data::new(AppState {
        catalog,
        relay,
        default_theme: config.default_theme,
    });

    let host = config.host.as_str();
    let port = config.port;

    log::info!("Starting folio server on {}:{}", host, port);
    log::info!(
        "Base locale: {}, strategies: {:?}, cookie: {}",
        resolver.base(),
        resolver.strategies(),
        resolver.cookie_name()
    );
    log::info!("Contact relay: {}", state.relay.endpoint());
    log::info!("Swagger UI available at http://{}:{}/swagger-ui/", host, port);

    HttpServer::new(move || {
        // The JSON API may be called from other origins
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(from_fn(middleware::negotiate_locale))
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(resolver.clone())
            .configure(api::configure_routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            .default_service(web::to(api::not_found_page))
    })
    .bind((host, port))?
    .run()
    .await
}
