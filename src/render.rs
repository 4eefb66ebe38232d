//! Server-side HTML rendering.
//!
//! Pages are built from the embedded `app.html` shell. The shell's `%lang%`
//! token is left in place: the locale middleware fills it on the way out,
//! once the response is known to be HTML.

use rust_embed::RustEmbed;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::catalog::Catalog;
use crate::contact::ContactForm;
use crate::i18n::{Locale, localize_path, switcher_path, tr};
use crate::theme::{ClassList, Theme, apply_theme};

/// Files compiled into the binary: page shell, stylesheet, content.
#[derive(RustEmbed)]
#[folder = "assets/"]
#[exclude = "*.tmp"]
pub struct Assets;

const SHELL_FILE: &str = "app.html";
const TITLE_TOKEN: &str = "%folio.title%";
const THEME_TOKEN: &str = "%folio.theme%";
const BODY_TOKEN: &str = "%folio.body%";

/// Fallback shell when the embedded one is missing.
const MINIMAL_SHELL: &str = "<!doctype html><html lang=\"%lang%\" class=\"%folio.theme%\">\
<head><meta charset=\"utf-8\"><title>%folio.title%</title></head>\
<body>%folio.body%</body></html>";

/// Navigation entries: canonical path and message key.
const NAV: &[(&str, &str)] = &[
    ("/", "nav.home"),
    ("/about", "nav.about"),
    ("/experience", "nav.experience"),
    ("/projects", "nav.projects"),
    ("/skills", "nav.skills"),
    ("/contact", "nav.contact"),
];

/// Per-request rendering inputs.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub locale: Locale,
    pub base: Locale,
    /// Locale-free path of the page being rendered.
    pub canonical_path: String,
    pub default_theme: Theme,
}

impl PageContext {
    fn t(&self, key: &str) -> String {
        tr(key, self.locale)
    }

    fn link(&self, canonical: &str) -> String {
        localize_path(canonical, self.locale, self.base)
    }

    /// Root classes for the initial render.
    ///
    /// The server has no access to the visitor's stored preference, so only
    /// the configured default is applied, with the same markers the theme
    /// store sets.
    fn theme_classes(&self) -> String {
        let document = ClassList::default();
        apply_theme(&document, self.default_theme);
        document.to_attr()
    }
}

/// State of the contact page after a submission.
#[derive(Debug, Clone, Default)]
pub struct ContactView {
    pub form: ContactForm,
    pub errors: BTreeMap<String, String>,
    pub sent: bool,
}

/// Escapes text for HTML element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn shell() -> String {
    Assets::get(SHELL_FILE)
        .and_then(|f| String::from_utf8(f.data.into_owned()).ok())
        .unwrap_or_else(|| MINIMAL_SHELL.to_string())
}

/// Wraps `body` in the page shell. `%lang%` is left for the middleware.
fn page(ctx: &PageContext, title: &str, body: &str) -> String {
    let mut html = String::new();
    html.push_str(&header(ctx));
    html.push_str("<main>");
    html.push_str(body);
    html.push_str("</main>");
    let _ = write!(
        html,
        "<footer><p>{}</p></footer>",
        escape_html(&ctx.t("footer.rights"))
    );

    shell()
        .replacen(TITLE_TOKEN, &escape_html(title), 1)
        .replacen(THEME_TOKEN, &ctx.theme_classes(), 1)
        .replacen(BODY_TOKEN, &html, 1)
}

fn header(ctx: &PageContext) -> String {
    let mut out = String::from("<header><nav>");
    for (path, key) in NAV {
        let current = if *path == ctx.canonical_path {
            " aria-current=\"page\""
        } else {
            ""
        };
        let _ = write!(
            out,
            "<a href=\"{}\"{}>{}</a>",
            escape_html(&ctx.link(path)),
            current,
            escape_html(&ctx.t(key))
        );
    }
    out.push_str("</nav><ul class=\"languages\">");
    for locale in Locale::ALL {
        let _ = write!(
            out,
            "<li><a href=\"{}\" hreflang=\"{}\">{}</a></li>",
            escape_html(&switcher_path(&ctx.canonical_path, locale)),
            locale,
            locale.as_str().to_uppercase()
        );
    }
    out.push_str("</ul></header>");
    out
}

fn tags(items: &[String]) -> String {
    let mut out = String::from("<ul class=\"tags\">");
    for item in items {
        let _ = write!(out, "<li>{}</li>", escape_html(item));
    }
    out.push_str("</ul>");
    out
}

fn years(start: &str, end: Option<&str>, ctx: &PageContext) -> String {
    let end = end.map(str::to_string).unwrap_or_else(|| ctx.t("work.present"));
    format!("{} – {}", escape_html(start), escape_html(&end))
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

pub fn home(ctx: &PageContext, catalog: &Catalog) -> String {
    let profile = &catalog.profile;
    let mut body = String::new();
    let _ = write!(
        body,
        "<section class=\"hero\" data-scroll>\
         <img src=\"{photo}\" alt=\"{name}\">\
         <h1>{name}</h1><h2>{title}</h2><p>{location}</p>\
         <p>{summary}</p>\
         <a class=\"button\" href=\"{cv_href}\" download>{cv}</a>\
         <a href=\"{github}\">GitHub</a> <a href=\"{linkedin}\">LinkedIn</a>\
         </section>",
        photo = escape_html(&profile.photo),
        name = escape_html(&profile.name),
        title = escape_html(&ctx.t(&profile.title_key)),
        location = escape_html(&profile.location),
        summary = escape_html(profile.summary_in(ctx.locale)),
        cv_href = escape_html(&ctx.link("/cv")),
        cv = escape_html(&ctx.t(&profile.cv_key)),
        github = escape_html(&profile.github),
        linkedin = escape_html(&profile.linkedin),
    );

    let _ = write!(
        body,
        "<section data-scroll><h2>{}</h2><ul class=\"technologies\">",
        escape_html(&ctx.t("home.technologies"))
    );
    for tech in &catalog.technologies {
        let _ = write!(
            body,
            "<li><img src=\"{}\" alt=\"\"><span>{}</span><small>{}</small></li>",
            escape_html(&tech.logo),
            escape_html(&tech.name),
            escape_html(&ctx.t(&tech.level_key))
        );
    }
    body.push_str("</ul></section>");

    page(ctx, &profile.name, &body)
}

pub fn about(ctx: &PageContext, catalog: &Catalog) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<section data-scroll><h1>{}</h1><p>{}</p></section>",
        escape_html(&ctx.t("about.title")),
        escape_html(catalog.profile.summary_in(ctx.locale))
    );

    let _ = write!(
        body,
        "<section data-scroll><h2>{}</h2>",
        escape_html(&ctx.t("education.title"))
    );
    for edu in &catalog.education {
        let _ = write!(
            body,
            "<article><h3>{}</h3><p>{}</p><p class=\"period\">{}</p><p>{}</p></article>",
            escape_html(&ctx.t(&edu.degree_key)),
            escape_html(&edu.institution),
            years(&edu.start_year, edu.end_year.as_deref(), ctx),
            escape_html(&ctx.t(&edu.description_key))
        );
    }
    body.push_str("</section>");

    let skills = &catalog.skills;
    for (title_key, keys) in [
        ("skills.soft.title", &skills.soft),
        ("skills.hobbies.title", &skills.hobbies),
    ] {
        let items: Vec<String> = keys.iter().map(|k| ctx.t(k)).collect();
        let _ = write!(
            body,
            "<section data-scroll><h2>{}</h2>{}</section>",
            escape_html(&ctx.t(title_key)),
            tags(&items)
        );
    }

    page(ctx, &ctx.t("about.title"), &body)
}

pub fn experience(ctx: &PageContext, catalog: &Catalog) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<h1>{}</h1><ol class=\"timeline\">",
        escape_html(&ctx.t("work.title"))
    );
    for job in catalog.timeline() {
        let _ = write!(
            body,
            "<li data-scroll><h2>{}</h2><h3>{}</h3><p class=\"period\">{}</p><p>{}</p>{}</li>",
            escape_html(&ctx.t(&job.position_key)),
            escape_html(&job.company),
            years(&job.start_year, job.end_year.as_deref(), ctx),
            escape_html(&ctx.t(&job.description_key)),
            tags(&job.technologies)
        );
    }
    body.push_str("</ol>");

    page(ctx, &ctx.t("work.title"), &body)
}

pub fn projects(ctx: &PageContext, catalog: &Catalog) -> String {
    let mut body = String::new();
    let _ = write!(body, "<h1>{}</h1>", escape_html(&ctx.t("projects.title")));
    for project in catalog.projects_by_date() {
        let name = ctx.t(&project.name_key);
        let _ = write!(
            body,
            "<article id=\"{}\" data-scroll><h2>{}</h2><time datetime=\"{date}\">{date}</time><p>{}</p>",
            escape_html(&project.id),
            escape_html(&name),
            escape_html(&ctx.t(&project.description_key)),
            date = escape_html(&project.date),
        );
        for image in &project.images {
            let _ = write!(
                body,
                "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
                escape_html(image),
                escape_html(&name)
            );
        }
        body.push_str(&tags(&project.technologies));
        if let Some(url) = &project.live_url {
            let _ = write!(
                body,
                "<a href=\"{}\">{}</a> ",
                escape_html(url),
                escape_html(&ctx.t("projects.live"))
            );
        }
        if let Some(url) = &project.github_url {
            let _ = write!(
                body,
                "<a href=\"{}\">{}</a>",
                escape_html(url),
                escape_html(&ctx.t("projects.code"))
            );
        }
        body.push_str("</article>");
    }

    page(ctx, &ctx.t("projects.title"), &body)
}

pub fn skills(ctx: &PageContext, catalog: &Catalog) -> String {
    let skills = &catalog.skills;
    let mut body = String::new();
    let _ = write!(body, "<h1>{}</h1>", escape_html(&ctx.t("skills.title")));

    for (title_key, list) in [
        ("skills.technical.title", &skills.technical),
        ("skills.languages.title", &skills.languages),
    ] {
        let _ = write!(
            body,
            "<section data-scroll><h2>{}</h2><dl>",
            escape_html(&ctx.t(title_key))
        );
        for skill in list {
            let _ = write!(
                body,
                "<dt>{}</dt><dd>{}</dd>",
                escape_html(&ctx.t(&skill.name_key)),
                escape_html(&ctx.t(&skill.level_key))
            );
        }
        body.push_str("</dl></section>");
    }

    let _ = write!(
        body,
        "<section data-scroll><h2>{}</h2><ul class=\"certificates\">",
        escape_html(&ctx.t("certificates.title"))
    );
    for cert in &skills.certificates {
        let _ = write!(
            body,
            "<li><strong>{}</strong> <span>{}</span> <time>{}</time></li>",
            escape_html(&ctx.t(&cert.name_key)),
            escape_html(&ctx.t(&cert.issuer_key)),
            escape_html(&cert.date)
        );
    }
    body.push_str("</ul></section>");

    page(ctx, &ctx.t("skills.title"), &body)
}

pub fn contact(ctx: &PageContext, view: &ContactView) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<h1>{}</h1><p>{}</p>",
        escape_html(&ctx.t("contact.title")),
        escape_html(&ctx.t("contact.intro"))
    );

    if view.sent {
        let _ = write!(
            body,
            "<p class=\"notice success\" role=\"status\">{}</p>",
            escape_html(&ctx.t("contact.success_message"))
        );
    }
    if let Some(general) = view.errors.get(crate::contact::GENERAL_ERROR) {
        let _ = write!(
            body,
            "<p class=\"notice error\" role=\"alert\">{}</p>",
            escape_html(general)
        );
    }

    let _ = write!(
        body,
        "<form method=\"post\" action=\"{}\" novalidate>",
        escape_html(&ctx.link("/contact"))
    );
    for (field, value, multiline) in [
        ("name", &view.form.name, false),
        ("email", &view.form.email, false),
        ("message", &view.form.message, true),
    ] {
        let _ = write!(
            body,
            "<label for=\"{field}\">{}</label>",
            escape_html(&ctx.t(&format!("contact.{}", field)))
        );
        if multiline {
            let _ = write!(
                body,
                "<textarea id=\"{field}\" name=\"{field}\" rows=\"6\">{}</textarea>",
                escape_html(value)
            );
        } else {
            let _ = write!(
                body,
                "<input id=\"{field}\" name=\"{field}\" type=\"{}\" value=\"{}\">",
                if field == "email" { "email" } else { "text" },
                escape_html(value)
            );
        }
        if let Some(message) = view.errors.get(field) {
            let _ = write!(
                body,
                "<p class=\"field-error\">{}</p>",
                escape_html(message)
            );
        }
    }
    let _ = write!(
        body,
        "<button type=\"submit\">{}</button></form>",
        escape_html(&ctx.t("contact.send"))
    );

    page(ctx, &ctx.t("contact.title"), &body)
}

pub fn not_found(ctx: &PageContext) -> String {
    let body = format!(
        "<h1>404</h1><p>{}</p><a href=\"{}\">{}</a>",
        escape_html(&ctx.t("errors.not_found")),
        escape_html(&ctx.link("/")),
        escape_html(&ctx.t("nav.home"))
    );
    page(ctx, &ctx.t("errors.not_found"), &body)
}
