//! Catalog export for the command line.
//!
//! Prints the portfolio content in one locale, either as a readable text
//! résumé or as the raw catalog JSON.
//!
//! # Supported Formats
//!
//! - **text**: Colored, human-readable résumé with every message resolved.
//!   Written without escape codes when going to a file or over HTTP.
//! - **json**: The catalog as pretty-printed JSON (message keys intact).

use colored::Colorize;
use regex::Regex;
use std::sync::LazyLock;

use crate::catalog::Catalog;
use crate::i18n::{Locale, tr};

// ---------------------------------------------------------------------------
// Export format enum
// ---------------------------------------------------------------------------

/// Output format for catalog exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Human-readable résumé.
    Text,
    /// Full catalog as pretty-printed JSON.
    Json,
}

impl ExportFormat {
    /// Parses a format string (case-insensitive).
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown export format '{}'. Valid: text, json", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Text format
// ---------------------------------------------------------------------------

fn heading(out: &mut String, title: &str) {
    out.push('\n');
    out.push_str(&format!("{}\n", title.to_uppercase().yellow().bold()));
    out.push_str(&format!("{}\n", "─".repeat(60).dimmed()));
}

fn period(start: &str, end: Option<&str>, locale: Locale) -> String {
    format!(
        "{} – {}",
        start,
        end.map(str::to_string)
            .unwrap_or_else(|| tr("work.present", locale))
    )
}

/// Formats the catalog as a résumé in `locale`.
pub fn format_text(catalog: &Catalog, locale: Locale) -> String {
    let t = |key: &str| tr(key, locale);
    let profile = &catalog.profile;
    let mut out = String::new();

    // ── Header ──────────────────────────────────────────────
    out.push_str(&format!("{}\n", profile.name.bold()));
    out.push_str(&format!("{}\n", t(&profile.title_key).green()));
    out.push_str(&format!("{} · {}\n", profile.location, profile.email));
    out.push_str(&format!("{}\n{}\n", profile.github, profile.linkedin));
    out.push('\n');
    out.push_str(profile.summary_in(locale));
    out.push('\n');

    // ── Experience ──────────────────────────────────────────
    heading(&mut out, &t("work.title"));
    for job in catalog.timeline() {
        out.push_str(&format!(
            "  {} · {}  {}\n",
            t(&job.position_key).bold(),
            job.company,
            period(&job.start_year, job.end_year.as_deref(), locale).dimmed()
        ));
        out.push_str(&format!("    {}\n", t(&job.description_key)));
        out.push_str(&format!("    [{}]\n", job.technologies.join(", ")));
    }

    // ── Education ───────────────────────────────────────────
    heading(&mut out, &t("education.title"));
    for edu in &catalog.education {
        out.push_str(&format!(
            "  {} · {}  {}\n",
            t(&edu.degree_key).bold(),
            edu.institution,
            period(&edu.start_year, edu.end_year.as_deref(), locale).dimmed()
        ));
    }

    // ── Projects ────────────────────────────────────────────
    heading(&mut out, &t("projects.title"));
    for project in catalog.projects_by_date() {
        out.push_str(&format!(
            "  {}  {}\n",
            t(&project.name_key).bold(),
            project.date.dimmed()
        ));
        out.push_str(&format!("    {}\n", t(&project.description_key)));
        if let Some(url) = &project.live_url {
            out.push_str(&format!("    {}: {}\n", t("projects.live"), url));
        }
        if let Some(url) = &project.github_url {
            out.push_str(&format!("    {}: {}\n", t("projects.code"), url));
        }
    }

    // ── Skills ──────────────────────────────────────────────
    heading(&mut out, &t("skills.title"));
    for skill in catalog.skills.technical.iter().chain(&catalog.skills.languages) {
        out.push_str(&format!(
            "  {:<40} {}\n",
            t(&skill.name_key),
            t(&skill.level_key).cyan()
        ));
    }
    let technologies: Vec<&str> = catalog.technologies.iter().map(|t| t.name.as_str()).collect();
    out.push_str(&format!("\n  {}\n", technologies.join(" · ")));

    // ── Certificates ────────────────────────────────────────
    heading(&mut out, &t("certificates.title"));
    for cert in &catalog.skills.certificates {
        out.push_str(&format!(
            "  {}  {} ({})\n",
            cert.date.dimmed(),
            t(&cert.name_key),
            t(&cert.issuer_key)
        ));
    }

    out
}

/// SGR escape sequences emitted by `colored`.
static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI regex"));

/// The text résumé without terminal colors, for files and downloads.
///
/// `colored` decides per process whether to emit escapes, so they are
/// stripped here instead of toggling the global override.
pub fn format_plain(catalog: &Catalog, locale: Locale) -> String {
    ANSI_RE.replace_all(&format_text(catalog, locale), "").into_owned()
}

// ---------------------------------------------------------------------------
// JSON format
// ---------------------------------------------------------------------------

pub fn format_json(catalog: &Catalog) -> Result<String, String> {
    serde_json::to_string_pretty(catalog).map_err(|e| format!("JSON serialization failed: {}", e))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Runs `folio export`.
pub fn run_export(format: ExportFormat, locale: Locale, output: Option<&str>) -> Result<(), String> {
    let catalog = Catalog::load().map_err(|e| e.to_string())?;

    let content = match format {
        ExportFormat::Text if output.is_some() => format_plain(&catalog, locale),
        ExportFormat::Text => format_text(&catalog, locale),
        ExportFormat::Json => format_json(&catalog)?,
    };

    write_output(&content, output)
}

/// Writes output to stdout or a file.
fn write_output(content: &str, output_path: Option<&str>) -> Result<(), String> {
    match output_path {
        Some(path) => {
            std::fs::write(path, content)
                .map_err(|e| format!("Failed to write to '{}': {}", path, e))?;
            eprintln!("Written to: {}", path);
            Ok(())
        }
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!(ExportFormat::from_str("TXT"), Ok(ExportFormat::Text));
        assert_eq!(ExportFormat::from_str("json"), Ok(ExportFormat::Json));
        assert!(ExportFormat::from_str("pdf").is_err());
    }

    #[test]
    fn test_format_text_resolves_messages() {
        let catalog = Catalog::load().unwrap();
        let text = format_text(&catalog, Locale::En);

        assert!(text.contains("Amle Martinez Marte"));
        assert!(text.contains("Junior Backend Developer"));
        assert!(text.contains(&tr("projects.p1.name", Locale::En)));
        assert!(text.contains("Universidad de Alcalá"));
        assert!(!text.contains("projects.p1.name"));
    }

    #[test]
    fn test_format_plain_has_no_escapes() {
        colored::control::set_override(true);
        let catalog = Catalog::load().unwrap();
        let plain = format_plain(&catalog, Locale::En);
        colored::control::unset_override();

        assert!(!plain.contains('\u{1b}'));
        assert!(plain.contains("Junior Backend Developer"));
    }

    #[test]
    fn test_format_json_parseable() {
        let catalog = Catalog::load().unwrap();
        let json = format_json(&catalog).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["profile"]["summary"]["es"].is_string());
        assert_eq!(parsed["skills"]["certificates"].as_array().unwrap().len(), 7);
    }

    #[test]
    fn test_run_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.txt");
        run_export(ExportFormat::Text, Locale::Es, path.to_str()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Desarrollador Backend Junior"));
        assert!(!written.contains('\u{1b}'));
    }
}
