//! Static portfolio content.
//!
//! The catalog is embedded into the binary (`assets/portfolio.json`) and
//! parsed once at start-up. Translatable text is stored as message keys
//! (resolved with [`crate::i18n::tr`]) except the profile summary, which
//! carries one text per locale.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::i18n::Locale;
use crate::render::Assets;

/// Name of the embedded content file.
const CATALOG_FILE: &str = "portfolio.json";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("embedded asset '{0}' is missing")]
    Missing(&'static str),
    #[error("invalid portfolio content: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Catalog {
    pub profile: Profile,
    pub technologies: Vec<Technology>,
    pub work_experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub skills: Skills,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub name: String,
    pub title_key: String,
    pub photo: String,
    pub email: String,
    pub location: String,
    pub github: String,
    pub linkedin: String,
    #[schema(value_type = Object)]
    pub summary: BTreeMap<Locale, String>,
    pub cv_key: String,
}

impl Profile {
    /// Summary in `locale`, or in any available locale if missing.
    pub fn summary_in(&self, locale: Locale) -> &str {
        self.summary
            .get(&locale)
            .or_else(|| self.summary.values().next())
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Technology {
    pub name: String,
    pub logo: String,
    pub level_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkExperience {
    pub id: u32,
    pub company: String,
    pub position_key: String,
    pub description_key: String,
    pub start_year: String,
    /// `None` means the position is current.
    pub end_year: Option<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Education {
    pub id: u32,
    pub institution: String,
    pub degree_key: String,
    pub description_key: String,
    pub start_year: String,
    pub end_year: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: String,
    pub name_key: String,
    pub description_key: String,
    pub images: Vec<String>,
    pub technologies: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Skill {
    pub name_key: String,
    pub level_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Certificate {
    pub name_key: String,
    pub issuer_key: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Skills {
    pub technical: Vec<Skill>,
    pub languages: Vec<Skill>,
    /// Message keys.
    pub soft: Vec<String>,
    /// Message keys.
    pub hobbies: Vec<String>,
    pub certificates: Vec<Certificate>,
}

impl Catalog {
    /// Parses the embedded portfolio content.
    pub fn load() -> Result<Self, CatalogError> {
        let file = Assets::get(CATALOG_FILE).ok_or(CatalogError::Missing(CATALOG_FILE))?;
        Self::from_json(&file.data)
    }

    pub fn from_json(data: &[u8]) -> Result<Self, CatalogError> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Work history, most recent first.
    ///
    /// Current positions (no end year) sort before finished ones; ties are
    /// broken by start year, then by id.
    pub fn timeline(&self) -> Vec<&WorkExperience> {
        let mut entries: Vec<&WorkExperience> = self.work_experience.iter().collect();
        entries.sort_by(|a, b| {
            end_key(b.end_year.as_deref())
                .cmp(&end_key(a.end_year.as_deref()))
                .then_with(|| b.start_year.cmp(&a.start_year))
                .then_with(|| a.id.cmp(&b.id))
        });
        entries
    }

    /// Projects, newest first.
    pub fn projects_by_date(&self) -> Vec<&Project> {
        let mut projects: Vec<&Project> = self.projects.iter().collect();
        projects.sort_by(|a, b| b.date.cmp(&a.date));
        projects
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }
}

fn end_key(end_year: Option<&str>) -> (bool, &str) {
    match end_year {
        None => (true, ""),
        Some(year) => (false, year),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = Catalog::load().unwrap();
        assert_eq!(catalog.profile.name, "Amle Martinez Marte");
        assert!(!catalog.technologies.is_empty());
        assert!(catalog.profile.summary_in(Locale::En).starts_with("Junior Backend"));
        assert!(catalog.profile.summary_in(Locale::Es).starts_with("Desarrollador"));
        assert_eq!(catalog.skills.certificates.len(), 7);
    }

    #[test]
    fn test_referenced_static_files_are_embedded() {
        let catalog = Catalog::load().unwrap();
        let urls = std::iter::once(&catalog.profile.photo)
            .chain(catalog.technologies.iter().map(|t| &t.logo))
            .chain(catalog.projects.iter().flat_map(|p| &p.images));

        for url in urls {
            let path = url.strip_prefix("/static/").unwrap_or(url);
            assert!(Assets::get(path).is_some(), "{} is not embedded", url);
        }
    }

    #[test]
    fn test_projects_by_date_newest_first() {
        let catalog = Catalog::load().unwrap();
        let dates: Vec<&str> = catalog
            .projects_by_date()
            .iter()
            .map(|p| p.date.as_str())
            .collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
        assert_eq!(dates[0], "2025-05-24");
    }

    #[test]
    fn test_timeline_puts_current_position_first() {
        let json = br#"{
            "profile": {"name": "n", "title_key": "t", "photo": "p", "email": "e",
                        "location": "l", "github": "g", "linkedin": "li",
                        "summary": {"en": "hello"}, "cv_key": "cv"},
            "technologies": [],
            "work_experience": [
                {"id": 1, "company": "Old", "position_key": "a", "description_key": "b",
                 "start_year": "2018", "end_year": "2020", "technologies": []},
                {"id": 2, "company": "Now", "position_key": "a", "description_key": "b",
                 "start_year": "2021", "end_year": null, "technologies": []},
                {"id": 3, "company": "Mid", "position_key": "a", "description_key": "b",
                 "start_year": "2020", "end_year": "2021", "technologies": []}
            ],
            "education": [],
            "projects": [],
            "skills": {"technical": [], "languages": [], "soft": [], "hobbies": [],
                       "certificates": []}
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        let order: Vec<&str> = catalog
            .timeline()
            .iter()
            .map(|w| w.company.as_str())
            .collect();
        assert_eq!(order, vec!["Now", "Mid", "Old"]);
        // Missing locale falls back to whatever summary exists.
        assert_eq!(catalog.profile.summary_in(Locale::Es), "hello");
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = Catalog::from_json(b"{\"profile\": 1}").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
