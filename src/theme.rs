//! Color theme preference.
//!
//! The theme lives in a [`Store`] seeded from persisted storage. A
//! subscriber installed at construction writes every value back to storage
//! and toggles the `dark` class on the document root. Both capabilities are
//! injected: the server renders with the no-op pair, so the in-memory value
//! still changes but nothing is persisted.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;

use crate::store::Store;

/// Storage key of the theme preference.
pub const THEME_KEY: &str = "theme";

/// Class placed on the document root while the dark theme is active.
pub const DARK_CLASS: &str = "dark";

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Unknown theme '{}'. Valid: light, dark", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Injected capabilities
// ---------------------------------------------------------------------------

/// Key/value storage that outlives the session.
pub trait PreferenceStorage {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Styling markers on the document root element.
pub trait DocumentRoot {
    fn set_class(&self, class: &str, present: bool);
}

/// Storage used where none exists (server-side render).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStorage;

impl PreferenceStorage for NoopStorage {
    fn load(&self, _key: &str) -> Option<String> {
        None
    }

    fn save(&self, _key: &str, _value: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Document used where none exists (server-side render).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDocument;

impl DocumentRoot for NoopDocument {
    fn set_class(&self, _class: &str, _present: bool) {}
}

/// In-memory storage, shared by clones.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        storage
    }
}

impl PreferenceStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by a JSON object on disk.
///
/// Every save rewrites the whole file through a temp file and a rename.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable preferences {}: {}", self.path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        }
    }
}

impl PreferenceStorage for FileStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn save(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.read_all();
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&entries).map_err(io::Error::other)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, data)?;
        fs::rename(&temp_path, &self.path)
    }
}

/// The class list of a document root, kept in memory.
///
/// The server reads it back to render the `<html class>` attribute.
#[derive(Debug, Default, Clone)]
pub struct ClassList {
    classes: Rc<RefCell<BTreeSet<String>>>,
}

impl ClassList {
    pub fn contains(&self, class: &str) -> bool {
        self.classes.borrow().contains(class)
    }

    /// Space-separated classes, suitable for a `class` attribute.
    pub fn to_attr(&self) -> String {
        self.classes
            .borrow()
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl DocumentRoot for ClassList {
    fn set_class(&self, class: &str, present: bool) {
        let mut classes = self.classes.borrow_mut();
        if present {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }
}

/// Sets the root markers for `theme`.
pub fn apply_theme(document: &dyn DocumentRoot, theme: Theme) {
    document.set_class(DARK_CLASS, theme == Theme::Dark);
}

// ---------------------------------------------------------------------------
// ThemeStore
// ---------------------------------------------------------------------------

/// The active theme plus its persistence side effects.
#[derive(Debug)]
pub struct ThemeStore {
    store: Store<Theme>,
}

impl ThemeStore {
    /// Seeds the theme from `storage` (falling back to `default` when the
    /// key is absent or invalid) and installs the sync subscriber.
    pub fn new(
        storage: Rc<dyn PreferenceStorage>,
        document: Rc<dyn DocumentRoot>,
        default: Theme,
    ) -> Self {
        let initial = storage
            .load(THEME_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default);

        let mut store = Store::new(initial);
        store.subscribe(move |theme: &Theme| {
            if let Err(e) = storage.save(THEME_KEY, theme.as_str()) {
                log::warn!("Failed to persist theme '{}': {}", theme, e);
            }
            apply_theme(&*document, *theme);
        });

        Self { store }
    }

    /// A store with no storage and no document, for server-side rendering.
    pub fn detached(default: Theme) -> Self {
        Self::new(Rc::new(NoopStorage), Rc::new(NoopDocument), default)
    }

    pub fn get(&self) -> Theme {
        *self.store.get()
    }

    /// Flips light and dark.
    pub fn toggle(&mut self) -> Theme {
        self.store.update(|t| *t = t.toggled());
        self.get()
    }

    /// Observes theme changes; `f` runs immediately with the current value.
    pub fn subscribe(&mut self, f: impl FnMut(&Theme) + 'static) -> crate::store::SubscriptionId {
        self.store.subscribe(f)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
