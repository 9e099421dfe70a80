//! Static subgenre catalog.
//!
//! The catalog ships as `public/data/subgenres.json`, which the server also
//! exposes as a static asset for the web client. The same file is embedded
//! at compile time so the CLI and `GET /api/subgenres` never depend on the
//! working directory.

use std::path::Path;

use crate::models::Subgenre;

const EMBEDDED_CATALOG: &str = include_str!("../public/data/subgenres.json");

/// Errors loading a catalog file
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ordered list of selectable subgenres
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<Subgenre>,
}

impl Catalog {
    /// Build a catalog from entries, keeping their order
    pub fn new(entries: Vec<Subgenre>) -> Self {
        Self { entries }
    }

    /// The catalog compiled into the binary
    pub fn embedded() -> Self {
        let entries = serde_json::from_str(EMBEDDED_CATALOG)
            .expect("embedded subgenre catalog is valid JSON");
        Self { entries }
    }

    /// Load a catalog from a JSON file of `{ "id", "name" }` objects
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self {
            entries: serde_json::from_str(&content)?,
        })
    }

    /// All entries in display order
    pub fn entries(&self) -> &[Subgenre] {
        &self.entries
    }

    /// Look up an entry by id
    pub fn get(&self, id: &str) -> Option<&Subgenre> {
        self.entries.iter().find(|s| s.id == id)
    }

    /// Resolve user input to an entry: exact id first, then a
    /// case-insensitive match on id or display name
    pub fn resolve(&self, input: &str) -> Option<&Subgenre> {
        let input = input.trim();
        self.get(input).or_else(|| {
            self.entries.iter().find(|s| {
                s.id.eq_ignore_ascii_case(input) || s.name.to_lowercase() == input.to_lowercase()
            })
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::embedded()
    }
}
