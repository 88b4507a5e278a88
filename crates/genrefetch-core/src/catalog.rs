//! Genre catalog: the collections to acquire, loaded once per run.
//!
//! The on-disk format is JSON:
//!
//! ```json
//! { "genres": { "jazz": { "search_terms": ["bebop", "cool jazz"], "count": 100 } } }
//! ```
//!
//! Genre order in the file is the order collections are processed in.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("genre {name:?}: {source}")]
    Entry {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown genre {0:?}")]
    UnknownGenre(String),
    #[error("genre name {0:?} is not a plain directory name")]
    InvalidName(String),
}

/// One named collection with its ordered search terms and target count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSpec {
    pub name: String,
    pub search_terms: Vec<String>,
    pub target_count: u32,
}

#[derive(Debug, Deserialize)]
struct GenreEntry {
    #[serde(default)]
    search_terms: Vec<String>,
    count: u32,
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    genres: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    collections: Vec<CollectionSpec>,
}

impl Catalog {
    pub fn new(collections: Vec<CollectionSpec>) -> Self {
        Self { collections }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        let mut collections = Vec::with_capacity(raw.genres.len());
        for (name, value) in raw.genres {
            if !is_plain_name(&name) {
                return Err(CatalogError::InvalidName(name));
            }
            let entry: GenreEntry =
                serde_json::from_value(value).map_err(|source| CatalogError::Entry {
                    name: name.clone(),
                    source,
                })?;
            if entry.search_terms.is_empty() && entry.count > 0 {
                tracing::warn!(genre = %name, count = entry.count, "genre has no search terms");
            }
            collections.push(CollectionSpec {
                name,
                search_terms: entry.search_terms,
                target_count: entry.count,
            });
        }
        Ok(Self { collections })
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let data = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    pub fn collections(&self) -> &[CollectionSpec] {
        &self.collections
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Restricts the catalog to `names`, keeping catalog order.
    /// An empty `names` keeps everything.
    pub fn select(&self, names: &[String]) -> Result<Catalog, CatalogError> {
        if names.is_empty() {
            return Ok(self.clone());
        }
        if let Some(unknown) = names
            .iter()
            .find(|n| !self.collections.iter().any(|c| &c.name == *n))
        {
            return Err(CatalogError::UnknownGenre(unknown.clone()));
        }
        let collections = self
            .collections
            .iter()
            .filter(|c| names.contains(&c.name))
            .cloned()
            .collect();
        Ok(Catalog { collections })
    }
}

/// A single normal path component, so `<base>/<name>` stays inside `<base>`.
fn is_plain_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut parts = Path::new(name).components();
    matches!((parts.next(), parts.next()), (Some(Component::Normal(_)), None))
}

/// Creates `<base>/<genre>` for every collection. Returns the created paths.
pub fn create_collection_dirs(base: &Path, catalog: &Catalog) -> std::io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::with_capacity(catalog.collections.len());
    for c in &catalog.collections {
        let dir = base.join(&c.name);
        fs::create_dir_all(&dir)?;
        dirs.push(dir);
    }
    Ok(dirs)
}
