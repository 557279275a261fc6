//! Per-mode JSON documents.
//!
//! Each mode becomes one `<slug><suffix>` document (`Mode 1` →
//! `mode-1.tokens.json`). Documents are rendered in full before anything is
//! written, and two modes that would share a file name are an error.

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::builder::TokenSet;
use crate::config::ConvertConfig;
use crate::node::ModeTree;
use crate::path::kebab_case;

/// Slug used when a mode name has no alphanumeric characters.
pub const FALLBACK_SLUG: &str = "default";

/// File name of the optional manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeDocument {
    pub mode: String,
    pub slug: String,
    pub file_name: String,
    /// Pretty-printed JSON, two-space indented.
    pub json: String,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("modes `{first}` and `{second}` would both be written to `{file_name}`")]
    SlugCollision {
        first: String,
        second: String,
        file_name: String,
    },
    #[error("failed to serialize mode `{mode}`: {source}")]
    Serialize {
        mode: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Filesystem-safe form of a mode name.
pub fn mode_slug(mode: &str) -> String {
    let slug = kebab_case(mode);
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

pub fn render_tree(tree: &ModeTree) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tree)
}

/// Render one document per mode, in mode order.
pub fn render_documents(
    set: &TokenSet,
    config: &ConvertConfig,
) -> Result<Vec<ModeDocument>, DocumentError> {
    let mut owners: HashMap<String, &str> = HashMap::new();
    let mut documents = Vec::with_capacity(set.modes.len());

    for (mode, tree) in &set.modes {
        let slug = mode_slug(mode);
        let file_name = format!("{slug}{}", config.file_suffix);
        if let Some(first) = owners.insert(file_name.clone(), mode.as_str()) {
            return Err(DocumentError::SlugCollision {
                first: first.to_string(),
                second: mode.clone(),
                file_name,
            });
        }

        let json = render_tree(tree).map_err(|source| DocumentError::Serialize {
            mode: mode.clone(),
            source,
        })?;
        documents.push(ModeDocument {
            mode: mode.clone(),
            slug,
            file_name,
            json,
        });
    }

    Ok(documents)
}

// ============================================================================
// Manifest
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub mode: String,
    pub slug: String,
    pub file: String,
}

/// Mode → file listing for tooling that themes by mode slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub documents: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn from_documents(documents: &[ModeDocument]) -> Self {
        Self {
            documents: documents
                .iter()
                .map(|doc| ManifestEntry {
                    mode: doc.mode.clone(),
                    slug: doc.slug.clone(),
                    file: doc.file_name.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
