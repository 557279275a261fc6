//! Design token trees for varitoken
//!
//! Builds one DTCG-style token document per display mode from the records
//! produced by `varitoken-ingest-csv`:
//! - token paths are normalized from `/`- and `.`-separated groups and names
//! - leaves carry a `$type` and a coerced `$value` (hex colors, numbers)
//! - variable-to-variable aliases are rewritten into `{dotted.path}`
//!   references through a global id index, across modes
//!
//! ```text
//!  CSV text ──► Record* ──► IdIndex ─────────────┐
//!                   │                            ▼
//!                   └────► ModeTree per mode ──► resolve ──► JSON per mode
//! ```
//!
//! Output is deterministic: groups, tokens and modes keep first-seen order.

use thiserror::Error;
use varitoken_ingest_csv::{ingest_csv_with, IngestError};

pub mod builder;
pub mod config;
pub mod document;
pub mod index;
pub mod node;
pub mod path;
pub mod resolve;
pub mod value;

pub use builder::{build_token_set, BuildReport, Diagnostic, ModeStats, TokenSet};
pub use config::{ConfigError, ConvertConfig};
pub use document::{mode_slug, render_documents, DocumentError, Manifest, ModeDocument};
pub use index::IdIndex;
pub use node::{Group, Leaf, ModeTree, TokenNode, TreeError};
pub use path::TokenPath;
pub use value::{Alias, LeafValue, Literal};

/// A finished conversion: the resolved trees and their rendered documents.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub token_set: TokenSet,
    pub documents: Vec<ModeDocument>,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("strict mode: {} problem(s) found in the export", .diagnostics.len())]
    Strict { diagnostics: Vec<Diagnostic> },
}

/// Run the whole pipeline on a variables export.
///
/// Rows dropped by the ingestor are reported first among the diagnostics. In
/// strict mode any diagnostic fails the conversion before documents are
/// rendered.
pub fn convert_csv(text: &str, config: &ConvertConfig) -> Result<Conversion, ConvertError> {
    config.validate()?;
    let ingested = ingest_csv_with(text, &config.ingest_options())?;

    let mut token_set = build_token_set(&ingested.records, config);
    token_set.report.diagnostics.splice(
        0..0,
        ingested.skipped.into_iter().map(Diagnostic::SkippedRow),
    );

    if config.strict && !token_set.report.is_clean() {
        return Err(ConvertError::Strict {
            diagnostics: token_set.report.diagnostics,
        });
    }

    let documents = render_documents(&token_set, config)?;
    Ok(Conversion {
        token_set,
        documents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
Collection,Mode,Group,Name,Type,Value,ID
Primitives,Light,colors/brand,primary,color,D73F09FF,1:1
Primitives,Light,,,color,ffffff,1:9
Tokens,Light,surface,accent,color,type:VARIABLE_ALIAS id:VariableID:1:1,2:1
";

    #[test]
    fn convert_reports_skipped_rows_first() {
        let conversion = convert_csv(EXPORT, &ConvertConfig::default()).unwrap();
        let diagnostics = &conversion.token_set.report.diagnostics;
        assert!(matches!(diagnostics.as_slice(), [Diagnostic::SkippedRow(row)] if row.line == 3));
        assert_eq!(conversion.documents.len(), 1);
    }

    #[test]
    fn strict_mode_fails_on_any_diagnostic() {
        let config = ConvertConfig {
            strict: true,
            ..ConvertConfig::default()
        };
        match convert_csv(EXPORT, &config) {
            Err(ConvertError::Strict { diagnostics }) => assert_eq!(diagnostics.len(), 1),
            other => panic!("expected strict failure, got {other:?}"),
        }
    }

    #[test]
    fn invalid_config_is_rejected_before_parsing() {
        let config = ConvertConfig {
            file_suffix: ".txt".to_string(),
            ..ConvertConfig::default()
        };
        assert!(matches!(
            convert_csv("not,a,valid\"csv", &config),
            Err(ConvertError::Config(_))
        ));
    }
}
