//! Records → per-mode token trees.
//!
//! The build runs in two passes over the input:
//!
//! 1. A fold over every record, in input order, that indexes variable ids
//!    ([`IdIndex`]) and inserts each record's leaf into its mode's tree.
//! 2. Alias resolution over every finished tree against the single,
//!    now-immutable index (so an alias may point at a token defined only
//!    under another mode).
//!
//! Data problems never abort the build; they are logged and collected as
//! [`Diagnostic`]s on the [`BuildReport`].

use indexmap::IndexMap;
use std::fmt;
use varitoken_ingest_csv::{Record, SkippedRow};

use crate::config::ConvertConfig;
use crate::index::IdIndex;
use crate::node::{Insertion, Leaf, ModeTree, TreeError};
use crate::path::TokenPath;
use crate::resolve::resolve_aliases;
use crate::value::{parse_value, LeafValue, Literal, ParsedValue};

// ============================================================================
// Report
// ============================================================================

/// A recoverable problem found while converting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Row dropped by the ingestor (no name or no value).
    SkippedRow(SkippedRow),
    /// Group and name normalized to zero segments.
    EmptyPath { line: u64, mode: String },
    /// The record's path clashes with the existing tree shape.
    PathConflict {
        line: u64,
        mode: String,
        error: TreeError,
    },
    /// Declared `number` but not numeric; kept as text.
    NotANumber {
        line: u64,
        mode: String,
        path: String,
        value: String,
    },
    /// Alias sentinel without a variable id; kept as text.
    MalformedAlias {
        line: u64,
        mode: String,
        path: String,
        value: String,
    },
    /// Alias id not found in any mode; raw value kept.
    UnresolvedAlias {
        mode: String,
        path: String,
        id: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SkippedRow(row) => write!(f, "line {}: row skipped ({})", row.line, row.reason),
            Diagnostic::EmptyPath { line, mode } => {
                write!(f, "line {line} [{mode}]: token path is empty")
            }
            Diagnostic::PathConflict { line, mode, error } => {
                write!(f, "line {line} [{mode}]: {error}")
            }
            Diagnostic::NotANumber {
                line,
                mode,
                path,
                value,
            } => write!(
                f,
                "line {line} [{mode}]: `{path}` is a number but `{value}` is not numeric"
            ),
            Diagnostic::MalformedAlias {
                line,
                mode,
                path,
                value,
            } => write!(f, "line {line} [{mode}]: `{path}` has an alias without an id: `{value}`"),
            Diagnostic::UnresolvedAlias { mode, path, id } => {
                write!(f, "[{mode}]: `{path}` references unknown variable `{id}`")
            }
        }
    }
}

/// Token counts for one mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeStats {
    pub mode: String,
    pub tokens: usize,
    pub aliases: usize,
    pub resolved_aliases: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Records consumed by the build.
    pub records: usize,
    /// Records that overwrote an earlier leaf at the same mode and path.
    pub replaced: usize,
    /// Rows per `Collection` value, in first-seen order.
    pub collections: IndexMap<String, usize>,
    pub modes: Vec<ModeStats>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ============================================================================
// Token set
// ============================================================================

/// Every mode's finished tree, plus the id index they were resolved against.
#[derive(Debug, Clone, Default)]
pub struct TokenSet {
    /// Mode name → tree, in order of first appearance.
    pub modes: IndexMap<String, ModeTree>,
    pub ids: IdIndex,
    pub report: BuildReport,
}

impl TokenSet {
    pub fn mode(&self, mode: &str) -> Option<&ModeTree> {
        self.modes.get(mode)
    }
}

/// Build and resolve the per-mode trees for `records`.
pub fn build_token_set(records: &[Record], config: &ConvertConfig) -> TokenSet {
    let ids = IdIndex::from_records(records, config.kebab_names);

    let mut report = BuildReport {
        records: records.len(),
        ..BuildReport::default()
    };
    let mut modes = records.iter().fold(IndexMap::new(), |mut modes, record| {
        insert_record(&mut modes, record, config, &mut report);
        modes
    });

    for (mode, tree) in modes.iter_mut() {
        let resolution = resolve_aliases(tree, &ids);
        report.modes.push(mode_stats(mode, tree, resolution.resolved));
        for unresolved in resolution.unresolved {
            tracing::warn!(
                mode = %mode,
                path = %unresolved.path,
                id = %unresolved.id,
                "alias references an unknown variable"
            );
            report.diagnostics.push(Diagnostic::UnresolvedAlias {
                mode: mode.clone(),
                path: unresolved.path,
                id: unresolved.id,
            });
        }
    }

    tracing::debug!(
        modes = modes.len(),
        ids = ids.len(),
        diagnostics = report.diagnostics.len(),
        "built token set"
    );
    TokenSet { modes, ids, report }
}

fn insert_record(
    modes: &mut IndexMap<String, ModeTree>,
    record: &Record,
    config: &ConvertConfig,
    report: &mut BuildReport,
) {
    if let Some(collection) = &record.collection {
        *report.collections.entry(collection.clone()).or_default() += 1;
    }

    // The mode exists as soon as one of its rows is seen, even if that row is
    // rejected below.
    let tree = modes.entry(record.mode.clone()).or_default();

    let path =
        TokenPath::from_group_and_name(record.group.as_deref(), &record.name, config.kebab_names);
    if path.is_empty() {
        tracing::warn!(line = record.line, mode = %record.mode, "token path is empty");
        report.diagnostics.push(Diagnostic::EmptyPath {
            line: record.line,
            mode: record.mode.clone(),
        });
        return;
    }

    let token_type = if record.token_type.is_empty() {
        config.default_type.clone()
    } else {
        record.token_type.clone()
    };

    let value = match parse_value(&record.value, &record.token_type) {
        ParsedValue::Literal(literal) => LeafValue::Literal(literal),
        ParsedValue::Alias(alias) => LeafValue::Alias(alias),
        ParsedValue::NotANumber(raw) => {
            tracing::warn!(line = record.line, path = %path, value = %raw, "number is not numeric");
            report.diagnostics.push(Diagnostic::NotANumber {
                line: record.line,
                mode: record.mode.clone(),
                path: path.dotted(),
                value: raw.clone(),
            });
            LeafValue::Literal(Literal::Text(raw))
        }
        ParsedValue::MalformedAlias(raw) => {
            tracing::warn!(line = record.line, path = %path, value = %raw, "alias has no variable id");
            report.diagnostics.push(Diagnostic::MalformedAlias {
                line: record.line,
                mode: record.mode.clone(),
                path: path.dotted(),
                value: raw.clone(),
            });
            LeafValue::Literal(Literal::Text(raw))
        }
    };

    // Only a declared type hints the parent group; a defaulted one does not.
    let hint = (!record.token_type.is_empty()).then_some(record.token_type.as_str());
    match tree.insert(&path, Leaf { token_type, value }, hint) {
        Ok(Insertion::Created) => {}
        Ok(Insertion::Replaced) => {
            tracing::debug!(line = record.line, mode = %record.mode, path = %path, "token overwritten");
            report.replaced += 1;
        }
        Err(error) => {
            tracing::warn!(line = record.line, mode = %record.mode, error = %error, "row rejected");
            report.diagnostics.push(Diagnostic::PathConflict {
                line: record.line,
                mode: record.mode.clone(),
                error,
            });
        }
    }
}

fn mode_stats(mode: &str, tree: &ModeTree, resolved_aliases: usize) -> ModeStats {
    let mut aliases = 0;
    tree.for_each_leaf(|_, leaf| {
        if leaf.value.as_alias().is_some() {
            aliases += 1;
        }
    });
    ModeStats {
        mode: mode.to_string(),
        tokens: tree.leaf_count(),
        aliases,
        resolved_aliases,
    }
}
