//! Variables-export CSV ingestion for varitoken
//!
//! Turns a design tool's variables export (one row per variable per mode) into
//! normalized [`Record`]s:
//! - header cells are trimmed; lookup is case-sensitive on the declared names
//! - every field is trimmed and `Type` is lowercased
//! - `Mode` falls back to `"Default"` when the column or cell is empty
//! - blank lines are skipped; rows without a `Name` or `Value` are reported as
//!   [`SkippedRow`]s instead of records
//!
//! Structural problems (ragged rows, an unterminated quoted field) are fatal:
//! the ingestor never returns a partial record set.

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;

/// Mode assigned to rows that don't name one.
pub const DEFAULT_MODE: &str = "Default";

/// Header names recognized in the export.
pub mod columns {
    pub const COLLECTION: &str = "Collection";
    pub const GROUP: &str = "Group";
    pub const NAME: &str = "Name";
    pub const TYPE: &str = "Type";
    pub const MODE: &str = "Mode";
    pub const VALUE: &str = "Value";
    pub const ID: &str = "ID";
}

// ============================================================================
// Records
// ============================================================================

/// One normalized variable row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub collection: Option<String>,
    pub group: Option<String>,
    pub name: String,
    /// Lowercased; empty when the row has no type.
    pub token_type: String,
    pub mode: String,
    pub value: String,
    pub id: Option<String>,
    /// 1-based line of the row in the source text.
    pub line: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingName,
    MissingValue,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingName => write!(f, "missing name"),
            SkipReason::MissingValue => write!(f, "missing value"),
        }
    }
}

/// A data row that was dropped during ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: SkipReason,
}

/// Ingestion result: records in input order plus the rows that were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ingested {
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Mode used when a row has no `Mode` value.
    pub default_mode: String,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            default_mode: DEFAULT_MODE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("input has no header row")]
    MissingHeader,
    #[error("header is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("line {line}: expected {expected} fields, found {found}")]
    ColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: quoted field is never closed")]
    UnterminatedQuote { line: u64 },
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse an export with the default options.
pub fn ingest_csv(text: &str) -> Result<Ingested, IngestError> {
    ingest_csv_with(text, &IngestOptions::default())
}

/// Parse an export into normalized records.
pub fn ingest_csv_with(text: &str, options: &IngestOptions) -> Result<Ingested, IngestError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    ensure_quotes_closed(text)?;

    // Column counts are checked by hand so whitespace-only lines can be skipped
    // instead of tripping the reader's own length check.
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::MissingHeader);
    }
    let layout = ColumnLayout::locate(&headers)?;

    let mut ingested = Ingested::default();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        if is_blank(&row) {
            continue;
        }
        if row.len() != headers.len() {
            return Err(IngestError::ColumnCount {
                line,
                expected: headers.len(),
                found: row.len(),
            });
        }

        match layout.record(&row, line, options) {
            Ok(record) => ingested.records.push(record),
            Err(reason) => {
                tracing::warn!(line, reason = %reason, "skipping variable row");
                ingested.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    tracing::debug!(
        records = ingested.records.len(),
        skipped = ingested.skipped.len(),
        "ingested variables export"
    );
    Ok(ingested)
}

fn is_blank(row: &StringRecord) -> bool {
    row.len() <= 1 && row.iter().all(|f| f.trim().is_empty())
}

/// Header positions of the recognized columns.
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    collection: Option<usize>,
    group: Option<usize>,
    name: usize,
    token_type: Option<usize>,
    mode: Option<usize>,
    value: usize,
    id: Option<usize>,
}

impl ColumnLayout {
    fn locate(headers: &StringRecord) -> Result<Self, IngestError> {
        let position = |column: &str| headers.iter().position(|h| h.trim() == column);
        let required = |column: &'static str| position(column).ok_or(IngestError::MissingColumn(column));

        Ok(Self {
            collection: position(columns::COLLECTION),
            group: position(columns::GROUP),
            name: required(columns::NAME)?,
            token_type: position(columns::TYPE),
            mode: position(columns::MODE),
            value: required(columns::VALUE)?,
            id: position(columns::ID),
        })
    }

    fn record(
        &self,
        row: &StringRecord,
        line: u64,
        options: &IngestOptions,
    ) -> Result<Record, SkipReason> {
        let field = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| row.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let name = field(Some(self.name)).ok_or(SkipReason::MissingName)?;
        let value = field(Some(self.value)).ok_or(SkipReason::MissingValue)?;

        Ok(Record {
            collection: field(self.collection),
            group: field(self.group),
            name,
            token_type: field(self.token_type)
                .map(|t| t.to_lowercase())
                .unwrap_or_default(),
            mode: field(self.mode).unwrap_or_else(|| options.default_mode.clone()),
            value,
            id: field(self.id),
            line,
        })
    }
}

/// Reject input whose last quoted field never closes.
///
/// The `csv` reader accepts such input and silently swallows the rest of the
/// file into one field, so the quoting structure is walked up front.
fn ensure_quotes_closed(text: &str) -> Result<(), IngestError> {
    #[derive(Clone, Copy)]
    enum State {
        FieldStart,
        Unquoted,
        Quoted { opened_on: u64 },
        QuoteInQuoted,
    }

    let mut line = 1u64;
    let mut state = State::FieldStart;
    let mut after_cr = false;
    for ch in text.chars() {
        state = match (state, ch) {
            (State::FieldStart, '"') => State::Quoted { opened_on: line },
            // The reader ends a record on `\n`, `\r` or `\r\n`.
            (State::FieldStart | State::Unquoted | State::QuoteInQuoted, ',' | '\n' | '\r') => {
                State::FieldStart
            }
            (State::FieldStart | State::Unquoted, _) => State::Unquoted,
            (State::Quoted { .. }, '"') => State::QuoteInQuoted,
            (quoted @ State::Quoted { .. }, _) => quoted,
            (State::QuoteInQuoted, '"') => State::Quoted { opened_on: line },
            (State::QuoteInQuoted, _) => State::Unquoted,
        };
        if ch == '\r' || (ch == '\n' && !after_cr) {
            line += 1;
        }
        after_cr = ch == '\r';
    }

    match state {
        State::Quoted { opened_on } => Err(IngestError::UnterminatedQuote { line: opened_on }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
Collection,Mode,Group,Name,Type,Value,ID
Primitives,Light, colors/brand ,accent.bg,COLOR,d73f09ff,1:1
Primitives,Dark,colors/brand,accent.bg,Color, 000000ff ,1:2
";

    #[test]
    fn trims_fields_and_lowercases_type() {
        let ingested = ingest_csv(EXPORT).unwrap();
        assert_eq!(ingested.records.len(), 2);
        assert!(ingested.skipped.is_empty());

        let first = &ingested.records[0];
        assert_eq!(first.collection.as_deref(), Some("Primitives"));
        assert_eq!(first.group.as_deref(), Some("colors/brand"));
        assert_eq!(first.name, "accent.bg");
        assert_eq!(first.token_type, "color");
        assert_eq!(first.mode, "Light");
        assert_eq!(first.id.as_deref(), Some("1:1"));
        assert_eq!(first.line, 2);

        assert_eq!(ingested.records[1].value, "000000ff");
    }

    #[test]
    fn header_cells_are_trimmed_but_case_sensitive() {
        let ok = ingest_csv(" Name , Value \nspacing,4\n").unwrap();
        assert_eq!(ok.records[0].name, "spacing");

        let err = ingest_csv("name,Value\nspacing,4\n").unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn("Name")));
    }

    #[test]
    fn mode_defaults_when_column_absent_or_empty() {
        let ingested = ingest_csv("Name,Value,Mode\na,1,\nb,2,Dark\n").unwrap();
        assert_eq!(ingested.records[0].mode, DEFAULT_MODE);
        assert_eq!(ingested.records[1].mode, "Dark");

        let no_column = ingest_csv("Name,Value\na,1\n").unwrap();
        assert_eq!(no_column.records[0].mode, DEFAULT_MODE);

        let custom = IngestOptions {
            default_mode: "Base".to_string(),
        };
        let ingested = ingest_csv_with("Name,Value\na,1\n", &custom).unwrap();
        assert_eq!(ingested.records[0].mode, "Base");
    }

    #[test]
    fn unknown_types_are_kept_verbatim() {
        let ingested = ingest_csv("Name,Type,Value\nfont,FontFamily,Inter\n").unwrap();
        assert_eq!(ingested.records[0].token_type, "fontfamily");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = "Name,Value\n\na,1\n   \n\r\nb,2\n";
        let ingested = ingest_csv(text).unwrap();
        let names: Vec<_> = ingested.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(ingested.skipped.is_empty());
    }

    #[test]
    fn rows_without_name_or_value_are_reported() {
        let text = "Name,Value\n,1\nb,\n  ,  \nc,3\n";
        let ingested = ingest_csv(text).unwrap();
        assert_eq!(ingested.records.len(), 1);
        assert_eq!(
            ingested.skipped,
            vec![
                SkippedRow {
                    line: 2,
                    reason: SkipReason::MissingName
                },
                SkippedRow {
                    line: 3,
                    reason: SkipReason::MissingValue
                },
                SkippedRow {
                    line: 4,
                    reason: SkipReason::MissingName
                },
            ]
        );
    }

    #[test]
    fn quoted_fields_may_contain_separators() {
        let text = "Name,Value\n\"font.stack\",\"Inter, \"\"Helvetica\"\", sans-serif\"\n";
        let ingested = ingest_csv(text).unwrap();
        assert_eq!(
            ingested.records[0].value,
            "Inter, \"Helvetica\", sans-serif"
        );
    }

    #[test]
    fn ragged_rows_are_fatal() {
        let err = ingest_csv("Name,Value\na,1,extra\n").unwrap_err();
        match err {
            IngestError::ColumnCount {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 2);
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unterminated_quote_is_fatal() {
        let err = ingest_csv("Name,Value\na,1\nb,\"open\nc,3\n").unwrap_err();
        assert!(matches!(err, IngestError::UnterminatedQuote { line: 3 }));
    }

    #[test]
    fn unterminated_quote_after_carriage_return_is_fatal() {
        let err = ingest_csv("Name,Value\r\"open,1").unwrap_err();
        assert!(matches!(err, IngestError::UnterminatedQuote { line: 2 }));

        let err = ingest_csv("Name,Value\r\na,1\r\nb,\"open\r\n").unwrap_err();
        assert!(matches!(err, IngestError::UnterminatedQuote { line: 3 }));
    }

    #[test]
    fn crlf_exports_parse() {
        let ingested = ingest_csv("Name,Value\r\na,\"1\"\r\nb,2\r\n").unwrap();
        assert_eq!(ingested.records.len(), 2);
        assert_eq!(ingested.records[0].value, "1");
    }

    #[test]
    fn inch_marks_inside_unquoted_fields_are_not_quotes() {
        let ingested = ingest_csv("Name,Value\nlabel,5'10\"\n").unwrap();
        assert_eq!(ingested.records[0].value, "5'10\"");
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(ingest_csv(""), Err(IngestError::MissingHeader)));
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let ingested = ingest_csv("\u{feff}Name,Value\na,1\n").unwrap();
        assert_eq!(ingested.records[0].name, "a");
    }
}
