//! Leaf values: literal coercion and alias encoding.

use serde::{Serialize, Serializer};
use serde_json::Number;

/// Token types the exporter emits with scalar values.
pub mod types {
    pub const COLOR: &str = "color";
    pub const NUMBER: &str = "number";
    pub const DIMENSION: &str = "dimension";
    pub const STRING: &str = "string";

    /// Types that may be hoisted onto the enclosing group as a `$type` hint.
    pub const GROUP_HINTS: [&str; 4] = [COLOR, NUMBER, DIMENSION, STRING];

    pub fn is_group_hint(token_type: &str) -> bool {
        GROUP_HINTS.contains(&token_type)
    }
}

/// Prefix of an exported variable-to-variable reference.
pub const ALIAS_SENTINEL: &str = "type:VARIABLE_ALIAS";

/// Marker preceding the referenced variable id inside an alias value.
pub const ALIAS_ID_MARKER: &str = "id:VariableID:";

// ============================================================================
// Values
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(Number),
    Text(String),
}

/// A reference to another variable by id.
///
/// `target` is empty until alias resolution finds the id; an alias that is
/// never resolved serializes as its original `raw` cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub id: String,
    pub raw: String,
    pub target: Option<String>,
}

impl Alias {
    /// The `$value` string for this alias: `{dotted.path}` once resolved.
    pub fn reference(&self) -> String {
        match &self.target {
            Some(path) => reference_string(path),
            None => self.raw.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeafValue {
    Literal(Literal),
    Alias(Alias),
}

impl LeafValue {
    pub fn as_alias(&self) -> Option<&Alias> {
        match self {
            LeafValue::Alias(alias) => Some(alias),
            LeafValue::Literal(_) => None,
        }
    }
}

impl Serialize for LeafValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LeafValue::Literal(Literal::Number(n)) => n.serialize(serializer),
            LeafValue::Literal(Literal::Text(s)) => serializer.serialize_str(s),
            LeafValue::Alias(alias) => serializer.serialize_str(&alias.reference()),
        }
    }
}

/// Wrap a dotted path in reference syntax: `colors.brand` → `{colors.brand}`.
pub fn reference_string(dotted: &str) -> String {
    format!("{{{dotted}}}")
}

// ============================================================================
// Parsing and coercion
// ============================================================================

/// How a raw cell should be stored on a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    Literal(Literal),
    Alias(Alias),
    /// Starts with the alias sentinel but carries no variable id.
    MalformedAlias(String),
    /// Declared `number` but not a finite real number; kept as text.
    NotANumber(String),
}

/// Interpret a trimmed cell according to its (lowercased) token type.
pub fn parse_value(raw: &str, token_type: &str) -> ParsedValue {
    if raw.starts_with(ALIAS_SENTINEL) {
        return match alias_id(raw) {
            Some(id) => ParsedValue::Alias(Alias {
                id: id.to_string(),
                raw: raw.to_string(),
                target: None,
            }),
            None => ParsedValue::MalformedAlias(raw.to_string()),
        };
    }

    match token_type {
        types::NUMBER => match coerce_number(raw) {
            Some(n) => ParsedValue::Literal(Literal::Number(n)),
            None => ParsedValue::NotANumber(raw.to_string()),
        },
        types::COLOR => ParsedValue::Literal(Literal::Text(
            normalize_hex_color(raw).unwrap_or_else(|| raw.to_string()),
        )),
        _ => ParsedValue::Literal(Literal::Text(raw.to_string())),
    }
}

/// The variable id following [`ALIAS_ID_MARKER`], if any.
pub fn alias_id(raw: &str) -> Option<&str> {
    let start = raw.find(ALIAS_ID_MARKER)? + ALIAS_ID_MARKER.len();
    let id = raw[start..].trim();
    (!id.is_empty()).then_some(id)
}

/// Parse a finite real number. Integral values become JSON integers so `16`
/// doesn't render as `16.0`.
///
/// Integral values beyond 2^53 can't be held exactly and stay floats, which
/// serialize in exponent form (`1.2345678901234567e19`).
pub fn coerce_number(raw: &str) -> Option<Number> {
    let parsed: f64 = raw.trim().parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    if parsed.fract() == 0.0 && parsed.abs() <= MAX_EXACT {
        return Some(Number::from(parsed as i64));
    }
    Number::from_f64(parsed)
}

/// Canonicalize a bare or `#`-prefixed 6/8-digit hex color to lowercase
/// `#rrggbb` / `#rrggbbaa`. Anything else returns `None`.
pub fn normalize_hex_color(raw: &str) -> Option<String> {
    let hex = raw.strip_prefix('#').unwrap_or(raw);
    let well_formed = matches!(hex.len(), 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    well_formed.then(|| format!("#{}", hex.to_ascii_lowercase()))
}
