//! Variable id → token path index.

use indexmap::map::Entry;
use indexmap::IndexMap;
use varitoken_ingest_csv::Record;

use crate::path::TokenPath;

/// Maps exported variable ids to the dotted path of the token they name.
///
/// Built once over every record, across all modes, before any alias is
/// rewritten. The first row carrying an id decides its path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdIndex {
    paths: IndexMap<String, String>,
}

impl IdIndex {
    pub fn from_records(records: &[Record], kebab_names: bool) -> Self {
        records.iter().fold(Self::default(), |mut index, record| {
            if let Some(id) = record.id.as_deref() {
                let path =
                    TokenPath::from_group_and_name(record.group.as_deref(), &record.name, kebab_names);
                if !path.is_empty() {
                    index.register(id, &path);
                }
            }
            index
        })
    }

    /// Register `id` unless it is already known.
    pub fn register(&mut self, id: &str, path: &TokenPath) {
        if id.is_empty() {
            return;
        }
        let dotted = path.dotted();
        match self.paths.entry(id.to_string()) {
            Entry::Occupied(existing) => {
                if *existing.get() != dotted {
                    tracing::debug!(
                        id,
                        kept = %existing.get(),
                        ignored = %dotted,
                        "duplicate variable id"
                    );
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(dotted);
            }
        }
    }

    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.paths.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mode: &str, group: Option<&str>, name: &str, id: Option<&str>) -> Record {
        Record {
            collection: None,
            group: group.map(str::to_string),
            name: name.to_string(),
            token_type: "color".to_string(),
            mode: mode.to_string(),
            value: "ffffff".to_string(),
            id: id.map(str::to_string),
            line: 0,
        }
    }

    #[test]
    fn indexes_ids_across_modes() {
        let records = vec![
            record("Light", Some("colors/brand"), "primary", Some("1:1")),
            record("Dark", Some("colors"), "surface", Some("1:2")),
            record("Dark", None, "no-id", None),
        ];
        let index = IdIndex::from_records(&records, false);
        assert_eq!(index.len(), 2);
        assert_eq!(index.resolve("1:1"), Some("colors.brand.primary"));
        assert_eq!(index.resolve("1:2"), Some("colors.surface"));
        assert_eq!(index.resolve("9:9"), None);
    }

    #[test]
    fn first_occurrence_wins() {
        let records = vec![
            record("Light", None, "first", Some("1:1")),
            record("Dark", None, "second", Some("1:1")),
        ];
        let index = IdIndex::from_records(&records, false);
        assert_eq!(index.resolve("1:1"), Some("first"));
    }

    #[test]
    fn kebab_names_apply_to_indexed_paths() {
        let records = vec![record("Light", Some("colors"), "Beaver Orange", Some("1:1"))];
        let index = IdIndex::from_records(&records, true);
        assert_eq!(index.resolve("1:1"), Some("colors.beaver-orange"));
    }

    #[test]
    fn empty_paths_are_not_indexed() {
        let records = vec![record("Light", None, "./", Some("1:1"))];
        assert!(IdIndex::from_records(&records, false).is_empty());
    }
}
