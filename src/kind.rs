use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The five native data types of the store, one per generate route.
///
/// The snake case name (`strings`, `sorted_sets`, ...) is the `type` tag reported back to
/// clients, while [`DataKind::prefix`] is the namespace every generated key lives under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DataKind {
    Strings,
    Hashes,
    Sets,
    Lists,
    SortedSets,
}

impl DataKind {
    /// Key prefix, which also determines the store command used to write the key.
    pub fn prefix(self) -> &'static str {
        match self {
            DataKind::Strings => "string",
            DataKind::Hashes => "hash",
            DataKind::Sets => "set",
            DataKind::Lists => "list",
            DataKind::SortedSets => "zset",
        }
    }

    /// Path of the route generating this kind of data, e.g. `/generate_sorted_sets`.
    pub fn route(self) -> String {
        format!("/generate_{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn type_tags() {
        let tags: Vec<String> = DataKind::iter().map(|kind| kind.to_string()).collect();

        assert_eq!(tags, ["strings", "hashes", "sets", "lists", "sorted_sets"]);
        assert_eq!(
            DataKind::from_str("sorted_sets").unwrap(),
            DataKind::SortedSets
        );
        assert_eq!(
            serde_json::to_string(&DataKind::SortedSets).unwrap(),
            "\"sorted_sets\""
        );
    }

    #[test]
    fn prefixes_are_distinct() {
        let prefixes: HashSet<&str> = DataKind::iter().map(DataKind::prefix).collect();

        assert_eq!(prefixes.len(), 5);
        assert_eq!(DataKind::SortedSets.prefix(), "zset");
        assert_eq!(DataKind::Lists.route(), "/generate_lists");
    }
}
