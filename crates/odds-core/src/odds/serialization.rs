use super::OddsTables;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// String-keyed capture of an [`OddsTables`] for persistence by
/// collaborators. Keys are the display labels ("2".."10", "Ace" and
/// "17".."21", "BUST").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OddsSnapshot {
    pub stand_at: u8,
    pub distributions: BTreeMap<String, BTreeMap<String, f64>>,
    pub expected_values: BTreeMap<String, f64>,
}

impl OddsSnapshot {
    pub fn capture(tables: &OddsTables) -> Self {
        let distributions = tables
            .distributions()
            .map(|(start, distribution)| {
                let outcomes = distribution
                    .iter()
                    .map(|(outcome, p)| (outcome.to_string(), p))
                    .collect();
                (start.to_string(), outcomes)
            })
            .collect();
        let expected_values = tables
            .expected_values()
            .map(|(start, ev)| (start.to_string(), ev))
            .collect();
        OddsSnapshot {
            stand_at: tables.stand_at(),
            distributions,
            expected_values,
        }
    }

    pub fn to_json(tables: &OddsTables) -> serde_json::Result<String> {
        let snapshot = Self::capture(tables);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::OddsSnapshot;
    use crate::enumerate::enumerate_hands;
    use crate::odds::{DrawTable, aggregate};

    #[test]
    fn snapshot_serializes_to_json() {
        let hands = enumerate_hands(17).expect("enumerates");
        let tables = aggregate(&hands, &DrawTable::standard(), 17);
        let json = OddsSnapshot::to_json(&tables).expect("serializes");
        assert!(json.contains("\"stand_at\": 17"));
        assert!(json.contains("\"Ace\""));
        assert!(json.contains("\"BUST\""));
    }

    #[test]
    fn snapshot_roundtrips() {
        let hands = enumerate_hands(17).expect("enumerates");
        let tables = aggregate(&hands, &DrawTable::standard(), 17);
        let snapshot = OddsSnapshot::capture(&tables);
        let json = serde_json::to_string(&snapshot).expect("serializes");
        let restored = OddsSnapshot::from_json(&json).expect("deserializes");
        assert_eq!(snapshot, restored);
        assert_eq!(restored.distributions.len(), 10);
        assert_eq!(restored.expected_values.len(), 10);
    }
}
