//! Sequence index configuration and the bootstrap scan query.
//!
//! This module defines the settings for the administrative index that holds
//! sequence counter documents, and the query used to find the highest
//! pre-existing integer identifier in a collection.

use serde_json::{json, Value};

/// Name of the administrative index holding sequence counter documents.
///
/// One document per sequence name lives here; its version number is the
/// counter. The document bodies carry no payload.
pub const SEQUENCE_INDEX: &str = "sequence";

/// Number of hits fetched by the bootstrap scan.
///
/// More than one hit is requested so that non-integer identifiers sorted to
/// the top (long names beat long numerals in the length-first ordering) can
/// be skipped without a second round trip.
pub const BOOTSTRAP_SCAN_SIZE: u64 = 32;

/// Settings for the sequence index.
///
/// Counter documents are pure version carriers, so storage and indexing are
/// disabled. A single shard with replicas auto-expanded to every node keeps
/// increments cheap and the counter available.
pub fn sequence_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "auto_expand_replicas": "0-all"
        },
        "mappings": {
            "_source": { "enabled": false },
            "enabled": false
        }
    })
}

/// Query returning existing documents ordered so that the highest integer
/// identifier sorts first.
///
/// Identifiers are engine-native string tokens, so a plain descending sort
/// would put `"9"` above `"100"`. Sorting by identifier string length first,
/// then by identifier, both descending, makes the longest numeral win, which
/// for integer identifiers is the numeric maximum.
pub fn max_id_scan_query(size: u64) -> Value {
    json!({
        "query": {
            "match_all": {}
        },
        "size": size,
        "sort": [
            {
                "_script": {
                    "script": "doc['_id'].value.length()",
                    "type": "number",
                    "order": "desc"
                }
            },
            {
                "_id": {
                    "order": "desc"
                }
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_index_settings_structure() {
        let settings = sequence_index_settings();

        assert_eq!(settings["settings"]["number_of_shards"], 1);
        assert_eq!(settings["settings"]["auto_expand_replicas"], "0-all");

        // Counter documents store nothing.
        assert_eq!(settings["mappings"]["_source"]["enabled"], false);
        assert_eq!(settings["mappings"]["enabled"], false);
    }

    #[test]
    fn test_max_id_scan_query_structure() {
        let query = max_id_scan_query(BOOTSTRAP_SCAN_SIZE);

        assert!(query["query"]["match_all"].is_object());
        assert_eq!(query["size"], BOOTSTRAP_SCAN_SIZE);

        let sort = query["sort"].as_array().unwrap();
        assert_eq!(sort.len(), 2);

        // Length-first ordering, both descending.
        assert_eq!(sort[0]["_script"]["type"], "number");
        assert_eq!(sort[0]["_script"]["order"], "desc");
        assert_eq!(sort[1]["_id"]["order"], "desc");
    }

    #[test]
    fn test_sequence_index_name() {
        assert_eq!(SEQUENCE_INDEX, "sequence");
    }
}
