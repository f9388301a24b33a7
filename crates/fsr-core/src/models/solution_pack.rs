//! Solution pack query documents.

use serde_json::{Value, json};

/// Query body for installed solution packs matching `search`.
pub fn installed_packs_query(search: &str, limit: u32) -> Value {
    json!({
        "sort": [{"field": "label", "direction": "ASC"}],
        "limit": limit,
        "logic": "AND",
        "filters": [
            {"field": "type", "operator": "in", "value": ["solutionpack"]},
            {"field": "installed", "operator": "eq", "value": true},
            {
                "logic": "OR",
                "filters": [
                    {"field": "development", "operator": "eq", "value": false},
                    {"field": "type", "operator": "eq", "value": "widget"},
                    {"field": "type", "operator": "eq", "value": "solutionpack"}
                ]
            }
        ],
        "search": search
    })
}

/// Query body for solution packs available from the content hub.
pub fn available_packs_query(search: &str, limit: u32) -> Value {
    json!({
        "sort": [
            {"field": "featured", "direction": "DESC"},
            {"field": "label", "direction": "ASC"}
        ],
        "limit": limit,
        "logic": "AND",
        "filters": [
            {"field": "type", "operator": "in", "value": ["solutionpack"]},
            {"field": "version", "operator": "notlike", "value": "%_dev"}
        ],
        "__selectFields": [
            "name", "installed", "type", "display", "label",
            "version", "publisher", "certified", "iconLarge",
            "description", "latestAvailableVersion", "draft",
            "local", "status", "featuredTags", "featured"
        ],
        "search": search
    })
}
