//! Lead database models

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Page creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePageRequest {
    pub parent: DatabaseParent,
    pub properties: Map<String, Value>,
}

/// Database that receives the page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseParent {
    pub database_id: String,
}

/// Page response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Property value builders
pub mod property {
    use super::*;

    pub fn title(text: &str) -> Value {
        json!({ "title": [{ "text": { "content": text } }] })
    }

    pub fn rich_text(text: &str) -> Value {
        json!({ "rich_text": [{ "text": { "content": text } }] })
    }

    pub fn number(value: f64) -> Value {
        json!({ "number": value })
    }

    /// Empty values are sent as `null`, which the database accepts for typed fields
    pub fn url(value: &str) -> Value {
        json!({ "url": non_empty(value) })
    }

    pub fn email(value: &str) -> Value {
        json!({ "email": non_empty(value) })
    }

    pub fn phone(value: &str) -> Value {
        json!({ "phone_number": non_empty(value) })
    }

    pub fn select(name: &str) -> Value {
        json!({ "select": { "name": name } })
    }

    pub fn multi_select(names: &[String]) -> Value {
        let options: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();
        json!({ "multi_select": options })
    }

    fn non_empty(value: &str) -> Value {
        if value.is_empty() {
            Value::Null
        } else {
            Value::String(value.to_string())
        }
    }
}
