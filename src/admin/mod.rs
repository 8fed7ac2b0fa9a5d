//! Declarative configuration of the administrative interface.
//!
//! Each registered model names the columns shown in its list view and the
//! relational fields edited as raw ids with a lookup picker rather than a full
//! dropdown, which keeps the forms usable with many authors and tags.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelAdmin {
    pub name: &'static str,
    pub list_display: &'static [&'static str],
    pub raw_id_fields: &'static [&'static str],
}

pub const POST_ADMIN: ModelAdmin = ModelAdmin {
    name: "posts",
    list_display: &["title", "author"],
    raw_id_fields: &["likes", "tags", "author"],
};

pub const COMMENT_ADMIN: ModelAdmin = ModelAdmin {
    name: "comments",
    list_display: &["post", "author", "published_at"],
    raw_id_fields: &["post", "author"],
};

// Registered with defaults
pub const TAG_ADMIN: ModelAdmin = ModelAdmin {
    name: "tags",
    list_display: &["title"],
    raw_id_fields: &[],
};

pub const REGISTRY: [ModelAdmin; 3] = [POST_ADMIN, TAG_ADMIN, COMMENT_ADMIN];

/// The entities managed through the admin. Carried as a request extension by
/// each model's nested router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminModel {
    Posts,
    Tags,
    Comments,
}

impl AdminModel {
    pub fn config(self) -> ModelAdmin {
        match self {
            AdminModel::Posts => POST_ADMIN,
            AdminModel::Tags => TAG_ADMIN,
            AdminModel::Comments => COMMENT_ADMIN,
        }
    }
}

impl ModelAdmin {
    pub fn is_raw_id(&self, field: &str) -> bool {
        self.raw_id_fields.contains(&field)
    }

    /// Keeps the row id plus the configured list columns.
    pub fn project(&self, mut row: Map<String, Value>) -> Map<String, Value> {
        let mut projected = Map::new();
        if let Some(id) = row.remove("id") {
            projected.insert("id".to_string(), id);
        }
        for column in self.list_display {
            let value = row.remove(*column).unwrap_or(Value::Null);
            projected.insert((*column).to_string(), value);
        }
        projected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registry_covers_every_model() {
        let names: Vec<&str> = REGISTRY.iter().map(|admin| admin.name).collect();
        assert_eq!(names, vec!["posts", "tags", "comments"]);
        assert_eq!(AdminModel::Posts.config(), POST_ADMIN);
        assert_eq!(AdminModel::Comments.config(), COMMENT_ADMIN);
    }

    #[test]
    fn raw_id_fields() {
        assert!(POST_ADMIN.is_raw_id("author"));
        assert!(POST_ADMIN.is_raw_id("likes"));
        assert!(!POST_ADMIN.is_raw_id("title"));
        assert!(COMMENT_ADMIN.is_raw_id("post"));
        assert!(!TAG_ADMIN.is_raw_id("title"));
    }

    #[test]
    fn project_keeps_only_list_display() {
        let row = json!({
            "id": "abc",
            "title": "Hello",
            "slug": "hello",
            "author": "editor",
            "image": "img.jpg",
        });
        let Value::Object(row) = row else { unreachable!() };

        let projected = POST_ADMIN.project(row);
        let keys: Vec<&str> = projected.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(projected["title"], "Hello");
        assert_eq!(projected["author"], "editor");
        assert!(!projected.contains_key("slug"));
    }

    #[test]
    fn project_fills_missing_columns_with_null() {
        let projected = COMMENT_ADMIN.project(Map::new());
        assert_eq!(projected["published_at"], Value::Null);
        assert!(!projected.contains_key("id"));
    }
}
