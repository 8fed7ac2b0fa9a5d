use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_serializing)]
    pub id: i64,
    #[sea_orm(unique, index)]
    pub public_id: Uuid,

    #[sea_orm(unique)]
    pub title: String,
}

impl Model {
    /// Canonical path of the `tag_filter` view. Titles may hold spaces or
    /// slashes, so the segment is percent-encoded.
    pub fn absolute_url(&self) -> String {
        format!("/tag/{}", urlencoding::encode(&self.title))
    }
}

/// Tag titles are stored trimmed and lowercase.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post_tag::Entity")]
    PostTag,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        super::post_tag::Relation::Post.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::post_tag::Relation::Tag.def().rev())
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let Set(title) = &self.title {
            let normalized = normalize_title(title);
            self.title = Set(normalized);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_title_lowercases() {
        assert_eq!(normalize_title("Python"), "python");
        assert_eq!(normalize_title("  Web Dev "), "web dev");
    }

    #[test]
    fn absolute_url_uses_title() {
        let tag = Model { id: 1, public_id: Uuid::nil(), title: "rust".to_string() };
        assert_eq!(tag.absolute_url(), "/tag/rust");
    }

    #[test]
    fn absolute_url_encodes_title() {
        let tag = Model { id: 1, public_id: Uuid::nil(), title: "c/c++ and go".to_string() };
        assert_eq!(tag.absolute_url(), "/tag/c%2Fc%2B%2B%20and%20go");
    }
}
