use std::collections::HashSet;

use sea_orm::{DatabaseConnection, ActiveValue::Set, ActiveModelTrait};
use uuid::Uuid;
use crate::entities::tag;
use crate::repositories::tag_repository::TagQuery;

pub async fn seed_tags(db: &DatabaseConnection) -> Result<(), String> {
    let tags = vec!["Technology", "Programming", "Health", "Lifestyle", "Rust", "Web Development"];

    // Stored titles are lowercase, so compare against the normalized form
    let mut existing: HashSet<String> = TagQuery::new()
        .fetch(db)
        .await
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|t| t.title)
        .collect();

    for name in tags {
        let title = tag::normalize_title(name);
        if existing.contains(&title) {
            continue;
        }

        let new_tag = tag::ActiveModel {
            public_id: Set(Uuid::now_v7()),
            title: Set(name.to_string()),
            ..Default::default()
        };
        new_tag.insert(db).await.map_err(|e| e.to_string())?;
        tracing::info!("Seeded tag: {}", title);
        existing.insert(title);
    }

    Ok(())
}
