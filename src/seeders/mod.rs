pub mod tag_seeder;
pub mod user_seeder;

use sea_orm::DatabaseConnection;

pub async fn run_seeders(db: &DatabaseConnection) -> Result<(), String> {
    // Staff author first so the admin has someone to assign posts to
    user_seeder::seed_editor(db).await?;

    tag_seeder::seed_tags(db).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{tag, user};
    use crate::test_utils;
    use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder};

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let db = test_utils::setup_db().await;
        run_seeders(&db).await.unwrap();
        run_seeders(&db).await.unwrap();

        let users = user::Entity::find().all(&db).await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].is_staff);

        let tags = tag::Entity::find()
            .order_by_asc(tag::Column::Title)
            .all(&db)
            .await
            .unwrap();
        assert_eq!(tags.len() as u64, tag::Entity::find().count(&db).await.unwrap());
        assert!(tags.iter().all(|t| t.title == t.title.to_lowercase()));
        assert!(tags.iter().any(|t| t.title == "web development"));
    }
}
