use std::collections::HashMap;

use sea_orm::*;
use chrono::Utc;
use uuid::Uuid;
use crate::entities::{user, user::Entity as User};

pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_public_id<C>(db: &C, public_id: Uuid) -> Result<Option<user::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        User::find()
            .filter(user::Column::PublicId.eq(public_id))
            .one(db)
            .await
    }

    pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> Result<Option<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await
    }

    // Resolve a batch of public ids. Missing ids are simply absent from the result.
    pub async fn find_many_by_public_ids<C>(db: &C, public_ids: &[Uuid]) -> Result<Vec<user::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        if public_ids.is_empty() {
            return Ok(Vec::new());
        }
        User::find()
            .filter(user::Column::PublicId.is_in(public_ids.iter().copied()))
            .all(db)
            .await
    }

    // Keyed by internal id, for joining authors onto posts and comments
    pub async fn load_by_ids<C>(db: &C, ids: impl IntoIterator<Item = i64>) -> Result<HashMap<i64, user::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut ids: Vec<i64> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        Ok(User::find()
            .filter(user::Column::Id.is_in(ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect())
    }

    // Lookup picker: username prefix/substring search, optionally staff only
    pub async fn search(
        db: &DatabaseConnection,
        query: Option<&str>,
        staff_only: bool,
        limit: u64,
    ) -> Result<Vec<user::Model>, DbErr> {
        let mut select = User::find();
        if let Some(q) = query.filter(|q| !q.trim().is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(user::Column::Username.contains(q.trim()))
                    .add(user::Column::Email.contains(q.trim()))
            );
        }
        if staff_only {
            select = select.filter(user::Column::IsStaff.eq(true));
        }
        select
            .order_by_asc(user::Column::Username)
            .limit(limit)
            .all(db)
            .await
    }

    pub async fn create(
        db: &DatabaseConnection,
        username: String,
        email: String,
        is_staff: bool,
    ) -> Result<user::Model, DbErr> {
        let new_user = user::ActiveModel {
            id: NotSet,
            public_id: Set(Uuid::now_v7()),
            username: Set(username),
            email: Set(email),
            is_staff: Set(is_staff),
            created_at: Set(Utc::now()),
        };

        new_user.insert(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[tokio::test]
    async fn search_can_restrict_to_staff() {
        let db = test_utils::setup_db().await;
        UserRepository::create(&db, "editor".into(), "editor@example.com".into(), true).await.unwrap();
        UserRepository::create(&db, "reader".into(), "reader@example.com".into(), false).await.unwrap();

        let everyone = UserRepository::search(&db, None, false, 10).await.unwrap();
        assert_eq!(everyone.len(), 2);

        let staff = UserRepository::search(&db, Some("e"), true, 10).await.unwrap();
        let names: Vec<&str> = staff.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["editor"]);
    }

    #[tokio::test]
    async fn load_by_ids_skips_unknown() {
        let db = test_utils::setup_db().await;
        let editor = UserRepository::create(&db, "editor".into(), "editor@example.com".into(), true).await.unwrap();

        let users = UserRepository::load_by_ids(&db, [editor.id, editor.id, 999]).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[&editor.id].username, "editor");
    }
}
