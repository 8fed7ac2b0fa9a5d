use axum::http::StatusCode;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::*;

use crate::entities::{post_tag, tag};
use crate::services::ServiceError;

pub const POSTS_COUNT: &str = "posts_count";

/// A tag annotated with the number of posts referencing it.
#[derive(Debug, Clone, PartialEq)]
pub struct TagWithCount {
    pub tag: tag::Model,
    pub posts_count: i64,
}

impl FromQueryResult for TagWithCount {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        Ok(Self {
            tag: tag::Model::from_query_result(res, pre)?,
            posts_count: res.try_get(pre, POSTS_COUNT)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TagQuery {
    condition: Condition,
}

impl Default for TagQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl TagQuery {
    pub fn new() -> Self {
        Self { condition: Condition::all() }
    }

    pub fn with_ids(mut self, ids: Vec<i64>) -> Self {
        self.condition = self.condition.add(tag::Column::Id.is_in(ids));
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.condition = self.condition.add(tag::Column::Title.eq(tag::normalize_title(title)));
        self
    }

    pub async fn fetch<C>(&self, db: &C) -> Result<Vec<tag::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        tag::Entity::find()
            .filter(self.condition.clone())
            .order_by_asc(tag::Column::Title)
            .all(db)
            .await
    }

    /// Tags in title order, each with its total post count.
    pub async fn fetch_with_posts_count<C>(&self, db: &C) -> Result<Vec<TagWithCount>, DbErr>
    where
        C: ConnectionTrait,
    {
        self.annotated()
            .order_by_asc(tag::Column::Title)
            .into_model::<TagWithCount>()
            .all(db)
            .await
    }

    /// Tags ordered by how many posts use them, most used first.
    pub async fn popular<C>(&self, db: &C) -> Result<Vec<TagWithCount>, DbErr>
    where
        C: ConnectionTrait,
    {
        self.annotated()
            .order_by_desc(posts_count_expr())
            .order_by_asc(tag::Column::Title)
            .into_model::<TagWithCount>()
            .all(db)
            .await
    }

    pub async fn get_object_or_404<C>(&self, db: &C, title: &str) -> Result<tag::Model, ServiceError>
    where
        C: ConnectionTrait,
    {
        let query = self.clone().with_title(title);
        tag::Entity::find()
            .filter(query.condition)
            .one(db)
            .await
            .map_err(|e| crate::services::db_error("DB_ERR", e))?
            .ok_or((StatusCode::NOT_FOUND, "TAG_NOT_FOUND", format!("Tag '{}' not found", title)))
    }

    fn annotated(&self) -> Select<tag::Entity> {
        tag::Entity::find()
            .column_as(posts_count_expr(), POSTS_COUNT)
            .join(JoinType::LeftJoin, tag::Relation::PostTag.def())
            .filter(self.condition.clone())
            .group_by(tag::Column::Id)
    }
}

fn posts_count_expr() -> SimpleExpr {
    Expr::col((post_tag::Entity, post_tag::Column::PostId)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, Fixture};

    #[tokio::test]
    async fn popular_orders_by_post_count() {
        let db = test_utils::setup_db().await;
        let mut fx = Fixture::new(&db).await;
        let rust = fx.tag("rust").await;
        let go = fx.tag("go").await;
        let _empty = fx.tag("cobol").await;

        let a = fx.post("a", "2021-01-01T10:00:00Z").await;
        let b = fx.post("b", "2021-02-01T10:00:00Z").await;
        let c = fx.post("c", "2021-03-01T10:00:00Z").await;
        fx.link_tag(&a, &rust).await;
        fx.link_tag(&b, &rust).await;
        fx.link_tag(&c, &rust).await;
        fx.link_tag(&a, &go).await;

        let popular = TagQuery::new().popular(&db).await.unwrap();
        let ranked: Vec<(&str, i64)> = popular
            .iter()
            .map(|t| (t.tag.title.as_str(), t.posts_count))
            .collect();
        assert_eq!(ranked, vec![("rust", 3), ("go", 1), ("cobol", 0)]);
        assert!(popular.windows(2).all(|w| w[0].posts_count >= w[1].posts_count));
    }

    #[tokio::test]
    async fn get_object_or_404_matches_normalized_title() {
        let db = test_utils::setup_db().await;
        let mut fx = Fixture::new(&db).await;
        fx.tag("Python").await;

        let found = TagQuery::new().get_object_or_404(&db, "PYTHON").await.unwrap();
        assert_eq!(found.title, "python");

        let (status, code, _) = TagQuery::new().get_object_or_404(&db, "perl").await.unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "TAG_NOT_FOUND");
    }

    #[tokio::test]
    async fn fetch_orders_by_title_and_honours_filters() {
        let db = test_utils::setup_db().await;
        let mut fx = Fixture::new(&db).await;
        let web = fx.tag("web").await;
        fx.tag("rust").await;
        let go = fx.tag("go").await;

        let all = TagQuery::new().fetch(&db).await.unwrap();
        let titles: Vec<&str> = all.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["go", "rust", "web"]);

        let some = TagQuery::new().with_ids(vec![web.id, go.id]).fetch(&db).await.unwrap();
        let titles: Vec<&str> = some.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["go", "web"]);
    }

    #[tokio::test]
    async fn tag_title_is_lowercased_on_save() {
        let db = test_utils::setup_db().await;
        let mut fx = Fixture::new(&db).await;
        let saved = fx.tag("Python").await;
        assert_eq!(saved.title, "python");

        let stored = tag::Entity::find_by_id(saved.id).one(&db).await.unwrap().unwrap();
        assert_eq!(stored.title, "python");
    }
}
