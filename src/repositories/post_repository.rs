use std::collections::{BTreeSet, HashMap};

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use sea_orm::sea_query::{Expr, Query, SimpleExpr};
use sea_orm::*;

use super::tag_repository::{TagQuery, TagWithCount};
use crate::entities::{comment, post, post_like, post_tag, tag};
use crate::services::ServiceError;

pub const LIKES_COUNT: &str = "likes_count";
pub const COMMENTS_COUNT: &str = "comments_count";

/// A post annotated with the number of distinct users who liked it.
#[derive(Debug, Clone, PartialEq)]
pub struct PostWithLikes {
    pub post: post::Model,
    pub likes_count: i64,
}

impl FromQueryResult for PostWithLikes {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        Ok(Self {
            post: post::Model::from_query_result(res, pre)?,
            likes_count: res.try_get(pre, LIKES_COUNT)?,
        })
    }
}

/// A post with its tags loaded, each tag carrying its total usage.
#[derive(Debug, Clone, PartialEq)]
pub struct PostWithTags {
    pub post: post::Model,
    pub tags: Vec<TagWithCount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostWithComments {
    pub post: post::Model,
    pub comments_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PostOrder {
    Newest,
    Oldest,
}

/// Composable post query. Builders narrow the filter, terminals run it.
#[derive(Debug, Clone)]
pub struct PostQuery {
    condition: Condition,
    order: PostOrder,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl PostQuery {
    pub fn new() -> Self {
        Self {
            condition: Condition::all(),
            order: PostOrder::Newest,
        }
    }

    /// Posts published during calendar year `year` (UTC), oldest first.
    pub fn year(mut self, year: i32) -> Self {
        let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single();
        let end = year
            .checked_add(1)
            .and_then(|next| Utc.with_ymd_and_hms(next, 1, 1, 0, 0, 0).single());

        self.condition = match (start, end) {
            (Some(start), Some(end)) => self
                .condition
                .add(post::Column::PublishedAt.gte(start))
                .add(post::Column::PublishedAt.lt(end)),
            // Outside the representable calendar nothing can match
            _ => self.condition.add(Expr::val(1).eq(0)),
        };
        self.order = PostOrder::Oldest;
        self
    }

    pub fn with_slug(mut self, slug: &str) -> Self {
        self.condition = self.condition.add(post::Column::Slug.eq(slug));
        self
    }

    /// Posts linked to the tag with this title.
    pub fn with_tag(mut self, title: &str) -> Self {
        let tagged = Query::select()
            .column((post_tag::Entity, post_tag::Column::PostId))
            .from(post_tag::Entity)
            .inner_join(
                tag::Entity,
                Expr::col((tag::Entity, tag::Column::Id))
                    .equals((post_tag::Entity, post_tag::Column::TagId)),
            )
            .and_where(Expr::col((tag::Entity, tag::Column::Title)).eq(tag::normalize_title(title)))
            .to_owned();

        self.condition = self.condition.add(post::Column::Id.in_subquery(tagged));
        self
    }

    pub async fn fetch<C>(&self, db: &C) -> Result<Vec<post::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        self.select().all(db).await
    }

    pub async fn count<C>(&self, db: &C) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        post::Entity::find()
            .filter(self.condition.clone())
            .count(db)
            .await
    }

    /// One page of results (1-based) together with the total number of matches.
    pub async fn paginate<C>(
        &self,
        db: &C,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<post::Model>, u64), DbErr>
    where
        C: ConnectionTrait,
    {
        let paginator = self.select().paginate(db, limit.max(1));
        let total = paginator.num_items().await?;
        let posts = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((posts, total))
    }

    /// Posts ranked by like count, most liked first. Ties fall back to newest.
    ///
    /// Ranks within the current filter rather than across the whole table;
    /// start from `PostQuery::new()` for a global ranking.
    pub async fn popular<C>(&self, db: &C) -> Result<Vec<PostWithLikes>, DbErr>
    where
        C: ConnectionTrait,
    {
        post::Entity::find()
            .column_as(likes_count_expr(), LIKES_COUNT)
            .join(JoinType::LeftJoin, post::Relation::PostLike.def())
            .filter(self.condition.clone())
            .group_by(post::Column::Id)
            .order_by_desc(likes_count_expr())
            .order_by_desc(post::Column::PublishedAt)
            .order_by_asc(post::Column::Id)
            .into_model::<PostWithLikes>()
            .all(db)
            .await
    }

    /// Runs the query and loads every post's tags with their usage counts.
    pub async fn prefetch_tags_count<C>(&self, db: &C) -> Result<Vec<PostWithTags>, DbErr>
    where
        C: ConnectionTrait,
    {
        let posts = self.fetch(db).await?;
        attach_tags_count(db, posts).await
    }

    /// Looks a post up by slug, answering 404 when it does not exist.
    pub async fn get_object_or_404<C>(&self, db: &C, slug: &str) -> Result<post::Model, ServiceError>
    where
        C: ConnectionTrait,
    {
        self.clone()
            .with_slug(slug)
            .select()
            .one(db)
            .await
            .map_err(|e| crate::services::db_error("DB_ERR", e))?
            .ok_or((StatusCode::NOT_FOUND, "POST_NOT_FOUND", format!("Post '{}' not found", slug)))
    }

    fn select(&self) -> Select<post::Entity> {
        let query = post::Entity::find().filter(self.condition.clone());
        match self.order {
            PostOrder::Newest => query
                .order_by_desc(post::Column::PublishedAt)
                .order_by_desc(post::Column::Id),
            PostOrder::Oldest => query
                .order_by_asc(post::Column::PublishedAt)
                .order_by_asc(post::Column::Id),
        }
    }
}

fn likes_count_expr() -> SimpleExpr {
    // (post_id, user_id) is the primary key, so this already counts distinct users
    Expr::col((post_like::Entity, post_like::Column::UserId)).count()
}

/// Loads the tags of `posts` in two queries, keeping the input order.
pub async fn attach_tags_count<C>(db: &C, posts: Vec<post::Model>) -> Result<Vec<PostWithTags>, DbErr>
where
    C: ConnectionTrait,
{
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
    let links = post_tag::Entity::find()
        .filter(post_tag::Column::PostId.is_in(post_ids))
        .all(db)
        .await?;

    let tag_ids: BTreeSet<i64> = links.iter().map(|l| l.tag_id).collect();
    let tags: HashMap<i64, TagWithCount> = if tag_ids.is_empty() {
        HashMap::new()
    } else {
        TagQuery::new()
            .with_ids(tag_ids.into_iter().collect())
            .fetch_with_posts_count(db)
            .await?
            .into_iter()
            .map(|t| (t.tag.id, t))
            .collect()
    };

    let mut tags_by_post: HashMap<i64, Vec<TagWithCount>> = HashMap::new();
    for link in links {
        if let Some(tag) = tags.get(&link.tag_id) {
            tags_by_post.entry(link.post_id).or_default().push(tag.clone());
        }
    }

    Ok(posts
        .into_iter()
        .map(|post| {
            let mut tags = tags_by_post.get(&post.id).cloned().unwrap_or_default();
            tags.sort_by(|a, b| a.tag.title.cmp(&b.tag.title));
            PostWithTags { post, tags }
        })
        .collect())
}

/// Attaches comment counts to an already materialized list of posts.
///
/// Issues a single grouped query over the id list, so it is meant for small
/// working sets such as one page. The posts and the counts are read in separate
/// round trips and may disagree under concurrent writes.
pub async fn fetch_with_comments_count<C>(
    db: &C,
    posts: Vec<post::Model>,
) -> Result<Vec<PostWithComments>, DbErr>
where
    C: ConnectionTrait,
{
    let post_ids: Vec<i64> = posts.iter().map(|p| p.id).collect();

    let counts: HashMap<i64, i64> = if post_ids.is_empty() {
        HashMap::new()
    } else {
        comment::Entity::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(Expr::col((comment::Entity, comment::Column::Id)).count(), COMMENTS_COUNT)
            .filter(comment::Column::PostId.is_in(post_ids))
            .group_by(comment::Column::PostId)
            .into_tuple::<(i64, i64)>()
            .all(db)
            .await?
            .into_iter()
            .collect()
    };

    Ok(posts
        .into_iter()
        .map(|post| {
            let comments_count = counts.get(&post.id).copied().unwrap_or(0);
            PostWithComments { post, comments_count }
        })
        .collect())
}
