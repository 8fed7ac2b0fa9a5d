use std::collections::HashMap;

use axum::http::StatusCode;
use sea_orm::*;

use super::{db_error, ServiceError};
use crate::entities::{comment, post, post_like, user};
use crate::models::blog_model::*;
use crate::repositories::post_repository::{attach_tags_count, fetch_with_comments_count, PostQuery};
use crate::repositories::tag_repository::TagQuery;
use crate::repositories::user_repository::UserRepository;

const POPULAR_LIMIT: usize = 10;

pub struct BlogService;

impl BlogService {
    /// Latest posts, one page at a time.
    pub async fn list_posts(
        db: &DatabaseConnection,
        params: PostListParams,
    ) -> Result<PostListResponse, ServiceError> {
        let (page, limit) = (params.page(), params.limit());

        let (posts, total) = PostQuery::new()
            .paginate(db, page, limit)
            .await
            .map_err(|e| db_error("DB_ERR", e))?;

        Ok(PostListResponse {
            data: Self::summarize(db, posts).await?,
            meta: PaginationMeta { total, page, limit },
        })
    }

    pub async fn post_detail(
        db: &DatabaseConnection,
        slug: &str,
    ) -> Result<PostDetailResponse, ServiceError> {
        let post = PostQuery::new().get_object_or_404(db, slug).await?;

        let tags = attach_tags_count(db, vec![post.clone()])
            .await
            .map_err(|e| db_error("DB_ERR", e))?
            .pop()
            .map(|p| p.tags)
            .unwrap_or_default();

        let comments = comment::Entity::find()
            .filter(comment::Column::PostId.eq(post.id))
            .order_by_asc(comment::Column::PublishedAt)
            .order_by_asc(comment::Column::Id)
            .all(db)
            .await
            .map_err(|e| db_error("DB_ERR", e))?;

        let likes_count = post_like::Entity::find()
            .filter(post_like::Column::PostId.eq(post.id))
            .count(db)
            .await
            .map_err(|e| db_error("DB_ERR", e))?;

        let authors = UserRepository::load_by_ids(
            db,
            comments.iter().map(|c| c.author_id).chain([post.author_id]),
        )
        .await
        .map_err(|e| db_error("DB_ERR", e))?;

        let author = Self::author_of(&authors, post.author_id)?;
        let comments = comments
            .into_iter()
            .map(|c| {
                let author = Self::author_of(&authors, c.author_id)?;
                Ok::<_, ServiceError>(CommentResponse::new(c, author))
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        Ok(PostDetailResponse {
            url: post.absolute_url(),
            id: post.public_id,
            title: post.title,
            slug: post.slug,
            text: post.text,
            image: post.image,
            published_at: post.published_at,
            author: author.into(),
            tags: tags.into_iter().map(TagResponse::from).collect(),
            likes_count,
            comments,
        })
    }

    /// Posts carrying the given tag, newest first.
    pub async fn tag_filter(
        db: &DatabaseConnection,
        title: &str,
    ) -> Result<TagFilterResponse, ServiceError> {
        let tag = TagQuery::new().get_object_or_404(db, title).await?;

        let query = PostQuery::new().with_tag(&tag.title);
        let posts = query.fetch(db).await.map_err(|e| db_error("DB_ERR", e))?;
        let posts_count = posts.len() as i64;

        let popular_tags = TagQuery::new()
            .popular(db)
            .await
            .map_err(|e| db_error("DB_ERR", e))?
            .into_iter()
            .take(POPULAR_LIMIT)
            .map(TagResponse::from)
            .collect();

        Ok(TagFilterResponse {
            tag: tag_response(tag, posts_count),
            posts: Self::summarize(db, posts).await?,
            popular_tags,
        })
    }

    pub async fn archive(
        db: &DatabaseConnection,
        year: i32,
    ) -> Result<ArchiveResponse, ServiceError> {
        let posts = PostQuery::new()
            .year(year)
            .fetch(db)
            .await
            .map_err(|e| db_error("DB_ERR", e))?;

        Ok(ArchiveResponse {
            year,
            posts: Self::summarize(db, posts).await?,
        })
    }

    pub async fn popular(db: &DatabaseConnection) -> Result<PopularResponse, ServiceError> {
        let posts = PostQuery::new()
            .popular(db)
            .await
            .map_err(|e| db_error("DB_ERR", e))?;
        let tags = TagQuery::new()
            .popular(db)
            .await
            .map_err(|e| db_error("DB_ERR", e))?;

        Ok(PopularResponse {
            posts: posts.into_iter().take(POPULAR_LIMIT).map(PopularPostResponse::from).collect(),
            tags: tags.into_iter().take(POPULAR_LIMIT).map(TagResponse::from).collect(),
        })
    }

    // Tags, comment counts and authors for a page of posts in a bounded number of queries
    async fn summarize(
        db: &DatabaseConnection,
        posts: Vec<post::Model>,
    ) -> Result<Vec<PostSummaryResponse>, ServiceError> {
        let authors = UserRepository::load_by_ids(db, posts.iter().map(|p| p.author_id))
            .await
            .map_err(|e| db_error("DB_ERR", e))?;
        let with_tags = attach_tags_count(db, posts.clone())
            .await
            .map_err(|e| db_error("DB_ERR", e))?;
        let with_comments = fetch_with_comments_count(db, posts)
            .await
            .map_err(|e| db_error("DB_ERR", e))?;

        with_tags
            .into_iter()
            .zip(with_comments)
            .map(|(tagged, counted)| {
                let author = Self::author_of(&authors, tagged.post.author_id)?;
                Ok::<_, ServiceError>(summary(tagged.post, author, tagged.tags, counted.comments_count))
            })
            .collect()
    }

    fn author_of(authors: &HashMap<i64, user::Model>, id: i64) -> Result<&user::Model, ServiceError> {
        authors.get(&id).ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATA_CORRUPT",
            format!("Author {} is missing", id),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, Fixture};

    #[tokio::test]
    async fn list_posts_summarizes_page() {
        let db = test_utils::setup_db().await;
        let mut fx = Fixture::new(&db).await;
        let rust = fx.tag("rust").await;
        let old = fx.post("old", "2020-05-01T00:00:00Z").await;
        let new = fx.post("new", "2021-05-01T00:00:00Z").await;
        fx.link_tag(&new, &rust).await;
        fx.link_tag(&old, &rust).await;
        fx.comment(&new, "first").await;

        let res = BlogService::list_posts(&db, PostListParams { page: Some(1), limit: Some(1) })
            .await
            .unwrap();
        assert_eq!(res.meta.total, 2);
        assert_eq!(res.data.len(), 1);

        let first = &res.data[0];
        assert_eq!(first.slug, "new");
        assert_eq!(first.url, "/post/new");
        assert_eq!(first.author.username, "author");
        assert_eq!(first.comments_count, 1);
        assert_eq!(first.tags[0].title, "rust");
        assert_eq!(first.tags[0].posts_count, 2);
    }

    #[tokio::test]
    async fn post_detail_collects_comments_and_likes() {
        let db = test_utils::setup_db().await;
        let mut fx = Fixture::new(&db).await;
        let post = fx.post("hello", "2021-05-01T00:00:00Z").await;
        let reader = fx.user("reader", false).await;
        fx.like(&post, &reader).await;
        fx.comment(&post, "one").await;
        fx.comment(&post, "two").await;

        let detail = BlogService::post_detail(&db, "hello").await.unwrap();
        assert_eq!(detail.likes_count, 1);
        let texts: Vec<&str> = detail.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert!(detail.tags.is_empty());

        let (status, code, _) = BlogService::post_detail(&db, "nope").await.unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "POST_NOT_FOUND");
    }

    #[tokio::test]
    async fn tag_filter_lists_tagged_posts() {
        let db = test_utils::setup_db().await;
        let mut fx = Fixture::new(&db).await;
        let rust = fx.tag("rust").await;
        let tagged = fx.post("tagged", "2021-05-01T00:00:00Z").await;
        fx.post("plain", "2021-06-01T00:00:00Z").await;
        fx.link_tag(&tagged, &rust).await;

        let res = BlogService::tag_filter(&db, "Rust").await.unwrap();
        assert_eq!(res.tag.title, "rust");
        assert_eq!(res.tag.url, "/tag/rust");
        assert_eq!(res.tag.posts_count, 1);
        assert_eq!(res.posts.len(), 1);
        assert_eq!(res.posts[0].slug, "tagged");

        let (status, _, _) = BlogService::tag_filter(&db, "missing").await.unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn popular_ranks_posts_and_tags() {
        let db = test_utils::setup_db().await;
        let mut fx = Fixture::new(&db).await;
        let a = fx.post("a", "2021-05-01T00:00:00Z").await;
        let b = fx.post("b", "2021-06-01T00:00:00Z").await;
        let reader = fx.user("reader", false).await;
        fx.like(&a, &reader).await;
        let t = fx.tag("misc").await;
        fx.link_tag(&b, &t).await;

        let res = BlogService::popular(&db).await.unwrap();
        assert_eq!(res.posts[0].slug, "a");
        assert_eq!(res.posts[0].likes_count, 1);
        assert_eq!(res.posts[1].likes_count, 0);
        assert_eq!(res.tags[0].title, "misc");
    }
}
