use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{comment, post, tag, user};
use crate::repositories::post_repository::PostWithLikes;
use crate::repositories::tag_repository::TagWithCount;

#[derive(Serialize, Debug)]
pub struct TagResponse {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub posts_count: i64,
}

impl From<TagWithCount> for TagResponse {
    fn from(t: TagWithCount) -> Self {
        TagResponse {
            url: t.tag.absolute_url(),
            id: t.tag.public_id,
            title: t.tag.title,
            posts_count: t.posts_count,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub username: String,
}

impl From<&user::Model> for AuthorResponse {
    fn from(u: &user::Model) -> Self {
        AuthorResponse {
            id: u.public_id,
            username: u.username.clone(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct PostSummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub image: String,
    pub published_at: DateTime<Utc>,
    pub author: AuthorResponse,
    pub tags: Vec<TagResponse>,
    pub comments_count: i64,
}

#[derive(Serialize, Debug)]
pub struct CommentResponse {
    pub id: Uuid,
    pub author: AuthorResponse,
    pub text: String,
    pub published_at: DateTime<Utc>,
}

impl CommentResponse {
    pub fn new(model: comment::Model, author: &user::Model) -> Self {
        CommentResponse {
            id: model.public_id,
            author: author.into(),
            text: model.text,
            published_at: model.published_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct PostDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub text: String,
    pub image: String,
    pub published_at: DateTime<Utc>,
    pub author: AuthorResponse,
    pub tags: Vec<TagResponse>,
    pub likes_count: u64,
    pub comments: Vec<CommentResponse>,
}

#[derive(Serialize, Debug)]
pub struct PopularPostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub likes_count: i64,
}

impl From<PostWithLikes> for PopularPostResponse {
    fn from(p: PostWithLikes) -> Self {
        PopularPostResponse {
            url: p.post.absolute_url(),
            id: p.post.public_id,
            title: p.post.title,
            slug: p.post.slug,
            likes_count: p.likes_count,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct PopularResponse {
    pub posts: Vec<PopularPostResponse>,
    pub tags: Vec<TagResponse>,
}

#[derive(Serialize, Debug)]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Serialize, Debug)]
pub struct PostListResponse {
    pub data: Vec<PostSummaryResponse>,
    pub meta: PaginationMeta,
}

#[derive(Serialize, Debug)]
pub struct TagFilterResponse {
    pub tag: TagResponse,
    pub posts: Vec<PostSummaryResponse>,
    pub popular_tags: Vec<TagResponse>,
}

#[derive(Serialize, Debug)]
pub struct ArchiveResponse {
    pub year: i32,
    pub posts: Vec<PostSummaryResponse>,
}

#[derive(Deserialize, Debug, Default)]
pub struct PostListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

impl PostListParams {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

pub fn summary(
    post: post::Model,
    author: &user::Model,
    tags: Vec<TagWithCount>,
    comments_count: i64,
) -> PostSummaryResponse {
    PostSummaryResponse {
        url: post.absolute_url(),
        id: post.public_id,
        title: post.title,
        slug: post.slug,
        image: post.image,
        published_at: post.published_at,
        author: author.into(),
        tags: tags.into_iter().map(TagResponse::from).collect(),
        comments_count,
    }
}

pub fn tag_response(tag: tag::Model, posts_count: i64) -> TagResponse {
    TagWithCount { tag, posts_count }.into()
}
