use std::collections::{BTreeSet, HashMap};

use axum::http::StatusCode;
use chrono::Utc;
use sea_orm::*;
use serde_json::{json, Map, Value};
use slug::slugify;
use uuid::Uuid;

use super::{db_error, ServiceError};
use crate::admin::AdminModel;
use crate::entities::{comment, post, post_like, post_tag, tag, user};
use crate::models::admin_model::*;
use crate::repositories::post_repository::PostQuery;
use crate::repositories::user_repository::UserRepository;

const DEFAULT_ADMIN_PAGE_SIZE: u64 = 25;
const DEFAULT_LOOKUP_LIMIT: u64 = 20;

pub struct AdminService;

impl AdminService {
    /// List view rows, projected to the model's configured columns.
    pub async fn list(
        db: &DatabaseConnection,
        model: AdminModel,
        params: AdminListParams,
    ) -> Result<AdminListResponse, ServiceError> {
        let page = params.page.unwrap_or(1).max(1);
        let limit = params.limit.unwrap_or(DEFAULT_ADMIN_PAGE_SIZE).clamp(1, 100);

        let (rows, total) = match model {
            AdminModel::Posts => Self::post_rows(db, page, limit).await?,
            AdminModel::Tags => Self::tag_rows(db, page, limit).await?,
            AdminModel::Comments => Self::comment_rows(db, page, limit).await?,
        };

        let config = model.config();
        Ok(AdminListResponse {
            model: config.name,
            columns: config.list_display.to_vec(),
            raw_id_fields: config.raw_id_fields.to_vec(),
            rows: rows.into_iter().map(|row| config.project(row)).collect(),
            total,
            page,
            limit,
        })
    }

    /// Candidates for a raw-id field's lookup picker.
    pub async fn lookup(
        db: &DatabaseConnection,
        model: AdminModel,
        field: &str,
        params: LookupParams,
    ) -> Result<Vec<LookupItem>, ServiceError> {
        if !model.config().is_raw_id(field) {
            return Err((
                StatusCode::NOT_FOUND,
                "FIELD_NOT_RAW_ID",
                format!("'{}' has no lookup on {}", field, model.config().name),
            ));
        }

        let limit = params.limit.unwrap_or(DEFAULT_LOOKUP_LIMIT).clamp(1, 100);
        let q = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

        let items = match (model, field) {
            // Only staff may author posts
            (AdminModel::Posts, "author") => Self::user_items(db, q, true, limit).await?,
            (AdminModel::Posts, "likes") | (AdminModel::Comments, "author") => {
                Self::user_items(db, q, false, limit).await?
            }
            (AdminModel::Posts, "tags") => {
                let mut select = tag::Entity::find();
                if let Some(q) = q {
                    select = select.filter(tag::Column::Title.contains(tag::normalize_title(q)));
                }
                select
                    .order_by_asc(tag::Column::Title)
                    .limit(limit)
                    .all(db)
                    .await
                    .map_err(|e| db_error("DB_ERR", e))?
                    .into_iter()
                    .map(|t| LookupItem { id: t.public_id, label: t.title })
                    .collect()
            }
            (AdminModel::Comments, "post") => {
                let mut select = post::Entity::find();
                if let Some(q) = q {
                    select = select.filter(post::Column::Title.contains(q));
                }
                select
                    .order_by_desc(post::Column::PublishedAt)
                    .limit(limit)
                    .all(db)
                    .await
                    .map_err(|e| db_error("DB_ERR", e))?
                    .into_iter()
                    .map(|p| LookupItem { id: p.public_id, label: p.title })
                    .collect()
            }
            _ => Vec::new(),
        };

        Ok(items)
    }

    pub async fn create_post(db: &DatabaseConnection, payload: CreatePostRequest) -> Result<Value, ServiceError> {
        let txn = db.begin().await
            .map_err(|e| db_error("TXN_ERR", e))?;

        let author = Self::resolve_staff_author(&txn, payload.author).await?;
        let public_id = Uuid::now_v7();
        let slug = match payload.slug {
            Some(s) => s,
            None => Self::slug_for(&payload.title, public_id),
        };

        let saved = post::ActiveModel {
            id: NotSet,
            public_id: Set(public_id),
            title: Set(payload.title),
            text: Set(payload.text),
            slug: Set(slug),
            image: Set(payload.image),
            published_at: Set(payload.published_at),
            author_id: Set(author.id),
        }
        .insert(&txn)
        .await
        .map_err(|e| db_error("DB_WRITE_ERR", e))?;

        if let Some(tag_ids) = payload.tags {
            Self::replace_tags(&txn, saved.id, &tag_ids).await?;
        }
        if let Some(user_ids) = payload.likes {
            Self::replace_likes(&txn, saved.id, &user_ids).await?;
        }

        txn.commit().await
            .map_err(|e| db_error("TXN_COMMIT_ERR", e))?;

        tracing::info!(post = %saved.public_id, slug = %saved.slug, "post created");
        Ok(Self::post_row(&saved, Some(&author)).into())
    }

    pub async fn update_post(
        db: &DatabaseConnection,
        public_id: Uuid,
        payload: UpdatePostRequest,
    ) -> Result<Value, ServiceError> {
        let txn = db.begin().await
            .map_err(|e| db_error("TXN_ERR", e))?;

        let existing = post::Entity::find()
            .filter(post::Column::PublicId.eq(public_id))
            .one(&txn)
            .await
            .map_err(|e| db_error("DB_ERR", e))?
            .ok_or((StatusCode::NOT_FOUND, "POST_NOT_FOUND", "Post not found".to_string()))?;

        let author = match payload.author {
            Some(author_id) => Self::resolve_staff_author(&txn, author_id).await?,
            None => user::Entity::find_by_id(existing.author_id)
                .one(&txn)
                .await
                .map_err(|e| db_error("DB_ERR", e))?
                .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "DATA_CORRUPT", "Post has no author".to_string()))?,
        };

        let mut active: post::ActiveModel = existing.into();
        if let Some(t) = payload.title { active.title = Set(t); }
        if let Some(t) = payload.text { active.text = Set(t); }
        if let Some(s) = payload.slug { active.slug = Set(s); }
        if let Some(img) = payload.image { active.image = Set(img); }
        if let Some(p) = payload.published_at { active.published_at = Set(p); }
        active.author_id = Set(author.id);

        let updated = active.update(&txn).await
            .map_err(|e| db_error("DB_WRITE_ERR", e))?;

        if let Some(tag_ids) = payload.tags {
            Self::replace_tags(&txn, updated.id, &tag_ids).await?;
        }
        if let Some(user_ids) = payload.likes {
            Self::replace_likes(&txn, updated.id, &user_ids).await?;
        }

        txn.commit().await
            .map_err(|e| db_error("TXN_COMMIT_ERR", e))?;

        tracing::info!(post = %updated.public_id, "post updated");
        Ok(Self::post_row(&updated, Some(&author)).into())
    }

    pub async fn create_tag(db: &DatabaseConnection, payload: TagRequest) -> Result<Value, ServiceError> {
        // Title is normalized by the entity before it is written
        let saved = tag::ActiveModel {
            id: NotSet,
            public_id: Set(Uuid::now_v7()),
            title: Set(payload.title),
        }
        .insert(db)
        .await
        .map_err(|e| db_error("DB_WRITE_ERR", e))?;

        tracing::info!(tag = %saved.title, "tag created");
        Ok(Self::tag_row(&saved).into())
    }

    pub async fn update_tag(
        db: &DatabaseConnection,
        public_id: Uuid,
        payload: TagRequest,
    ) -> Result<Value, ServiceError> {
        let existing = tag::Entity::find()
            .filter(tag::Column::PublicId.eq(public_id))
            .one(db)
            .await
            .map_err(|e| db_error("DB_ERR", e))?
            .ok_or((StatusCode::NOT_FOUND, "TAG_NOT_FOUND", "Tag not found".to_string()))?;

        let mut active: tag::ActiveModel = existing.into();
        active.title = Set(payload.title);
        let updated = active.update(db).await
            .map_err(|e| db_error("DB_WRITE_ERR", e))?;

        Ok(Self::tag_row(&updated).into())
    }

    pub async fn create_comment(
        db: &DatabaseConnection,
        payload: CreateCommentRequest,
    ) -> Result<Value, ServiceError> {
        let post = Self::resolve_post(db, payload.post).await?;
        let author = Self::resolve_user(db, payload.author).await?;

        let saved = comment::ActiveModel {
            id: NotSet,
            public_id: Set(Uuid::now_v7()),
            post_id: Set(post.id),
            author_id: Set(author.id),
            text: Set(payload.text),
            published_at: Set(payload.published_at.unwrap_or_else(Utc::now)),
        }
        .insert(db)
        .await
        .map_err(|e| db_error("DB_WRITE_ERR", e))?;

        Ok(Self::comment_row(&saved, Some(&post), Some(&author)).into())
    }

    pub async fn update_comment(
        db: &DatabaseConnection,
        public_id: Uuid,
        payload: UpdateCommentRequest,
    ) -> Result<Value, ServiceError> {
        let existing = comment::Entity::find()
            .filter(comment::Column::PublicId.eq(public_id))
            .one(db)
            .await
            .map_err(|e| db_error("DB_ERR", e))?
            .ok_or((StatusCode::NOT_FOUND, "COMMENT_NOT_FOUND", "Comment not found".to_string()))?;

        let post = match payload.post {
            Some(id) => Self::resolve_post(db, id).await?,
            None => post::Entity::find_by_id(existing.post_id)
                .one(db)
                .await
                .map_err(|e| db_error("DB_ERR", e))?
                .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "DATA_CORRUPT", "Comment has no post".to_string()))?,
        };
        let author = match payload.author {
            Some(id) => Self::resolve_user(db, id).await?,
            None => user::Entity::find_by_id(existing.author_id)
                .one(db)
                .await
                .map_err(|e| db_error("DB_ERR", e))?
                .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "DATA_CORRUPT", "Comment has no author".to_string()))?,
        };

        let mut active: comment::ActiveModel = existing.into();
        active.post_id = Set(post.id);
        active.author_id = Set(author.id);
        if let Some(t) = payload.text { active.text = Set(t); }
        if let Some(p) = payload.published_at { active.published_at = Set(p); }

        let updated = active.update(db).await
            .map_err(|e| db_error("DB_WRITE_ERR", e))?;

        Ok(Self::comment_row(&updated, Some(&post), Some(&author)).into())
    }

    pub async fn delete(db: &DatabaseConnection, model: AdminModel, public_id: Uuid) -> Result<(), ServiceError> {
        match model {
            AdminModel::Posts => Self::delete_post(db, public_id).await,
            AdminModel::Tags => {
                let tag = tag::Entity::find()
                    .filter(tag::Column::PublicId.eq(public_id))
                    .one(db)
                    .await
                    .map_err(|e| db_error("DB_ERR", e))?
                    .ok_or((StatusCode::NOT_FOUND, "TAG_NOT_FOUND", "Tag not found".to_string()))?;

                let txn = db.begin().await.map_err(|e| db_error("TXN_ERR", e))?;
                post_tag::Entity::delete_many()
                    .filter(post_tag::Column::TagId.eq(tag.id))
                    .exec(&txn)
                    .await
                    .map_err(|e| db_error("DB_WRITE_ERR", e))?;
                tag::Entity::delete_by_id(tag.id)
                    .exec(&txn)
                    .await
                    .map_err(|e| db_error("DB_WRITE_ERR", e))?;
                txn.commit().await.map_err(|e| db_error("TXN_COMMIT_ERR", e))?;
                Ok(())
            }
            AdminModel::Comments => {
                let res = comment::Entity::delete_many()
                    .filter(comment::Column::PublicId.eq(public_id))
                    .exec(db)
                    .await
                    .map_err(|e| db_error("DB_WRITE_ERR", e))?;
                if res.rows_affected == 0 {
                    return Err((StatusCode::NOT_FOUND, "COMMENT_NOT_FOUND", "Comment not found".to_string()));
                }
                Ok(())
            }
        }
    }

    // Comments and both link tables go with the post. The foreign keys cascade
    // too; clearing them here keeps backends without enforced keys consistent.
    async fn delete_post(db: &DatabaseConnection, public_id: Uuid) -> Result<(), ServiceError> {
        let post = post::Entity::find()
            .filter(post::Column::PublicId.eq(public_id))
            .one(db)
            .await
            .map_err(|e| db_error("DB_ERR", e))?
            .ok_or((StatusCode::NOT_FOUND, "POST_NOT_FOUND", "Post not found".to_string()))?;

        let txn = db.begin().await.map_err(|e| db_error("TXN_ERR", e))?;

        comment::Entity::delete_many()
            .filter(comment::Column::PostId.eq(post.id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("DB_WRITE_ERR", e))?;
        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(post.id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("DB_WRITE_ERR", e))?;
        post_like::Entity::delete_many()
            .filter(post_like::Column::PostId.eq(post.id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("DB_WRITE_ERR", e))?;
        post::Entity::delete_by_id(post.id)
            .exec(&txn)
            .await
            .map_err(|e| db_error("DB_WRITE_ERR", e))?;

        txn.commit().await.map_err(|e| db_error("TXN_COMMIT_ERR", e))?;

        tracing::info!(post = %post.public_id, "post deleted");
        Ok(())
    }

    async fn post_rows(db: &DatabaseConnection, page: u64, limit: u64) -> Result<(Vec<Map<String, Value>>, u64), ServiceError> {
        let (posts, total) = PostQuery::new()
            .paginate(db, page, limit)
            .await
            .map_err(|e| db_error("DB_ERR", e))?;
        let authors = UserRepository::load_by_ids(db, posts.iter().map(|p| p.author_id))
            .await
            .map_err(|e| db_error("DB_ERR", e))?;

        let rows = posts
            .iter()
            .map(|p| Self::post_row(p, authors.get(&p.author_id)))
            .collect();
        Ok((rows, total))
    }

    async fn tag_rows(db: &DatabaseConnection, page: u64, limit: u64) -> Result<(Vec<Map<String, Value>>, u64), ServiceError> {
        let paginator = tag::Entity::find()
            .order_by_asc(tag::Column::Title)
            .paginate(db, limit);
        let total = paginator.num_items().await.map_err(|e| db_error("DB_ERR", e))?;
        let tags = paginator.fetch_page(page - 1).await.map_err(|e| db_error("DB_ERR", e))?;

        Ok((tags.iter().map(Self::tag_row).collect(), total))
    }

    async fn comment_rows(db: &DatabaseConnection, page: u64, limit: u64) -> Result<(Vec<Map<String, Value>>, u64), ServiceError> {
        let paginator = comment::Entity::find()
            .order_by_asc(comment::Column::PublishedAt)
            .order_by_asc(comment::Column::Id)
            .paginate(db, limit);
        let total = paginator.num_items().await.map_err(|e| db_error("DB_ERR", e))?;
        let comments = paginator.fetch_page(page - 1).await.map_err(|e| db_error("DB_ERR", e))?;

        let post_ids: BTreeSet<i64> = comments.iter().map(|c| c.post_id).collect();
        let posts: HashMap<i64, post::Model> = if post_ids.is_empty() {
            HashMap::new()
        } else {
            post::Entity::find()
                .filter(post::Column::Id.is_in(post_ids))
                .all(db)
                .await
                .map_err(|e| db_error("DB_ERR", e))?
                .into_iter()
                .map(|p| (p.id, p))
                .collect()
        };
        let authors = UserRepository::load_by_ids(db, comments.iter().map(|c| c.author_id))
            .await
            .map_err(|e| db_error("DB_ERR", e))?;

        let rows = comments
            .iter()
            .map(|c| Self::comment_row(c, posts.get(&c.post_id), authors.get(&c.author_id)))
            .collect();
        Ok((rows, total))
    }

    async fn user_items(
        db: &DatabaseConnection,
        q: Option<&str>,
        staff_only: bool,
        limit: u64,
    ) -> Result<Vec<LookupItem>, ServiceError> {
        Ok(UserRepository::search(db, q, staff_only, limit)
            .await
            .map_err(|e| db_error("DB_ERR", e))?
            .into_iter()
            .map(|u| LookupItem { id: u.public_id, label: u.username })
            .collect())
    }

    async fn resolve_staff_author<C>(db: &C, public_id: Uuid) -> Result<user::Model, ServiceError>
    where
        C: ConnectionTrait,
    {
        let author = Self::resolve_user(db, public_id).await?;
        if !author.is_staff {
            return Err((
                StatusCode::BAD_REQUEST,
                "AUTHOR_NOT_STAFF",
                format!("User {} is not staff and cannot author posts", author.username),
            ));
        }
        Ok(author)
    }

    async fn resolve_user<C>(db: &C, public_id: Uuid) -> Result<user::Model, ServiceError>
    where
        C: ConnectionTrait,
    {
        UserRepository::find_by_public_id(db, public_id)
            .await
            .map_err(|e| db_error("DB_ERR", e))?
            .ok_or((StatusCode::BAD_REQUEST, "USER_NOT_FOUND", format!("User with ID {} not found", public_id)))
    }

    async fn resolve_post(db: &DatabaseConnection, public_id: Uuid) -> Result<post::Model, ServiceError> {
        post::Entity::find()
            .filter(post::Column::PublicId.eq(public_id))
            .one(db)
            .await
            .map_err(|e| db_error("DB_ERR", e))?
            .ok_or((StatusCode::BAD_REQUEST, "POST_NOT_FOUND", format!("Post with ID {} not found", public_id)))
    }

    async fn replace_tags<C>(db: &C, post_id: i64, tag_ids: &[Uuid]) -> Result<(), ServiceError>
    where
        C: ConnectionTrait,
    {
        let wanted: BTreeSet<Uuid> = tag_ids.iter().copied().collect();
        let tags = if wanted.is_empty() {
            Vec::new()
        } else {
            tag::Entity::find()
                .filter(tag::Column::PublicId.is_in(wanted.iter().copied()))
                .all(db)
                .await
                .map_err(|e| db_error("DB_ERR", e))?
        };
        if let Some(missing) = wanted.iter().find(|id| !tags.iter().any(|t| t.public_id == **id)) {
            return Err((StatusCode::BAD_REQUEST, "TAG_NOT_FOUND", format!("Tag with ID {} not found", missing)));
        }

        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .exec(db)
            .await
            .map_err(|e| db_error("DB_WRITE_ERR", e))?;

        if !tags.is_empty() {
            post_tag::Entity::insert_many(tags.iter().map(|t| post_tag::ActiveModel {
                post_id: Set(post_id),
                tag_id: Set(t.id),
            }))
            .exec_without_returning(db)
            .await
            .map_err(|e| db_error("DB_WRITE_ERR", e))?;
        }
        Ok(())
    }

    async fn replace_likes<C>(db: &C, post_id: i64, user_ids: &[Uuid]) -> Result<(), ServiceError>
    where
        C: ConnectionTrait,
    {
        let wanted: Vec<Uuid> = user_ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let users = UserRepository::find_many_by_public_ids(db, &wanted)
            .await
            .map_err(|e| db_error("DB_ERR", e))?;
        if let Some(missing) = wanted.iter().find(|id| !users.iter().any(|u| u.public_id == **id)) {
            return Err((StatusCode::BAD_REQUEST, "USER_NOT_FOUND", format!("User with ID {} not found", missing)));
        }

        post_like::Entity::delete_many()
            .filter(post_like::Column::PostId.eq(post_id))
            .exec(db)
            .await
            .map_err(|e| db_error("DB_WRITE_ERR", e))?;

        if !users.is_empty() {
            post_like::Entity::insert_many(users.iter().map(|u| post_like::ActiveModel {
                post_id: Set(post_id),
                user_id: Set(u.id),
            }))
            .exec_without_returning(db)
            .await
            .map_err(|e| db_error("DB_WRITE_ERR", e))?;
        }
        Ok(())
    }

    fn slug_for(title: &str, public_id: Uuid) -> String {
        let slug = slugify(title);
        if slug.is_empty() { public_id.to_string() } else { slug }
    }

    fn post_row(post: &post::Model, author: Option<&user::Model>) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert("id".into(), json!(post.public_id));
        row.insert("title".into(), json!(post.title));
        row.insert("slug".into(), json!(post.slug));
        row.insert("image".into(), json!(post.image));
        row.insert("published_at".into(), json!(post.published_at));
        row.insert("author".into(), json!(author.map(|a| a.username.as_str())));
        row
    }

    fn tag_row(tag: &tag::Model) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert("id".into(), json!(tag.public_id));
        row.insert("title".into(), json!(tag.title));
        row
    }

    fn comment_row(comment: &comment::Model, post: Option<&post::Model>, author: Option<&user::Model>) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert("id".into(), json!(comment.public_id));
        row.insert("post".into(), json!(post.map(|p| p.title.as_str())));
        row.insert("author".into(), json!(author.map(|a| a.username.as_str())));
        row.insert("text".into(), json!(comment.text));
        row.insert("published_at".into(), json!(comment.published_at));
        row
    }
}
