use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validator_utils::{validate_not_blank, validate_slug};

#[derive(Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 chars"), custom(function = "validate_not_blank"))]
    pub title: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,

    // Derived from the title when omitted
    #[validate(length(max = 200, message = "Slug must be at most 200 chars"), custom(function = "validate_slug"))]
    pub slug: Option<String>,

    #[validate(custom(function = "validate_not_blank"))]
    pub image: String,

    pub published_at: DateTime<Utc>,

    pub author: Uuid,                 // raw id, staff user public id
    pub tags: Option<Vec<Uuid>>,      // raw ids, tag public ids
    pub likes: Option<Vec<Uuid>>,     // raw ids, user public ids
}

#[derive(Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 chars"), custom(function = "validate_not_blank"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub text: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Slug must be 1-200 chars"), custom(function = "validate_slug"))]
    pub slug: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub image: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub author: Option<Uuid>,
    pub tags: Option<Vec<Uuid>>,
    pub likes: Option<Vec<Uuid>>,
}

#[derive(Deserialize, Validate)]
pub struct TagRequest {
    #[validate(length(min = 1, max = 20, message = "Tag title must be 1-20 chars"), custom(function = "validate_not_blank"))]
    pub title: String,
}

#[derive(Deserialize, Validate)]
pub struct CreateCommentRequest {
    pub post: Uuid,   // raw id
    pub author: Uuid, // raw id
    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Validate)]
pub struct UpdateCommentRequest {
    pub post: Option<Uuid>,
    pub author: Option<Uuid>,
    #[validate(custom(function = "validate_not_blank"))]
    pub text: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct AdminListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct LookupParams {
    pub q: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct LookupItem {
    pub id: Uuid,
    pub label: String,
}

#[derive(Serialize, Debug)]
pub struct AdminListResponse {
    pub model: &'static str,
    pub columns: Vec<&'static str>,
    pub raw_id_fields: Vec<&'static str>,
    pub rows: Vec<Map<String, Value>>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}
