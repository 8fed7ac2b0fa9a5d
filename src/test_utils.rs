use chrono::{DateTime, Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::*;
use uuid::Uuid;

use crate::entities::{comment, post, post_like, post_tag, tag, user};

/// Fresh in-memory SQLite database with every migration applied.
pub async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    // A second pooled connection would open a different empty database
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub fn at(timestamp: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(timestamp)
        .expect("rfc3339 timestamp")
        .with_timezone(&Utc)
}

pub async fn insert_user(db: &DatabaseConnection, username: &str, is_staff: bool) -> user::Model {
    user::ActiveModel {
        public_id: Set(Uuid::now_v7()),
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        is_staff: Set(is_staff),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user")
}

/// Builds rows for tests. Posts are written by a staff author created up front.
pub struct Fixture<'a> {
    db: &'a DatabaseConnection,
    pub author: user::Model,
    comments: i64,
}

impl<'a> Fixture<'a> {
    pub async fn new(db: &'a DatabaseConnection) -> Self {
        let author = insert_user(db, "author", true).await;
        Self { db, author, comments: 0 }
    }

    pub async fn user(&mut self, username: &str, is_staff: bool) -> user::Model {
        insert_user(self.db, username, is_staff).await
    }

    pub async fn tag(&mut self, title: &str) -> tag::Model {
        tag::ActiveModel {
            public_id: Set(Uuid::now_v7()),
            title: Set(title.to_string()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .expect("insert tag")
    }

    pub async fn post(&mut self, slug: &str, published_at: &str) -> post::Model {
        post::ActiveModel {
            public_id: Set(Uuid::now_v7()),
            title: Set(format!("Post {}", slug)),
            text: Set(format!("Body of {}", slug)),
            slug: Set(slug.to_string()),
            image: Set(format!("images/{}.jpg", slug)),
            published_at: Set(at(published_at)),
            author_id: Set(self.author.id),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .expect("insert post")
    }

    pub async fn link_tag(&mut self, post: &post::Model, tag: &tag::Model) {
        post_tag::ActiveModel {
            post_id: Set(post.id),
            tag_id: Set(tag.id),
        }
        .insert(self.db)
        .await
        .expect("link tag");
    }

    pub async fn like(&mut self, post: &post::Model, user: &user::Model) {
        post_like::ActiveModel {
            post_id: Set(post.id),
            user_id: Set(user.id),
        }
        .insert(self.db)
        .await
        .expect("like post");
    }

    pub async fn comment(&mut self, post: &post::Model, text: &str) -> comment::Model {
        self.comments += 1;
        comment::ActiveModel {
            public_id: Set(Uuid::now_v7()),
            post_id: Set(post.id),
            author_id: Set(self.author.id),
            text: Set(text.to_string()),
            published_at: Set(post.published_at + Duration::minutes(self.comments)),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .expect("insert comment")
    }
}
