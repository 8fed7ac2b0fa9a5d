use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Posts
        manager.create_table(
            Table::create()
                .table(Posts::Table)
                .if_not_exists()
                .col(ColumnDef::new(Posts::Id).big_integer().not_null().auto_increment().primary_key())
                .col(ColumnDef::new(Posts::PublicId).uuid().not_null().unique_key())
                .col(ColumnDef::new(Posts::Title).string_len(200).not_null())
                .col(ColumnDef::new(Posts::Text).text().not_null())
                // Slug is indexed but not unique: uniqueness is an editorial convention
                .col(ColumnDef::new(Posts::Slug).string_len(200).not_null())
                .col(ColumnDef::new(Posts::Image).string().not_null())
                .col(ColumnDef::new(Posts::PublishedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Posts::AuthorId).big_integer().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_posts_author_id")
                        .from(Posts::Table, Posts::AuthorId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned(),
        ).await?;

        manager.create_index(
            Index::create()
                .name("idx_posts_slug")
                .table(Posts::Table)
                .col(Posts::Slug)
                .to_owned(),
        ).await?;

        manager.create_index(
            Index::create()
                .name("idx_posts_published_at")
                .table(Posts::Table)
                .col(Posts::PublishedAt)
                .to_owned(),
        ).await?;

        // 2. Tags
        manager.create_table(
            Table::create()
                .table(Tags::Table)
                .if_not_exists()
                .col(ColumnDef::new(Tags::Id).big_integer().not_null().auto_increment().primary_key())
                .col(ColumnDef::new(Tags::PublicId).uuid().not_null().unique_key())
                .col(ColumnDef::new(Tags::Title).string_len(20).not_null().unique_key())
                .to_owned(),
        ).await?;

        // 3. Comments
        manager.create_table(
            Table::create()
                .table(Comments::Table)
                .if_not_exists()
                .col(ColumnDef::new(Comments::Id).big_integer().not_null().auto_increment().primary_key())
                .col(ColumnDef::new(Comments::PublicId).uuid().not_null().unique_key())
                .col(ColumnDef::new(Comments::PostId).big_integer().not_null())
                .col(ColumnDef::new(Comments::AuthorId).big_integer().not_null())
                .col(ColumnDef::new(Comments::Text).text().not_null())
                .col(ColumnDef::new(Comments::PublishedAt).timestamp_with_time_zone().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_comments_post_id")
                        .from(Comments::Table, Comments::PostId)
                        .to(Posts::Table, Posts::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_comments_author_id")
                        .from(Comments::Table, Comments::AuthorId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned(),
        ).await?;

        manager.create_index(
            Index::create()
                .name("idx_comments_post_id")
                .table(Comments::Table)
                .col(Comments::PostId)
                .to_owned(),
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Comments::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Tags::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Posts::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Posts {
    Table,
    Id,
    PublicId,
    Title,
    Text,
    Slug,
    Image,
    PublishedAt,
    AuthorId,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
    PublicId,
    Title,
}

#[derive(Iden)]
enum Comments {
    Table,
    Id,
    PublicId,
    PostId,
    AuthorId,
    Text,
    PublishedAt,
}
