use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. PostTags (Many-to-Many)
        manager.create_table(
            Table::create()
                .table(PostTags::Table)
                .if_not_exists()
                .col(ColumnDef::new(PostTags::PostId).big_integer().not_null())
                .col(ColumnDef::new(PostTags::TagId).big_integer().not_null())
                .primary_key(Index::create().col(PostTags::PostId).col(PostTags::TagId))
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_post_tags_post_id")
                        .from(PostTags::Table, PostTags::PostId)
                        .to(Posts::Table, Posts::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_post_tags_tag_id")
                        .from(PostTags::Table, PostTags::TagId)
                        .to(Tags::Table, Tags::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned(),
        ).await?;

        // 2. PostLikes (Many-to-Many), one row per user and post
        manager.create_table(
            Table::create()
                .table(PostLikes::Table)
                .if_not_exists()
                .col(ColumnDef::new(PostLikes::PostId).big_integer().not_null())
                .col(ColumnDef::new(PostLikes::UserId).big_integer().not_null())
                .primary_key(Index::create().col(PostLikes::PostId).col(PostLikes::UserId))
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_post_likes_post_id")
                        .from(PostLikes::Table, PostLikes::PostId)
                        .to(Posts::Table, Posts::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_post_likes_user_id")
                        .from(PostLikes::Table, PostLikes::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned(),
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PostLikes::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(PostTags::Table).to_owned()).await?;
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
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
}

#[derive(Iden)]
enum PostTags {
    Table,
    PostId,
    TagId,
}

#[derive(Iden)]
enum PostLikes {
    Table,
    PostId,
    UserId,
}
