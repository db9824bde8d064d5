use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                    .col(created_at(Users::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Posts::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Posts::Text).text().null())
                    .col(
                        ColumnDef::new(Posts::Media)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(counter(Posts::LikesCount))
                    .col(counter(Posts::SavesCount))
                    .col(counter(Posts::CommentsCount))
                    .col(created_at(Posts::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_author")
                            .from(Posts::Table, Posts::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Comments::PostId).uuid().not_null())
                    .col(ColumnDef::new(Comments::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Comments::Text).text().not_null())
                    .col(counter(Comments::LikesCount))
                    .col(created_at(Comments::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_post")
                            .from(Comments::Table, Comments::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_author")
                            .from(Comments::Table, Comments::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // (user, user) edges
        manager
            .create_table(edge_table(
                Follows::Table,
                Follows::FollowerId,
                Follows::FollowingId,
                Users::Table,
                Users::Id,
                Follows::CreatedAt,
            ))
            .await?;

        manager
            .create_table(edge_table(
                Blocks::Table,
                Blocks::BlockerId,
                Blocks::BlockedId,
                Users::Table,
                Users::Id,
                Blocks::CreatedAt,
            ))
            .await?;

        // (user, target) memberships
        manager
            .create_table(edge_table(
                PostViews::Table,
                PostViews::UserId,
                PostViews::PostId,
                Posts::Table,
                Posts::Id,
                PostViews::LastViewedAt,
            ))
            .await?;

        manager
            .create_table(edge_table(
                PostLikes::Table,
                PostLikes::UserId,
                PostLikes::PostId,
                Posts::Table,
                Posts::Id,
                PostLikes::CreatedAt,
            ))
            .await?;

        manager
            .create_table(edge_table(
                PostSaves::Table,
                PostSaves::UserId,
                PostSaves::PostId,
                Posts::Table,
                Posts::Id,
                PostSaves::CreatedAt,
            ))
            .await?;

        manager
            .create_table(edge_table(
                CommentLikes::Table,
                CommentLikes::UserId,
                CommentLikes::CommentId,
                Comments::Table,
                Comments::Id,
                CommentLikes::CreatedAt,
            ))
            .await?;

        // Reverse lookups. The composite keys already cover the forward side.
        create_index(manager, "idx_posts_author_id", Posts::Table, Posts::AuthorId).await?;
        create_index(manager, "idx_comments_post_id", Comments::Table, Comments::PostId).await?;
        create_index(
            manager,
            "idx_follows_following_id",
            Follows::Table,
            Follows::FollowingId,
        )
        .await?;
        create_index(manager, "idx_blocks_blocked_id", Blocks::Table, Blocks::BlockedId).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, CommentLikes::Table).await?;
        drop_table(manager, PostSaves::Table).await?;
        drop_table(manager, PostLikes::Table).await?;
        drop_table(manager, PostViews::Table).await?;
        drop_table(manager, Blocks::Table).await?;
        drop_table(manager, Follows::Table).await?;
        drop_table(manager, Comments::Table).await?;
        drop_table(manager, Posts::Table).await?;
        drop_table(manager, Users::Table).await
    }
}

fn counter(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .default(0)
        .to_owned()
}

fn created_at(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

/// Two-column table keyed by `(owner, target)`, both sides cascading.
fn edge_table<T, C, R, RC>(
    table: T,
    owner: C,
    target: C,
    target_table: R,
    target_key: RC,
    timestamp: C,
) -> TableCreateStatement
where
    T: IntoIden + Copy + 'static,
    C: IntoIden + Copy + 'static,
    R: IntoIden + Copy + 'static,
    RC: IntoIden + Copy + 'static,
{
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(owner).uuid().not_null())
        .col(ColumnDef::new(target).uuid().not_null())
        .col(created_at(timestamp))
        .primary_key(Index::create().col(owner).col(target))
        .foreign_key(
            ForeignKey::create()
                .from(table, owner)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .from(table, target)
                .to(target_table, target_key)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

async fn drop_table<T>(manager: &SchemaManager<'_>, table: T) -> Result<(), DbErr>
where
    T: IntoIden + 'static,
{
    manager
        .drop_table(Table::drop().table(table).if_exists().to_owned())
        .await
}

async fn create_index<T, C>(
    manager: &SchemaManager<'_>,
    name: &str,
    table: T,
    col: C,
) -> Result<(), DbErr>
where
    T: IntoIden + 'static,
    C: IntoIden + 'static,
{
    manager
        .create_index(
            Index::create()
                .name(name)
                .table(table)
                .col(col)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden, Clone, Copy)]
enum Users {
    Table,
    Id,
    Username,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Posts {
    Table,
    Id,
    AuthorId,
    Text,
    Media,
    LikesCount,
    SavesCount,
    CommentsCount,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Comments {
    Table,
    Id,
    PostId,
    AuthorId,
    Text,
    LikesCount,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Follows {
    Table,
    FollowerId,
    FollowingId,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Blocks {
    Table,
    BlockerId,
    BlockedId,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum PostViews {
    Table,
    UserId,
    PostId,
    LastViewedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum PostLikes {
    Table,
    UserId,
    PostId,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum PostSaves {
    Table,
    UserId,
    PostId,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum CommentLikes {
    Table,
    UserId,
    CommentId,
    CreatedAt,
}
