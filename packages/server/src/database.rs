use std::time::Duration;

use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder, SqliteQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr};
use tracing::info;

use crate::entity::{post, role, user};

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(20)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("warta_server::entity::*")
        .sync(&db)
        .await?;
    ensure_indexes(&db).await?;

    Ok(db)
}

/// Create the `created_at` indexes backing newest-first listing.
async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let indexes = [
        (
            "idx_post_created_at",
            Index::create()
                .if_not_exists()
                .name("idx_post_created_at")
                .table(post::Entity)
                .col(post::Column::CreatedAt)
                .to_owned(),
        ),
        (
            "idx_role_created_at",
            Index::create()
                .if_not_exists()
                .name("idx_role_created_at")
                .table(role::Entity)
                .col(role::Column::CreatedAt)
                .to_owned(),
        ),
        (
            "idx_user_created_at",
            Index::create()
                .if_not_exists()
                .name("idx_user_created_at")
                .table(user::Entity)
                .col(user::Column::CreatedAt)
                .to_owned(),
        ),
    ];

    for (name, stmt) in indexes {
        create_index(db, name, stmt).await?;
    }
    Ok(())
}

async fn create_index(
    db: &DatabaseConnection,
    name: &str,
    stmt: IndexCreateStatement,
) -> Result<(), DbErr> {
    let sql = match db.get_database_backend() {
        DbBackend::Postgres => stmt.to_string(PostgresQueryBuilder),
        _ => stmt.to_string(SqliteQueryBuilder),
    };
    db.execute_unprepared(&sql).await?;
    info!("Ensured index {} exists", name);
    Ok(())
}
