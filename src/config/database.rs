use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema, Statement,
};
use tracing::info;

use crate::domain::message::entity::problem_message;

/// Index backing "latest active record for a problem key" lookups.
const ACTIVE_LOOKUP_INDEX: &str = "idx_problem_message_key_status_ts";

/// Opens the store and creates the schema if absent.
///
/// One relay process performs a handful of statements, so a single pooled
/// connection is enough; SQLite serializes writers across processes.
pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!("Successfully connected to the message store.");

    create_tables(&db).await?;

    Ok(db)
}

async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    create_table_if_not_exists(db, &schema, problem_message::Entity).await?;
    create_index_if_not_exists(
        db,
        ACTIVE_LOOKUP_INDEX,
        "problem_message",
        &["problem_key", "status", "timestamp"],
    )
    .await?;

    Ok(())
}

async fn create_index_if_not_exists(
    db: &DatabaseConnection,
    index_name: &str,
    table_name: &str,
    columns: &[&str],
) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let cols = columns.join(", ");
    let sql = format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
        index_name, table_name, cols
    );
    let stmt = Statement::from_string(backend, sql);
    match db.execute(stmt).await {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!("Failed to create index {}: {}", index_name, e);
            Err(e)
        }
    }
}

async fn create_table_if_not_exists<E>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr>
where
    E: sea_orm::EntityTrait,
{
    let backend = db.get_database_backend();
    let create_stmt: Statement =
        backend.build(schema.create_table_from_entity(entity).if_not_exists());

    db.execute(create_stmt).await.map(|_| ()).map_err(|e| {
        tracing::error!("Failed to create table: {}", e);
        e
    })
}
