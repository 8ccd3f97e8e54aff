use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `interviews` table and its owner index if they do not exist.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS interviews (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL,
            name        TEXT NOT NULL DEFAULT '',
            position    TEXT NOT NULL DEFAULT '',
            experience  JSONB NOT NULL DEFAULT 'null'::jsonb,
            description TEXT NOT NULL DEFAULT '',
            tech_stack  TEXT NOT NULL DEFAULT '',
            questions   JSONB NOT NULL DEFAULT '[]'::jsonb,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS interviews_user_id_updated_at_idx \
         ON interviews (user_id, updated_at DESC)",
    )
    .execute(pool)
    .await?;

    info!("Schema ready: interviews");
    Ok(())
}
