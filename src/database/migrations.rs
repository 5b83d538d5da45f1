use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    create_presence_records_table(pool).await?;

    info!("Database migrations completed successfully");
    Ok(())
}

async fn create_presence_records_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS presence_records (
            id INTEGER PRIMARY KEY,
            sheet_target TEXT NOT NULL,
            day TEXT NOT NULL,
            event TEXT NOT NULL,
            time TEXT NOT NULL,
            nickname TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_presence_records_target ON presence_records (sheet_target)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
