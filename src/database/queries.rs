use crate::database::models::PresenceRecord;
use crate::sheets::PresenceRow;
use sqlx::{SqlitePool, Row};

pub async fn insert_presence_record(
    pool: &SqlitePool,
    sheet_target: &str,
    row: &PresenceRow,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO presence_records (sheet_target, day, event, time, nickname) VALUES (?, ?, ?, ?, ?)"
    )
    .bind(sheet_target)
    .bind(&row.day)
    .bind(&row.event)
    .bind(&row.time)
    .bind(&row.nickname)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_presence_records(
    pool: &SqlitePool,
    sheet_target: &str,
) -> Result<Vec<PresenceRecord>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT id, sheet_target, day, event, time, nickname, created_at
         FROM presence_records
         WHERE sheet_target = ?
         ORDER BY id ASC"
    )
    .bind(sheet_target)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| PresenceRecord {
            id: row.get("id"),
            sheet_target: row.get("sheet_target"),
            day: row.get("day"),
            event: row.get("event"),
            time: row.get("time"),
            nickname: row.get("nickname"),
            created_at: row.get("created_at"),
        })
        .collect())
}
