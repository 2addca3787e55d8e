//! Player repository: the SQLite-backed identity store.

use super::DbError;
use crate::check::{IdentityRecord, IdentityStore};
use async_trait::async_trait;
use sqlx::SqlitePool;

type PlayerRow = (Option<String>, Option<String>, String, Option<String>);

fn into_record((steam_id, platform_id, last_name, last_ip): PlayerRow) -> IdentityRecord {
    IdentityRecord {
        steam_id,
        platform_id,
        last_name,
        last_ip,
    }
}

/// Repository for player identity rows.
#[derive(Clone)]
pub struct PlayerRepository {
    pool: SqlitePool,
}

impl PlayerRepository {
    /// Create a new player repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a player's last seen name and IP.
    ///
    /// Matches an existing row on platform ID first, then Steam ID. When the
    /// two IDs were first seen on separate rows, those rows are merged into
    /// the platform ID row.
    pub async fn record_seen(
        &self,
        steam_id: Option<&str>,
        platform_id: Option<&str>,
        name: &str,
        ip: Option<&str>,
    ) -> Result<(), DbError> {
        if steam_id.is_none() && platform_id.is_none() {
            return Err(DbError::Internal(format!(
                "player '{}' has neither steam_id nor platform_id",
                name
            )));
        }

        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        let matches: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM players
            WHERE (platform_id IS NOT NULL AND platform_id = ?)
               OR (steam_id IS NOT NULL AND steam_id = ?)
            ORDER BY CASE WHEN platform_id = ? THEN 0 ELSE 1 END, id
            "#,
        )
        .bind(platform_id)
        .bind(steam_id)
        .bind(platform_id)
        .fetch_all(&mut *tx)
        .await?;

        let existing = matches.first().copied();
        for duplicate in matches.iter().skip(1) {
            sqlx::query("DELETE FROM players WHERE id = ?")
                .bind(duplicate)
                .execute(&mut *tx)
                .await?;
        }

        match existing {
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE players
                    SET steam_id = COALESCE(?, steam_id),
                        platform_id = COALESCE(?, platform_id),
                        last_name = ?,
                        last_ip = COALESCE(?, last_ip),
                        updated_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(steam_id)
                .bind(platform_id)
                .bind(name)
                .bind(ip)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO players (steam_id, platform_id, last_name, last_ip, created_at, updated_at)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(steam_id)
                .bind(platform_id)
                .bind(name)
                .bind(ip)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for PlayerRepository {
    async fn find_by_steam_id(&self, steam_id: &str) -> Result<Option<IdentityRecord>, DbError> {
        let row = sqlx::query_as::<_, PlayerRow>(
            "SELECT steam_id, platform_id, last_name, last_ip FROM players WHERE steam_id = ?",
        )
        .bind(steam_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(into_record))
    }

    async fn find_by_platform_id(
        &self,
        platform_id: &str,
    ) -> Result<Option<IdentityRecord>, DbError> {
        let row = sqlx::query_as::<_, PlayerRow>(
            "SELECT steam_id, platform_id, last_name, last_ip FROM players WHERE platform_id = ?",
        )
        .bind(platform_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(into_record))
    }

    async fn search_by_name(
        &self,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<IdentityRecord>, DbError> {
        let like = format!("%{}%", escape_like(pattern));
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, (Option<String>, Option<String>, String, Option<String>, i64)>(
            r#"
            SELECT steam_id, platform_id, last_name, last_ip, MIN(id) AS first_id
            FROM players
            WHERE last_name LIKE ? ESCAPE '\' AND platform_id IS NOT NULL
            GROUP BY platform_id
            ORDER BY first_id
            LIMIT ?
            "#,
        )
        .bind(like)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(steam_id, platform_id, last_name, last_ip, _)| {
                into_record((steam_id, platform_id, last_name, last_ip))
            })
            .collect())
    }

    async fn find_by_ip(&self, ip: &str) -> Result<Vec<IdentityRecord>, DbError> {
        let rows = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT steam_id, platform_id, last_name, last_ip
            FROM players
            WHERE last_ip = ?
            ORDER BY id
            "#,
        )
        .bind(ip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(into_record).collect())
    }
}

/// Escape LIKE wildcards so names match literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
