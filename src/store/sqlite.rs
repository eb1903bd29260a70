//! SQLite-backed document store.
//!
//! Each collection is a two-column table (id, JSON document), with an index
//! on the one equality-filtered field (`bills.event_id`). Schema setup is
//! idempotent and applied on connect.

use super::{DocumentStore, StoreError, IN_QUERY_CHUNK};
use crate::domain::{Bill, Decimal, Event, EventId, UserId, UserProfile};
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Document store persisted in a single SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `db_path`, configure
    /// pragmas, and apply the schema.
    ///
    /// # Errors
    /// Returns an error if the pool cannot be opened or the schema fails to
    /// apply.
    pub async fn connect(db_path: &str) -> Result<Self, StoreError> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .after_connect(|conn, _meta| Box::pin(async move { configure_pragmas(conn).await }))
            .connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await?;

        apply_schema(&pool).await?;
        info!("document store initialized at {}", db_path);

        Ok(SqliteStore { pool })
    }

    fn encode<T: Serialize>(value: &T) -> Result<String, StoreError> {
        serde_json::to_string(value).map_err(|e| StoreError::Io(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(id: &str, doc: &str) -> Result<T, StoreError> {
        serde_json::from_str(doc).map_err(|e| StoreError::Corrupt {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Read-modify-write an event document inside a transaction.
    async fn mutate_event<F>(&self, id: &EventId, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Event),
    {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT doc FROM events WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::Io(format!("event {} missing on update", id)))?;

        let doc: String = row.get("doc");
        let mut event: Event = Self::decode(id.as_str(), &doc)?;
        mutate(&mut event);
        event.updated_at = Utc::now();

        sqlx::query("UPDATE events SET doc = ? WHERE id = ?")
            .bind(Self::encode(&event)?)
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    let schema_sql = include_str!("schema.sql");
    for statement in schema_sql.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

async fn configure_pragmas(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;

    // journal_mode returns the mode actually set; fetch to consume it.
    sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;

    Ok(())
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get_event(&self, id: &EventId) -> Result<Option<Event>, StoreError> {
        let row = sqlx::query("SELECT doc FROM events WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| {
            let doc: String = r.get("doc");
            Self::decode(id.as_str(), &doc)
        })
        .transpose()
    }

    async fn put_event(&self, event: &Event) -> Result<(), StoreError> {
        sqlx::query("INSERT OR REPLACE INTO events (id, doc) VALUES (?, ?)")
            .bind(event.id.as_str())
            .bind(Self::encode(event)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn events_by_ids(&self, ids: &[EventId]) -> Result<Vec<Event>, StoreError> {
        if ids.len() > IN_QUERY_CHUNK {
            return Err(StoreError::ChunkTooLarge(ids.len()));
        }
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT id, doc FROM events WHERE id IN ({})", placeholders);
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id.as_str());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let doc: String = row.get("doc");
                Self::decode(&id, &doc)
            })
            .collect()
    }

    async fn update_balances(
        &self,
        id: &EventId,
        balances: &BTreeMap<UserId, Decimal>,
    ) -> Result<(), StoreError> {
        self.mutate_event(id, |event| {
            event.balances = balances.clone();
        })
        .await
    }

    async fn update_total_expenses(&self, id: &EventId, total: Decimal) -> Result<(), StoreError> {
        self.mutate_event(id, |event| {
            event.total_expenses = total;
        })
        .await
    }

    async fn bills_by_event(&self, event_id: &EventId) -> Result<Vec<Bill>, StoreError> {
        let rows = sqlx::query("SELECT id, doc FROM bills WHERE event_id = ?")
            .bind(event_id.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let doc: String = row.get("doc");
                Self::decode(&id, &doc)
            })
            .collect()
    }

    async fn insert_bill(&self, bill: &Bill) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO bills (id, event_id, doc) VALUES (?, ?, ?)")
            .bind(bill.id.as_str())
            .bind(bill.event_id.as_str())
            .bind(Self::encode(bill)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        let row = sqlx::query("SELECT doc FROM users WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| {
            let doc: String = r.get("doc");
            Self::decode(id.as_str(), &doc)
        })
        .transpose()
    }

    async fn put_user(&self, user: &UserProfile) -> Result<(), StoreError> {
        sqlx::query("INSERT OR REPLACE INTO users (id, doc) VALUES (?, ?)")
            .bind(user.user_id.as_str())
            .bind(Self::encode(user)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, StoreError> {
        if ids.len() > IN_QUERY_CHUNK {
            return Err(StoreError::ChunkTooLarge(ids.len()));
        }
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT id, doc FROM users WHERE id IN ({})", placeholders);
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id.as_str());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let doc: String = row.get("doc");
                Self::decode(&id, &doc)
            })
            .collect()
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, StoreError> {
        let rows = sqlx::query("SELECT id, doc FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let doc: String = row.get("doc");
                Self::decode(&id, &doc)
            })
            .collect()
    }

    async fn put_event_and_user(
        &self,
        event: &Event,
        user: &UserProfile,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT OR REPLACE INTO events (id, doc) VALUES (?, ?)")
            .bind(event.id.as_str())
            .bind(Self::encode(event)?)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT OR REPLACE INTO users (id, doc) VALUES (?, ?)")
            .bind(user.user_id.as_str())
            .bind(Self::encode(user)?)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
