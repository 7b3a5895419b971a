use crate::db::models::{ImageRecord, Label, Operator};
use crate::db::schema::SQLITE_INIT;
use crate::error::SnowgateError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

/// Open (creating if missing) the SQLite database behind `database_url`.
pub async fn connect(database_url: &str) -> Result<SqlitePool, SnowgateError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
    Ok(pool)
}

#[derive(Clone)]
pub struct PortalStorage {
    pool: SqlitePool,
}

impl PortalStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), SnowgateError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert a labeling account. Fails on a duplicate username
    /// (UNIQUE constraint). Returns the new row id.
    pub async fn insert_operator(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<i64, SnowgateError> {
        let result = sqlx::query("INSERT INTO operators (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_operator(&self, username: &str) -> Result<Option<Operator>, SnowgateError> {
        let row = sqlx::query("SELECT id, username, password_hash FROM operators WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_operator).transpose()
    }

    /// Insert a new image row with the default `unlabeled` label. Fails on a
    /// duplicate filename (UNIQUE constraint). Returns the new row id.
    pub async fn insert_image(
        &self,
        filename: &str,
        device_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<i64, SnowgateError> {
        let result = sqlx::query(
            r#"INSERT INTO images (filename, timestamp, label, device_id)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(filename)
        .bind(timestamp.to_rfc3339())
        .bind(Label::Unlabeled.as_str())
        .bind(device_id)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_image(&self, id: i64) -> Result<Option<ImageRecord>, SnowgateError> {
        let row = sqlx::query(
            r#"SELECT id, filename, timestamp, label, device_id
               FROM images WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_image).transpose()
    }

    /// The next image awaiting a label, in insertion (primary key) order.
    pub async fn first_unlabeled(&self) -> Result<Option<ImageRecord>, SnowgateError> {
        let row = sqlx::query(
            r#"SELECT id, filename, timestamp, label, device_id
               FROM images WHERE label = ? ORDER BY id LIMIT 1"#,
        )
        .bind(Label::Unlabeled.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_image).transpose()
    }

    pub async fn count_unlabeled(&self) -> Result<i64, SnowgateError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM images WHERE label = ?")
            .bind(Label::Unlabeled.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    pub async fn count_images(&self) -> Result<i64, SnowgateError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM images")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    /// Overwrite the label of an existing image. Relabeling an already
    /// labeled image is permitted; the update is a single atomic statement,
    /// so concurrent calls on the same id are last-write-wins. Returns
    /// `false` when no row has that id.
    pub async fn set_label(&self, id: i64, label: Label) -> Result<bool, SnowgateError> {
        let result = sqlx::query("UPDATE images SET label = ? WHERE id = ?")
            .bind(label.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_operator(row: SqliteRow) -> Result<Operator, SnowgateError> {
        Ok(Operator {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
        })
    }

    fn row_to_image(row: SqliteRow) -> Result<ImageRecord, SnowgateError> {
        let id: i64 = row.try_get("id")?;
        let filename: String = row.try_get("filename")?;
        let timestamp_str: String = row.try_get("timestamp")?;
        let label_str: String = row.try_get("label")?;
        let device_id: String = row.try_get("device_id")?;

        let timestamp: DateTime<Utc> = chrono::DateTime::parse_from_rfc3339(&timestamp_str)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc);
        let label = Label::from_str(&label_str)
            .map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(ImageRecord {
            id,
            filename,
            timestamp,
            label,
            device_id,
        })
    }
}
