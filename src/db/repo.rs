//! Repository layer for stage persistence.

use crate::domain::{decode_stages, encode_stages, Stage, StagePayload};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("malformed stages blob: {0}")]
    Blob(#[from] serde_json::Error),
}

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Fetch every stage in storage order.
    ///
    /// A single row with an undecodable blob fails the whole listing.
    pub async fn list_stages(&self) -> Result<Vec<Stage>, StoreError> {
        let rows = sqlx::query("SELECT id, stage_name, stages FROM stages")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(stage_from_row).collect()
    }

    /// Look up one stage by primary key.
    pub async fn get_stage(&self, id: i64) -> Result<Option<Stage>, StoreError> {
        let row = sqlx::query("SELECT id, stage_name, stages FROM stages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(stage_from_row).transpose()
    }

    /// Insert a new stage and return the id assigned by the database.
    pub async fn insert_stage(&self, payload: &StagePayload) -> Result<i64, StoreError> {
        let blob = encode_stages(&payload.stages)?;
        let result = sqlx::query("INSERT INTO stages (stage_name, stages) VALUES (?, ?)")
            .bind(payload.stage_name.as_str())
            .bind(blob)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Replace name and mapping of a stage. Returns the number of rows touched,
    /// which is zero when the id does not exist.
    pub async fn update_stage(&self, id: i64, payload: &StagePayload) -> Result<u64, StoreError> {
        let blob = encode_stages(&payload.stages)?;
        let result = sqlx::query("UPDATE stages SET stage_name = ?, stages = ? WHERE id = ?")
            .bind(payload.stage_name.as_str())
            .bind(blob)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Delete a stage. Returns the number of rows removed.
    pub async fn delete_stage(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM stages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Round-trip a trivial query to check the pool can hand out a connection.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn stage_from_row(row: &SqliteRow) -> Result<Stage, StoreError> {
    let blob: String = row.try_get("stages")?;
    Ok(Stage {
        id: row.try_get("id")?,
        stage_name: row.try_get("stage_name")?,
        stages: decode_stages(&blob)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::init_db;
    use crate::domain::StageMap;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path, 5).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    fn payload(name: &str, entries: &[(&str, &str)]) -> StagePayload {
        StagePayload {
            stage_name: name.to_string(),
            stages: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_stage() {
        let (repo, _temp) = setup_test_db().await;

        let p = payload("IELTS", &[("listening", "url1"), ("reading", "url2")]);
        let id = repo.insert_stage(&p).await.unwrap();

        let stage = repo.get_stage(id).await.unwrap().expect("stage missing");
        assert_eq!(stage.id, id);
        assert_eq!(stage.stage_name, p.stage_name);
        assert_eq!(stage.stages, p.stages);
    }

    #[tokio::test]
    async fn test_get_missing_stage_is_none() {
        let (repo, _temp) = setup_test_db().await;
        assert!(repo.get_stage(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_are_distinct() {
        let (repo, _temp) = setup_test_db().await;
        let a = repo.insert_stage(&payload("a", &[])).await.unwrap();
        let b = repo.insert_stage(&payload("a", &[])).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_list_stages() {
        let (repo, _temp) = setup_test_db().await;
        assert!(repo.list_stages().await.unwrap().is_empty());

        repo.insert_stage(&payload("one", &[("k", "v")])).await.unwrap();
        repo.insert_stage(&payload("two", &[])).await.unwrap();

        let mut names: Vec<String> = repo
            .list_stages()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.stage_name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let (repo, _temp) = setup_test_db().await;
        let id = repo
            .insert_stage(&payload("old", &[("a", "1"), ("b", "2")]))
            .await
            .unwrap();

        let affected = repo
            .update_stage(id, &payload("new", &[("c", "3")]))
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let stage = repo.get_stage(id).await.unwrap().unwrap();
        assert_eq!(stage.stage_name, "new");
        assert_eq!(
            stage.stages,
            StageMap::from([("c".to_string(), "3".to_string())])
        );
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_id_touch_nothing() {
        let (repo, _temp) = setup_test_db().await;
        assert_eq!(repo.update_stage(7, &payload("x", &[])).await.unwrap(), 0);
        assert_eq!(repo.delete_stage(7).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_stage() {
        let (repo, _temp) = setup_test_db().await;
        let id = repo.insert_stage(&payload("gone", &[])).await.unwrap();

        assert_eq!(repo.delete_stage(id).await.unwrap(), 1);
        assert!(repo.get_stage(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_blob_fails_reads() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_stage(&payload("fine", &[])).await.unwrap();
        sqlx::query("INSERT INTO stages (id, stage_name, stages) VALUES (100, 'bad', '{oops')")
            .execute(&repo.pool)
            .await
            .unwrap();

        assert!(matches!(
            repo.get_stage(100).await,
            Err(StoreError::Blob(_))
        ));
        assert!(matches!(repo.list_stages().await, Err(StoreError::Blob(_))));
    }

    #[tokio::test]
    async fn test_ping() {
        let (repo, _temp) = setup_test_db().await;
        repo.ping().await.unwrap();
    }
}
