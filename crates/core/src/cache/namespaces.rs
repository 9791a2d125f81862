//! Namespace operations.
//!
//! A namespace is one versioned cache; exactly one is current at any time
//! and activation deletes every other one. Deleting a namespace cascades
//! to its entries.

use super::connection::CacheDb;
use crate::Error;
use tokio_rusqlite::params;

impl CacheDb {
    /// Open a namespace, creating it if absent.
    ///
    /// Opening an existing namespace is a no-op.
    pub async fn open_namespace(&self, name: &str) -> Result<(), Error> {
        if name.is_empty() {
            return Err(Error::InvalidInput("namespace name cannot be empty".into()));
        }

        let name = name.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO namespaces (name, created_at) VALUES (?1, ?2)",
                    params![name, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// List all namespace names, oldest first.
    pub async fn namespace_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM namespaces ORDER BY created_at, name")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Check if a namespace exists.
    pub async fn has_namespace(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM namespaces WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a namespace and all of its entries.
    ///
    /// Returns true if the namespace existed.
    pub async fn delete_namespace(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM namespaces WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_namespace_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("appquiz-cache-v1").await.unwrap();
        db.open_namespace("appquiz-cache-v1").await.unwrap();

        let names = db.namespace_names().await.unwrap();
        assert_eq!(names, vec!["appquiz-cache-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_open_namespace_empty_name() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.open_namespace("").await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_has_namespace() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(!db.has_namespace("appquiz-cache-v1").await.unwrap());
        db.open_namespace("appquiz-cache-v1").await.unwrap();
        assert!(db.has_namespace("appquiz-cache-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_namespace() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("appquiz-cache-v1").await.unwrap();

        assert!(db.delete_namespace("appquiz-cache-v1").await.unwrap());
        assert!(!db.delete_namespace("appquiz-cache-v1").await.unwrap());
        assert!(db.namespace_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_namespace_names_multiple() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("appquiz-cache-v1").await.unwrap();
        db.open_namespace("appquiz-cache-v2").await.unwrap();

        let names = db.namespace_names().await.unwrap();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"appquiz-cache-v1".to_string()));
        assert!(names.contains(&"appquiz-cache-v2".to_string()));
    }
}
