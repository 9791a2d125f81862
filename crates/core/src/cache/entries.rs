//! Entry CRUD operations.
//!
//! An entry maps a normalized request identity to a captured response
//! snapshot within one namespace. Re-storing the same identity replaces
//! the prior snapshot.

use super::connection::CacheDb;
use crate::request::{Method, Request, ResponseSnapshot};
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;
use tokio_rusqlite::rusqlite::Row;

const SNAPSHOT_COLUMNS: &str = "status, content_type, headers_json, body, fetched_at";

fn snapshot_from_row(row: &Row<'_>) -> Result<ResponseSnapshot, rusqlite::Error> {
    let headers_json: String = row.get(2)?;
    Ok(ResponseSnapshot {
        status: row.get::<_, i64>(0)? as u16,
        content_type: row.get(1)?,
        headers: serde_json::from_str(&headers_json).unwrap_or_default(),
        body: row.get(3)?,
        fetched_at: row.get(4)?,
    })
}

impl CacheDb {
    /// Insert or replace a single entry.
    ///
    /// Uses UPSERT semantics keyed on (namespace, entry key): re-fetching
    /// the same request overwrites the prior snapshot.
    pub async fn put_entry(
        &self, namespace: &str, request: &Request, snapshot: &ResponseSnapshot,
    ) -> Result<(), Error> {
        let namespace = namespace.to_string();
        let request = request.clone();
        let snapshot = snapshot.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                write_entry(conn, &namespace, &request, &snapshot)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store a batch of entries in a single transaction.
    ///
    /// Either every entry is stored or none is; install relies on this to
    /// keep a half-populated namespace from ever becoming visible.
    pub async fn put_entries(
        &self, namespace: &str, batch: &[(Request, ResponseSnapshot)],
    ) -> Result<(), Error> {
        let namespace = namespace.to_string();
        let batch = batch.to_vec();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction().map_err(Error::from)?;
                for (request, snapshot) in &batch {
                    write_entry(&tx, &namespace, request, snapshot)?;
                }
                tx.commit().map_err(Error::from)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the snapshot stored for a request.
    ///
    /// Returns None on a cache miss.
    pub async fn match_entry(&self, namespace: &str, request: &Request) -> Result<Option<ResponseSnapshot>, Error> {
        let namespace = namespace.to_string();
        let entry_key = request.entry_key();
        self.conn
            .call(move |conn| -> Result<Option<ResponseSnapshot>, Error> {
                let result = conn.query_row(
                    &format!("SELECT {SNAPSHOT_COLUMNS} FROM entries WHERE namespace = ?1 AND entry_key = ?2"),
                    params![namespace, entry_key],
                    snapshot_from_row,
                );

                match result {
                    Ok(s) => Ok(Some(s)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a snapshot by method and URL.
    ///
    /// Fallback resolution goes through here: the navigation document and
    /// the fallback icon are addressed by URL, not by an original request.
    pub async fn match_url(&self, namespace: &str, method: Method, url: &str) -> Result<Option<ResponseSnapshot>, Error> {
        let namespace = namespace.to_string();
        let method = method.as_str().to_string();
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<ResponseSnapshot>, Error> {
                let result = conn.query_row(
                    &format!(
                        "SELECT {SNAPSHOT_COLUMNS} FROM entries
                         WHERE namespace = ?1 AND method = ?2 AND url = ?3"
                    ),
                    params![namespace, method, url],
                    snapshot_from_row,
                );

                match result {
                    Ok(s) => Ok(Some(s)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in a namespace.
    pub async fn entry_count(&self, namespace: &str) -> Result<u64, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE namespace = ?1",
                    params![namespace],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// All entry URLs in a namespace, in store order.
    pub async fn entry_urls(&self, namespace: &str) -> Result<Vec<String>, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url FROM entries WHERE namespace = ?1 ORDER BY stored_at, url",
                )?;
                let urls = stmt
                    .query_map(params![namespace], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }
}

fn write_entry(
    conn: &rusqlite::Connection, namespace: &str, request: &Request, snapshot: &ResponseSnapshot,
) -> Result<(), Error> {
    let headers_json = serde_json::to_string(&snapshot.headers)
        .map_err(|e| Error::InvalidInput(format!("unserializable headers: {e}")))?;

    conn.execute(
        "INSERT INTO entries (
            namespace, entry_key, method, url, status, content_type,
            headers_json, body, fetched_at, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(namespace, entry_key) DO UPDATE SET
            status = excluded.status,
            content_type = excluded.content_type,
            headers_json = excluded.headers_json,
            body = excluded.body,
            fetched_at = excluded.fetched_at,
            stored_at = excluded.stored_at",
        params![
            namespace,
            request.entry_key(),
            request.method.as_str(),
            request.url,
            snapshot.status as i64,
            snapshot.content_type,
            headers_json,
            snapshot.body,
            snapshot.fetched_at,
            chrono::Utc::now().to_rfc3339(),
        ],
    )
    .map_err(Error::from)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_snapshot(body: &[u8]) -> ResponseSnapshot {
        ResponseSnapshot {
            status: 200,
            content_type: Some("text/html".to_string()),
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            body: body.to_vec(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("appquiz-cache-v1").await.unwrap();

        let request = Request::get("https://example.com/index.html");
        let snapshot = make_snapshot(b"<html>hi</html>");
        db.put_entry("appquiz-cache-v1", &request, &snapshot).await.unwrap();

        let found = db.match_entry("appquiz-cache-v1", &request).await.unwrap().unwrap();
        assert_eq!(found.body, b"<html>hi</html>");
        assert_eq!(found.status, 200);
        assert_eq!(found.content_type.as_deref(), Some("text/html"));
    }

    #[tokio::test]
    async fn test_match_miss() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("appquiz-cache-v1").await.unwrap();

        let request = Request::get("https://example.com/missing.js");
        let found = db.match_entry("appquiz-cache-v1", &request).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("appquiz-cache-v1").await.unwrap();

        let request = Request::get("https://example.com/app.js");
        db.put_entry("appquiz-cache-v1", &request, &make_snapshot(b"old")).await.unwrap();
        db.put_entry("appquiz-cache-v1", &request, &make_snapshot(b"new")).await.unwrap();

        let found = db.match_entry("appquiz-cache-v1", &request).await.unwrap().unwrap();
        assert_eq!(found.body, b"new");
        assert_eq!(db.entry_count("appquiz-cache-v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_put_entries_batch() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("appquiz-cache-v1").await.unwrap();

        let batch = vec![
            (Request::get("https://example.com/"), make_snapshot(b"root")),
            (Request::get("https://example.com/index.html"), make_snapshot(b"index")),
            (Request::get("https://example.com/favicon.ico"), make_snapshot(b"icon")),
        ];
        db.put_entries("appquiz-cache-v1", &batch).await.unwrap();

        assert_eq!(db.entry_count("appquiz-cache-v1").await.unwrap(), 3);
        let urls = db.entry_urls("appquiz-cache-v1").await.unwrap();
        assert!(urls.contains(&"https://example.com/favicon.ico".to_string()));
    }

    #[tokio::test]
    async fn test_match_url() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("appquiz-cache-v1").await.unwrap();

        let request = Request::get("https://example.com/index.html");
        db.put_entry("appquiz-cache-v1", &request, &make_snapshot(b"index")).await.unwrap();

        let found = db
            .match_url("appquiz-cache-v1", Method::Get, "https://example.com/index.html")
            .await
            .unwrap();
        assert!(found.is_some());

        let miss = db
            .match_url("appquiz-cache-v1", Method::Head, "https://example.com/index.html")
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_entries_scoped_to_namespace() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("appquiz-cache-v1").await.unwrap();
        db.open_namespace("appquiz-cache-v2").await.unwrap();

        let request = Request::get("https://example.com/");
        db.put_entry("appquiz-cache-v1", &request, &make_snapshot(b"v1")).await.unwrap();

        let found = db.match_entry("appquiz-cache-v2", &request).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_delete_namespace_cascades() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("appquiz-cache-v1").await.unwrap();

        let request = Request::get("https://example.com/");
        db.put_entry("appquiz-cache-v1", &request, &make_snapshot(b"root")).await.unwrap();

        db.delete_namespace("appquiz-cache-v1").await.unwrap();

        // Entries go with their namespace; a recreated namespace starts empty.
        db.open_namespace("appquiz-cache-v1").await.unwrap();
        assert_eq!(db.entry_count("appquiz-cache-v1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip_bytes() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("appquiz-cache-v1").await.unwrap();

        let body: Vec<u8> = (0..=255u8).collect();
        let request = Request::get("https://example.com/icons/app-icon-192.png");
        let mut snapshot = make_snapshot(&body);
        snapshot.content_type = Some("image/png".to_string());
        db.put_entry("appquiz-cache-v1", &request, &snapshot).await.unwrap();

        let found = db.match_entry("appquiz-cache-v1", &request).await.unwrap().unwrap();
        assert_eq!(found, snapshot);
    }
}
