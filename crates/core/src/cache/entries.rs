//! Entry and partition operations for the SQLite store.
//!
//! Entries keep insertion order through the autoincrement `seq` column. A
//! write deletes any previous row for the key before inserting, so an
//! overwritten entry becomes the newest one.

use async_trait::async_trait;
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

use super::connection::CacheDb;
use super::key::request_key;
use super::store::CacheStore;
use crate::{CacheRequest, CachedResponse, Error};

fn ensure_partition(conn: &rusqlite::Connection, partition: &str) -> Result<i64, Error> {
    conn.execute(
        "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)",
        params![partition, chrono::Utc::now().to_rfc3339()],
    )?;
    let id = conn.query_row("SELECT id FROM partitions WHERE name = ?1", params![partition], |row| row.get(0))?;
    Ok(id)
}

#[async_trait]
impl CacheStore for CacheDb {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                ensure_partition(conn, &partition)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn match_request(&self, partition: &str, request: &CacheRequest) -> Result<Option<CachedResponse>, Error> {
        let partition = partition.to_string();
        let key = request_key(request);
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let row = conn
                    .query_row(
                        "SELECT e.status, e.headers_json, e.body
                         FROM entries e JOIN partitions p ON p.id = e.partition_id
                         WHERE p.name = ?1 AND e.key_hash = ?2",
                        params![partition, key],
                        |row| Ok((row.get::<_, u16>(0)?, row.get::<_, String>(1)?, row.get::<_, Vec<u8>>(2)?)),
                    )
                    .optional()?;

                let Some((status, headers_json, body)) = row else {
                    return Ok(None);
                };

                let headers: Vec<(String, String)> =
                    serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(e.to_string()))?;

                Ok(Some(CachedResponse { status, headers, body: Bytes::from(body) }))
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, partition: &str, request: &CacheRequest, response: &CachedResponse) -> Result<(), Error> {
        let partition = partition.to_string();
        let key = request_key(request);
        let method = request.method.clone();
        let url = request.url.to_string();
        let response = response.clone();
        let headers_json = serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(e.to_string()))?;

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                let partition_id = ensure_partition(&tx, &partition)?;
                tx.execute(
                    "DELETE FROM entries WHERE partition_id = ?1 AND key_hash = ?2",
                    params![partition_id, key],
                )?;
                tx.execute(
                    "INSERT INTO entries (partition_id, key_hash, method, url, status, headers_json, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        partition_id,
                        key,
                        method,
                        url,
                        response.status,
                        headers_json,
                        response.body.as_ref(),
                        chrono::Utc::now().to_rfc3339(),
                    ],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, partition: &str, request: &CacheRequest) -> Result<bool, Error> {
        let partition = partition.to_string();
        let key = request_key(request);
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM entries
                     WHERE partition_id = (SELECT id FROM partitions WHERE name = ?1) AND key_hash = ?2",
                    params![partition, key],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self, partition: &str) -> Result<Vec<CacheRequest>, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<CacheRequest>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT e.method, e.url
                     FROM entries e JOIN partitions p ON p.id = e.partition_id
                     WHERE p.name = ?1
                     ORDER BY e.seq ASC",
                )?;
                let rows = stmt.query_map(params![partition], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;

                let mut requests = Vec::new();
                for row in rows {
                    let (method, url) = row?;
                    let request = CacheRequest::new(&method, &url).map_err(|e| Error::CorruptEntry(e.to_string()))?;
                    requests.push(request);
                }
                Ok(requests)
            })
            .await
            .map_err(Error::from)
    }

    async fn list_partitions(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM partitions ORDER BY id ASC")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_partition(&self, partition: &str) -> Result<bool, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM partitions WHERE name = ?1", params![partition])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}
