//! Sneaker store
//!
//! Table-level operations plus change notification. Writes run on the
//! blocking pool; a caller that stops waiting does not stop a commit
//! already in progress, and the change notification is sent from inside
//! the blocking section so a committed write is never left unannounced.

use std::sync::Arc;

use tokio::sync::watch;

use crate::database::Database;
use crate::error::StorageError;
use crate::sneaker::Sneaker;
use crate::Result;

pub struct SneakerStore {
    db: Database,
    changes: Arc<watch::Sender<u64>>,
}

impl SneakerStore {
    pub fn new(db: Database) -> Self {
        let (changes, _) = watch::channel(0);

        Self {
            db,
            changes: Arc::new(changes),
        }
    }

    /// Upsert by primary key.
    ///
    /// A sneaker with the unassigned sentinel id gets a fresh id from the
    /// database; an assigned id replaces the whole existing row.
    pub async fn insert(&self, sneaker: Sneaker) -> Result<Sneaker> {
        let db = self.db.clone();
        let changes = Arc::clone(&self.changes);

        let stored = tokio::task::spawn_blocking(move || {
            let stored = insert_row(&db, sneaker)?;
            changes.send_modify(|generation| *generation += 1);
            Ok::<_, StorageError>(stored)
        })
        .await
        .map_err(|_| StorageError::Interrupted)??;

        tracing::debug!(sneaker_id = stored.id, name = %stored.name, "Inserted sneaker");

        Ok(stored)
    }

    /// Remove the row with the sneaker's id. Deleting a row that does not
    /// exist is a no-op and emits no change notification.
    pub async fn delete(&self, sneaker: &Sneaker) -> Result<()> {
        let id = sneaker.id;
        let db = self.db.clone();
        let changes = Arc::clone(&self.changes);

        let removed = tokio::task::spawn_blocking(move || {
            let affected = db.with_connection(|conn| {
                Ok(conn.execute("DELETE FROM sneakers WHERE id = ?1", [id])?)
            })?;

            if affected > 0 {
                changes.send_modify(|generation| *generation += 1);
            }

            Ok::<_, StorageError>(affected > 0)
        })
        .await
        .map_err(|_| StorageError::Interrupted)??;

        if removed {
            tracing::debug!(sneaker_id = id, "Deleted sneaker");
        }

        Ok(())
    }

    /// One full-table snapshot. Rows come back in rowid (insertion) order;
    /// that order is the observed default, not a contract.
    pub async fn all(&self) -> Result<Vec<Sneaker>> {
        let db = self.db.clone();

        tokio::task::spawn_blocking(move || all_rows(&db))
            .await
            .map_err(|_| StorageError::Interrupted)?
    }

    /// Live query over the whole table. The first `next()` resolves
    /// immediately with a fresh snapshot; later calls resolve after the
    /// next committed write. Rapid writes may coalesce into one emission.
    pub fn watch_all(&self) -> LiveQuery {
        let mut rx = self.changes.subscribe();
        rx.mark_changed();

        LiveQuery {
            store: self.clone(),
            rx,
        }
    }
}

impl Clone for SneakerStore {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            changes: Arc::clone(&self.changes),
        }
    }
}

/// Handle to a continuously-updating query of all sneakers.
pub struct LiveQuery {
    store: SneakerStore,
    rx: watch::Receiver<u64>,
}

impl LiveQuery {
    /// Wait for the table to change, then return a fresh snapshot.
    ///
    /// A failed snapshot read surfaces as an error for that emission only;
    /// the query stays usable.
    pub async fn next(&mut self) -> Result<Vec<Sneaker>> {
        self.rx
            .changed()
            .await
            .map_err(|_| StorageError::Interrupted)?;

        self.store.all().await
    }
}

fn insert_row(db: &Database, sneaker: Sneaker) -> Result<Sneaker> {
    db.with_connection(|conn| {
        if sneaker.is_persisted() {
            conn.execute(
                "INSERT OR REPLACE INTO sneakers (id, name, brand, price, imageUrl)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    sneaker.id,
                    sneaker.name,
                    sneaker.brand,
                    sneaker.price,
                    sneaker.image_url,
                ],
            )?;

            Ok(sneaker)
        } else {
            conn.execute(
                "INSERT INTO sneakers (name, brand, price, imageUrl) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![sneaker.name, sneaker.brand, sneaker.price, sneaker.image_url],
            )?;

            Ok(Sneaker {
                id: conn.last_insert_rowid(),
                ..sneaker
            })
        }
    })
}

fn all_rows(db: &Database) -> Result<Vec<Sneaker>> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare("SELECT id, name, brand, price, imageUrl FROM sneakers")?;

        let sneakers: Vec<Sneaker> = stmt
            .query_map([], |row| {
                Ok(Sneaker {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    brand: row.get(2)?,
                    price: row.get(3)?,
                    image_url: row.get(4)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(sneakers)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> SneakerStore {
        SneakerStore::new(Database::open_in_memory().unwrap())
    }

    fn dunk() -> Sneaker {
        Sneaker::new("Dunk Low", "Nike", 12000, "https://example.com/dunk.jpg")
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_round_trips() {
        let store = test_store();

        let stored = store.insert(dunk()).await.unwrap();
        assert!(stored.is_persisted());
        assert_eq!(stored.name, "Dunk Low");

        let rows = store.all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], stored);
    }

    #[tokio::test]
    async fn test_replace_on_conflict_keeps_row_count() {
        let store = test_store();

        let stored = store.insert(dunk()).await.unwrap();

        let replacement = Sneaker {
            name: "Dunk High".to_string(),
            price: 14000,
            ..stored.clone()
        };
        let replaced = store.insert(replacement.clone()).await.unwrap();
        assert_eq!(replaced.id, stored.id);

        let rows = store.all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], replacement);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = test_store();

        let stored = store.insert(dunk()).await.unwrap();
        store.delete(&stored).await.unwrap();
        assert!(store.all().await.unwrap().is_empty());

        // Second delete of the same row is a no-op, not an error
        store.delete(&stored).await.unwrap();
        assert!(store.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_live_query_emits_after_write() {
        let store = test_store();
        let mut live = store.watch_all();

        // First emission is immediate and reflects the empty table
        assert!(live.next().await.unwrap().is_empty());

        let stored = store.insert(dunk()).await.unwrap();
        let rows = live.next().await.unwrap();
        assert_eq!(rows, vec![stored]);
    }

    #[tokio::test]
    async fn test_live_query_converges_on_final_state() {
        let store = test_store();
        let mut live = store.watch_all();
        live.next().await.unwrap();

        for i in 0..5i64 {
            store
                .insert(Sneaker::new(
                    format!("Model {i}"),
                    "Asics",
                    9000 + i,
                    "https://example.com/gel.jpg",
                ))
                .await
                .unwrap();
        }

        // Emissions may coalesce, but the query must converge on the
        // final table state.
        let expected = store.all().await.unwrap();
        assert_eq!(expected.len(), 5);
        loop {
            let rows = live.next().await.unwrap();
            if rows == expected {
                break;
            }
        }
    }

    #[tokio::test]
    async fn test_snapshot_preserves_insertion_order() {
        let store = test_store();

        let first = store.insert(dunk()).await.unwrap();
        let second = store
            .insert(Sneaker::new(
                "Gel-Lyte III",
                "Asics",
                9000,
                "https://example.com/gel.jpg",
            ))
            .await
            .unwrap();

        let rows = store.all().await.unwrap();
        assert_eq!(rows, vec![first, second]);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = test_store();

        let first = store.insert(dunk()).await.unwrap();
        store.delete(&first).await.unwrap();

        let second = store.insert(dunk()).await.unwrap();
        assert!(second.id > first.id);
    }
}
