//! Sneaker repository
//!
//! Pass-through façade over the store: the live query is re-exported
//! unchanged and the add path delegates straight to insert. No caching,
//! no validation, no state of its own.

use kickstash_storage::{LiveQuery, Sneaker, SneakerStore};

use crate::Result;

pub struct SneakerRepository {
    store: SneakerStore,
}

impl SneakerRepository {
    pub fn new(store: SneakerStore) -> Self {
        Self { store }
    }

    pub fn sneakers(&self) -> LiveQuery {
        self.store.watch_all()
    }

    pub async fn add_sneaker(&self, sneaker: Sneaker) -> Result<Sneaker> {
        Ok(self.store.insert(sneaker).await?)
    }
}

impl Clone for SneakerRepository {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickstash_storage::Database;

    #[tokio::test]
    async fn test_add_is_visible_through_live_query() {
        let store = SneakerStore::new(Database::open_in_memory().unwrap());
        let repository = SneakerRepository::new(store);

        let mut live = repository.sneakers();
        assert!(live.next().await.unwrap().is_empty());

        let stored = repository
            .add_sneaker(Sneaker::new(
                "Chuck 70",
                "Converse",
                7000,
                "https://example.com/chuck.jpg",
            ))
            .await
            .unwrap();

        assert_eq!(live.next().await.unwrap(), vec![stored]);
    }
}
