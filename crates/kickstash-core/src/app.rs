//! Application composition
//!
//! Owns the database and wires store, repository, and presentation
//! model together. The rendering layer only ever talks to the model.

use kickstash_storage::{Database, SneakerStore};

use crate::config::Config;
use crate::model::SneakerListModel;
use crate::repository::SneakerRepository;
use crate::Result;

pub struct App {
    config: Config,
    db: Database,
    repository: SneakerRepository,
    model: SneakerListModel,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        // Ensure data directory exists
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;

        tracing::info!(
            database = %config.database_path.display(),
            "App initialized"
        );

        Ok(Self::assemble(config, db))
    }

    /// In-memory instance for tests and demos.
    pub fn in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        let config = Config {
            database_path: ":memory:".into(),
        };

        Ok(Self::assemble(config, db))
    }

    fn assemble(config: Config, db: Database) -> Self {
        let store = SneakerStore::new(db.clone());
        let repository = SneakerRepository::new(store);
        let model = SneakerListModel::new(repository.clone());

        Self {
            config,
            db,
            repository,
            model,
        }
    }

    pub fn model(&self) -> &SneakerListModel {
        &self.model
    }

    pub fn repository(&self) -> &SneakerRepository {
        &self.repository
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickstash_storage::Sneaker;

    #[tokio::test]
    async fn test_app_wiring() {
        let app = App::in_memory().unwrap();

        let mut observer = app.model().subscribe();
        app.repository()
            .add_sneaker(Sneaker::demo())
            .await
            .unwrap();

        loop {
            let rows = observer.next().await.expect("model dropped");
            if rows.len() == 1 {
                assert_eq!(rows[0].name, "Air Jordan 1");
                break;
            }
        }
    }
}
