//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use quill_core::PostService;
use quill_core::ports::{PostRepository, UserRepository};
use quill_infra::database::{DatabaseConfig, InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
use quill_infra::database::{DatabaseConnections, PostgresPostRepository, PostgresUserRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub users: Arc<dyn UserRepository>,
    pub started_at: Instant,
}

impl AppState {
    /// Assemble state around the given repositories.
    pub fn with_repositories(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            posts: PostService::new(posts),
            users,
            started_at: Instant::now(),
        }
    }

    /// State backed by process-local storage.
    pub fn in_memory() -> Self {
        Self::with_repositories(
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        )
    }

    /// Build the application state with appropriate implementations.
    ///
    /// Falls back to in-memory storage when no database is configured or it
    /// cannot be reached.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        #[cfg(feature = "postgres")]
        let state = match db_config {
            Some(config) => match DatabaseConnections::init(config).await {
                Ok(connections) => Self::with_repositories(
                    Arc::new(PostgresPostRepository::new(Arc::clone(&connections.main))),
                    Arc::new(PostgresUserRepository::new(connections.main)),
                ),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            let _ = db_config;
            tracing::info!("Running without postgres feature - using in-memory repositories");
            Self::in_memory()
        };

        tracing::info!("Application state initialized");
        state
    }
}
