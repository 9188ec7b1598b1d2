//! Composition root: the shared store handle plus a per-request repository.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use thiserror::Error;

use codecamp_infra::{
    CampRepository, CampStore, InMemoryCampStore, PostgresCampStore, RepositoryError, StoreError, db, seed,
};

use crate::app::errors::ApiError;
use crate::app::versioning::ApiVersion;
use crate::config::{ApiConfig, Persistence};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database setup failed: {0}")]
    Store(#[from] StoreError),

    #[error("seeding sample data failed: {0}")]
    Seed(#[from] RepositoryError),
}

/// Process-wide services, built once at startup.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn CampStore>,
    default_version: ApiVersion,
}

impl AppServices {
    pub fn new(store: Arc<dyn CampStore>, default_version: ApiVersion) -> Self {
        Self { store, default_version }
    }

    pub fn default_version(&self) -> ApiVersion {
        self.default_version
    }

    /// A fresh unit of work; never shared between requests.
    pub fn repository(&self) -> CampRepository {
        CampRepository::new(self.store.clone())
    }
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices")
            .field("default_version", &self.default_version)
            .finish_non_exhaustive()
    }
}

pub async fn build_services(config: &ApiConfig) -> Result<AppServices, StartupError> {
    let store: Arc<dyn CampStore> = match &config.persistence {
        Persistence::InMemory => {
            tracing::info!("using in-memory camp store");
            Arc::new(InMemoryCampStore::new())
        }
        Persistence::Postgres { url, max_connections } => {
            tracing::info!(max_connections, "using postgres camp store");
            let pool = db::connect(url, *max_connections).await?;
            db::migrate(&pool).await?;
            Arc::new(PostgresCampStore::new(pool))
        }
    };

    if config.seed_sample_data {
        seed::seed_sample_data(store.clone()).await?;
    }

    Ok(AppServices::new(store, config.default_api_version))
}

/// Extractor handing each request its own `CampRepository`.
pub struct Repo(pub CampRepository);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Repo
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let services = parts
            .extensions
            .get::<Arc<AppServices>>()
            .ok_or_else(|| ApiError::Internal("application services are not installed".to_string()))?;
        Ok(Repo(services.repository()))
    }
}
