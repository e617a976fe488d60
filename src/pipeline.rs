//! Composition root: wires configuration, stores, providers, queues and
//! workers into a running pipeline.
//!
//! Real deployments build the HTTP providers from config; tests assemble the
//! same graph around mock providers and in-process stores.

use crate::modules::artist::domain::repository::{ArtistStore, CatalogStore, ShowStore};
use crate::modules::artist::infrastructure::persistence::MemoryEntityStore;
use crate::modules::import::cache::{CacheInvalidator, MemoryCache};
use crate::modules::import::orchestrator::ImportOrchestrator;
use crate::modules::import::progress::ProgressTracker;
use crate::modules::import::stages::catalog::CatalogSyncProcessor;
use crate::modules::import::stages::events::EventSyncProcessor;
use crate::modules::import::stages::profile::ProfileSyncProcessor;
use crate::modules::import::stages::setlists::SetlistSyncProcessor;
use crate::modules::import::stages::Finalizer;
use crate::modules::jobs::domain::entities::Queue;
use crate::modules::jobs::domain::repository::JobStore;
use crate::modules::jobs::infrastructure::memory::{MemoryJobStore, RetentionConfig};
use crate::modules::jobs::registry::QueueRegistry;
use crate::modules::jobs::worker::{JobProcessor, WorkerPool};
use crate::modules::provider::domain::ports::{CatalogProvider, EventsProvider, SetlistProvider};
use crate::modules::provider::infrastructure::catalog::{CatalogClient, TokenManager};
use crate::modules::provider::infrastructure::events::EventsClient;
use crate::modules::provider::infrastructure::http_client::GuardedClient;
use crate::modules::provider::infrastructure::setlists::SetlistClient;
use crate::modules::provider::Provider;
use crate::shared::config::PipelineConfig;
use crate::shared::errors::AppResult;
use crate::shared::utils::circuit_breaker::CircuitBreaker;
use crate::shared::utils::rate_limiter::ProviderRateLimiter;
use std::sync::Arc;

/// Entity store handles the pipeline writes through.
pub struct PipelineStores {
    pub artists: Arc<dyn ArtistStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub shows: Arc<dyn ShowStore>,
}

impl PipelineStores {
    /// One in-process store backing all three traits.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryEntityStore::new());
        Self {
            artists: Arc::clone(&store) as Arc<dyn ArtistStore>,
            catalog: Arc::clone(&store) as Arc<dyn CatalogStore>,
            shows: store as Arc<dyn ShowStore>,
        }
    }
}

/// Provider adapter handles the stage processors call.
pub struct PipelineProviders {
    pub catalog: Arc<dyn CatalogProvider>,
    pub events: Arc<dyn EventsProvider>,
    pub setlists: Arc<dyn SetlistProvider>,
}

impl PipelineProviders {
    /// HTTP adapters guarded by per-provider limiter + breaker, from config.
    pub fn from_config(config: &PipelineConfig) -> AppResult<Self> {
        let endpoints = &config.endpoints;

        let catalog_guard = GuardedClient::new(
            Provider::Catalog,
            &config.catalog_limits,
            Arc::new(ProviderRateLimiter::new(
                "catalog",
                config.catalog_limits.permits,
                config.catalog_limits.period,
                config.catalog_limits.burst,
            )),
            Arc::new(CircuitBreaker::new("catalog", config.breaker.clone())),
        )?;
        let tokens = TokenManager::new(
            &endpoints.catalog_token_url,
            &endpoints.catalog_client_id,
            &endpoints.catalog_client_secret,
        )?;
        let catalog = Arc::new(CatalogClient::new(
            catalog_guard,
            tokens,
            &endpoints.catalog_base_url,
        ));

        let events_guard = GuardedClient::new(
            Provider::Events,
            &config.events_limits,
            Arc::new(ProviderRateLimiter::new(
                "events",
                config.events_limits.permits,
                config.events_limits.period,
                config.events_limits.burst,
            )),
            Arc::new(CircuitBreaker::new("events", config.breaker.clone())),
        )?;
        let events = Arc::new(EventsClient::new(
            events_guard,
            &endpoints.events_base_url,
            &endpoints.events_api_key,
        ));

        let setlist_guard = GuardedClient::new(
            Provider::Setlists,
            &config.setlist_limits,
            Arc::new(ProviderRateLimiter::new(
                "setlists",
                config.setlist_limits.permits,
                config.setlist_limits.period,
                config.setlist_limits.burst,
            )),
            Arc::new(CircuitBreaker::new("setlists", config.breaker.clone())),
        )?;
        let setlists = Arc::new(SetlistClient::new(
            setlist_guard,
            &endpoints.setlist_base_url,
            &endpoints.setlist_api_key,
        ));

        Ok(Self {
            catalog,
            events,
            setlists,
        })
    }
}

/// A fully wired pipeline.
pub struct Pipeline {
    pub orchestrator: Arc<ImportOrchestrator>,
    pub registry: QueueRegistry,
    pub progress: Arc<ProgressTracker>,
    pub jobs: Arc<dyn JobStore>,
    pub cache: Arc<MemoryCache>,
}

impl Pipeline {
    /// Assemble the full graph around the given stores and providers.
    pub fn assemble(
        config: &PipelineConfig,
        stores: PipelineStores,
        providers: PipelineProviders,
    ) -> Self {
        let jobs: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new(
            config.retry.clone(),
            RetentionConfig {
                completed: config.completed_retention,
                failed: config.failed_retention,
            },
        ));
        let progress = Arc::new(ProgressTracker::new());
        let cache = Arc::new(MemoryCache::new());
        let finalizer = Arc::new(Finalizer::new(
            Arc::clone(&progress),
            Arc::clone(&cache) as Arc<dyn CacheInvalidator>,
        ));

        let profile = Arc::new(ProfileSyncProcessor::new(
            Arc::clone(&stores.artists),
            Arc::clone(&providers.catalog),
            Arc::clone(&providers.events),
            Arc::clone(&jobs),
            Arc::clone(&finalizer),
        ));
        let catalog = Arc::new(CatalogSyncProcessor::new(
            Arc::clone(&stores.artists),
            Arc::clone(&stores.catalog),
            Arc::clone(&providers.catalog),
            Arc::clone(&jobs),
            Arc::clone(&finalizer),
            config.deep_catalog_delay,
        ));
        let events = Arc::new(EventSyncProcessor::new(
            Arc::clone(&stores.artists),
            Arc::clone(&stores.shows),
            Arc::clone(&providers.events),
            Arc::clone(&jobs),
            Arc::clone(&finalizer),
        ));
        let setlists = Arc::new(SetlistSyncProcessor::new(
            Arc::clone(&stores.artists),
            Arc::clone(&stores.shows),
            Arc::clone(&providers.setlists),
            Arc::clone(&finalizer),
        ));

        let mut registry = QueueRegistry::new(Arc::clone(&jobs));
        registry.register(Arc::new(WorkerPool::new(
            Queue::ProfileSync,
            Arc::clone(&jobs),
            profile as Arc<dyn JobProcessor>,
            config.profile_queue.clone(),
        )));
        registry.register(Arc::new(WorkerPool::new(
            Queue::CatalogSync,
            Arc::clone(&jobs),
            catalog as Arc<dyn JobProcessor>,
            config.catalog_queue.clone(),
        )));
        registry.register(Arc::new(WorkerPool::new(
            Queue::EventSync,
            Arc::clone(&jobs),
            events as Arc<dyn JobProcessor>,
            config.event_queue.clone(),
        )));
        registry.register(Arc::new(WorkerPool::new(
            Queue::SetlistSync,
            Arc::clone(&jobs),
            setlists as Arc<dyn JobProcessor>,
            config.setlist_queue.clone(),
        )));

        let orchestrator = Arc::new(ImportOrchestrator::new(
            Arc::clone(&stores.artists),
            Arc::clone(&jobs),
            Arc::clone(&progress),
        ));

        Self {
            orchestrator,
            registry,
            progress,
            jobs,
            cache,
        }
    }

    /// Assemble against HTTP providers and an in-process entity store.
    pub fn from_config(config: &PipelineConfig) -> AppResult<Self> {
        let providers = PipelineProviders::from_config(config)?;
        Ok(Self::assemble(config, PipelineStores::in_memory(), providers))
    }

    pub async fn start(&self) {
        self.registry.start_all().await;
    }

    pub async fn shutdown(&self) {
        self.registry.shutdown().await;
    }
}
