//! Core service façade and bootstrap helpers.
//!
//! This crate wires a validated [`CoreConfig`] into the filter catalog, the
//! filter and user stores, the sync service, the account manager and the
//! preview renderer. Desktop apps typically enable the `desktop-shims`
//! feature so the HTTP client and the CPU filter backend are provided
//! automatically; headless hosts inject every bridge themselves.
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_service::CoreService;
//!
//! let config = CoreConfig::builder()
//!     .filters_endpoint("https://db.example.com/filters")
//!     .users_endpoint("https://db.example.com/users")
//!     .identity_provider(identity)
//!     .build()?;
//! let core = CoreService::new(config)?;
//!
//! core.accounts().log_in("ann@example.com", "secret").await?;
//! let filters = core.my_filters().await?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use core_auth::{AccountManager, InMemoryUserRepository, RestUserRepository, UserRepository};
use core_filters::{
    apply_filter, CameraFilter, FilterCatalog, FilterId, FilterRepository,
    InMemoryFilterRepository, PreviewRenderer, RestFilterRepository,
};
use core_runtime::config::{CoreConfig, StoreMode};
use core_runtime::document::DocumentClient;
use core_runtime::events::{EventBus, EventStream};
use core_sync::FilterSyncService;
use image::DynamicImage;
use tracing::info;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<CoreConfig>,
    event_bus: EventBus,
    catalog: FilterCatalog,
    filters: FilterSyncService,
    accounts: Arc<AccountManager>,
    preview: Option<Arc<PreviewRenderer>>,
}

impl CoreService {
    /// Build every component from `config`.
    ///
    /// # Errors
    ///
    /// [`CoreError::Runtime`] when a store endpoint cannot be bound,
    /// [`CoreError::InitializationFailed`] when remote mode lacks an HTTP
    /// client.
    pub fn new(config: CoreConfig) -> Result<Self> {
        let event_bus = EventBus::new(config.event_buffer_size);
        let catalog = FilterCatalog::new(config.filter_backend.clone())
            .with_levels_min(config.posterize_levels_min);

        let (filter_store, user_store) = build_stores(&config, &catalog)?;

        let filters = FilterSyncService::new(filter_store, event_bus.clone());
        let accounts = Arc::new(AccountManager::new(
            config.identity_provider.clone(),
            user_store,
            event_bus.clone(),
        ));
        let preview = config.frame_source.clone().map(|source| {
            Arc::new(
                PreviewRenderer::new(source, config.filter_backend.clone())
                    .with_thumbnail_edge(config.preview_edge),
            )
        });

        info!(
            store_mode = ?config.store_mode,
            kinds = catalog.kinds().len(),
            preview = preview.is_some(),
            "Core service initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            event_bus,
            catalog,
            filters,
            accounts,
            preview,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn catalog(&self) -> &FilterCatalog {
        &self.catalog
    }

    pub fn filters(&self) -> &FilterSyncService {
        &self.filters
    }

    pub fn accounts(&self) -> &AccountManager {
        &self.accounts
    }

    /// Preview renderer; `None` when no frame source was configured.
    pub fn preview(&self) -> Option<&PreviewRenderer> {
        self.preview.as_deref()
    }

    pub fn events(&self) -> &EventBus {
        &self.event_bus
    }

    /// Subscribe to every core event.
    pub fn subscribe(&self) -> EventStream {
        self.event_bus.stream()
    }

    /// Filters owned by the signed-in user
    pub async fn my_filters(&self) -> Result<Vec<CameraFilter>> {
        let user = self.accounts.require_user().await?;
        Ok(self.filters.fetch_all(&user.user_id).await?.into_payload())
    }

    /// Store a new filter for the signed-in user
    pub async fn save_filter(&self, filter: &CameraFilter) -> Result<()> {
        let user = self.accounts.require_user().await?;
        self.filters.create(&user.user_id, filter).await?;
        Ok(())
    }

    /// Replace a stored filter of the signed-in user
    pub async fn update_filter(&self, filter: &CameraFilter) -> Result<()> {
        let user = self.accounts.require_user().await?;
        self.filters.update(&user.user_id, filter).await?;
        Ok(())
    }

    pub async fn delete_filter(&self, id: &FilterId) -> Result<()> {
        self.accounts.require_user().await?;
        self.filters.delete(id).await?;
        Ok(())
    }

    /// Render `image` through `filter` with the configured backend
    pub fn apply(&self, filter: &CameraFilter, image: &DynamicImage) -> Option<DynamicImage> {
        apply_filter(self.config.filter_backend.as_ref(), filter, image)
    }
}

type Stores = (Arc<dyn FilterRepository>, Arc<dyn UserRepository>);

fn build_stores(config: &CoreConfig, catalog: &FilterCatalog) -> Result<Stores> {
    match config.store_mode {
        StoreMode::Local => {
            let filters: Arc<dyn FilterRepository> = Arc::new(InMemoryFilterRepository::new());
            let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
            Ok((filters, users))
        }
        StoreMode::Remote => {
            let http = config.http_client.clone().ok_or_else(|| {
                CoreError::InitializationFailed(
                    "remote store mode requires an HTTP client".to_string(),
                )
            })?;
            let bind = |endpoint: Option<&str>, name: &str| -> Result<DocumentClient> {
                let url = endpoint.ok_or_else(|| {
                    CoreError::InitializationFailed(format!("{} is not configured", name))
                })?;
                Ok(DocumentClient::new(http.clone(), url)?
                    .with_auth_token(config.auth_token.clone())
                    .with_timeout(config.request_timeout))
            };

            let filters: Arc<dyn FilterRepository> = Arc::new(RestFilterRepository::new(
                bind(config.filters_endpoint.as_deref(), "filters_endpoint")?,
                catalog.clone(),
            ));
            let users: Arc<dyn UserRepository> = Arc::new(RestUserRepository::new(bind(
                config.users_endpoint.as_deref(),
                "users_endpoint",
            )?));
            Ok((filters, users))
        }
    }
}
