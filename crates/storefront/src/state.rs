//! Shop client state shared across commands.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::checkout::CheckoutSubmitter;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::pos::SaleSubmitter;
use crate::session::SessionStore;
use crate::storage::{FileStore, SharedStore};

/// Everything one session needs, over a single durable store.
///
/// This struct is cheaply cloneable via `Arc`. The session and the cart
/// both read and write through the same [`SharedStore`], which makes that
/// store the single source of truth for the session.
#[derive(Clone)]
pub struct ShopState {
    inner: Arc<ShopStateInner>,
}

struct ShopStateInner {
    config: ClientConfig,
    api: ApiClient,
    session: SessionStore,
    cart: Mutex<CartStore>,
    checkout: CheckoutSubmitter<ApiClient>,
    pos: SaleSubmitter<ApiClient>,
}

impl ShopState {
    /// Open the durable store named in `config` and restore the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file is unreadable or the HTTP
    /// client cannot be built.
    pub fn open(config: ClientConfig) -> Result<Self, ClientError> {
        let store = Arc::new(FileStore::open(&config.storage_path)?);
        Self::with_store(config, store)
    }

    /// Build state over an existing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_store(config: ClientConfig, store: SharedStore) -> Result<Self, ClientError> {
        let api = ApiClient::new(&config)?;
        let session = SessionStore::new(store.clone());
        let cart = Mutex::new(CartStore::open(store));

        Ok(Self {
            inner: Arc::new(ShopStateInner {
                checkout: CheckoutSubmitter::new(api.clone()),
                pos: SaleSubmitter::new(api.clone()),
                config,
                api,
                session,
                cart,
            }),
        })
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the shop API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Get a reference to the locked cart store.
    #[must_use]
    pub fn cart(&self) -> &Mutex<CartStore> {
        &self.inner.cart
    }

    /// Get a reference to the checkout submitter.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutSubmitter<ApiClient> {
        &self.inner.checkout
    }

    /// Get a reference to the POS sale submitter.
    #[must_use]
    pub fn pos(&self) -> &SaleSubmitter<ApiClient> {
        &self.inner.pos
    }
}
