//! Kumalo Shop client core
//!
//! Storefront and back-office logic for a small yoghurt shop whose data lives
//! in a Supabase project: product catalog, cart, order and contact
//! submissions, and the staff dashboard behind a password session.
//!
//! All persistence goes through the [`gateway::DataGateway`] and
//! [`gateway::AuthGateway`] traits, so the same view models run against a
//! hosted project or the in-memory gateway.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod contact;
pub mod error;
pub mod fetch;
pub mod gateway;
pub mod models;
pub mod postgrest;
pub mod submission;

use std::sync::Arc;

use crate::admin::{Dashboard, LoginForm, SessionGate};
use crate::catalog::{Catalog, CatalogPurpose};
use crate::checkout::OrderWorkflow;
use crate::config::{ClientOptions, ShopConfig};
use crate::contact::ContactWorkflow;
use crate::error::Error;
use crate::gateway::{DynAuthGateway, DynDataGateway, SupabaseGateway};
use crate::models::Product;

/// The main entry point: shared gateways plus factories for each screen's model
#[derive(Clone)]
pub struct Shop {
    data: DynDataGateway,
    auth: DynAuthGateway,
    options: ClientOptions,
}

impl Shop {
    /// Connect to a hosted project
    ///
    /// # Example
    ///
    /// ```no_run
    /// use kumalo_shop::{config::ShopConfig, Shop};
    ///
    /// let config = ShopConfig::new("https://your-project.supabase.co", "your-anon-key").unwrap();
    /// let shop = Shop::connect(config).unwrap();
    /// ```
    pub fn connect(config: ShopConfig) -> Result<Self, Error> {
        let options = config.options.clone();
        let gateway = SupabaseGateway::new(config)?;
        let auth: DynAuthGateway = gateway.auth();
        Ok(Self::new(Arc::new(gateway), auth, options))
    }

    /// Connect using `SUPABASE_URL` and `SUPABASE_ANON_KEY`
    pub fn from_env() -> Result<Self, Error> {
        Self::connect(ShopConfig::from_env()?)
    }

    /// Build a shop over any gateway pair
    pub fn new(data: DynDataGateway, auth: DynAuthGateway, options: ClientOptions) -> Self {
        Self { data, auth, options }
    }

    pub fn data(&self) -> DynDataGateway {
        self.data.clone()
    }

    pub fn auth(&self) -> DynAuthGateway {
        self.auth.clone()
    }

    pub async fn catalog(&self, purpose: CatalogPurpose) -> Catalog {
        Catalog::load(self.data.as_ref(), purpose).await
    }

    pub async fn featured(&self) -> Vec<Product> {
        catalog::load_featured(self.data.as_ref()).await
    }

    pub fn order_workflow(&self) -> OrderWorkflow {
        OrderWorkflow::new(self.data.clone(), self.options.notice_duration)
    }

    pub fn contact_workflow(&self) -> ContactWorkflow {
        ContactWorkflow::new(self.data.clone(), self.options.notice_duration)
    }

    pub async fn session_gate(&self) -> SessionGate {
        SessionGate::mount(self.auth.clone()).await
    }

    pub fn login_form(&self) -> LoginForm {
        LoginForm::new(self.auth.clone())
    }

    pub async fn dashboard(&self) -> Dashboard {
        Dashboard::mount(self.data.clone(), self.auth.clone()).await
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::admin::{AdminView, Dashboard, DeleteOutcome, LoginForm, LoginMode, SessionGate, Tab};
    pub use crate::cart::Cart;
    pub use crate::catalog::{Catalog, CatalogPurpose};
    pub use crate::checkout::{OrderForm, OrderWorkflow};
    pub use crate::config::{ClientOptions, ShopConfig};
    pub use crate::contact::{ContactForm, ContactWorkflow};
    pub use crate::error::{Error, SubmitError, ValidationError};
    pub use crate::gateway::{AuthGateway, DataGateway, MemoryAuth, MemoryGateway};
    pub use crate::models::{OrderStatus, Product, StockStatus};
    pub use crate::Shop;
}
