//! The remote data backend, seen as row CRUD plus session-based auth
//!
//! Everything durable lives behind these two traits. [`SupabaseGateway`] talks
//! to a hosted project over HTTP; [`MemoryGateway`] and [`MemoryAuth`] keep rows
//! and users in process and record every call.

mod memory;
mod supabase;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

use crate::auth::{Session, SessionChange};
use crate::error::Error;
use crate::postgrest::SelectQuery;

pub use memory::*;
pub use supabase::*;

/// The tables the shop reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Orders,
    ContactSubmissions,
    Products,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Orders => "orders",
            Collection::ContactSubmissions => "contact_submissions",
            Collection::Products => "products",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row operations on the remote backend
#[async_trait]
pub trait DataGateway: Send + Sync {
    async fn select(&self, collection: Collection, query: &SelectQuery) -> Result<Vec<Value>, Error>;

    async fn insert(&self, collection: Collection, row: Value) -> Result<(), Error>;

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<(), Error>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), Error>;
}

/// Session-based authentication on the remote backend
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, Error>;

    /// Register a new account. Returns a session only when the backend signs the user in directly.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, Error>;

    async fn sign_out(&self) -> Result<(), Error>;

    /// The current session; an expired session is cleared and reported as absent
    async fn get_session(&self) -> Option<Session>;

    /// Every session transition from now until the receiver is dropped
    fn on_session_change(&self) -> broadcast::Receiver<SessionChange>;
}

pub type DynDataGateway = Arc<dyn DataGateway>;
pub type DynAuthGateway = Arc<dyn AuthGateway>;

/// A row type stored in one collection
pub trait Record: DeserializeOwned + Serialize {
    const COLLECTION: Collection;

    /// Checks invariants serde cannot express
    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Parse raw rows, dropping (and logging) those that fail to parse or validate
pub fn parse_rows<T: Record>(rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| {
            let parsed = serde_json::from_value::<T>(row)
                .map_err(Error::from)
                .and_then(|record| record.validate().map(|_| record));
            match parsed {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(collection = %T::COLLECTION, error = %e, "skipping invalid row");
                    None
                }
            }
        })
        .collect()
}

/// Select and parse rows of one record type
pub async fn fetch_records<T: Record>(
    gateway: &dyn DataGateway,
    query: &SelectQuery,
) -> Result<Vec<T>, Error> {
    let rows = gateway.select(T::COLLECTION, query).await?;
    Ok(parse_rows(rows))
}
