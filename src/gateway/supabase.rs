//! Gateway backed by a hosted Supabase project

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::auth::Auth;
use crate::config::ShopConfig;
use crate::error::Error;
use crate::gateway::{Collection, DataGateway};
use crate::postgrest::{PostgrestClient, SelectQuery};

/// Gateway backed by a hosted Supabase project
#[derive(Clone)]
pub struct SupabaseGateway {
    config: Arc<ShopConfig>,
    http_client: Client,
    auth: Arc<Auth>,
}

impl SupabaseGateway {
    pub fn new(config: ShopConfig) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let auth = Auth::new(
            config.base_url(),
            &config.anon_key,
            http_client.clone(),
            &config.options.client_info,
        );

        Ok(Self {
            config: Arc::new(config),
            http_client,
            auth: Arc::new(auth),
        })
    }

    /// Convenience constructor reading `SUPABASE_URL` / `SUPABASE_ANON_KEY`
    pub fn from_env() -> Result<Self, Error> {
        Self::new(ShopConfig::from_env()?)
    }

    /// The auth client whose session authorizes row requests
    pub fn auth(&self) -> Arc<Auth> {
        self.auth.clone()
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    async fn from(&self, collection: Collection) -> PostgrestClient {
        PostgrestClient::new(
            self.config.base_url(),
            &self.config.anon_key,
            collection.as_str(),
            self.http_client.clone(),
            &self.config.options.client_info,
        )
        .with_auth(self.auth.access_token().await)
    }
}

#[async_trait]
impl DataGateway for SupabaseGateway {
    async fn select(&self, collection: Collection, query: &SelectQuery) -> Result<Vec<Value>, Error> {
        let rows = self.from(collection).await.select(query).await?;
        debug!(%collection, rows = rows.len(), "selected rows");
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, row: Value) -> Result<(), Error> {
        self.from(collection).await.insert(&row).await
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<(), Error> {
        self.from(collection).await.update_by_id(id, &patch).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), Error> {
        self.from(collection).await.delete_by_id(id).await
    }
}
