//! Row operations through the PostgREST API

mod filter;
mod query;
mod types;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::Error;
use crate::fetch::{Fetch, FetchBuilder};

pub use filter::*;
pub use query::*;
pub use types::*;

/// Client for row operations on one table
pub struct PostgrestClient {
    /// The base URL for the Supabase project
    url: String,

    /// The anonymous API key for the Supabase project
    key: String,

    /// The table name
    table: String,

    /// Bearer token of the signed-in user, if any
    token: Option<String>,

    client: Client,

    client_info: String,
}

impl PostgrestClient {
    pub(crate) fn new(url: &str, key: &str, table: &str, client: Client, client_info: &str) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            table: table.to_string(),
            token: None,
            client,
            client_info: client_info.to_string(),
        }
    }

    /// Send requests as the given user instead of the anonymous role
    pub fn with_auth(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn get_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.table)
    }

    fn prepare<'a>(&self, fetch: FetchBuilder<'a>) -> FetchBuilder<'a> {
        let token = self.token.as_deref().unwrap_or(&self.key);
        fetch
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .bearer_auth(token)
    }

    /// Fetch the rows matching `query`
    pub async fn select(&self, query: &SelectQuery) -> Result<Vec<Value>, Error> {
        let url = self.get_url();
        self.prepare(Fetch::get(&self.client, &url))
            .query(&query.to_params())
            .execute::<Vec<Value>>()
            .await
    }

    /// Insert one row without reading it back
    pub async fn insert<T: Serialize + ?Sized>(&self, row: &T) -> Result<(), Error> {
        let url = self.get_url();
        self.prepare(Fetch::post(&self.client, &url))
            .header("Prefer", RETURN_MINIMAL)
            .json(row)?
            .execute_empty()
            .await
    }

    /// Patch the row with the given id
    pub async fn update_by_id<T: Serialize + ?Sized>(&self, id: &str, patch: &T) -> Result<(), Error> {
        let url = self.get_url();
        self.prepare(Fetch::patch(&self.client, &url))
            .header("Prefer", RETURN_MINIMAL)
            .query(&[id_filter(id)])
            .json(patch)?
            .execute_empty()
            .await
    }

    /// Delete the row with the given id
    pub async fn delete_by_id(&self, id: &str) -> Result<(), Error> {
        let url = self.get_url();
        self.prepare(Fetch::delete(&self.client, &url))
            .header("Prefer", RETURN_MINIMAL)
            .query(&[id_filter(id)])
            .execute_empty()
            .await
    }
}

fn id_filter(id: &str) -> (String, String) {
    let filter = Filter::new("id", FilterOperator::Eq, id);
    (filter.column.clone(), filter.to_param())
}
