//! In-process gateways for tests and offline use

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::{Session, SessionChange, User};
use crate::error::Error;
use crate::gateway::{AuthGateway, Collection, DataGateway};
use crate::postgrest::{Filter, FilterOperator, SelectQuery, SortOrder};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unavailable() -> Error {
    Error::Database {
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        message: "backend unavailable".to_string(),
    }
}

/// A call received by [`MemoryGateway`], in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Select {
        collection: Collection,
        query: SelectQuery,
    },
    Insert {
        collection: Collection,
        row: Value,
    },
    Update {
        collection: Collection,
        id: String,
        patch: Value,
    },
    Delete {
        collection: Collection,
        id: String,
    },
}

impl GatewayCall {
    pub fn is_write(&self) -> bool {
        !matches!(self, GatewayCall::Select { .. })
    }
}

/// In-process row store with the column defaults of the shop schema
#[derive(Default)]
pub struct MemoryGateway {
    tables: Mutex<HashMap<Collection, Vec<Value>>>,
    calls: Mutex<Vec<GatewayCall>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a row as-is, bypassing defaults and call recording
    pub fn seed(&self, collection: Collection, row: Value) {
        lock(&self.tables).entry(collection).or_default().push(row);
    }

    pub fn rows(&self, collection: Collection) -> Vec<Value> {
        lock(&self.tables).get(&collection).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        lock(&self.calls).clone()
    }

    pub fn writes(&self) -> Vec<GatewayCall> {
        self.calls().into_iter().filter(GatewayCall::is_write).collect()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, AtomicOrdering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, AtomicOrdering::SeqCst);
    }

    fn record(&self, call: GatewayCall) {
        lock(&self.calls).push(call);
    }

    fn check_writes(&self) -> Result<(), Error> {
        if self.fail_writes.load(AtomicOrdering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

fn apply_defaults(collection: Collection, row: &mut Map<String, Value>) {
    let now = Utc::now().to_rfc3339();
    row.entry("id").or_insert_with(|| json!(Uuid::new_v4()));
    row.entry("created_at").or_insert_with(|| json!(now));
    match collection {
        Collection::Orders => {
            row.entry("status").or_insert_with(|| json!("pending"));
            row.entry("updated_at").or_insert_with(|| json!(now));
        }
        Collection::Products => {
            row.entry("stock_status").or_insert_with(|| json!("in_stock"));
            row.entry("is_featured").or_insert_with(|| json!(false));
            row.entry("updated_at").or_insert_with(|| json!(now));
        }
        Collection::ContactSubmissions => {
            row.entry("is_read").or_insert_with(|| json!(false));
        }
    }
}

fn has_id(row: &Value, id: &str) -> bool {
    row.get("id").and_then(Value::as_str) == Some(id)
}

/// Text form of a cell as PostgREST compares it
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn compare_cells(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => {
            match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        // Nulls sort last, as in Postgres ascending order.
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => cell_text(a).cmp(&cell_text(b)),
    }
}

/// SQL comparison: a null cell matches neither `eq` nor `neq`
fn matches(filter: &Filter, row: &Value) -> bool {
    let cell = row.get(&filter.column).unwrap_or(&Value::Null);
    if cell.is_null() {
        return false;
    }
    let equal = cell_text(cell) == filter.value;
    match filter.operator {
        FilterOperator::Eq => equal,
        FilterOperator::Neq => !equal,
    }
}

#[async_trait]
impl DataGateway for MemoryGateway {
    async fn select(&self, collection: Collection, query: &SelectQuery) -> Result<Vec<Value>, Error> {
        self.record(GatewayCall::Select {
            collection,
            query: query.clone(),
        });
        if self.fail_reads.load(AtomicOrdering::SeqCst) {
            return Err(unavailable());
        }

        let mut rows: Vec<Value> = self
            .rows(collection)
            .into_iter()
            .filter(|row| query.filters().iter().all(|f| matches(f, row)))
            .collect();

        if let Some(order) = query.order_by() {
            rows.sort_by(|a, b| {
                let a = a.get(&order.column).unwrap_or(&Value::Null);
                let b = b.get(&order.column).unwrap_or(&Value::Null);
                match order.direction {
                    SortOrder::Ascending => compare_cells(a, b),
                    SortOrder::Descending => compare_cells(b, a),
                }
            });
        }
        if let Some(limit) = query.row_limit() {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, row: Value) -> Result<(), Error> {
        self.record(GatewayCall::Insert {
            collection,
            row: row.clone(),
        });
        self.check_writes()?;

        let Value::Object(mut row) = row else {
            return Err(Error::Database {
                status: reqwest::StatusCode::BAD_REQUEST,
                message: "row must be a JSON object".to_string(),
            });
        };
        apply_defaults(collection, &mut row);
        let row = Value::Object(row);

        let mut tables = lock(&self.tables);
        let table = tables.entry(collection).or_default();
        if let Some(id) = row.get("id").and_then(Value::as_str) {
            if table.iter().any(|existing| has_id(existing, id)) {
                return Err(Error::Database {
                    status: reqwest::StatusCode::CONFLICT,
                    message: format!("duplicate key value violates unique constraint \"{}_pkey\"", collection),
                });
            }
        }
        table.push(row);
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<(), Error> {
        self.record(GatewayCall::Update {
            collection,
            id: id.to_string(),
            patch: patch.clone(),
        });
        self.check_writes()?;

        let mut tables = lock(&self.tables);
        let rows = tables.entry(collection).or_default();
        // Like PostgREST, patching a missing id succeeds and touches nothing.
        if let (Some(Value::Object(row)), Value::Object(patch)) =
            (rows.iter_mut().find(|row| has_id(row, id)), patch)
        {
            row.extend(patch);
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), Error> {
        self.record(GatewayCall::Delete {
            collection,
            id: id.to_string(),
        });
        self.check_writes()?;

        lock(&self.tables)
            .entry(collection)
            .or_default()
            .retain(|row| !has_id(row, id));
        Ok(())
    }
}

/// In-process password auth with the same notification behaviour as [`crate::auth::Auth`]
pub struct MemoryAuth {
    users: Mutex<HashMap<String, String>>,
    session: Mutex<Option<Session>>,
    changes: broadcast::Sender<SessionChange>,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            users: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
            changes,
        }
    }
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, email: &str, password: &str) -> Self {
        lock(&self.users).insert(email.to_string(), password.to_string());
        self
    }

    /// Live session-change subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }

    /// Simulate the backend invalidating the session
    pub fn expire_session(&self) {
        *lock(&self.session) = None;
        let _ = self.changes.send(SessionChange::expired());
    }

    fn open_session(&self, email: &str) -> Session {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
            role: Some("authenticated".to_string()),
        };
        Session::new(Uuid::new_v4().to_string(), Uuid::new_v4().to_string(), user, 3600)
    }
}

#[async_trait]
impl AuthGateway for MemoryAuth {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, Error> {
        let known = lock(&self.users).get(email).map(|p| p == password).unwrap_or(false);
        if !known {
            return Err(Error::auth("Invalid login credentials"));
        }
        let session = self.open_session(email);
        *lock(&self.session) = Some(session.clone());
        let _ = self.changes.send(SessionChange::signed_in(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, Error> {
        let mut users = lock(&self.users);
        if users.contains_key(email) {
            return Err(Error::auth("User already registered"));
        }
        users.insert(email.to_string(), password.to_string());
        Ok(None)
    }

    async fn sign_out(&self) -> Result<(), Error> {
        *lock(&self.session) = None;
        let _ = self.changes.send(SessionChange::signed_out());
        Ok(())
    }

    async fn get_session(&self) -> Option<Session> {
        lock(&self.session).clone()
    }

    fn on_session_change(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_applies_column_defaults() {
        let gateway = MemoryGateway::new();
        gateway
            .insert(Collection::ContactSubmissions, json!({ "name": "Ann" }))
            .await
            .unwrap();

        let rows = gateway.rows(Collection::ContactSubmissions);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["is_read"], json!(false));
        assert!(rows[0]["id"].is_string());
        assert!(rows[0]["created_at"].is_string());
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let gateway = MemoryGateway::new();
        let row = json!({ "id": "a" });
        gateway.insert(Collection::Orders, row.clone()).await.unwrap();
        assert!(gateway.insert(Collection::Orders, row).await.is_err());
    }

    #[tokio::test]
    async fn select_filters_orders_and_limits() {
        let gateway = MemoryGateway::new();
        for (name, price, stock) in [("b", 2, "in_stock"), ("a", 1, "out_of_stock"), ("c", 3, "low_stock")] {
            gateway.seed(
                Collection::Products,
                json!({ "id": name, "name": name, "price": price, "stock_status": stock }),
            );
        }

        let query = SelectQuery::new().neq("stock_status", "out_of_stock").order("name", true);
        let names: Vec<String> = gateway
            .select(Collection::Products, &query)
            .await
            .unwrap()
            .iter()
            .map(|row| row["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["b", "c"]);

        let query = SelectQuery::new().order("price", false).limit(1);
        let rows = gateway.select(Collection::Products, &query).await.unwrap();
        assert_eq!(rows[0]["name"], json!("c"));
    }

    #[tokio::test]
    async fn eq_and_neq_skip_null_cells() {
        let gateway = MemoryGateway::new();
        gateway.seed(Collection::Products, json!({ "id": "featured", "is_featured": true, "flavor": "mango" }));
        gateway.seed(Collection::Products, json!({ "id": "plain", "is_featured": false, "flavor": null }));
        gateway.seed(Collection::Products, json!({ "id": "unset" }));

        let ids = |rows: Vec<Value>| -> Vec<String> {
            rows.iter().map(|r| r["id"].as_str().unwrap().to_string()).collect()
        };

        let featured = gateway
            .select(Collection::Products, &SelectQuery::new().eq("is_featured", true))
            .await
            .unwrap();
        assert_eq!(ids(featured), vec!["featured"]);

        let not_featured = gateway
            .select(Collection::Products, &SelectQuery::new().neq("is_featured", true))
            .await
            .unwrap();
        assert_eq!(ids(not_featured), vec!["plain"]);

        let not_mango = gateway
            .select(Collection::Products, &SelectQuery::new().neq("flavor", "mango"))
            .await
            .unwrap();
        assert!(not_mango.is_empty());
    }

    #[tokio::test]
    async fn timestamps_sort_chronologically() {
        let gateway = MemoryGateway::new();
        gateway.seed(Collection::Orders, json!({ "id": "old", "created_at": "2024-01-01T09:00:00+00:00" }));
        gateway.seed(Collection::Orders, json!({ "id": "new", "created_at": "2024-01-01T10:00:00.5+02:00" }));
        gateway.seed(Collection::Orders, json!({ "id": "newest", "created_at": "2024-01-01T09:30:00Z" }));

        let rows = gateway
            .select(Collection::Orders, &SelectQuery::newest_first())
            .await
            .unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["newest", "old", "new"]);
    }

    #[tokio::test]
    async fn failed_writes_are_recorded_but_not_applied() {
        let gateway = MemoryGateway::new();
        gateway.set_fail_writes(true);
        assert!(gateway.insert(Collection::Orders, json!({})).await.is_err());
        assert_eq!(gateway.writes().len(), 1);
        assert!(gateway.rows(Collection::Orders).is_empty());
    }

    #[tokio::test]
    async fn memory_auth_rejects_unknown_credentials() {
        let auth = MemoryAuth::new().with_user("staff@example.com", "secret1");
        assert!(matches!(
            auth.sign_in_with_password("staff@example.com", "wrong").await,
            Err(Error::Auth(_))
        ));
        assert!(auth.sign_in_with_password("staff@example.com", "secret1").await.is_ok());
        assert!(auth.get_session().await.is_some());
    }
}
