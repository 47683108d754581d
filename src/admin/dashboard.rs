//! Staff dashboard over orders, contact messages and products

use chrono::Utc;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Error;
use crate::gateway::{fetch_records, Collection, DataGateway, DynAuthGateway, DynDataGateway};
use crate::models::{
    ContactSubmission, MarkReadPatch, Order, OrderStatus, OrderStatusPatch, Product, StockStatus,
    StockStatusPatch,
};
use crate::postgrest::SelectQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Orders,
    Contacts,
    Products,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Orders, Tab::Contacts, Tab::Products];

    pub fn collection(self) -> Collection {
        match self {
            Tab::Orders => Collection::Orders,
            Tab::Contacts => Collection::ContactSubmissions,
            Tab::Products => Collection::Products,
        }
    }

    fn index(self) -> usize {
        match self {
            Tab::Orders => 0,
            Tab::Contacts => 1,
            Tab::Products => 2,
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tab::Orders => "Orders",
            Tab::Contacts => "Messages",
            Tab::Products => "Products",
        })
    }
}

/// Identifies one fetch; only the newest ticket per tab may apply its rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    tab: Tab,
    seq: u64,
}

impl FetchTicket {
    pub fn tab(&self) -> Tab {
        self.tab
    }
}

/// Rows returned by one tab fetch
#[derive(Debug, Clone)]
pub enum TabRows {
    Orders(Vec<Order>),
    Contacts(Vec<ContactSubmission>),
    Products(Vec<Product>),
}

/// Asks the operator before a destructive action
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
}

/// Fetch the full list behind `tab`, newest first
pub async fn fetch_tab(gateway: &dyn DataGateway, tab: Tab) -> Result<TabRows, Error> {
    let query = SelectQuery::newest_first();
    Ok(match tab {
        Tab::Orders => TabRows::Orders(fetch_records(gateway, &query).await?),
        Tab::Contacts => TabRows::Contacts(fetch_records(gateway, &query).await?),
        Tab::Products => TabRows::Products(fetch_records(gateway, &query).await?),
    })
}

/// Back-office view over orders, contact messages and products.
///
/// Every tab activation re-fetches that tab's collection; every successful
/// mutation re-fetches the collection it touched. A failed fetch or mutation
/// leaves the displayed list as it was.
pub struct Dashboard {
    data: DynDataGateway,
    auth: DynAuthGateway,
    active_tab: Tab,
    orders: Vec<Order>,
    contacts: Vec<ContactSubmission>,
    products: Vec<Product>,
    issued: [u64; 3],
    pending: [bool; 3],
}

impl Dashboard {
    pub fn new(data: DynDataGateway, auth: DynAuthGateway) -> Self {
        Self {
            data,
            auth,
            active_tab: Tab::default(),
            orders: Vec::new(),
            contacts: Vec::new(),
            products: Vec::new(),
            issued: [0; 3],
            pending: [false; 3],
        }
    }

    /// Create the dashboard on its default tab and load it
    pub async fn mount(data: DynDataGateway, auth: DynAuthGateway) -> Self {
        let mut dashboard = Self::new(data, auth);
        dashboard.refresh().await;
        dashboard
    }

    pub async fn activate(&mut self, tab: Tab) {
        self.active_tab = tab;
        self.reload(tab).await;
    }

    /// Re-fetch the active tab
    pub async fn refresh(&mut self) {
        self.reload(self.active_tab).await;
    }

    async fn reload(&mut self, tab: Tab) {
        let ticket = self.begin_fetch(tab);
        let result = fetch_tab(self.data.as_ref(), tab).await;
        self.complete_fetch(ticket, result);
    }

    /// Issue a ticket for a fetch of `tab`, superseding any earlier one
    pub fn begin_fetch(&mut self, tab: Tab) -> FetchTicket {
        let seq = &mut self.issued[tab.index()];
        *seq += 1;
        self.pending[tab.index()] = true;
        FetchTicket { tab, seq: *seq }
    }

    /// Apply a fetch result if its ticket is still the newest for its tab.
    ///
    /// Returns whether the result was applied.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: Result<TabRows, Error>) -> bool {
        if self.issued[ticket.tab.index()] != ticket.seq {
            debug!(tab = %ticket.tab, seq = ticket.seq, "discarding superseded fetch");
            return false;
        }
        self.pending[ticket.tab.index()] = false;

        match result {
            Ok(TabRows::Orders(rows)) => self.orders = rows,
            Ok(TabRows::Contacts(rows)) => self.contacts = rows,
            Ok(TabRows::Products(rows)) => self.products = rows,
            Err(e) => {
                warn!(tab = %ticket.tab, error = %e, "fetch failed, keeping previous list");
                return false;
            }
        }
        true
    }

    async fn mutate(&mut self, tab: Tab, action: &str, call: Result<(), Error>) -> Result<(), Error> {
        match call {
            Ok(()) => {
                info!(tab = %tab, action, "mutation applied");
                self.reload(tab).await;
                Ok(())
            }
            Err(e) => {
                warn!(tab = %tab, action, error = %e, "mutation failed");
                Err(e)
            }
        }
    }

    async fn patch<P: Serialize>(&self, collection: Collection, id: Uuid, patch: &P) -> Result<(), Error> {
        let patch = serde_json::to_value(patch)?;
        self.data.update(collection, &id.to_string(), patch).await
    }

    pub async fn set_order_status(&mut self, id: Uuid, status: OrderStatus) -> Result<(), Error> {
        if let Some(order) = self.orders.iter().find(|o| o.id == id) {
            if !order.status.can_transition_to(status) {
                return Err(Error::general(format!(
                    "order {} cannot move from {} to {}",
                    id, order.status, status
                )));
            }
        }
        let patch = OrderStatusPatch {
            status,
            updated_at: Utc::now(),
        };
        let result = self.patch(Collection::Orders, id, &patch).await;
        self.mutate(Tab::Orders, "set_order_status", result).await
    }

    /// Mark a message read; marking an already-read message is harmless
    pub async fn mark_contact_read(&mut self, id: Uuid) -> Result<(), Error> {
        let result = self
            .patch(Collection::ContactSubmissions, id, &MarkReadPatch::default())
            .await;
        self.mutate(Tab::Contacts, "mark_contact_read", result).await
    }

    pub async fn set_stock_status(&mut self, id: Uuid, stock_status: StockStatus) -> Result<(), Error> {
        if let Some(product) = self.products.iter().find(|p| p.id == id) {
            if !product.stock_status.can_transition_to(stock_status) {
                return Err(Error::general(format!(
                    "product {} cannot move from {} to {}",
                    id, product.stock_status, stock_status
                )));
            }
        }
        let patch = StockStatusPatch {
            stock_status,
            updated_at: Utc::now(),
        };
        let result = self.patch(Collection::Products, id, &patch).await;
        self.mutate(Tab::Products, "set_stock_status", result).await
    }

    pub async fn delete_order(&mut self, id: Uuid, confirm: &dyn Confirm) -> Result<DeleteOutcome, Error> {
        self.delete(Tab::Orders, id, "Are you sure you want to delete this order?", confirm)
            .await
    }

    pub async fn delete_contact(&mut self, id: Uuid, confirm: &dyn Confirm) -> Result<DeleteOutcome, Error> {
        self.delete(
            Tab::Contacts,
            id,
            "Are you sure you want to delete this contact submission?",
            confirm,
        )
        .await
    }

    async fn delete(
        &mut self,
        tab: Tab,
        id: Uuid,
        prompt: &str,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome, Error> {
        if !confirm.confirm(prompt) {
            debug!(tab = %tab, %id, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }
        let result = self.data.delete(tab.collection(), &id.to_string()).await;
        self.mutate(tab, "delete", result).await?;
        Ok(DeleteOutcome::Deleted)
    }

    /// End the staff session; the session gate observes the change
    pub async fn sign_out(&self) -> Result<(), Error> {
        self.auth.sign_out().await
    }

    pub fn unread_count(&self) -> usize {
        self.contacts.iter().filter(|c| !c.is_read).count()
    }

    /// Tab caption with its badge count, e.g. `Messages (2)`
    pub fn tab_label(&self, tab: Tab) -> String {
        let count = match tab {
            Tab::Orders => self.orders.len(),
            Tab::Contacts => self.unread_count(),
            Tab::Products => self.products.len(),
        };
        format!("{} ({})", tab, count)
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    /// Whether the active tab is waiting on a fetch
    pub fn is_loading(&self) -> bool {
        self.pending[self.active_tab.index()]
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn contacts(&self) -> &[ContactSubmission] {
        &self.contacts
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }
}
