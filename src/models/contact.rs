//! Contact form submissions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gateway::{Collection, Record};
use crate::models::blank_as_none;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub phone: Option<String>,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for ContactSubmission {
    const COLLECTION: Collection = Collection::ContactSubmissions;
}

/// Row inserted by the contact workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub is_read: bool,
}

/// The only read transition: unread to read
#[derive(Debug, Clone, Serialize)]
pub struct MarkReadPatch {
    is_read: bool,
}

impl Default for MarkReadPatch {
    fn default() -> Self {
        Self { is_read: true }
    }
}
