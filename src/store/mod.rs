use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{Contact, ContactInput};

pub mod memory;
pub mod postgres;

pub use memory::MemoryContactStore;
pub use postgres::PgContactStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Pool exhaustion or a closed pool, as opposed to a failed statement.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::Database(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed)
        )
    }
}

/// Persistence boundary for contacts. Absent records are `Ok(None)`, not errors.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, input: ContactInput) -> Result<Contact, StoreError>;
    async fn get(&self, id: i32) -> Result<Option<Contact>, StoreError>;
    async fn list_all(&self) -> Result<Vec<Contact>, StoreError>;
    async fn replace(&self, id: i32, input: ContactInput) -> Result<Option<Contact>, StoreError>;
    async fn delete(&self, id: i32) -> Result<Option<Contact>, StoreError>;
    async fn search(&self, query: &str) -> Result<Vec<Contact>, StoreError>;
    async fn upcoming_birthdays(&self, today: NaiveDate) -> Result<Vec<Contact>, StoreError>;
}
