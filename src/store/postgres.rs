use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use tracing::debug;

use super::{ContactStore, StoreError};
use crate::birthdays::is_upcoming;
use crate::models::{Contact, ContactInput};

const COLUMNS: &str =
    "id, first_name, last_name, email, phone_number, birthday, additional_data";

#[derive(Clone)]
pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Dropping the returned connection hands it back to the pool.
    async fn conn(&self) -> Result<PoolConnection<Postgres>, StoreError> {
        Ok(self.pool.acquire().await?)
    }
}

/// Escapes LIKE metacharacters and wraps the query for a substring match.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn insert(&self, input: ContactInput) -> Result<Contact, StoreError> {
        let mut conn = self.conn().await?;
        let sql = format!(
            "INSERT INTO contacts (first_name, last_name, email, phone_number, birthday, additional_data) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        );
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone_number)
            .bind(input.birthday)
            .bind(&input.additional_data)
            .fetch_one(&mut *conn)
            .await?;
        debug!(id = contact.id, "contact inserted");
        Ok(contact)
    }

    async fn get(&self, id: i32) -> Result<Option<Contact>, StoreError> {
        let mut conn = self.conn().await?;
        let sql = format!("SELECT {COLUMNS} FROM contacts WHERE id = $1");
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(contact)
    }

    async fn list_all(&self) -> Result<Vec<Contact>, StoreError> {
        let mut conn = self.conn().await?;
        let sql = format!("SELECT {COLUMNS} FROM contacts ORDER BY id");
        let contacts = sqlx::query_as::<_, Contact>(&sql)
            .fetch_all(&mut *conn)
            .await?;
        Ok(contacts)
    }

    async fn replace(&self, id: i32, input: ContactInput) -> Result<Option<Contact>, StoreError> {
        let mut conn = self.conn().await?;
        let sql = format!(
            "UPDATE contacts SET first_name = $1, last_name = $2, email = $3, phone_number = $4, \
             birthday = $5, additional_data = $6 WHERE id = $7 RETURNING {COLUMNS}"
        );
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone_number)
            .bind(input.birthday)
            .bind(&input.additional_data)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(contact)
    }

    async fn delete(&self, id: i32) -> Result<Option<Contact>, StoreError> {
        let mut conn = self.conn().await?;
        let sql = format!("DELETE FROM contacts WHERE id = $1 RETURNING {COLUMNS}");
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(contact)
    }

    async fn search(&self, query: &str) -> Result<Vec<Contact>, StoreError> {
        let mut conn = self.conn().await?;
        let sql = format!(
            "SELECT {COLUMNS} FROM contacts \
             WHERE first_name ILIKE $1 OR last_name ILIKE $1 OR email ILIKE $1 ORDER BY id"
        );
        let contacts = sqlx::query_as::<_, Contact>(&sql)
            .bind(like_pattern(query))
            .fetch_all(&mut *conn)
            .await?;
        Ok(contacts)
    }

    async fn upcoming_birthdays(&self, today: NaiveDate) -> Result<Vec<Contact>, StoreError> {
        // Window rule lives in `birthdays::is_upcoming` so every store applies the same one.
        let contacts = self.list_all().await?;
        Ok(contacts
            .into_iter()
            .filter(|contact| is_upcoming(contact.birthday, today))
            .collect())
    }
}
