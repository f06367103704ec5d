use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::{ContactStore, StoreError};
use crate::birthdays::is_upcoming;
use crate::models::{Contact, ContactInput};

#[derive(Default)]
struct Inner {
    contacts: BTreeMap<i32, Contact>,
    last_id: i32,
}

/// In-process store; ids start at 1 and are never handed out twice.
#[derive(Default)]
pub struct MemoryContactStore {
    inner: RwLock<Inner>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// `str::to_lowercase` folds full Unicode; Postgres `ILIKE` folds per the database's
// ctype, so the two stores can differ on non-ASCII text.
fn matches_query(contact: &Contact, needle: &str) -> bool {
    [&contact.first_name, &contact.last_name, &contact.email]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn insert(&self, input: ContactInput) -> Result<Contact, StoreError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let contact = Contact::from_input(inner.last_id, input);
        inner.contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn get(&self, id: i32) -> Result<Option<Contact>, StoreError> {
        Ok(self.inner.read().await.contacts.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Contact>, StoreError> {
        Ok(self.inner.read().await.contacts.values().cloned().collect())
    }

    async fn replace(&self, id: i32, input: ContactInput) -> Result<Option<Contact>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.contacts.get_mut(&id).map(|contact| {
            contact.replace_with(input);
            contact.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<Option<Contact>, StoreError> {
        Ok(self.inner.write().await.contacts.remove(&id))
    }

    async fn search(&self, query: &str) -> Result<Vec<Contact>, StoreError> {
        let needle = query.to_lowercase();
        let inner = self.inner.read().await;
        Ok(inner
            .contacts
            .values()
            .filter(|contact| matches_query(contact, &needle))
            .cloned()
            .collect())
    }

    async fn upcoming_birthdays(&self, today: NaiveDate) -> Result<Vec<Contact>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .contacts
            .values()
            .filter(|contact| is_upcoming(contact.birthday, today))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(first: &str, last: &str, email: &str, birthday: &str) -> ContactInput {
        ContactInput {
            first_name: first.into(),
            last_name: last.into(),
            email: email.into(),
            phone_number: "555-0100".into(),
            birthday: birthday.parse().unwrap(),
            additional_data: None,
        }
    }

    #[tokio::test]
    async fn insert_then_get_returns_same_record() {
        let store = MemoryContactStore::new();
        let created = store
            .insert(input("Ann", "Lee", "ann@x.com", "1990-01-05"))
            .await
            .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(store.get(created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryContactStore::new();
        let first = store.insert(input("A", "B", "a@b.c", "1990-01-01")).await.unwrap();
        let deleted = store.delete(first.id).await.unwrap();
        assert_eq!(deleted, Some(first.clone()));
        assert_eq!(store.get(first.id).await.unwrap(), None);
        assert_eq!(store.delete(first.id).await.unwrap(), None);

        let second = store.insert(input("C", "D", "c@d.e", "1990-01-01")).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn replace_on_missing_id_does_nothing() {
        let store = MemoryContactStore::new();
        let kept = store.insert(input("A", "B", "a@b.c", "1990-01-01")).await.unwrap();
        let result = store
            .replace(42, input("X", "Y", "x@y.z", "1991-02-02"))
            .await
            .unwrap();
        assert_eq!(result, None);
        assert_eq!(store.list_all().await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn replace_overwrites_all_fields() {
        let store = MemoryContactStore::new();
        let created = store.insert(input("A", "B", "a@b.c", "1990-01-01")).await.unwrap();
        let mut next = input("Zed", "Zulu", "zed@z.z", "1980-12-12");
        next.additional_data = Some("note".into());
        let updated = store.replace(created.id, next.clone()).await.unwrap().unwrap();
        assert_eq!(updated, Contact::from_input(created.id, next));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_union() {
        let store = MemoryContactStore::new();
        let ann = store.insert(input("Ann", "Lee", "ann@x.com", "1990-01-05")).await.unwrap();
        let bob = store.insert(input("Bob", "Annable", "bob@y.org", "1990-01-05")).await.unwrap();
        let cat = store.insert(input("Cat", "Moe", "cat@ANNEX.io", "1990-01-05")).await.unwrap();
        store.insert(input("Dan", "Roe", "dan@z.net", "1990-01-05")).await.unwrap();

        assert_eq!(store.search("ANN").await.unwrap(), vec![ann, bob, cat]);
        assert!(store.search("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let store = MemoryContactStore::new();
        let elodie = store.insert(input("Élodie", "Brun", "e@x.fr", "1990-01-05")).await.unwrap();
        store.insert(input("Eloise", "Marr", "m@x.fr", "1990-01-05")).await.unwrap();

        assert_eq!(store.search("éLO").await.unwrap(), vec![elodie.clone()]);
        assert_eq!(store.search("BRUN").await.unwrap(), vec![elodie]);
    }

    #[tokio::test]
    async fn upcoming_birthdays_uses_seven_day_window() {
        let store = MemoryContactStore::new();
        let soon = store.insert(input("A", "B", "a@b.c", "2000-07-10")).await.unwrap();
        store.insert(input("C", "D", "c@d.e", "2000-07-20")).await.unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 7, 9).unwrap();
        assert_eq!(store.upcoming_birthdays(today).await.unwrap(), vec![soon]);
    }
}
