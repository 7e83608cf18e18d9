//! Shipping address book
//!
//! CRUD over the address-list document with the single-default invariant:
//! whenever the list is non-empty exactly one address has
//! `is_default = true` and `default_address_id` mirrors it. The first
//! address a user adds becomes the default; deleting the default promotes
//! the first remaining address.

use crate::store::{self, DocumentStore};
use shared::models::{Address, AddressInput, AddressesDocument, now_millis};
use shared::{AppError, AppResult};
use std::sync::Arc;

/// Validate the shared address fields
fn validate_fields(
    receiver_name: &str,
    receiver_phone: &str,
    province: &str,
    city: &str,
    district: &str,
    detail: &str,
) -> AppResult<()> {
    if receiver_name.trim().is_empty() {
        return Err(AppError::validation("receiver name must not be empty"));
    }
    let phone = receiver_phone.trim();
    if !(5..=20).contains(&phone.len()) {
        return Err(AppError::validation(
            "receiver phone must be 5-20 characters",
        ));
    }
    if !phone
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || (i == 0 && c == '+'))
    {
        return Err(AppError::validation(
            "receiver phone must contain only digits (optional leading +)",
        ));
    }
    for (field, value) in [
        ("province", province),
        ("city", city),
        ("district", district),
        ("detail", detail),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::validation(format!("{field} must not be empty")));
        }
    }
    Ok(())
}

/// Validate an address input
pub fn validate_address_input(input: &AddressInput) -> AppResult<()> {
    validate_fields(
        &input.receiver_name,
        &input.receiver_phone,
        &input.province,
        &input.city,
        &input.district,
        &input.detail,
    )
}

/// Validate an address snapshot (used by order creation)
pub fn validate_address(address: &Address) -> AppResult<()> {
    validate_fields(
        &address.receiver_name,
        &address.receiver_phone,
        &address.province,
        &address.city,
        &address.district,
        &address.detail,
    )
}

/// Address book service
#[derive(Clone)]
pub struct AddressBook {
    store: Arc<dyn DocumentStore>,
    key: String,
}

impl AddressBook {
    pub fn new(store: Arc<dyn DocumentStore>, user_id: &str) -> Self {
        Self {
            key: store::addresses_key(user_id),
            store,
        }
    }

    async fn load(&self) -> AppResult<AddressesDocument> {
        Ok(store::read_document(self.store.as_ref(), &self.key)
            .await?
            .unwrap_or_default())
    }

    async fn persist(&self, doc: &mut AddressesDocument) -> AppResult<()> {
        Self::sync_default(doc);
        doc.last_modified = now_millis();
        store::write_document(self.store.as_ref(), &self.key, doc).await
    }

    /// Restore the single-default invariant and mirror the id field.
    ///
    /// If nothing is flagged (e.g. an update cleared the flag on the old
    /// default), the first address is promoted.
    fn sync_default(doc: &mut AddressesDocument) {
        if !doc.addresses.is_empty() && !doc.addresses.iter().any(|a| a.is_default) {
            doc.addresses[0].is_default = true;
        }
        doc.default_address_id = doc
            .addresses
            .iter()
            .find(|a| a.is_default)
            .map(|a| a.id.clone());
    }

    /// All addresses, default first preserved in insertion order
    pub async fn list(&self) -> AppResult<Vec<Address>> {
        Ok(self.load().await?.addresses)
    }

    /// Look up one address by id
    pub async fn get(&self, id: &str) -> AppResult<Address> {
        self.load()
            .await?
            .addresses
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::not_found("address", id))
    }

    /// The current default address, if any exist
    pub async fn get_default(&self) -> AppResult<Option<Address>> {
        Ok(self.load().await?.addresses.into_iter().find(|a| a.is_default))
    }

    /// Add a new address. The first address added always becomes the
    /// default; a later address flagged as default demotes the previous one.
    pub async fn add(&self, input: AddressInput) -> AppResult<Address> {
        validate_address_input(&input)?;
        let mut doc = self.load().await?;

        let mut address = Address::from_input(input);
        if doc.addresses.is_empty() {
            address.is_default = true;
        }
        if address.is_default {
            for existing in &mut doc.addresses {
                existing.is_default = false;
            }
        }

        doc.addresses.push(address.clone());
        self.persist(&mut doc).await?;
        tracing::debug!(address_id = %address.id, "address added");
        Ok(address)
    }

    /// Update an address in place
    pub async fn update(&self, id: &str, input: AddressInput) -> AppResult<Address> {
        validate_address_input(&input)?;
        let mut doc = self.load().await?;

        let idx = doc
            .addresses
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| AppError::not_found("address", id))?;

        doc.addresses[idx].apply_input(input);
        if doc.addresses[idx].is_default {
            for (i, existing) in doc.addresses.iter_mut().enumerate() {
                if i != idx {
                    existing.is_default = false;
                }
            }
        }

        let updated = doc.addresses[idx].clone();
        self.persist(&mut doc).await?;
        Ok(updated)
    }

    /// Remove an address. Deleting the default promotes the first remaining
    /// address.
    pub async fn remove(&self, id: &str) -> AppResult<()> {
        let mut doc = self.load().await?;

        let idx = doc
            .addresses
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| AppError::not_found("address", id))?;

        let removed = doc.addresses.remove(idx);
        if removed.is_default && !doc.addresses.is_empty() {
            doc.addresses[0].is_default = true;
        }

        self.persist(&mut doc).await?;
        tracing::debug!(address_id = %id, "address removed");
        Ok(())
    }

    /// Make the given address the default
    pub async fn set_default(&self, id: &str) -> AppResult<Address> {
        let mut doc = self.load().await?;

        if !doc.addresses.iter().any(|a| a.id == id) {
            return Err(AppError::not_found("address", id));
        }
        for address in &mut doc.addresses {
            address.is_default = address.id == id;
        }

        let updated = doc
            .addresses
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("address", id))?;
        self.persist(&mut doc).await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RedbStore;

    fn input(name: &str, is_default: bool) -> AddressInput {
        AddressInput {
            receiver_name: name.to_string(),
            receiver_phone: "13800001111".to_string(),
            province: "Zhejiang".to_string(),
            city: "Hangzhou".to_string(),
            district: "Xihu".to_string(),
            detail: "1 Lakeside Rd".to_string(),
            is_default,
            label: None,
        }
    }

    fn book() -> AddressBook {
        let store = Arc::new(RedbStore::open_in_memory().unwrap());
        AddressBook::new(store, "u1")
    }

    #[tokio::test]
    async fn test_first_address_becomes_default() {
        let book = book();
        let a = book.add(input("Alice", false)).await.unwrap();
        assert!(a.is_default);
        assert_eq!(book.get_default().await.unwrap().unwrap().id, a.id);
    }

    #[tokio::test]
    async fn test_single_default_invariant_on_add() {
        let book = book();
        let a = book.add(input("Alice", false)).await.unwrap();
        let b = book.add(input("Bob", true)).await.unwrap();

        let list = book.list().await.unwrap();
        let defaults: Vec<_> = list.iter().filter(|x| x.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, b.id);
        assert!(!list.iter().find(|x| x.id == a.id).unwrap().is_default);
    }

    #[tokio::test]
    async fn test_removing_default_promotes_first_remaining() {
        let book = book();
        let a = book.add(input("Alice", false)).await.unwrap();
        let b = book.add(input("Bob", false)).await.unwrap();
        assert!(!b.is_default);

        book.remove(&a.id).await.unwrap();
        let remaining = book.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].is_default);
        assert_eq!(remaining[0].id, b.id);
    }

    #[tokio::test]
    async fn test_set_default_moves_flag() {
        let book = book();
        let a = book.add(input("Alice", false)).await.unwrap();
        let b = book.add(input("Bob", false)).await.unwrap();

        book.set_default(&b.id).await.unwrap();
        assert!(!book.get(&a.id).await.unwrap().is_default);
        assert!(book.get(&b.id).await.unwrap().is_default);
    }

    #[tokio::test]
    async fn test_update_clearing_default_repromotes() {
        let book = book();
        let a = book.add(input("Alice", true)).await.unwrap();
        // Update the default with the flag cleared; someone must stay default
        book.update(&a.id, input("Alice2", false)).await.unwrap();
        let list = book.list().await.unwrap();
        assert_eq!(list.iter().filter(|x| x.is_default).count(), 1);
    }

    #[tokio::test]
    async fn test_validation_rejects_bad_phone() {
        let book = book();
        let mut bad = input("Alice", false);
        bad.receiver_phone = "12ab".to_string();
        let err = book.add(bad).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let book = book();
        let err = book.get("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
