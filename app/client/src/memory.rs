//! In-process identity provider and document store.
//!
//! Used by offline mode and by tests. Both answer with the same failure codes
//! as the remote services, and the document store can inject failures and
//! delays to exercise slow or broken backends.
use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use records::{Document, StoredDocument};
use uuid::Uuid;

use crate::{
    documents::DocumentStore,
    error::{ProviderError, StoreError},
    identity::{IdentityProvider, MIN_PASSWORD_LEN},
    session::Session,
};

struct Account {
    uid: String,
    password: String,
}

#[derive(Default)]
pub struct MemoryIdentity {
    accounts: RwLock<HashMap<String, Account>>,
    resets: RwLock<Vec<String>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emails a reset link was sent to, oldest first.
    pub fn resets_sent(&self) -> Vec<String> {
        self.resets.read().clone()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    fn session_for(email: &str, account: &Account) -> Session {
        Session::new(
            account.uid.clone(),
            Some(email.to_string()),
            Uuid::new_v4().simple().to_string(),
        )
    }
}

fn invalid_login() -> ProviderError {
    ProviderError::new("INVALID_LOGIN_CREDENTIALS", "INVALID_LOGIN_CREDENTIALS")
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        if !email.contains('@') {
            return Err(ProviderError::new("INVALID_EMAIL", "INVALID_EMAIL"));
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ProviderError::new(
                "WEAK_PASSWORD",
                "WEAK_PASSWORD : Password should be at least 6 characters",
            ));
        }

        let mut accounts = self.accounts.write();
        if accounts.contains_key(email) {
            return Err(ProviderError::new("EMAIL_EXISTS", "EMAIL_EXISTS"));
        }

        let account = Account {
            uid: Uuid::new_v4().simple().to_string(),
            password: password.to_string(),
        };
        let session = Self::session_for(email, &account);
        accounts.insert(email.to_string(), account);

        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        let accounts = self.accounts.read();
        let account = accounts.get(email).ok_or_else(invalid_login)?;

        if account.password != password {
            return Err(invalid_login());
        }

        Ok(Self::session_for(email, account))
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        if !self.accounts.read().contains_key(email) {
            return Err(ProviderError::new("EMAIL_NOT_FOUND", "EMAIL_NOT_FOUND"));
        }

        self.resets.write().push(email.to_string());
        Ok(())
    }
}

type Collections = BTreeMap<String, BTreeMap<String, Document>>;

#[derive(Default)]
pub struct MemoryDocuments {
    collections: RwLock<Collections>,
    fail_next: AtomicUsize,
    delays: Mutex<VecDeque<Duration>>,
    calls: AtomicUsize,
}

impl MemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the next `count` calls with an unavailable error.
    pub fn fail_next(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Delays the next calls, one duration per call in order.
    pub fn delay_next(&self, delays: impl IntoIterator<Item = Duration>) {
        self.delays.lock().extend(delays);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Raw fields of one document, bypassing defaults and sessions.
    pub fn raw(&self, collection: &str, id: &str) -> Option<Document> {
        self.collections
            .read()
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned()
    }

    /// Stores a document as-is, bypassing sessions.
    pub fn insert_raw(&self, collection: &str, id: &str, fields: Document) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    /// Counts the call, applies injected failures, and returns the delay owed.
    fn begin(&self, session: &Session) -> Result<Option<Duration>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().pop_front();

        let failing = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::new("UNAVAILABLE: injected failure"));
        }

        if session.is_expired() {
            return Err(StoreError::new("UNAUTHENTICATED: session expired"));
        }

        Ok(delay)
    }
}

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl DocumentStore for MemoryDocuments {
    async fn list(
        &self,
        session: &Session,
        collection: &str,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let delay = self.begin(session)?;

        // read now, answer late: a delayed list returns the data as it was
        let documents: Vec<StoredDocument> = self
            .collections
            .read()
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, fields)| StoredDocument {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        pause(delay).await;
        Ok(documents)
    }

    async fn create(
        &self,
        session: &Session,
        collection: &str,
        fields: Document,
    ) -> Result<String, StoreError> {
        pause(self.begin(session)?).await;

        let id = Uuid::new_v4().simple().to_string();
        self.insert_raw(collection, &id, fields);
        Ok(id)
    }

    async fn set(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError> {
        pause(self.begin(session)?).await;

        self.insert_raw(collection, id, fields);
        Ok(())
    }

    async fn update(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError> {
        pause(self.begin(session)?).await;

        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default()
            .extend(fields);
        Ok(())
    }

    async fn delete(&self, session: &Session, collection: &str, id: &str) -> Result<(), StoreError> {
        pause(self.begin(session)?).await;

        if let Some(documents) = self.collections.write().get_mut(collection) {
            documents.remove(id);
        }
        Ok(())
    }
}
