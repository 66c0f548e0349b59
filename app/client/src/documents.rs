//! # Record Store Gateway
//!
//! Plain asynchronous CRUD over the `notes` and `products` collections.
//!
//! - Reads substitute defaults and skip empty records
//! - Reads never fail: a failed fetch is logged and yields an empty list
//! - Writes report failure through their `Result`, callers are free to only log it
//! - No retries, no timeouts beyond the transport's, no cancellation
use std::sync::Arc;

use async_trait::async_trait;
use records::{Document, FieldValue, Record, StoredDocument, USERS};
use tracing::{debug, warn};

use crate::{error::StoreError, session::Session};

/// A remote collection-of-documents backend.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of the collection, ordered by id.
    async fn list(&self, session: &Session, collection: &str)
    -> Result<Vec<StoredDocument>, StoreError>;

    /// Creates a document under a store-assigned id and returns that id.
    async fn create(
        &self,
        session: &Session,
        collection: &str,
        fields: Document,
    ) -> Result<String, StoreError>;

    /// Replaces the whole document.
    async fn set(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError>;

    /// Merges the supplied fields into the document, creating it when missing.
    async fn update(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError>;

    async fn delete(&self, session: &Session, collection: &str, id: &str) -> Result<(), StoreError>;
}

/// Gateway bound to one session.
#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn DocumentStore>,
    session: Session,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn DocumentStore>, session: Session) -> Self {
        Self { backend, session }
    }

    pub async fn add<R: Record>(&self, draft: &R::Draft) -> Result<String, StoreError> {
        let id = self
            .backend
            .create(&self.session, R::COLLECTION, R::to_fields(draft))
            .await
            .inspect_err(|e| warn!("Failed to add to {}: {e}", R::COLLECTION))?;

        debug!("Added {id} to {}", R::COLLECTION);
        Ok(id)
    }

    pub async fn get_all<R: Record>(&self) -> Vec<R> {
        match self.try_get_all::<R>().await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to fetch {}: {e}", R::COLLECTION);
                Vec::new()
            }
        }
    }

    pub async fn try_get_all<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        let documents = self.backend.list(&self.session, R::COLLECTION).await?;

        Ok(documents.iter().filter_map(R::from_document).collect())
    }

    pub async fn update<R: Record>(&self, id: &str, draft: &R::Draft) -> Result<(), StoreError> {
        self.backend
            .update(&self.session, R::COLLECTION, id, R::to_fields(draft))
            .await
            .inspect_err(|e| warn!("Failed to update {id} in {}: {e}", R::COLLECTION))
    }

    pub async fn delete<R: Record>(&self, id: &str) -> Result<(), StoreError> {
        self.backend
            .delete(&self.session, R::COLLECTION, id)
            .await
            .inspect_err(|e| warn!("Failed to delete {id} from {}: {e}", R::COLLECTION))
    }
}

/// Profile document written next to a new account: the email plus two empty
/// record collections.
pub fn profile_document(email: &str) -> Document {
    Document::from([
        ("email".to_string(), email.into()),
        (records::NOTES.to_string(), FieldValue::array(Vec::new())),
        (records::PRODUCTS.to_string(), FieldValue::array(Vec::new())),
    ])
}

pub async fn create_profile(
    backend: &dyn DocumentStore,
    session: &Session,
    email: &str,
) -> Result<(), StoreError> {
    backend
        .set(session, USERS, &session.uid, profile_document(email))
        .await
}
