//! Document store REST provider.
//!
//! Documents live under
//! `{base}/projects/{project}/databases/(default)/documents/{collection}/{id}`.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list      | `GET {collection}`, repeated with `pageToken` until exhausted |
//! | create    | `POST {collection}` |
//! | set       | `PATCH {collection}/{id}` |
//! | update    | `PATCH {collection}/{id}?updateMask.fieldPaths=...` |
//! | delete    | `DELETE {collection}/{id}` |
use async_trait::async_trait;
use records::{Document, StoredDocument};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{documents::DocumentStore, error::StoreError, session::Session};

pub struct Firestore {
    client: Client,
    documents_url: String,
}

#[derive(Serialize, Deserialize)]
struct RemoteDocument {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default)]
    fields: Document,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RemoteDocument>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl Firestore {
    pub fn new(client: Client, base_url: &str, project_id: &str) -> Self {
        Self {
            client,
            documents_url: format!(
                "{}/projects/{project_id}/databases/(default)/documents",
                base_url.trim_end_matches('/')
            ),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url =
            Url::parse(&self.documents_url).map_err(|e| StoreError::new(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::new(format!("not a base url: {}", self.documents_url)))?
            .extend(segments);

        Ok(url)
    }

    fn collection_url(&self, collection: &str) -> Result<Url, StoreError> {
        self.url(&[collection])
    }

    /// Ids are percent-encoded, so `/`, `?` or spaces stay inside the last segment.
    fn document_url(&self, collection: &str, id: &str) -> Result<Url, StoreError> {
        self.url(&[collection, id])
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        session: &Session,
    ) -> Result<T, StoreError> {
        let res = request.bearer_auth(&session.id_token).send().await?;

        read(res).await
    }
}

async fn read<T: DeserializeOwned>(res: Response) -> Result<T, StoreError> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|envelope| envelope.error.message)
            .unwrap_or(text);

        return Err(StoreError::new(format!("{status}: {message}")));
    }

    serde_json::from_str(&text).map_err(|e| StoreError::new(e.to_string()))
}

fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

#[async_trait]
impl DocumentStore for Firestore {
    async fn list(
        &self,
        session: &Session,
        collection: &str,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let url = self.collection_url(collection)?;
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(url.clone());
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            debug!("GET {url}");
            let page: ListResponse = self.send(request, session).await?;

            documents.extend(page.documents.into_iter().map(|document| StoredDocument {
                id: document_id(&document.name).to_string(),
                fields: document.fields,
            }));

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(documents)
    }

    async fn create(
        &self,
        session: &Session,
        collection: &str,
        fields: Document,
    ) -> Result<String, StoreError> {
        let url = self.collection_url(collection)?;
        debug!("POST {url}");

        let body = RemoteDocument {
            name: String::new(),
            fields,
        };
        let created: RemoteDocument = self.send(self.client.post(url).json(&body), session).await?;

        Ok(document_id(&created.name).to_string())
    }

    async fn set(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError> {
        let url = self.document_url(collection, id)?;
        debug!("PATCH {url}");

        let body = RemoteDocument {
            name: String::new(),
            fields,
        };
        let _: RemoteDocument = self.send(self.client.patch(url).json(&body), session).await?;

        Ok(())
    }

    async fn update(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError> {
        let url = self.document_url(collection, id)?;
        debug!("PATCH {url} (merge)");

        let mask: Vec<(&str, &str)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", key.as_str()))
            .collect();
        let body = RemoteDocument {
            name: String::new(),
            fields: fields.clone(),
        };
        let request = self.client.patch(url).query(&mask).json(&body);
        let _: RemoteDocument = self.send(request, session).await?;

        Ok(())
    }

    async fn delete(&self, session: &Session, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.document_url(collection, id)?;
        debug!("DELETE {url}");

        let _: serde_json::Value = self.send(self.client.delete(url), session).await?;

        Ok(())
    }
}
