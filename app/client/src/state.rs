use std::sync::Arc;

use reqwest::Client;
use tracing::info;

use crate::{
    config::{Backend, Config},
    documents::DocumentStore,
    firebase_auth::FirebaseAuth,
    firestore::Firestore,
    identity::{Identity, IdentityProvider},
    memory::{MemoryDocuments, MemoryIdentity},
};

pub struct State {
    pub config: Config,
    pub identity: Arc<Identity>,
    pub documents: Arc<dyn DocumentStore>,
}

impl State {
    pub fn new(config: Config) -> Arc<Self> {
        let (provider, documents): (Arc<dyn IdentityProvider>, Arc<dyn DocumentStore>) =
            match &config.backend {
                Backend::Firebase { api_key } => {
                    info!("Using project {}", config.project_id);

                    let client = Client::new();
                    (
                        Arc::new(FirebaseAuth::new(
                            client.clone(),
                            &config.identity_url,
                            api_key,
                        )),
                        Arc::new(Firestore::new(
                            client,
                            &config.firestore_url,
                            &config.project_id,
                        )),
                    )
                }
                Backend::Memory => {
                    info!("Using in-memory providers");

                    (
                        Arc::new(MemoryIdentity::new()),
                        Arc::new(MemoryDocuments::new()),
                    )
                }
            };

        Self::with_providers(config, provider, documents)
    }

    pub fn with_providers(
        config: Config,
        provider: Arc<dyn IdentityProvider>,
        documents: Arc<dyn DocumentStore>,
    ) -> Arc<Self> {
        let mut identity = Identity::new(provider);
        if config.create_profile {
            identity = identity.with_profiles(documents.clone());
        }

        Arc::new(Self {
            config,
            identity: Arc::new(identity),
            documents,
        })
    }
}
