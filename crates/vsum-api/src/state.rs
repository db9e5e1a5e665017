//! Application state.

use std::sync::Arc;

use vsum_docstore::{DocStoreClient, FrameRepository, VideoRepository};
use vsum_storage::MediaStore;

use crate::auth::TokenVerifier;
use crate::config::ApiConfig;
use crate::services::MediaLibrary;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub docstore: Arc<DocStoreClient>,
    pub videos: VideoRepository,
    pub frames: FrameRepository,
    pub store: Arc<MediaStore>,
    pub verifier: Arc<TokenVerifier>,
    pub library: MediaLibrary,
}

impl AppState {
    /// Create new application state.
    ///
    /// Connects to the document store and the media store, and makes sure the
    /// database and its indexes exist before the server starts accepting
    /// traffic.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        if config.auth_secret.is_empty() {
            return Err("AUTH_SECRET must be set to a non-empty signing secret".into());
        }

        let docstore = DocStoreClient::from_env()?;
        docstore.ensure_database().await?;
        docstore.ensure_indexes().await?;

        let store = MediaStore::from_env().await?;

        let videos = VideoRepository::new(docstore.clone());
        let frames = FrameRepository::new(docstore.clone());

        let verifier = TokenVerifier::new(&config.auth_secret);

        let store_arc = Arc::new(store);
        let library = MediaLibrary::new(videos.clone(), frames.clone(), Arc::clone(&store_arc));

        Ok(Self {
            config,
            docstore: Arc::new(docstore),
            videos,
            frames,
            store: store_arc,
            verifier: Arc::new(verifier),
            library,
        })
    }
}
