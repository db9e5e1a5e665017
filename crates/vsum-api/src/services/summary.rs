//! Summary source backed by the document store.

use async_trait::async_trait;

use vsum_docstore::{FrameRepository, VideoRepository};
use vsum_engine::{SummarySource, UpstreamError};
use vsum_models::{FrameRecord, VideoId, VideoRecord};

/// Adapts the repositories to the engine's [`SummarySource`] trait.
#[derive(Clone)]
pub struct StoreSummarySource {
    videos: VideoRepository,
    frames: FrameRepository,
}

impl StoreSummarySource {
    /// Create a source over the given repositories.
    pub fn new(videos: VideoRepository, frames: FrameRepository) -> Self {
        Self { videos, frames }
    }
}

#[async_trait]
impl SummarySource for StoreSummarySource {
    async fn video(&self, video_id: &VideoId) -> Result<Option<VideoRecord>, UpstreamError> {
        self.videos.get(video_id).await.map_err(UpstreamError::new)
    }

    async fn frames_for_video(
        &self,
        video_id: &VideoId,
    ) -> Result<Vec<FrameRecord>, UpstreamError> {
        self.frames
            .list_for_video(video_id)
            .await
            .map_err(UpstreamError::new)
    }
}
