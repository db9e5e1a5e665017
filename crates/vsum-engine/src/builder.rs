//! Summary assembly.
//!
//! Ties the pipeline together: fetch the video and its frame records
//! through a [`SummarySource`], collect occurrences, rank faces and
//! keywords under their threshold sets, and assemble the response payload.
//! The builder has no storage knowledge; the API crate adapts its
//! repositories to the source trait.

use async_trait::async_trait;
use tracing::debug;

use vsum_models::{
    FaceDetection, FrameId, FrameRecord, KeywordDetection, ThresholdConfig, VideoId, VideoRecord,
    VideoSummary,
};

use crate::collector::OccurrenceCollector;
use crate::error::{SummaryError, UpstreamError};
use crate::filter::RankedFilter;

/// Read access to stored videos and their frame analysis records.
#[async_trait]
pub trait SummarySource: Send + Sync {
    /// Fetch a video record; `None` when no such video exists.
    async fn video(&self, video_id: &VideoId) -> Result<Option<VideoRecord>, UpstreamError>;

    /// Fetch all frame analysis records for a video, in stored order.
    async fn frames_for_video(&self, video_id: &VideoId)
        -> Result<Vec<FrameRecord>, UpstreamError>;
}

/// Builds per-video summaries from stored analysis records.
pub struct SummaryBuilder<S> {
    source: S,
}

impl<S: SummarySource> SummaryBuilder<S> {
    /// Create a builder over a source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Build the summary for one video.
    ///
    /// Both threshold sets are validated before anything is fetched, so a
    /// bad configuration never costs a store round-trip. An absent video is
    /// [`SummaryError::NotFound`]; a video with no frame records yields a
    /// summary with empty sections. Source failures short-circuit as
    /// [`SummaryError::Upstream`]; there are no partial summaries.
    pub async fn summarize(
        &self,
        video_id: &VideoId,
        face_thresholds: &ThresholdConfig,
        keyword_thresholds: &ThresholdConfig,
        frame_url: impl Fn(&FrameId) -> String + Send,
    ) -> Result<VideoSummary, SummaryError> {
        face_thresholds.validate()?;
        keyword_thresholds.validate()?;

        let video = self
            .source
            .video(video_id)
            .await?
            .ok_or_else(|| SummaryError::NotFound(video_id.clone()))?;

        let records = self.source.frames_for_video(video_id).await?;
        debug!(
            video_id = %video_id,
            records = records.len(),
            "building summary"
        );

        let (face_groups, keyword_groups) = OccurrenceCollector::collect(&records, frame_url);

        let faces = RankedFilter::rank(&face_groups, |d: &FaceDetection| d.score, face_thresholds)?;
        let keywords = RankedFilter::rank(
            &keyword_groups,
            |d: &KeywordDetection| d.score,
            keyword_thresholds,
        )?;

        let mut summary = VideoSummary::new(video);
        for entry in faces {
            summary.faces.insert(entry.key, vec![entry.best]);
        }
        for entry in keywords {
            summary.keywords.insert(entry.key, vec![entry.best]);
        }

        Ok(summary)
    }
}
