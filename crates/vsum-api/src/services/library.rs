//! Media library service.
//!
//! Coordinates the two stores behind every write: metadata documents in the
//! document store, media bytes in the blob store. Writes create the document
//! first and roll it back if the media store rejects the bytes, so a failed
//! upload never leaves a document pointing at nothing.

use std::sync::Arc;

use tracing::{info, warn};

use vsum_docstore::{FrameRepository, VideoRepository};
use vsum_models::{FrameId, FrameRecord, VideoId, VideoRecord};
use vsum_storage::MediaStore;

use crate::error::{ApiError, ApiResult};
use crate::metrics;

/// Outcome of a cascading video delete.
#[derive(Debug, Clone, Copy)]
pub struct VideoDeletion {
    /// Frame documents removed alongside the video.
    pub frames_deleted: u32,
    /// Blob store objects removed, frame images included.
    pub media_objects_deleted: u32,
}

/// Service that keeps video/frame documents and their media in step.
#[derive(Clone)]
pub struct MediaLibrary {
    videos: VideoRepository,
    frames: FrameRepository,
    store: Arc<MediaStore>,
}

impl MediaLibrary {
    /// Create a new media library service.
    pub fn new(videos: VideoRepository, frames: FrameRepository, store: Arc<MediaStore>) -> Self {
        Self {
            videos,
            frames,
            store,
        }
    }

    /// Store a new video: document first, then the source media.
    pub async fn upload_video(
        &self,
        record: VideoRecord,
        data: Vec<u8>,
    ) -> ApiResult<VideoRecord> {
        let record = record.with_size(data.len() as u64);
        self.videos.create(&record).await?;

        if let Err(e) = self
            .store
            .store_video_source(&record.video_id, data, &record.content_type)
            .await
        {
            warn!(
                "Media store rejected video {}, rolling back document: {}",
                record.video_id, e
            );
            let _ = self.videos.delete(&record.video_id).await;
            return Err(e.into());
        }

        metrics::record_media_upload("video");
        info!("Uploaded video {} ({} bytes)", record.video_id, record.size_bytes);
        Ok(record)
    }

    /// Ingest one analyzed frame under an existing video.
    ///
    /// The frame record must carry its video link; the parent's frame count
    /// is bumped once the frame is safely stored.
    pub async fn ingest_frame(&self, record: FrameRecord, data: Vec<u8>) -> ApiResult<FrameRecord> {
        let video_id = record
            .video_id
            .clone()
            .ok_or_else(|| ApiError::bad_request("Frame is not attached to a video"))?;

        if self.videos.get(&video_id).await?.is_none() {
            return Err(ApiError::not_found(format!("Video not found: {}", video_id)));
        }

        let record = self.persist_frame(record, data).await?;
        self.videos
            .update(&video_id, |video| video.record_frames(1))
            .await?;

        metrics::record_media_upload("frame");
        Ok(record)
    }

    /// Store a standalone image with its analysis results.
    pub async fn upload_image(&self, record: FrameRecord, data: Vec<u8>) -> ApiResult<FrameRecord> {
        if !record.is_standalone() {
            return Err(ApiError::bad_request("Image must not reference a video"));
        }

        let record = self.persist_frame(record, data).await?;
        metrics::record_media_upload("image");
        Ok(record)
    }

    /// Delete a video, its frame records, and all of its media.
    pub async fn delete_video(&self, video_id: &VideoId) -> ApiResult<VideoDeletion> {
        if self.videos.get(video_id).await?.is_none() {
            return Err(ApiError::not_found(format!("Video not found: {}", video_id)));
        }

        let frames = self.frames.list_for_video(video_id).await?;
        for frame in &frames {
            self.store.delete_frame_media(&frame.frame_id).await?;
        }
        let frames_deleted = self.frames.delete_for_video(video_id).await?;
        let source_objects = self.store.delete_video_media(video_id).await?;
        self.videos.delete(video_id).await?;

        let deletion = VideoDeletion {
            frames_deleted,
            media_objects_deleted: source_objects + frames.len() as u32,
        };
        info!(
            "Deleted video {} ({} frames, {} media objects)",
            video_id, deletion.frames_deleted, deletion.media_objects_deleted
        );
        Ok(deletion)
    }

    /// Drop every frame of a video and reset its analysis state.
    ///
    /// The video itself and its source media stay in place, ready for a
    /// fresh analysis run.
    pub async fn purge_analysis(&self, video_id: &VideoId) -> ApiResult<u32> {
        if self.videos.get(video_id).await?.is_none() {
            return Err(ApiError::not_found(format!("Video not found: {}", video_id)));
        }

        let frames = self.frames.list_for_video(video_id).await?;
        for frame in &frames {
            self.store.delete_frame_media(&frame.frame_id).await?;
        }
        let deleted = self.frames.delete_for_video(video_id).await?;
        self.videos
            .update(video_id, |video| video.reset_analysis())
            .await?;

        info!("Purged {} frames from video {}", deleted, video_id);
        Ok(deleted)
    }

    /// Delete a standalone image and its media.
    ///
    /// Frames that belong to a video are not addressable here; they go away
    /// with their video or through an analysis purge.
    pub async fn delete_image(&self, frame_id: &FrameId) -> ApiResult<()> {
        match self.frames.get(frame_id).await? {
            Some(record) if record.is_standalone() => {
                self.store.delete_frame_media(frame_id).await?;
                self.frames.delete(frame_id).await?;
                info!("Deleted image {}", frame_id);
                Ok(())
            }
            _ => Err(ApiError::not_found(format!("Image not found: {}", frame_id))),
        }
    }

    /// Document-then-media write with rollback.
    ///
    /// Creating the document first means a frame id collision surfaces as a
    /// conflict before any bytes are written, so a duplicate id can never
    /// clobber another frame's stored media.
    async fn persist_frame(&self, record: FrameRecord, data: Vec<u8>) -> ApiResult<FrameRecord> {
        let record = record.with_size(data.len() as u64);
        self.frames.create(&record).await?;

        if let Err(e) = self
            .store
            .store_frame_media(&record.frame_id, data, &record.content_type)
            .await
        {
            warn!(
                "Media store rejected frame {}, rolling back document: {}",
                record.frame_id, e
            );
            let _ = self.frames.delete(&record.frame_id).await;
            return Err(e.into());
        }

        Ok(record)
    }
}
