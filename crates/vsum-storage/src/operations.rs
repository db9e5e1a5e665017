//! High-level media operations.
//!
//! Typed wrappers that tie the object key layout to the client, so
//! callers never format keys by hand.

use std::time::Duration;

use tracing::info;

use vsum_models::{FrameId, VideoId};

use crate::client::MediaStore;
use crate::error::StorageResult;
use crate::keys::{frame_key, video_prefix, video_source_key};

impl MediaStore {
    /// Store a video's source media. Returns the object key.
    pub async fn store_video_source(
        &self,
        video_id: &VideoId,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let key = video_source_key(video_id);
        self.upload_bytes(data, &key, content_type).await?;
        Ok(key)
    }

    /// Store a frame image. Returns the object key.
    pub async fn store_frame_media(
        &self,
        frame_id: &FrameId,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let key = frame_key(frame_id);
        self.upload_bytes(data, &key, content_type).await?;
        Ok(key)
    }

    /// Read a video's source media, optionally a byte range.
    ///
    /// Returns the bytes, the response content length, and the stored
    /// content type.
    pub async fn video_media(
        &self,
        video_id: &VideoId,
        range: Option<&str>,
    ) -> StorageResult<(Vec<u8>, u64, String)> {
        self.get_object_range(&video_source_key(video_id), range).await
    }

    /// Read a frame image in full. Frame images are small enough that
    /// ranged reads are not worth the complexity.
    pub async fn frame_media(&self, frame_id: &FrameId) -> StorageResult<Vec<u8>> {
        self.download_bytes(&frame_key(frame_id)).await
    }

    /// Presigned GET URL for a video's source media.
    pub async fn presign_video_source(
        &self,
        video_id: &VideoId,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.presign_get(&video_source_key(video_id), expires_in).await
    }

    /// Delete a frame image.
    pub async fn delete_frame_media(&self, frame_id: &FrameId) -> StorageResult<()> {
        self.delete_object(&frame_key(frame_id)).await
    }

    /// Delete every object under a video's own prefix.
    ///
    /// Frame images live under their own keys and are deleted per-frame
    /// by the caller during a cascade.
    pub async fn delete_video_media(&self, video_id: &VideoId) -> StorageResult<u32> {
        let deleted = self.delete_prefix(&video_prefix(video_id)).await?;
        if deleted == 0 {
            info!("No media found to delete for video {}", video_id);
        }
        Ok(deleted)
    }
}
