//! Typed repository for frame documents.

use serde_json::json;
use tracing::info;

use vsum_models::{FrameId, FrameRecord, VideoId};

use crate::client::DocStoreClient;
use crate::error::{DocStoreError, DocStoreResult};
use crate::sorting::{frame_order, mango_sort, normalize_page_size, SortDirection, SCAN_PAGE_SIZE};
use crate::types::{DocId, DocRef, FindRequest, Stored};

/// Discriminator stored in the `type` field of frame documents.
const DOC_TYPE: &str = "frame";

/// Index that serves type-filtered, creation-ordered queries.
const LIST_INDEX: &str = "type-created-at";

/// Index that serves per-video frame queries.
const VIDEO_INDEX: &str = "type-video-id";

/// One page of a standalone image listing.
#[derive(Debug, Clone)]
pub struct FramePage {
    pub frames: Vec<FrameRecord>,
    /// Continuation token for the next page; `None` when exhausted.
    pub bookmark: Option<String>,
}

/// Repository for frame documents.
#[derive(Clone)]
pub struct FrameRepository {
    client: DocStoreClient,
}

impl FrameRepository {
    /// Create a new frame repository.
    pub fn new(client: DocStoreClient) -> Self {
        Self { client }
    }

    /// Document id for a frame.
    fn doc_id(frame_id: &FrameId) -> String {
        format!("frame:{}", frame_id)
    }

    /// Get a frame by ID.
    pub async fn get(&self, frame_id: &FrameId) -> DocStoreResult<Option<FrameRecord>> {
        let doc = self
            .client
            .get_document::<FrameRecord>(&Self::doc_id(frame_id))
            .await?;
        Ok(doc.map(|stored| stored.doc))
    }

    /// Create a new frame record. Fails with a conflict if the id is taken.
    pub async fn create(&self, frame: &FrameRecord) -> DocStoreResult<()> {
        let stored = Stored::new(Self::doc_id(&frame.frame_id), DOC_TYPE, frame.clone());
        self.client.put_document(&stored).await?;
        info!("Created frame record: {}", frame.frame_id);
        Ok(())
    }

    /// Delete a frame record. Returns `false` when it was already gone.
    pub async fn delete(&self, frame_id: &FrameId) -> DocStoreResult<bool> {
        let id = Self::doc_id(frame_id);

        match self.client.get_document::<FrameRecord>(&id).await? {
            Some(stored) => {
                let rev = stored
                    .rev
                    .ok_or_else(|| DocStoreError::invalid_response("document without _rev"))?;
                self.client.delete_document(&id, &rev).await?;
                info!("Deleted frame record: {}", frame_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fetch every frame of a video, in playback order (timecode, then id).
    pub async fn list_for_video(&self, video_id: &VideoId) -> DocStoreResult<Vec<FrameRecord>> {
        let mut frames: Vec<FrameRecord> = Vec::new();
        let mut bookmark: Option<String> = None;

        loop {
            let request = FindRequest {
                selector: json!({ "type": DOC_TYPE, "video_id": video_id.as_str() }),
                sort: None,
                fields: None,
                limit: Some(SCAN_PAGE_SIZE),
                bookmark: bookmark.take(),
                use_index: Some(VIDEO_INDEX.to_string()),
            };

            let page = self.client.find::<Stored<FrameRecord>>(&request).await?;
            let fetched = page.docs.len();
            frames.extend(page.docs.into_iter().map(|stored| stored.doc));

            if fetched < SCAN_PAGE_SIZE as usize {
                break;
            }
            bookmark = page.bookmark;
        }

        frames.sort_by(frame_order);
        Ok(frames)
    }

    /// List standalone images (frames not attached to any video), newest
    /// first, with bookmark pagination.
    pub async fn list_standalone(
        &self,
        limit: Option<u32>,
        bookmark: Option<String>,
    ) -> DocStoreResult<FramePage> {
        let page_size = normalize_page_size(limit);
        let request = FindRequest {
            selector: json!({
                "type": DOC_TYPE,
                "video_id": { "$exists": false }
            }),
            sort: Some(mango_sort(
                &["type", "created_at"],
                SortDirection::Descending,
            )),
            fields: None,
            limit: Some(page_size),
            bookmark,
            use_index: Some(LIST_INDEX.to_string()),
        };

        let page = self.client.find::<Stored<FrameRecord>>(&request).await?;
        let exhausted = page.docs.len() < page_size as usize;

        Ok(FramePage {
            frames: page.docs.into_iter().map(|stored| stored.doc).collect(),
            bookmark: if exhausted { None } else { page.bookmark },
        })
    }

    /// Delete every frame of a video. Returns the number of records removed.
    pub async fn delete_for_video(&self, video_id: &VideoId) -> DocStoreResult<u32> {
        // Collect refs first; deleting while paginating can skip documents.
        let mut refs: Vec<DocRef> = Vec::new();
        let mut bookmark: Option<String> = None;

        loop {
            let request = FindRequest {
                selector: json!({ "type": DOC_TYPE, "video_id": video_id.as_str() }),
                sort: None,
                fields: Some(vec!["_id".to_string(), "_rev".to_string()]),
                limit: Some(SCAN_PAGE_SIZE),
                bookmark: bookmark.take(),
                use_index: Some(VIDEO_INDEX.to_string()),
            };

            let page = self.client.find::<DocRef>(&request).await?;
            let fetched = page.docs.len();
            refs.extend(page.docs);

            if fetched < SCAN_PAGE_SIZE as usize {
                break;
            }
            bookmark = page.bookmark;
        }

        for doc_ref in &refs {
            self.client.delete_document(&doc_ref.id, &doc_ref.rev).await?;
        }

        let deleted = refs.len() as u32;
        if deleted > 0 {
            info!("Deleted {} frame records for video {}", deleted, video_id);
        }
        Ok(deleted)
    }

    /// Count frame documents.
    pub async fn count(&self) -> DocStoreResult<u64> {
        let mut total: u64 = 0;
        let mut bookmark: Option<String> = None;

        loop {
            let request = FindRequest {
                selector: json!({ "type": DOC_TYPE }),
                sort: None,
                fields: Some(vec!["_id".to_string()]),
                limit: Some(SCAN_PAGE_SIZE),
                bookmark: bookmark.take(),
                use_index: Some(LIST_INDEX.to_string()),
            };

            let page = self.client.find::<DocId>(&request).await?;
            total += page.docs.len() as u64;

            if page.docs.len() < SCAN_PAGE_SIZE as usize {
                return Ok(total);
            }
            bookmark = page.bookmark;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_prefix() {
        let id = FrameId::from_string("f-9");
        assert_eq!(FrameRepository::doc_id(&id), "frame:f-9");
    }
}
