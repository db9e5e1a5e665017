//! Typed repository for video documents.

use serde_json::json;
use tracing::{debug, info};

use vsum_models::{VideoId, VideoRecord};

use crate::client::DocStoreClient;
use crate::error::{DocStoreError, DocStoreResult};
use crate::sorting::{mango_sort, normalize_page_size, SortDirection, SCAN_PAGE_SIZE};
use crate::types::{DocId, FindRequest, Stored};

/// Discriminator stored in the `type` field of video documents.
const DOC_TYPE: &str = "video";

/// Index that serves type-filtered, creation-ordered queries.
const LIST_INDEX: &str = "type-created-at";

const MAX_UPDATE_RETRIES: u32 = 3;

/// One page of a video listing.
#[derive(Debug, Clone)]
pub struct VideoPage {
    pub videos: Vec<VideoRecord>,
    /// Continuation token for the next page; `None` when exhausted.
    pub bookmark: Option<String>,
}

/// Repository for video documents.
#[derive(Clone)]
pub struct VideoRepository {
    client: DocStoreClient,
}

impl VideoRepository {
    /// Create a new video repository.
    pub fn new(client: DocStoreClient) -> Self {
        Self { client }
    }

    /// Document id for a video.
    fn doc_id(video_id: &VideoId) -> String {
        format!("video:{}", video_id)
    }

    /// Get a video by ID.
    pub async fn get(&self, video_id: &VideoId) -> DocStoreResult<Option<VideoRecord>> {
        let doc = self
            .client
            .get_document::<VideoRecord>(&Self::doc_id(video_id))
            .await?;
        Ok(doc.map(|stored| stored.doc))
    }

    /// Create a new video record. Fails with a conflict if the id is taken.
    pub async fn create(&self, video: &VideoRecord) -> DocStoreResult<()> {
        let stored = Stored::new(Self::doc_id(&video.video_id), DOC_TYPE, video.clone());
        self.client.put_document(&stored).await?;
        info!("Created video record: {}", video.video_id);
        Ok(())
    }

    /// Apply a mutation to a video record, retrying on revision conflicts.
    pub async fn update<F>(&self, video_id: &VideoId, apply: F) -> DocStoreResult<VideoRecord>
    where
        F: Fn(VideoRecord) -> VideoRecord,
    {
        let id = Self::doc_id(video_id);
        let mut last_error = None;

        for attempt in 0..MAX_UPDATE_RETRIES {
            let stored = self
                .client
                .get_document::<VideoRecord>(&id)
                .await?
                .ok_or_else(|| DocStoreError::not_found(&id))?;

            let Stored {
                id: doc_id,
                rev,
                doc_type,
                doc,
            } = stored;
            let updated = Stored {
                id: doc_id,
                rev,
                doc_type,
                doc: apply(doc),
            };

            match self.client.put_document(&updated).await {
                Ok(_) => return Ok(updated.doc),
                Err(e @ DocStoreError::Conflict(_)) => {
                    debug!(
                        "Video update conflict for {} (attempt {}), refetching",
                        video_id,
                        attempt + 1
                    );
                    last_error = Some(e);
                    tokio::time::sleep(std::time::Duration::from_millis(50 * (attempt as u64 + 1)))
                        .await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| DocStoreError::conflict(format!("update exhausted retries: {}", id))))
    }

    /// Delete a video record. Returns `false` when it was already gone.
    pub async fn delete(&self, video_id: &VideoId) -> DocStoreResult<bool> {
        let id = Self::doc_id(video_id);

        match self.client.get_document::<VideoRecord>(&id).await? {
            Some(stored) => {
                let rev = stored
                    .rev
                    .ok_or_else(|| DocStoreError::invalid_response("document without _rev"))?;
                self.client.delete_document(&id, &rev).await?;
                info!("Deleted video record: {}", video_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// List videos, newest first, with bookmark pagination.
    pub async fn list(
        &self,
        limit: Option<u32>,
        bookmark: Option<String>,
    ) -> DocStoreResult<VideoPage> {
        let page_size = normalize_page_size(limit);
        let request = FindRequest {
            selector: json!({ "type": DOC_TYPE }),
            sort: Some(mango_sort(
                &["type", "created_at"],
                SortDirection::Descending,
            )),
            fields: None,
            limit: Some(page_size),
            bookmark,
            use_index: Some(LIST_INDEX.to_string()),
        };

        let page = self.client.find::<Stored<VideoRecord>>(&request).await?;
        let exhausted = page.docs.len() < page_size as usize;

        Ok(VideoPage {
            videos: page.docs.into_iter().map(|stored| stored.doc).collect(),
            bookmark: if exhausted { None } else { page.bookmark },
        })
    }

    /// Count video documents.
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
        let id = VideoId::from_string("abc-123");
        assert_eq!(VideoRepository::doc_id(&id), "video:abc-123");
    }
}
