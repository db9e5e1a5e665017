//! Video summary handler.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use vsum_engine::SummaryBuilder;
use vsum_models::{ThresholdConfig, VideoId, VideoSummary};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::metrics;
use crate::provenance::{frame_media_url, public_base_url};
use crate::services::StoreSummarySource;
use crate::state::AppState;

/// Threshold overrides for one summary request.
///
/// Absent fields fall back to the server defaults.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    #[serde(default)]
    pub face_min_occurrence: Option<u32>,
    #[serde(default)]
    pub face_min_score: Option<f32>,
    #[serde(default)]
    pub face_min_score_occurrence: Option<u32>,
    #[serde(default)]
    pub face_max_entries: Option<usize>,
    #[serde(default)]
    pub keyword_min_occurrence: Option<u32>,
    #[serde(default)]
    pub keyword_min_score: Option<f32>,
    #[serde(default)]
    pub keyword_min_score_occurrence: Option<u32>,
    #[serde(default)]
    pub keyword_max_entries: Option<usize>,
}

impl SummaryQuery {
    /// Resolve the two threshold sets, defaults overridden field by field.
    fn thresholds(&self) -> (ThresholdConfig, ThresholdConfig) {
        let mut faces = ThresholdConfig::default_faces();
        if let Some(v) = self.face_min_occurrence {
            faces.min_occurrence = v;
        }
        if let Some(v) = self.face_min_score {
            faces.min_score = v;
        }
        if let Some(v) = self.face_min_score_occurrence {
            faces.min_score_occurrence = v;
        }
        if let Some(v) = self.face_max_entries {
            faces.max_entries = Some(v);
        }

        let mut keywords = ThresholdConfig::default_keywords();
        if let Some(v) = self.keyword_min_occurrence {
            keywords.min_occurrence = v;
        }
        if let Some(v) = self.keyword_min_score {
            keywords.min_score = v;
        }
        if let Some(v) = self.keyword_min_score_occurrence {
            keywords.min_score_occurrence = v;
        }
        if let Some(v) = self.keyword_max_entries {
            keywords.max_entries = Some(v);
        }

        (faces, keywords)
    }
}

/// Build the face/keyword summary for one video.
///
/// The core read path: collects the video's frame detections, applies the
/// threshold sets, and returns ranked sections with per-entry provenance
/// links into the frame media route.
pub async fn video_summary(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<SummaryQuery>,
    headers: HeaderMap,
    _user: AuthUser,
) -> ApiResult<Json<VideoSummary>> {
    let video_id = VideoId::from_string(video_id);
    let (face_thresholds, keyword_thresholds) = query.thresholds();

    let base = public_base_url(&state.config, &headers);
    let builder = SummaryBuilder::new(StoreSummarySource::new(
        state.videos.clone(),
        state.frames.clone(),
    ));

    let start = Instant::now();
    let result = builder
        .summarize(&video_id, &face_thresholds, &keyword_thresholds, |frame_id| {
            frame_media_url(&base, frame_id)
        })
        .await;
    let duration = start.elapsed().as_secs_f64();

    match result {
        Ok(summary) => {
            metrics::record_summary_build("success", duration);
            info!(
                video_id = %video_id,
                faces = summary.faces.len(),
                keywords = summary.keywords.len(),
                "Summary built"
            );
            Ok(Json(summary))
        }
        Err(e) => {
            metrics::record_summary_build("error", duration);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_no_overrides() {
        let (faces, keywords) = SummaryQuery::default().thresholds();
        assert_eq!(faces, ThresholdConfig::default_faces());
        assert_eq!(keywords, ThresholdConfig::default_keywords());
    }

    #[test]
    fn test_overrides_apply_per_field() {
        let query = SummaryQuery {
            face_min_score: Some(0.5),
            face_max_entries: Some(2),
            keyword_min_occurrence: Some(1),
            keyword_min_score_occurrence: Some(1),
            ..Default::default()
        };
        let (faces, keywords) = query.thresholds();

        assert_eq!(faces.min_occurrence, 3);
        assert!((faces.min_score - 0.5).abs() < f32::EPSILON);
        assert_eq!(faces.max_entries, Some(2));
        assert_eq!(keywords.min_occurrence, 1);
        assert_eq!(keywords.min_score_occurrence, 1);
        assert_eq!(keywords.max_entries, Some(5));
    }
}
