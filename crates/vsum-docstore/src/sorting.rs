//! Query ordering and pagination utilities.
//!
//! Mango sorts must match a JSON index field-for-field and use a single
//! direction across the whole sort spec, so the builders here keep that
//! shape in one place. Frame playback order is resolved client-side
//! because `timecode` is optional and Mango indexes skip documents that
//! lack an indexed field.

use std::cmp::Ordering;

use serde_json::{json, Value};
use vsum_models::FrameRecord;

/// Pagination limits for list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size used when draining every page of a query internally.
pub const SCAN_PAGE_SIZE: u32 = 500;

/// Normalize a requested page size to the supported range.
pub fn normalize_page_size(limit: Option<u32>) -> u32 {
    limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

/// Sort direction for Mango queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    /// Get the Mango direction string.
    pub const fn mango_direction(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// Build a Mango sort spec over the given index fields.
pub fn mango_sort(fields: &[&str], direction: SortDirection) -> Value {
    let dir = direction.mango_direction();
    Value::Array(fields.iter().map(|field| json!({ *field: dir })).collect())
}

/// Deterministic order for a video's frames: timecode, then frame id.
///
/// Frames without a timecode sort after timed ones.
pub fn frame_order(a: &FrameRecord, b: &FrameRecord) -> Ordering {
    let ta = a.timecode.unwrap_or(f64::MAX);
    let tb = b.timecode.unwrap_or(f64::MAX);
    ta.partial_cmp(&tb)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.frame_id.as_str().cmp(b.frame_id.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsum_models::FrameId;

    fn frame(id: &str, timecode: Option<f64>) -> FrameRecord {
        let mut record = FrameRecord::new(FrameId::from_string(id), "image/jpeg");
        record.timecode = timecode;
        record
    }

    #[test]
    fn test_normalize_page_size_bounds() {
        assert_eq!(normalize_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(normalize_page_size(Some(0)), MIN_PAGE_SIZE);
        assert_eq!(normalize_page_size(Some(50)), 50);
        assert_eq!(normalize_page_size(Some(10_000)), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_mango_sort_shape() {
        let sort = mango_sort(&["type", "created_at"], SortDirection::Descending);
        assert_eq!(
            sort,
            json!([{"type": "desc"}, {"created_at": "desc"}])
        );

        let sort = mango_sort(&["type", "video_id"], SortDirection::Ascending);
        assert_eq!(sort, json!([{"type": "asc"}, {"video_id": "asc"}]));
    }

    #[test]
    fn test_frame_order_by_timecode() {
        let a = frame("b-frame", Some(1.0));
        let b = frame("a-frame", Some(2.0));
        assert_eq!(frame_order(&a, &b), Ordering::Less);
        assert_eq!(frame_order(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_frame_order_tie_falls_to_id() {
        let a = frame("frame-a", Some(3.5));
        let b = frame("frame-b", Some(3.5));
        assert_eq!(frame_order(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_untimed_frames_sort_last() {
        let timed = frame("z-frame", Some(99.0));
        let untimed = frame("a-frame", None);
        assert_eq!(frame_order(&timed, &untimed), Ordering::Less);
    }
}
