//! Object key layout.
//!
//! All media bytes live under two prefixes: `videos/{video_id}/` for
//! source media (and any future derivatives), `frames/{frame_id}` for
//! frame images. Frame images are keyed by frame id alone so standalone
//! images and video frames share one layout.

use vsum_models::{FrameId, VideoId};

/// Key for a video's source media.
pub fn video_source_key(video_id: &VideoId) -> String {
    format!("videos/{}/source", video_id)
}

/// Prefix under which all of a video's own objects live.
///
/// Frame images are NOT under this prefix; they are deleted per-frame
/// during a cascade.
pub fn video_prefix(video_id: &VideoId) -> String {
    format!("videos/{}/", video_id)
}

/// Key for a frame image.
pub fn frame_key(frame_id: &FrameId) -> String {
    format!("frames/{}", frame_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_keys() {
        let id = VideoId::from_string("vid-1");
        assert_eq!(video_source_key(&id), "videos/vid-1/source");
        assert_eq!(video_prefix(&id), "videos/vid-1/");
    }

    #[test]
    fn test_source_key_is_under_video_prefix() {
        let id = VideoId::from_string("vid-2");
        assert!(video_source_key(&id).starts_with(&video_prefix(&id)));
    }

    #[test]
    fn test_frame_key() {
        let id = FrameId::from_string("frame-9");
        assert_eq!(frame_key(&id), "frames/frame-9");
    }
}
