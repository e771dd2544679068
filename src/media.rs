//! Video asset resolution.
//!
//! A datapoint's `DavKey` starts with an environment path segment and embeds
//! a literal `[M]` marker after the clip stem. The playable asset is the
//! stem with `.mp4` appended, resolved against the media base.

/// Drop the leading environment segment of a key.
pub fn strip_environment(dav_key: &str) -> &str {
    match dav_key.split_once('/') {
        Some((_, rest)) => rest,
        None => "",
    }
}

const CLIP_MARKER: &str = "[M]";

/// Resolve the `.mp4` URL for a datapoint's key, or `None` when the key
/// carries no clip marker.
pub fn video_url(media_base: &str, dav_key: &str) -> Option<String> {
    let key = strip_environment(dav_key);
    let stem = &key[..key.find(CLIP_MARKER)?];
    Some(format!("{}/{}.mp4", media_base.trim_end_matches('/'), stem))
}
