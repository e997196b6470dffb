use once_cell::sync::Lazy;
use regex::Regex;

static YOUTUBE_URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^https?://(?:www\.)?youtube\.com/watch\?v=[\w-]+",
        r"^https?://(?:www\.)?youtube\.com/v/[\w-]+",
        r"^https?://(?:www\.)?youtube\.com/embed/[\w-]+",
        r"^https?://(?:www\.)?youtube\.com/shorts/[\w-]+",
        r"^https?://(?:www\.)?youtube\.com/channel/[\w-]+",
        r"^https?://(?:www\.)?youtube\.com/c/[\w-]+",
        r"^https?://(?:www\.)?youtube\.com/user/[\w-]+",
        r"^https?://(?:www\.)?youtube\.com/@[\w-]+",
        r"^https?://youtu\.be/[\w-]+",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

static VIDEO_ID_IN_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:v=|/v/|/embed/|/shorts/|youtu\.be/)([\w-]{11})").expect("valid video id pattern")
});

static BARE_VIDEO_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\w-]{11})$").expect("valid bare id pattern"));

static CHANNEL_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"/channel/([\w-]+)", r"/c/([\w-]+)", r"/user/([\w-]+)", r"/@([\w-]+)"]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
});

pub fn is_valid_youtube_url(url: &str) -> bool {
    let url = url.trim();
    YOUTUBE_URL_PATTERNS.iter().any(|pattern| pattern.is_match(url))
}

/// The 11-character video id from a watch/embed/shorts/short-link URL, or
/// the input itself when it already is a bare id.
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    VIDEO_ID_IN_URL
        .captures(url)
        .or_else(|| BARE_VIDEO_ID.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn extract_channel_id(url: &str) -> Option<String> {
    let url = url.trim();
    CHANNEL_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
