//! Recognition of URLs that point at video content.

use url::Url;

/// Hosts known to serve embeddable video players. Subdomains match too.
const SUPPORTED_DOMAINS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "m.youtube.com",
    "vimeo.com",
    "player.vimeo.com",
    "dailymotion.com",
    "dai.ly",
    "twitch.tv",
    "clips.twitch.tv",
    "facebook.com",
    "fb.watch",
    "instagram.com",
    "tiktok.com",
    "twitter.com",
    "x.com",
    "streamable.com",
    "wistia.com",
    "fast.wistia.net",
    "brightcove.com",
    "jwplayer.com",
    "kaltura.com",
];

/// Direct video file extensions, matched against the lowercased path.
const VIDEO_EXTENSIONS: &[&str] = &[
    ".mp4", ".webm", ".ogg", ".avi", ".mov", ".wmv", ".flv", ".mkv",
];

/// Returns `true` if `url` is on a known video platform or names a video file.
///
/// `url` is expected to be an absolute HTTP(S) URL; anything unparsable is
/// reported as unsupported.
pub fn is_supported_video_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let known_host = SUPPORTED_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")));
    if known_host {
        return true;
    }

    let path = parsed.path().to_ascii_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
