//! Bot detection for short link previews.
//!
//! Link unfurlers (chat apps, social networks, search engines) should get an
//! OpenGraph page; people should be redirected straight to the video.

/// Engine and browser markers present in real browser user agents.
const BROWSER_MARKERS: &[&str] = &[
    "mozilla", "chrome", "safari", "firefox", "edge", "opera", "webkit", "gecko", "trident",
    "presto",
];

/// Markers that identify automated clients even when they mimic a browser.
const BOT_MARKERS: &[&str] = &["bot", "crawler", "spider"];

/// Returns `true` unless the user agent is confidently a human browser.
///
/// An empty or short user agent counts as a bot.
pub fn is_bot_user_agent(user_agent: &str) -> bool {
    let trimmed = user_agent.trim();
    if trimmed.len() <= 20 {
        return true;
    }

    let lower = trimmed.to_ascii_lowercase();
    let looks_like_browser = BROWSER_MARKERS.iter().any(|m| lower.contains(m));
    let declares_bot = BOT_MARKERS.iter().any(|m| lower.contains(m));

    !(looks_like_browser && !declares_bot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_browser_is_human() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                  (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        assert!(!is_bot_user_agent(ua));
    }

    #[test]
    fn test_mobile_safari_is_human() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
                  (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
        assert!(!is_bot_user_agent(ua));
    }

    #[test]
    fn test_crawlers_are_bots() {
        assert!(is_bot_user_agent(
            "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"
        ));
        assert!(is_bot_user_agent(
            "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)"
        ));
        assert!(is_bot_user_agent("Slackbot-LinkExpanding 1.0 (+https://api.slack.com/robots)"));
    }

    #[test]
    fn test_empty_and_short_agents_are_bots() {
        assert!(is_bot_user_agent(""));
        assert!(is_bot_user_agent("   "));
        assert!(is_bot_user_agent("curl/8.4.0"));
        assert!(is_bot_user_agent("Mozilla/5.0"));
    }
}
