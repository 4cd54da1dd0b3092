//! Social-preview meta-tag rewriting for crawler requests.
//!
//! Boundary contract for the edge in front of the card page: when a known
//! crawler asks for a shared letter, the `og:title` and `twitter:title`
//! content attributes are rewritten with a sender-specific title. Any
//! lookup or fetch failure upstream means the caller serves the origin
//! HTML untouched.

use regex::Regex;
use std::sync::OnceLock;

/// Known crawler user-agent signatures, matched case-insensitively as
/// substrings.
pub const CRAWLER_USER_AGENTS: &[&str] = &[
    "facebookexternalhit",
    "Twitterbot",
    "LinkedInBot",
    "Slurp",
    "googlebot",
    "bingbot",
    "Baiduspider",
    "yandexbot",
    "preview",
];

pub fn is_crawler(user_agent: &str) -> bool {
    let user_agent = user_agent.to_lowercase();
    CRAWLER_USER_AGENTS
        .iter()
        .any(|crawler| user_agent.contains(&crawler.to_lowercase()))
}

pub fn share_title(sender_name: &str) -> String {
    format!("{} sent you a Valentine's Card!", sender_name)
}

fn og_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"id="og-title"\s+property="og:title"\s+content="[^"]*""#).unwrap()
    })
}

fn twitter_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"id="twitter-title"\s+name="twitter:title"\s+content="[^"]*""#).unwrap()
    })
}

/// Rewrites both preview-title meta attributes in place. Double quotes in
/// the sender name are HTML-escaped so the attribute can't be broken out
/// of.
pub fn rewrite_meta_titles(html: &str, sender_name: &str) -> String {
    let title = share_title(sender_name).replace('"', "&quot;");

    let og = format!(
        r#"id="og-title" property="og:title" content="{}""#,
        title
    );
    let twitter = format!(
        r#"id="twitter-title" name="twitter:title" content="{}""#,
        title
    );

    let html = og_title_re().replace(html, regex::NoExpand(&og));
    twitter_title_re()
        .replace(&html, regex::NoExpand(&twitter))
        .into_owned()
}
