//! User-agent parsing and bot detection.

use std::sync::LazyLock;

use regex::Regex;
use woothee::parser::Parser;

use crate::domain::entities::DeviceInfo;

/// Crawler and link-preview signatures, matched case-insensitively as substrings.
const BOT_SIGNATURES: &[&str] = &[
    "googlebot",
    "bingbot",
    "slurp",
    "duckduckbot",
    "baiduspider",
    "yandexbot",
    "applebot",
    "facebookexternalhit",
    "facebot",
    "twitterbot",
    "linkedinbot",
    "slackbot",
    "slack-imgproxy",
    "discordbot",
    "telegrambot",
    "whatsapp",
    "skypeuripreview",
    "pinterestbot",
    "redditbot",
    "embedly",
    "semrushbot",
    "ahrefsbot",
    "mj12bot",
    "petalbot",
    "bytespider",
    "gptbot",
    "headlesschrome",
];

static BOT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = BOT_SIGNATURES
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){alternation}")).expect("bot signatures form a valid regex")
});

static ANDROID_MODEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Android [\d.]+; (?:[a-zA-Z]{2}[-_][a-zA-Z]{2}; )?([^;)]+?)(?: Build/|\))")
        .expect("valid regex")
});

/// Returns true if the user agent matches a known crawler or preview bot.
pub fn is_bot(user_agent: &str) -> bool {
    BOT_PATTERN.is_match(user_agent)
}

fn known(value: &str) -> Option<String> {
    (!value.is_empty() && value != "UNKNOWN").then(|| value.to_string())
}

fn device_model(user_agent: &str) -> Option<String> {
    if user_agent.contains("iPhone") {
        return Some("iPhone".to_string());
    }
    if user_agent.contains("iPad") {
        return Some("iPad".to_string());
    }
    ANDROID_MODEL
        .captures(user_agent)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|m| !m.is_empty() && !m.eq_ignore_ascii_case("K"))
}

/// Parses a user agent into device information.
///
/// Device classes are `desktop`, `mobile`, `tablet` or `bot`; anything
/// woothee cannot place is reported as absent.
pub fn parse_user_agent(user_agent: Option<&str>) -> DeviceInfo {
    let Some(ua) = user_agent.map(str::trim).filter(|ua| !ua.is_empty()) else {
        return DeviceInfo::default();
    };

    let result = Parser::new().parse(ua).unwrap_or_default();
    let crawler = result.category == "crawler";

    let device_class = match result.category {
        "pc" => Some("desktop"),
        "smartphone" | "mobilephone" => Some("mobile"),
        "tablet" => Some("tablet"),
        "crawler" => Some("bot"),
        _ if ua.contains("iPad") => Some("tablet"),
        _ => None,
    };

    DeviceInfo {
        browser: known(result.name),
        os: known(result.os),
        device_class: device_class.map(str::to_string),
        device_model: device_model(ua),
        is_bot: crawler || is_bot(ua),
    }
}
