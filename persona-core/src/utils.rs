use crate::error::CoreError;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

const PROFILE_URL_PATTERN: &str = r"^https?://(www\.)?reddit\.com/user/[a-zA-Z0-9_-]+/?$";

fn profile_url_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(PROFILE_URL_PATTERN).expect("profile URL pattern is valid"))
}

pub fn validate_reddit_url(url: &str) -> bool {
    profile_url_regex().is_match(url)
}

pub fn extract_username_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    match parsed.host_str() {
        Some("reddit.com") | Some("www.reddit.com") => {}
        _ => return None,
    }

    let mut segments = parsed.path_segments()?.filter(|segment| !segment.is_empty());
    match (segments.next(), segments.next()) {
        (Some("user"), Some(username)) => Some(username.to_string()),
        _ => None,
    }
}

/// Turns a CLI argument (profile URL or bare username) into a username.
pub fn resolve_username(input: &str) -> Result<String, CoreError> {
    let input = input.trim();
    if input.starts_with("http") {
        if !validate_reddit_url(input) {
            return Err(CoreError::InvalidInput {
                message: format!("Invalid Reddit URL: {}", input),
            });
        }
        return extract_username_from_url(input).ok_or_else(|| CoreError::InvalidInput {
            message: format!("Could not extract a username from {}", input),
        });
    }

    if input.is_empty() {
        return Err(CoreError::InvalidInput {
            message: "Username is empty".to_string(),
        });
    }
    Ok(input.to_string())
}

const UNNAMED_STEM: &str = "unnamed";
const MAX_HEX_BYTES: usize = 32;

pub fn sanitize_filename(filename: &str) -> String {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    static RUNS: OnceLock<Regex> = OnceLock::new();

    let invalid = INVALID.get_or_init(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("valid pattern"));
    let non_word = NON_WORD.get_or_init(|| Regex::new(r"[^\w\s.-]").expect("valid pattern"));
    let runs = RUNS.get_or_init(|| Regex::new(r"[_\s]+").expect("valid pattern"));

    let sanitized = invalid.replace_all(filename, "_");
    let sanitized = non_word.replace_all(&sanitized, "");
    let sanitized = runs.replace_all(&sanitized, "_");
    let sanitized = sanitized.trim_matches('_');
    if !sanitized.is_empty() {
        return sanitized.to_string();
    }

    // Nothing printable survived; hex-encode the raw bytes so distinct names stay distinct.
    let mut stem = String::from(UNNAMED_STEM);
    if !filename.is_empty() {
        stem.push('_');
        for byte in filename.bytes().take(MAX_HEX_BYTES) {
            stem.push_str(&format!("{:02x}", byte));
        }
    }
    stem
}
