//! Locally synthesized data used when a collaborator fails

use crate::models::practice::{PracticeRecord, Target};

pub const FALLBACK_SUFFIX: &str = "Healthcare Practice";
pub const FALLBACK_ADDRESS: &str = "Address not available";
pub const FALLBACK_SERVICE: &str = "General Healthcare";
pub const FALLBACK_LEAD_SCORE: i64 = 25;
pub const FALLBACK_AGENT_PREFIX: &str = "fallback-agent";

/// Practice record derived only from the target URL
///
/// The name depends on nothing but the hostname, so the same URL always
/// yields the same name.
pub fn fallback_practice(target: &Target) -> PracticeRecord {
    let host = target.hostname().unwrap_or_else(|| "unknown".to_string());

    PracticeRecord {
        name: fallback_name(&host),
        address: FALLBACK_ADDRESS.to_string(),
        services: vec![FALLBACK_SERVICE.to_string()],
        phone: None,
        email: None,
        website: target.url.clone(),
        practice_type: target.practice_type.clone(),
        lead_score: FALLBACK_LEAD_SCORE,
        slug: String::new(),
    }
}

/// "bright-smiles.co.uk" becomes "Bright Smiles Healthcare Practice"
pub fn fallback_name(host: &str) -> String {
    let label = host.split('.').next().unwrap_or(host);
    let words: Vec<String> = label
        .split(|c: char| c == '-' || c == '_')
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect();

    if words.is_empty() {
        format!("Unknown {}", FALLBACK_SUFFIX)
    } else {
        format!("{} {}", words.join(" "), FALLBACK_SUFFIX)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Agent identifier used when the voice-agent provider fails
pub fn fallback_agent_id(timestamp_millis: i64) -> String {
    format!("{}-{}", FALLBACK_AGENT_PREFIX, timestamp_millis)
}
