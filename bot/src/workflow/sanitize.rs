//! Lead sanitization
//!
//! Everything written to the lead database passes through here first: text
//! is stripped of control and invisible characters and capped, contact fields
//! that do not validate are blanked, and the score is clamped.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::lead::{LeadRecord, LeadStatus};
use crate::models::practice::PracticeRecord;

/// Longest text value accepted by the lead database
pub const MAX_FIELD_CHARS: usize = 2000;
pub const MAX_SERVICES: usize = 25;
pub const MAX_SERVICE_CHARS: usize = 100;

const UNKNOWN_NAME: &str = "Unknown Practice";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

static PHONE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+\-(). ]+$").expect("phone pattern is valid"));

/// Build the lead record for a practice
pub fn sanitize_lead(record: &PracticeRecord, agent_id: &str) -> LeadRecord {
    let name = clean_text(&record.name, MAX_FIELD_CHARS);

    LeadRecord {
        name: if name.is_empty() { UNKNOWN_NAME.to_string() } else { name },
        address: clean_text(&record.address, MAX_FIELD_CHARS),
        services: clean_services(&record.services),
        phone: record.phone.as_deref().map(sanitize_phone).unwrap_or_default(),
        email: record.email.as_deref().map(sanitize_email).unwrap_or_default(),
        website: sanitize_url(&record.website),
        practice_type: record
            .practice_type
            .as_deref()
            .map(|t| clean_text(t, MAX_SERVICE_CHARS))
            .unwrap_or_default(),
        lead_score: clamp_score(record.lead_score),
        slug: clean_text(&record.slug, MAX_SERVICE_CHARS),
        agent_id: clean_text(agent_id, MAX_SERVICE_CHARS),
        status: LeadStatus::Pending,
        lead_id: None,
    }
}

/// Strip control and invisible characters, collapse whitespace, cap length
pub fn clean_text(input: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(input.len().min(max_chars * 4));
    let mut last_was_space = true;

    for c in input.chars() {
        let c = if c.is_whitespace() {
            ' '
        } else if c.is_control() || is_invisible(c) {
            continue;
        } else {
            c
        };

        if c == ' ' {
            if last_was_space {
                continue;
            }
            last_was_space = true;
        } else {
            last_was_space = false;
        }
        out.push(c);
    }

    let trimmed = out.trim_end();
    trimmed.chars().take(max_chars).collect::<String>().trim_end().to_string()
}

/// Unicode general category Cf (format characters), plus U+FFFD
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{0890}'..='\u{0891}'
            | '\u{08E2}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{FFFD}'
            | '\u{110BD}'
            | '\u{110CD}'
            | '\u{13430}'..='\u{1343F}'
            | '\u{1BCA0}'..='\u{1BCA3}'
            | '\u{1D173}'..='\u{1D17A}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
    )
}

fn clean_services(services: &[String]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for service in services {
        let service = clean_text(service, MAX_SERVICE_CHARS);
        if service.is_empty() || cleaned.iter().any(|s| s.eq_ignore_ascii_case(&service)) {
            continue;
        }
        cleaned.push(service);
        if cleaned.len() == MAX_SERVICES {
            break;
        }
    }
    cleaned
}

/// Valid email or empty string
pub fn sanitize_email(input: &str) -> String {
    let email = clean_text(input, 254);
    let email = email.strip_prefix("mailto:").unwrap_or(&email).trim();
    if EMAIL_RE.is_match(email) {
        email.to_lowercase()
    } else {
        String::new()
    }
}

/// Valid phone number or empty string
pub fn sanitize_phone(input: &str) -> String {
    let phone = clean_text(input, 40);
    let phone = phone.strip_prefix("tel:").unwrap_or(&phone).trim();
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if PHONE_CHARS_RE.is_match(phone) && (7..=15).contains(&digits) {
        phone.to_string()
    } else {
        String::new()
    }
}

/// Absolute http(s) URL or empty string
pub fn sanitize_url(input: &str) -> String {
    let candidate = clean_text(input, MAX_FIELD_CHARS);
    match url::Url::parse(&candidate) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some() => {
            candidate
        }
        _ => String::new(),
    }
}

pub fn clamp_score(score: i64) -> u8 {
    score.clamp(0, 100) as u8
}
