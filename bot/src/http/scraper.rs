//! Practice website scraper
//!
//! Fetches the landing page and extracts practice data from:
//! - OpenGraph site name, title tag and first heading
//! - `tel:` and `mailto:` links, falling back to text patterns
//! - `address` elements and schema.org street addresses
//! - Service keywords found in the page text

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::errors::BotError;
use crate::models::practice::{PracticeRecord, Target};
use crate::providers::Scraper;
use crate::storage::settings::ScraperSettings;

const SERVICE: &str = "scraper";

static OG_SITE_NAME: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:site_name"]"#).expect("valid selector"));
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("valid selector"));
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("valid selector"));
static TEL_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href^="tel:"]"#).expect("valid selector"));
static MAILTO_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href^="mailto:"]"#).expect("valid selector"));
static ADDRESS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"[itemprop="streetAddress"], address"#).expect("valid selector")
});
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("valid selector"));

static PHONE_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(?\b\d{3}\)?[\s.\-]\d{3}[\s.\-]\d{4}\b").expect("phone pattern is valid")
});
static EMAIL_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("email pattern is valid")
});
static STREET_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b\d{1,6}\s+(?:[A-Z][a-z]+\s){1,4}(?:St|Street|Ave|Avenue|Rd|Road|Blvd|Boulevard|Dr|Drive|Ln|Lane|Way|Ct|Court|Pkwy|Suite)\b\.?(?:[^<\n]{0,60}?\b\d{5}\b)?",
    )
    .expect("street pattern is valid")
});
static TITLE_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+[|\-–—:]\s+").expect("separator pattern is valid"));

/// Service labels recognized in page text, lowercase keyword first
const SERVICE_KEYWORDS: &[(&str, &str)] = &[
    ("cleaning", "Cleanings"),
    ("whitening", "Teeth Whitening"),
    ("implant", "Dental Implants"),
    ("orthodont", "Orthodontics"),
    ("invisalign", "Invisalign"),
    ("root canal", "Root Canal Therapy"),
    ("crown", "Crowns"),
    ("emergency", "Emergency Care"),
    ("physical therapy", "Physical Therapy"),
    ("chiropractic", "Chiropractic Care"),
    ("massage", "Massage Therapy"),
    ("acupuncture", "Acupuncture"),
    ("dermatolog", "Dermatology"),
    ("botox", "Botox"),
    ("pediatric", "Pediatric Care"),
    ("vaccin", "Vaccinations"),
    ("eye exam", "Eye Exams"),
    ("telehealth", "Telehealth"),
];

/// Practice types guessed from page text, checked in order
const PRACTICE_TYPES: &[(&str, &str)] = &[
    ("dental", "dentist"),
    ("dentist", "dentist"),
    ("orthodont", "orthodontist"),
    ("chiropract", "chiropractor"),
    ("physical therapy", "physical therapy"),
    ("dermatolog", "dermatologist"),
    ("optometr", "optometrist"),
    ("veterinar", "veterinarian"),
    ("medical spa", "med spa"),
];

const BOOKING_HINTS: &[&str] = &["book online", "book an appointment", "schedule online", "request an appointment"];

pub struct HtmlScraper {
    client: reqwest::Client,
}

impl HtmlScraper {
    pub fn new(settings: &ScraperSettings) -> Result<Self, BotError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .user_agent(settings.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }

    async fn fetch_page(&self, url: &str) -> Result<String, BotError> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::remote(
                SERVICE,
                format!("Non-success status {} for {}", status, url),
            ));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl Scraper for HtmlScraper {
    async fn scrape(&self, target: &Target) -> Result<PracticeRecord, BotError> {
        let html = self.fetch_page(&target.url).await?;
        let record = extract_practice(&html, target);
        if record.name.is_empty() {
            return Err(BotError::Validation(format!(
                "No practice name found on {}",
                target.url
            )));
        }
        Ok(record)
    }
}

/// Extract practice data from a landing page
pub fn extract_practice(html: &str, target: &Target) -> PracticeRecord {
    let document = Html::parse_document(html);
    let text = page_text(&document);
    let lower = text.to_lowercase();

    let name = extract_name(&document);
    let phone = first_link_value(&document, &TEL_LINK, "tel:")
        .or_else(|| PHONE_TEXT.find(&text).map(|m| m.as_str().to_string()));
    let email = first_link_value(&document, &MAILTO_LINK, "mailto:")
        .map(|e| e.split('?').next().unwrap_or_default().to_string())
        .or_else(|| EMAIL_TEXT.find(&text).map(|m| m.as_str().to_string()));
    let address = extract_address(&document, &text);

    let services: Vec<String> = SERVICE_KEYWORDS
        .iter()
        .filter(|(keyword, _)| lower.contains(keyword))
        .map(|(_, label)| label.to_string())
        .collect();

    let practice_type = target.practice_type.clone().or_else(|| {
        PRACTICE_TYPES
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, kind)| kind.to_string())
    });

    let has_booking = BOOKING_HINTS.iter().any(|hint| lower.contains(hint));
    let lead_score = score(
        phone.is_some(),
        email.is_some(),
        address.is_some(),
        services.len(),
        has_booking,
    );

    PracticeRecord {
        name,
        address: address
            .or_else(|| target.location.clone())
            .unwrap_or_default(),
        services,
        phone,
        email,
        website: target.url.clone(),
        practice_type,
        lead_score,
        slug: String::new(),
    }
}

/// Practices that lack contact details or online booking score higher
fn score(phone: bool, email: bool, address: bool, services: usize, booking: bool) -> i64 {
    let mut score = 40;
    if phone {
        score += 10;
    }
    if email {
        score += 10;
    }
    if address {
        score += 5;
    }
    score += (services as i64 * 3).min(15);
    if !booking {
        score += 20;
    }
    score
}

fn extract_name(document: &Html) -> String {
    let og = document
        .select(&OG_SITE_NAME)
        .filter_map(|el| el.value().attr("content"))
        .map(normalize_whitespace)
        .find(|s| !s.is_empty());
    if let Some(name) = og {
        return name;
    }

    let title = document
        .select(&TITLE)
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .find(|s| !s.is_empty())
        .and_then(|title| {
            TITLE_SEPARATORS
                .split(&title)
                .map(str::trim)
                .find(|part| !part.is_empty() && !part.eq_ignore_ascii_case("home"))
                .map(str::to_string)
        });
    if let Some(name) = title {
        return name;
    }

    document
        .select(&H1)
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn first_link_value(document: &Html, selector: &Selector, prefix: &str) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr("href"))
        .map(|href| href.trim_start_matches(prefix).trim().to_string())
        .find(|value| !value.is_empty())
}

fn extract_address(document: &Html, text: &str) -> Option<String> {
    document
        .select(&ADDRESS)
        .map(|el| normalize_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .find(|s| !s.is_empty())
        .or_else(|| STREET_TEXT.find(text).map(|m| normalize_whitespace(m.as_str())))
}

fn page_text(document: &Html) -> String {
    document
        .select(&BODY)
        .next()
        .map(|body| body.text().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
