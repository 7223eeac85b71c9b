//! Fake collaborators shared by the unit tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use leadbot::errors::BotError;
use leadbot::models::deployment::DeploymentRecord;
use leadbot::models::lead::LeadRecord;
use leadbot::models::practice::{DiscoveryQuery, PracticeRecord, Target};
use leadbot::providers::{ChatTransport, ChatUpdate, Discoverer, LeadStore, Scraper, VoiceAgentProvider};
use leadbot::workflow::batch::BatchLimiter;
use leadbot::workflow::controller::{Collaborators, ControllerOptions, WorkflowController};
use leadbot::workflow::runner::WorkflowRunner;
use leadbot::workflow::strategy::{DeployContext, DeploymentStrategy};

/// Practice record as a healthy scraper would return it
pub fn practice(name: &str, website: &str) -> PracticeRecord {
    PracticeRecord {
        name: name.to_string(),
        address: "100 Congress Ave, Austin, TX".to_string(),
        services: vec!["Cleanings".to_string(), "Implants".to_string()],
        phone: Some("(512) 555-0100".to_string()),
        email: Some("hello@brightsmiles.com".to_string()),
        website: website.to_string(),
        practice_type: Some("dentist".to_string()),
        lead_score: 80,
        slug: String::new(),
    }
}

// ================================== GAUGE ======================================= //

/// Tracks how many calls are running at once
#[derive(Default)]
pub struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

pub struct GaugeGuard<'a>(&'a Gauge);

impl Gauge {
    pub fn enter(&self) -> GaugeGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        GaugeGuard(self)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Drop for GaugeGuard<'_> {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

// ================================= SCRAPER ====================================== //

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScrapeBehavior {
    Ok,
    Fail,
    EmptyName,
}

pub struct FakeScraper {
    behavior: ScrapeBehavior,
    delay: Duration,
    pub gauge: Arc<Gauge>,
    pub calls: AtomicUsize,
}

impl FakeScraper {
    fn with_behavior(behavior: ScrapeBehavior) -> Self {
        Self {
            behavior,
            delay: Duration::ZERO,
            gauge: Arc::new(Gauge::default()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Names each practice after its hostname
    pub fn ok() -> Self {
        Self::with_behavior(ScrapeBehavior::Ok)
    }

    pub fn failing() -> Self {
        Self::with_behavior(ScrapeBehavior::Fail)
    }

    pub fn empty_name() -> Self {
        Self::with_behavior(ScrapeBehavior::EmptyName)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Scraper for FakeScraper {
    async fn scrape(&self, target: &Target) -> Result<PracticeRecord, BotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _running = self.gauge.enter();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.behavior {
            ScrapeBehavior::Fail => Err(BotError::remote("scraper", "connection refused")),
            ScrapeBehavior::EmptyName => Ok(practice("  ", &target.url)),
            ScrapeBehavior::Ok => {
                let host = target.hostname().unwrap_or_default();
                Ok(practice(&format!("Practice {}", host), &target.url))
            }
        }
    }
}

// ============================== VOICE AND LEADS ================================= //

pub struct FakeVoice {
    outcome: Result<String, String>,
    pub slugs: Mutex<Vec<String>>,
}

impl FakeVoice {
    pub fn ok(agent_id: &str) -> Self {
        Self {
            outcome: Ok(agent_id.to_string()),
            slugs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: Err("503 Service Unavailable".to_string()),
            slugs: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VoiceAgentProvider for FakeVoice {
    async fn create_agent(&self, record: &PracticeRecord) -> Result<String, BotError> {
        self.slugs.lock().unwrap().push(record.slug.clone());
        self.outcome
            .clone()
            .map_err(|e| BotError::remote("voice provider", e))
    }
}

pub struct FakeLeads {
    outcome: Result<String, String>,
    pub stored: Mutex<Vec<LeadRecord>>,
}

impl FakeLeads {
    pub fn ok(lead_id: &str) -> Self {
        Self {
            outcome: Ok(lead_id.to_string()),
            stored: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: Err("401 Unauthorized".to_string()),
            stored: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LeadStore for FakeLeads {
    async fn store_lead(&self, lead: &LeadRecord) -> Result<String, BotError> {
        self.stored.lock().unwrap().push(lead.clone());
        self.outcome
            .clone()
            .map_err(|e| BotError::remote("lead database", e))
    }
}

// ================================ STRATEGIES ==================================== //

pub struct FakeStrategy {
    name: String,
    outcome: Result<String, String>,
    mock: bool,
    pub calls: AtomicUsize,
    pub agent_ids: Mutex<Vec<String>>,
}

impl FakeStrategy {
    pub fn ok(name: &str, url: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            outcome: Ok(url.to_string()),
            mock: false,
            calls: AtomicUsize::new(0),
            agent_ids: Mutex::new(Vec::new()),
        })
    }

    pub fn mock(name: &str, url: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            outcome: Ok(url.to_string()),
            mock: true,
            calls: AtomicUsize::new(0),
            agent_ids: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(name: &str, error: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            outcome: Err(error.to_string()),
            mock: false,
            calls: AtomicUsize::new(0),
            agent_ids: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeploymentStrategy for FakeStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deploy(&self, ctx: &DeployContext) -> Result<DeploymentRecord, BotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.agent_ids.lock().unwrap().push(ctx.agent_id.clone());
        match &self.outcome {
            Ok(url) => {
                let mut record = DeploymentRecord::deployed(&self.name, url.clone());
                record.is_mock = self.mock;
                Ok(record)
            }
            Err(e) => Err(BotError::remote(&self.name, e.clone())),
        }
    }
}

// ============================ DISCOVERY AND CHAT ================================ //

pub struct FakeDiscoverer {
    urls: Vec<String>,
    pub queries: Mutex<Vec<DiscoveryQuery>>,
}

impl FakeDiscoverer {
    pub fn new(urls: &[&str]) -> Self {
        Self {
            urls: urls.iter().map(|u| u.to_string()).collect(),
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Discoverer for FakeDiscoverer {
    async fn discover(&self, query: &DiscoveryQuery) -> Result<Vec<String>, BotError> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.urls.clone())
    }
}

/// Serves queued poll results, then empty polls
#[derive(Default)]
pub struct FakeChat {
    polls: Mutex<VecDeque<Result<Vec<ChatUpdate>, String>>>,
    pub offsets: Mutex<Vec<i64>>,
    pub sent: Mutex<Vec<(i64, String)>>,
}

impl FakeChat {
    pub fn with_polls(polls: Vec<Result<Vec<ChatUpdate>, String>>) -> Self {
        Self {
            polls: Mutex::new(polls.into()),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for FakeChat {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn get_updates(&self, offset: i64, _timeout_secs: u64) -> Result<Vec<ChatUpdate>, BotError> {
        self.offsets.lock().unwrap().push(offset);
        let next = self.polls.lock().unwrap().pop_front();
        match next {
            Some(Ok(updates)) => Ok(updates),
            Some(Err(e)) => Err(BotError::remote("chat transport", e)),
            None => {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(Vec::new())
            }
        }
    }
}

pub fn update(update_id: i64, chat_id: i64, text: &str) -> ChatUpdate {
    ChatUpdate {
        update_id,
        chat_id,
        text: text.to_string(),
    }
}

// ================================= BUILDERS ===================================== //

pub fn collaborators(
    scraper: Arc<FakeScraper>,
    voice: Arc<FakeVoice>,
    leads: Arc<FakeLeads>,
    strategies: &[Arc<FakeStrategy>],
) -> Collaborators {
    Collaborators {
        scraper,
        voice,
        leads,
        strategies: strategies
            .iter()
            .map(|s| s.clone() as Arc<dyn DeploymentStrategy>)
            .collect(),
    }
}

pub fn controller(collaborators: Collaborators) -> WorkflowController {
    WorkflowController::new(collaborators, ControllerOptions::default())
}

/// Controller where every collaborator succeeds
pub fn healthy_controller() -> WorkflowController {
    controller(collaborators(
        Arc::new(FakeScraper::ok()),
        Arc::new(FakeVoice::ok("agent-123")),
        Arc::new(FakeLeads::ok("lead-456")),
        &[FakeStrategy::ok("full-remote-deploy", "https://demo.example.app")],
    ))
}

pub fn runner(controller: WorkflowController, concurrency_limit: usize) -> WorkflowRunner {
    WorkflowRunner::new(controller, BatchLimiter::new(concurrency_limit, Duration::ZERO))
}
