//! Deployment strategies, tried in priority order

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::errors::BotError;
use crate::models::deployment::{DeploymentRecord, FileSet, StrategyAttempt};
use crate::models::practice::PracticeRecord;
use crate::providers::{DeployHost, RepoHost, RepoRef, ServiceSource};
use crate::storage::settings::WorkflowSettings;
use crate::workflow::with_timeout;

pub const FULL_REMOTE_DEPLOY: &str = "full-remote-deploy";
pub const EXISTING_TEMPLATE_REUSE: &str = "existing-template-reuse";
pub const DIRECT_SERVICE_CREATE: &str = "direct-service-create";
pub const EMERGENCY_MOCK: &str = "emergency-mock";

/// Everything a strategy needs to deploy one practice demo
#[derive(Debug, Clone)]
pub struct DeployContext {
    pub record: PracticeRecord,
    pub agent_id: String,
    pub files: FileSet,
    pub call_timeout: Duration,
}

impl DeployContext {
    /// Environment passed to deployed services
    pub fn service_env(&self) -> Vec<(String, String)> {
        vec![
            ("PRACTICE_NAME".to_string(), self.record.name.clone()),
            ("PRACTICE_SLUG".to_string(), self.record.slug.clone()),
            ("PRACTICE_WEBSITE".to_string(), self.record.website.clone()),
            ("VOICE_AGENT_ID".to_string(), self.agent_id.clone()),
        ]
    }
}

/// One way of getting a demo online
#[async_trait]
pub trait DeploymentStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn deploy(&self, ctx: &DeployContext) -> Result<DeploymentRecord, BotError>;
}

/// Every strategy failed
#[derive(Debug)]
pub struct ExhaustedDeployment {
    pub attempts: Vec<StrategyAttempt>,
    pub error: BotError,
}

/// Try each strategy in order; the first one that succeeds wins
///
/// The returned record carries every attempt, the winner last.
pub async fn run_strategies(
    strategies: &[Arc<dyn DeploymentStrategy>],
    ctx: &DeployContext,
) -> Result<DeploymentRecord, ExhaustedDeployment> {
    let mut attempts = Vec::with_capacity(strategies.len());
    let mut last_error = "no deployment strategies configured".to_string();

    for strategy in strategies {
        match strategy.deploy(ctx).await {
            Ok(mut record) => {
                info!(
                    "[{}] Deployed with {} at {}",
                    ctx.record.slug,
                    strategy.name(),
                    record.url
                );
                attempts.push(StrategyAttempt {
                    strategy: strategy.name().to_string(),
                    error: None,
                });
                record.method = strategy.name().to_string();
                record.attempts = attempts;
                return Ok(record);
            }
            Err(e) => {
                warn!("[{}] Strategy {} failed: {}", ctx.record.slug, strategy.name(), e);
                last_error = e.to_string();
                attempts.push(StrategyAttempt {
                    strategy: strategy.name().to_string(),
                    error: Some(last_error.clone()),
                });
            }
        }
    }

    Err(ExhaustedDeployment {
        error: BotError::ExhaustedStrategies {
            attempts: attempts.len(),
            last_error,
        },
        attempts,
    })
}

/// Built-in strategy chain
pub fn default_strategies(
    repo_host: Arc<dyn RepoHost>,
    deploy_host: Arc<dyn DeployHost>,
    settings: &WorkflowSettings,
) -> Vec<Arc<dyn DeploymentStrategy>> {
    let mut strategies: Vec<Arc<dyn DeploymentStrategy>> = vec![
        Arc::new(FullRemoteDeploy {
            repo_host,
            deploy_host: deploy_host.clone(),
        }),
        Arc::new(ExistingTemplateReuse {
            deploy_host: deploy_host.clone(),
            shared_repo: settings.shared_template_repo.clone(),
        }),
        Arc::new(DirectServiceCreate {
            deploy_host,
            image: settings.demo_image.clone(),
        }),
    ];

    if settings.enable_mock_deploy {
        strategies.push(Arc::new(EmergencyMock {
            domain: settings.mock_domain.clone(),
        }));
    }

    strategies
}

async fn deploy_service(
    deploy_host: &dyn DeployHost,
    ctx: &DeployContext,
    source: ServiceSource,
) -> Result<(String, String), BotError> {
    let timeout = ctx.call_timeout;
    let project = with_timeout(
        "deploy host",
        timeout,
        deploy_host.create_project(&ctx.record.slug),
    )
    .await?;
    let service = with_timeout(
        "deploy host",
        timeout,
        deploy_host.create_service(&project, source, ctx.service_env()),
    )
    .await?;
    let url = with_timeout("deploy host", timeout, deploy_host.create_domain(&service)).await?;

    if url.trim().is_empty() {
        return Err(BotError::Validation(
            "Deploy host returned an empty domain".to_string(),
        ));
    }

    Ok((service.id, url))
}

/// Create a repository with the rendered files and deploy it
pub struct FullRemoteDeploy {
    pub repo_host: Arc<dyn RepoHost>,
    pub deploy_host: Arc<dyn DeployHost>,
}

#[async_trait]
impl DeploymentStrategy for FullRemoteDeploy {
    fn name(&self) -> &str {
        FULL_REMOTE_DEPLOY
    }

    async fn deploy(&self, ctx: &DeployContext) -> Result<DeploymentRecord, BotError> {
        let repo = with_timeout(
            "repo host",
            ctx.call_timeout,
            self.repo_host.create_repo(&ctx.record.slug, &ctx.files),
        )
        .await?;

        let source = ServiceSource::Repo {
            full_name: repo.full_name(),
            branch: repo.default_branch.clone(),
        };
        let (service_id, url) = deploy_service(self.deploy_host.as_ref(), ctx, source).await?;

        let mut record = DeploymentRecord::deployed(FULL_REMOTE_DEPLOY, url);
        record.repo = Some(repo.full_name());
        record.service_id = Some(service_id);
        Ok(record)
    }
}

/// Deploy a pre-built shared repository, configured through service env
pub struct ExistingTemplateReuse {
    pub deploy_host: Arc<dyn DeployHost>,
    pub shared_repo: Option<String>,
}

#[async_trait]
impl DeploymentStrategy for ExistingTemplateReuse {
    fn name(&self) -> &str {
        EXISTING_TEMPLATE_REUSE
    }

    async fn deploy(&self, ctx: &DeployContext) -> Result<DeploymentRecord, BotError> {
        let shared = self.shared_repo.as_deref().ok_or_else(|| {
            BotError::Validation("No shared template repository configured".to_string())
        })?;
        let repo = RepoRef::parse(shared)?;

        let source = ServiceSource::Repo {
            full_name: repo.full_name(),
            branch: repo.default_branch.clone(),
        };
        let (service_id, url) = deploy_service(self.deploy_host.as_ref(), ctx, source).await?;

        let mut record = DeploymentRecord::deployed(EXISTING_TEMPLATE_REUSE, url);
        record.repo = Some(repo.full_name());
        record.service_id = Some(service_id);
        Ok(record)
    }
}

/// Deploy the demo container image without creating a repository
pub struct DirectServiceCreate {
    pub deploy_host: Arc<dyn DeployHost>,
    pub image: String,
}

#[async_trait]
impl DeploymentStrategy for DirectServiceCreate {
    fn name(&self) -> &str {
        DIRECT_SERVICE_CREATE
    }

    async fn deploy(&self, ctx: &DeployContext) -> Result<DeploymentRecord, BotError> {
        let source = ServiceSource::Image {
            image: self.image.clone(),
        };
        let (service_id, url) = deploy_service(self.deploy_host.as_ref(), ctx, source).await?;

        let mut record = DeploymentRecord::deployed(DIRECT_SERVICE_CREATE, url);
        record.service_id = Some(service_id);
        Ok(record)
    }
}

/// Fabricate a plausible URL; nothing is deployed
pub struct EmergencyMock {
    pub domain: String,
}

#[async_trait]
impl DeploymentStrategy for EmergencyMock {
    fn name(&self) -> &str {
        EMERGENCY_MOCK
    }

    async fn deploy(&self, ctx: &DeployContext) -> Result<DeploymentRecord, BotError> {
        let url = format!("https://{}.{}", ctx.record.slug, self.domain.trim_matches('.'));
        let mut record = DeploymentRecord::deployed(EMERGENCY_MOCK, url);
        record.is_mock = true;
        Ok(record)
    }
}
