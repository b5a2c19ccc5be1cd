//! Visitors that attach cross-account pull policies during graph traversal.
//!
//! A reference counts as cross-account when the image URI both matches the
//! ECR pattern (12-digit account segment) and contains the configured
//! image-asset account id as an anchor.

use std::collections::HashMap;
use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;

use berth_core::config::ENV_IMAGE_ASSET_ACCOUNT_ID;
use berth_core::error::{Error, Result};
use berth_core::expr::Expr;

use crate::graph::{ResourceNode, Role};
use crate::policy::PolicyCache;

/// `<12-digit-account>.dkr.ecr.<host>/<repository>:<tag>`; capture group 1 is
/// the repository name up to the tag separator.
static IMAGE_URI_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{12}\.dkr\.ecr\..*/(.*):.*").expect("image uri pattern compiles"));

/// Shared matcher configuration and traversal-scoped policy cache.
#[derive(Debug)]
pub struct AspectContext {
    account_id: String,
    cache: PolicyCache,
}

impl AspectContext {
    pub fn new(image_asset_account_id: impl Into<String>) -> Self {
        Self { account_id: image_asset_account_id.into(), cache: PolicyCache::new() }
    }

    /// Repository name iff `image` references the image-asset account.
    fn cross_account_repository(&self, image: &Expr) -> Option<String> {
        let uri = image.template();
        if !uri.contains(&self.account_id) {
            return None;
        }
        IMAGE_URI_PATTERN
            .captures(uri)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn attach(&mut self, role: &Role, repository_name: &str) {
        let policy = self.cache.policy_for(&self.account_id, repository_name);
        tracing::debug!(role = %role.arn, repo = repository_name, "attached cross-account pull policy");
        role.attach_inline_policy(policy);
    }

    /// Number of distinct repository policies built so far.
    pub fn policy_count(&self) -> usize {
        self.cache.len()
    }
}

/// One specialization of the visitor family, dispatched by resource kind.
pub trait Visit {
    fn visit(&mut self, node: &ResourceNode, ctx: &mut AspectContext);
}

/// Task definitions: the first cross-account container image wins.
#[derive(Debug, Default)]
pub struct TaskDefinitionMatcher;

impl Visit for TaskDefinitionMatcher {
    fn visit(&mut self, node: &ResourceNode, ctx: &mut AspectContext) {
        let ResourceNode::TaskDefinition(task) = node else { return };
        let repo = task
            .containers
            .iter()
            .find_map(|container| ctx.cross_account_repository(&container.image));
        if let Some(repo) = repo {
            ctx.attach(&task.execution_role, &repo);
        }
    }
}

/// Training jobs: single image, direct role handle.
#[derive(Debug, Default)]
pub struct TrainingJobMatcher;

impl Visit for TrainingJobMatcher {
    fn visit(&mut self, node: &ResourceNode, ctx: &mut AspectContext) {
        let ResourceNode::TrainingJob(job) = node else { return };
        if let Some(repo) = ctx.cross_account_repository(&job.training_image) {
            ctx.attach(&job.role, &repo);
        }
    }
}

/// Batch job definitions name their execution role by ARN, and the role node
/// may appear after the job definition. Pending repository names are queued
/// per role ARN and flushed onto the role once it is observed.
#[derive(Debug, Default)]
pub struct BatchJobMatcher {
    pending: HashMap<String, Vec<String>>,
    roles: HashMap<String, Rc<Role>>,
}

impl Visit for BatchJobMatcher {
    fn visit(&mut self, node: &ResourceNode, ctx: &mut AspectContext) {
        match node {
            ResourceNode::BatchJobDefinition(job) => {
                let Some(repo) = ctx.cross_account_repository(&job.image) else { return };
                let Some(arn) = &job.execution_role_arn else { return };
                if let Some(role) = self.roles.get(arn) {
                    let role = Rc::clone(role);
                    ctx.attach(&role, &repo);
                } else {
                    let queue = self.pending.entry(arn.clone()).or_default();
                    if !queue.contains(&repo) {
                        queue.push(repo);
                    }
                }
            }
            ResourceNode::Role(role) => {
                self.roles.insert(role.arn.clone(), Rc::clone(role));
                if let Some(repos) = self.pending.remove(&role.arn) {
                    for repo in repos {
                        ctx.attach(role, &repo);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Runs every specialization against each visited node in a fixed order,
/// tolerating nodes that match none. Owns the traversal-scoped context.
#[derive(Debug)]
pub struct CompositeAspect {
    ctx: AspectContext,
    task: TaskDefinitionMatcher,
    training: TrainingJobMatcher,
    batch: BatchJobMatcher,
}

impl CompositeAspect {
    pub fn new(image_asset_account_id: impl Into<String>) -> Self {
        Self {
            ctx: AspectContext::new(image_asset_account_id),
            task: TaskDefinitionMatcher,
            training: TrainingJobMatcher,
            batch: BatchJobMatcher::default(),
        }
    }

    /// Account id from `BERTH_IMAGE_ASSET_ACCOUNT_ID`.
    pub fn from_env() -> Result<Self> {
        match std::env::var(ENV_IMAGE_ASSET_ACCOUNT_ID) {
            Ok(account) => Ok(Self::new(account)),
            Err(_) => Err(Error::Config(format!(
                "{ENV_IMAGE_ASSET_ACCOUNT_ID} is required when no account id is given"
            ))),
        }
    }

    /// Visit one node of the externally-driven traversal.
    pub fn visit(&mut self, node: &ResourceNode) {
        self.task.visit(node, &mut self.ctx);
        self.training.visit(node, &mut self.ctx);
        self.batch.visit(node, &mut self.ctx);
    }

    /// Number of distinct repository policies built in this traversal.
    pub fn policy_count(&self) -> usize {
        self.ctx.policy_count()
    }
}
