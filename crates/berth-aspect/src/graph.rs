//! Materialized resource definitions the policy visitors inspect.
//!
//! The resource graph is owned and traversed by the caller; visitors only
//! mutate the role attached to (or named by) each definition. Roles are
//! shared `Rc` handles with interior mutability for the attached policies.

use std::cell::RefCell;
use std::rc::Rc;

use berth_core::expr::Expr;

use crate::policy::RepositoryPullPolicy;

/// An execution role; policies accumulate as visitors discover cross-account
/// image references.
#[derive(Debug)]
pub struct Role {
    pub arn: String,
    policies: RefCell<Vec<Rc<RepositoryPullPolicy>>>,
}

impl Role {
    pub fn new(arn: impl Into<String>) -> Rc<Self> {
        Rc::new(Self { arn: arn.into(), policies: RefCell::new(Vec::new()) })
    }

    pub fn attach_inline_policy(&self, policy: Rc<RepositoryPullPolicy>) {
        self.policies.borrow_mut().push(policy);
    }

    /// Snapshot of the attached policy handles.
    pub fn policies(&self) -> Vec<Rc<RepositoryPullPolicy>> {
        self.policies.borrow().clone()
    }
}

/// One container inside a task definition. The image may be a literal URI or
/// a deploy-time substitution expression.
#[derive(Debug, Clone)]
pub struct ContainerDefinition {
    pub image: Expr,
}

/// ECS-style task definition with a direct role handle.
#[derive(Debug)]
pub struct TaskDefinition {
    pub containers: Vec<ContainerDefinition>,
    pub execution_role: Rc<Role>,
}

/// Training job driven from a state machine, with a direct role handle.
#[derive(Debug)]
pub struct TrainingJob {
    pub training_image: Expr,
    pub role: Rc<Role>,
}

/// Batch job definition. It names its execution role by ARN only; the role
/// node may be observed later in traversal order.
#[derive(Debug)]
pub struct BatchJobDefinition {
    pub image: Expr,
    pub execution_role_arn: Option<String>,
}

/// One node of the externally-owned resource graph.
#[derive(Debug)]
pub enum ResourceNode {
    TaskDefinition(TaskDefinition),
    TrainingJob(TrainingJob),
    BatchJobDefinition(BatchJobDefinition),
    Role(Rc<Role>),
    /// A node no matcher cares about.
    Other,
}
