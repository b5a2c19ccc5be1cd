//! Least-privilege pull policies for cross-account image repositories.

use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;

use berth_core::placeholder;

/// The three read actions an image pull needs, nothing more.
const PULL_ACTIONS: [&str; 3] = [
    "ecr:BatchCheckLayerAvailability",
    "ecr:GetDownloadUrlForLayer",
    "ecr:BatchGetImage",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyStatement {
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

/// Inline policy attached to an execution role, scoped to one repository in
/// the image account. Within one traversal there is exactly one policy object
/// per repository name, shared by reference.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryPullPolicy {
    pub repository_name: String,
    pub statements: Vec<PolicyStatement>,
}

impl RepositoryPullPolicy {
    fn new(account: &str, repository_name: &str) -> Self {
        // Partition and region stay placeholder tokens; only the account is
        // known (it is the configured image-asset account).
        let resource = format!(
            "arn:{}:ecr:{}:{}:repository/{}",
            placeholder::PARTITION,
            placeholder::REGION,
            account,
            repository_name,
        );
        Self {
            repository_name: repository_name.to_string(),
            statements: vec![PolicyStatement {
                actions: PULL_ACTIONS.iter().map(|a| a.to_string()).collect(),
                resources: vec![resource],
            }],
        }
    }
}

/// Traversal-scoped cache: one shared policy per repository name.
#[derive(Debug, Default)]
pub struct PolicyCache {
    policies: HashMap<String, Rc<RepositoryPullPolicy>>,
}

impl PolicyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or build the shared policy for `repository_name`. Two callers
    /// asking for the same name get the identical object, not a copy.
    pub fn policy_for(&mut self, account: &str, repository_name: &str) -> Rc<RepositoryPullPolicy> {
        if let Some(policy) = self.policies.get(repository_name) {
            return Rc::clone(policy);
        }
        let policy = Rc::new(RepositoryPullPolicy::new(account, repository_name));
        self.policies
            .insert(repository_name.to_string(), Rc::clone(&policy));
        policy
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
