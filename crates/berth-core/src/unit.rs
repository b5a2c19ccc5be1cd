//! The deployable unit an engine instance is bound to.

use serde::{Deserialize, Serialize};

use crate::placeholder;

/// Environment coordinates of a unit. `None` means the value is not known at
/// compile time and must be resolved by the deploying system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitEnv {
    pub account: Option<String>,
    pub region: Option<String>,
    pub url_suffix: Option<String>,
}

impl UnitEnv {
    /// An environment with literal account and region.
    pub fn resolved(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            region: Some(region.into()),
            url_suffix: None,
        }
    }

    /// Literal account if known, else the account placeholder token.
    pub fn account_or_placeholder(&self) -> &str {
        self.account.as_deref().unwrap_or(placeholder::ACCOUNT_ID)
    }

    /// Literal region if known, else the region placeholder token.
    pub fn region_or_placeholder(&self) -> &str {
        self.region.as_deref().unwrap_or(placeholder::REGION)
    }

    /// Literal URL suffix if known, else the URL-suffix placeholder token.
    pub fn url_suffix_or_placeholder(&self) -> &str {
        self.url_suffix.as_deref().unwrap_or(placeholder::URL_SUFFIX)
    }

    /// `<account>-<region>` label keying single-environment destinations,
    /// using `current_account`/`current_region` when a value is deferred.
    pub fn manifest_key(&self) -> String {
        format!(
            "{}-{}",
            self.account.as_deref().unwrap_or(placeholder::CURRENT_ACCOUNT),
            self.region.as_deref().unwrap_or(placeholder::CURRENT_REGION),
        )
    }
}

/// One compiled infrastructure template plus its artifacts; bound to exactly
/// one engine instance.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployUnit {
    pub id: String,
    pub env: UnitEnv,
    /// Compiled template body, written verbatim at finalize.
    pub template: serde_json::Value,
}

impl DeployUnit {
    pub fn new(id: impl Into<String>, env: UnitEnv, template: serde_json::Value) -> Self {
        Self { id: id.into(), env, template }
    }

    /// File name the compiled template is written under, also used as the
    /// template's manifest key.
    pub fn template_file(&self) -> String {
        format!("{}.template.json", self.id)
    }
}
