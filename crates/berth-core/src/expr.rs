//! Deploy-time substitution expressions.
//!
//! A location component that still contains `${...}` placeholders after
//! bind-time resolution is wrapped in a substitution expression; the
//! deploying system replaces the remaining placeholders with its own context.
//! Fully resolved components stay plain string literals.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expr {
    /// Fully resolved literal.
    Literal(String),
    /// Serialized as `{"Fn::Sub": "<template>"}`; substituted at deploy time.
    Sub {
        #[serde(rename = "Fn::Sub")]
        template: String,
    },
}

impl Expr {
    /// Wrap `s` in a substitution expression iff placeholders remain.
    pub fn from_template(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.contains("${") {
            Expr::Sub { template: s }
        } else {
            Expr::Literal(s)
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal(_))
    }

    /// The inner string, template or literal.
    pub fn template(&self) -> &str {
        match self {
            Expr::Literal(s) => s,
            Expr::Sub { template } => template,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.template())
    }
}
