//! Placeholder tokens and their bind-time resolution.
//!
//! Configured strings may carry environment placeholders. At bind time we
//! substitute the account and region tokens when the bound unit knows the
//! literal values; unknown tokens are left in place for the deploying system
//! to resolve. The partition token is never substituted: no literal partition
//! value is ever available to this engine.

use crate::unit::UnitEnv;

/// `${AWS::AccountId}` token.
pub const ACCOUNT_ID: &str = "${AWS::AccountId}";
/// `${AWS::Region}` token.
pub const REGION: &str = "${AWS::Region}";
/// `${AWS::Partition}` token.
pub const PARTITION: &str = "${AWS::Partition}";
/// `${AWS::URLSuffix}` token.
pub const URL_SUFFIX: &str = "${AWS::URLSuffix}";

/// Fallback labels keying a destination when the bound unit's environment is
/// not known at compile time.
pub const CURRENT_ACCOUNT: &str = "current_account";
pub const CURRENT_REGION: &str = "current_region";

/// Substitute the account and region placeholders with the literal values
/// known for the bound unit; leave unknown placeholders intact.
pub fn specialize(raw: &str, env: &UnitEnv) -> String {
    let mut out = raw.to_string();
    if let Some(account) = env.account.as_deref() {
        out = replace_all(&out, ACCOUNT_ID, account);
    }
    if let Some(region) = env.region.as_deref() {
        out = replace_all(&out, REGION, region);
    }
    out
}

/// `specialize` lifted over optional configuration fields.
pub fn specialize_opt(raw: Option<&str>, env: &UnitEnv) -> Option<String> {
    raw.map(|s| specialize(s, env))
}

/// Whole-string replace-all that does not require escaping the needle into a
/// regex. Used when expanding a region-templated bucket name across an
/// explicit region set.
pub fn replace_all(s: &str, search: &str, replace: &str) -> String {
    s.split(search).collect::<Vec<_>>().join(replace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specialize_substitutes_known_values_only() {
        let env = UnitEnv {
            account: Some("123456789012".to_string()),
            region: None,
            url_suffix: None,
        };
        let out = specialize("b-${AWS::AccountId}-${AWS::Region}-${AWS::Partition}", &env);
        assert_eq!(out, "b-123456789012-${AWS::Region}-${AWS::Partition}");
    }

    #[test]
    fn partition_is_never_substituted() {
        let env = UnitEnv {
            account: Some("123456789012".to_string()),
            region: Some("us-east-1".to_string()),
            url_suffix: Some("amazonaws.com".to_string()),
        };
        assert_eq!(specialize(PARTITION, &env), PARTITION);
    }

    #[test]
    fn replace_all_hits_every_occurrence() {
        assert_eq!(replace_all("a-${X}-${X}", "${X}", "r"), "a-r-r");
    }
}
