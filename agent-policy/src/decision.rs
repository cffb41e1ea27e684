//! The outcome of a single policy evaluation.

/// Binary decision produced by the policy engine for one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    blocked: bool,
    reason: Option<String>,
    rule_name: Option<String>,
}

impl PolicyDecision {
    /// The invocation is permitted.
    #[must_use]
    pub fn permit() -> Self {
        Self {
            blocked: false,
            reason: None,
            rule_name: None,
        }
    }

    /// The invocation is blocked by the named rule, for `reason`.
    #[must_use]
    pub fn block(rule_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            blocked: true,
            reason: Some(reason.into()),
            rule_name: Some(rule_name.into()),
        }
    }

    /// Returns whether the invocation was blocked.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Returns the human-readable reason, when blocked.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Returns the name of the rule that fired, when blocked.
    #[must_use]
    pub fn rule_name(&self) -> Option<&str> {
        self.rule_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permit_carries_no_reason() {
        let decision = PolicyDecision::permit();
        assert!(!decision.is_blocked());
        assert_eq!(decision.reason(), None);
    }

    #[test]
    fn block_carries_rule_and_reason() {
        let decision = PolicyDecision::block("no-secrets", "path touches .env");
        assert!(decision.is_blocked());
        assert_eq!(decision.rule_name(), Some("no-secrets"));
        assert_eq!(decision.reason(), Some("path touches .env"));
    }
}
