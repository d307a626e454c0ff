use std::sync::Arc;

use hyperkit_security::SecurityContext;

/// Decides whether `identity` may perform an operation, optionally on one
/// resource identified by its key.
pub type PermissionFn =
    Arc<dyn Fn(&SecurityContext, Option<&str>) -> anyhow::Result<bool> + Send + Sync>;

/// Wrap a closure as a [`PermissionFn`].
#[must_use]
pub fn permission<F>(evaluate: F) -> PermissionFn
where
    F: Fn(&SecurityContext, Option<&str>) -> anyhow::Result<bool> + Send + Sync + 'static,
{
    Arc::new(evaluate)
}

/// Run an evaluator, treating errors as a denial.
pub(crate) fn is_permitted(
    permission: &PermissionFn,
    identity: &SecurityContext,
    key: Option<&str>,
    operation: &str,
) -> bool {
    match permission(identity, key) {
        Ok(allowed) => allowed,
        Err(e) => {
            tracing::warn!(
                operation,
                key,
                error = %e,
                "permission evaluator failed, denying"
            );
            false
        }
    }
}

/// Permit every caller, anonymous ones included.
#[must_use]
pub fn allow_all() -> PermissionFn {
    permission(|_, _| Ok(true))
}

/// Permit callers whose token grants `scope`.
#[must_use]
pub fn require_scope(scope: &str) -> PermissionFn {
    let scope = scope.to_owned();
    permission(move |identity, _| Ok(identity.has_scope(&scope)))
}

/// Permit authenticated callers holding `role`.
#[must_use]
pub fn require_role(role: &str) -> PermissionFn {
    let role = role.to_owned();
    permission(move |identity, _| Ok(!identity.is_anonymous() && identity.has_role(&role)))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use tracing_test::traced_test;
    use uuid::Uuid;

    use super::*;

    fn editor() -> SecurityContext {
        SecurityContext::builder()
            .subject_id(Uuid::new_v4())
            .role("editor")
            .token_scopes(vec!["people:write".to_owned()])
            .build()
    }

    #[test]
    #[traced_test]
    fn evaluator_error_fails_closed() {
        let failing = permission(|_, _| Err(anyhow::anyhow!("policy store offline")));

        assert!(!is_permitted(&failing, &editor(), Some("7"), "people.update"));
        assert!(logs_contain("permission evaluator failed"));
        assert!(logs_contain("policy store offline"));
    }

    #[test]
    fn scope_and_role_helpers() {
        let anonymous = SecurityContext::anonymous();

        assert!(is_permitted(&require_scope("people:write"), &editor(), None, "op"));
        assert!(!is_permitted(&require_scope("people:admin"), &editor(), None, "op"));
        assert!(is_permitted(&require_role("editor"), &editor(), None, "op"));
        assert!(!is_permitted(&require_role("editor"), &anonymous, None, "op"));
        assert!(is_permitted(&allow_all(), &anonymous, None, "op"));
    }

    #[test]
    fn key_is_passed_through() {
        let only_seven = permission(|_, key| Ok(key == Some("7")));

        assert!(is_permitted(&only_seven, &editor(), Some("7"), "op"));
        assert!(!is_permitted(&only_seven, &editor(), Some("8"), "op"));
        assert!(!is_permitted(&only_seven, &editor(), None, "op"));
    }
}
