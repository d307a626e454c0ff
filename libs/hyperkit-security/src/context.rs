use secrecy::SecretString;
use uuid::Uuid;

/// Token scope granting every capability (first-party callers).
pub const WILDCARD_SCOPE: &str = "*";

/// `SecurityContext` identifies the caller of a request.
///
/// Built by the authentication layer and stored in the request extensions.
/// hyperkit never authenticates anyone itself: it only hands this value to
/// permission evaluators and to handlers that declare it as a capability.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SecurityContext {
    /// Subject ID. The nil UUID marks an anonymous caller.
    subject_id: Uuid,
    /// Subject type classification (e.g., "user", "service").
    subject_type: Option<String>,
    /// Tenant the subject belongs to.
    tenant_id: Uuid,
    /// Role names granted to the subject.
    #[serde(default)]
    roles: Vec<String>,
    /// Token capability restrictions. `["*"]` means unrestricted.
    #[serde(default)]
    token_scopes: Vec<String>,
    /// Original bearer token. Never serialized; `Debug` redacts it.
    #[serde(skip)]
    bearer_token: Option<SecretString>,
}

impl SecurityContext {
    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    /// Identity used for requests that carry no credentials.
    #[must_use]
    pub fn anonymous() -> Self {
        SecurityContextBuilder::default().build()
    }

    #[must_use]
    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    #[must_use]
    pub fn subject_type(&self) -> Option<&str> {
        self.subject_type.as_deref()
    }

    #[must_use]
    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    #[must_use]
    pub fn token_scopes(&self) -> &[String] {
        &self.token_scopes
    }

    #[must_use]
    pub fn bearer_token(&self) -> Option<&SecretString> {
        self.bearer_token.as_ref()
    }

    /// `true` when no subject was authenticated.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.subject_id.is_nil()
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Whether the token grants `scope`.
    ///
    /// An empty scope list grants nothing; the wildcard scope grants everything.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.token_scopes
            .iter()
            .any(|s| s == WILDCARD_SCOPE || s == scope)
    }
}

#[derive(Default)]
pub struct SecurityContextBuilder {
    subject_id: Option<Uuid>,
    subject_type: Option<String>,
    tenant_id: Option<Uuid>,
    roles: Vec<String>,
    token_scopes: Vec<String>,
    bearer_token: Option<SecretString>,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn subject_id(mut self, subject_id: Uuid) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    #[must_use]
    pub fn subject_type(mut self, subject_type: &str) -> Self {
        self.subject_type = Some(subject_type.to_owned());
        self
    }

    #[must_use]
    pub fn tenant_id(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    #[must_use]
    pub fn token_scopes(mut self, scopes: Vec<String>) -> Self {
        self.token_scopes = scopes;
        self
    }

    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<SecretString>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn build(self) -> SecurityContext {
        SecurityContext {
            subject_id: self.subject_id.unwrap_or_default(),
            subject_type: self.subject_type,
            tenant_id: self.tenant_id.unwrap_or_default(),
            roles: self.roles,
            token_scopes: self.token_scopes,
            bearer_token: self.bearer_token,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn anonymous_has_nil_subject_and_no_grants() {
        let ctx = SecurityContext::anonymous();

        assert!(ctx.is_anonymous());
        assert_eq!(ctx.tenant_id(), Uuid::default());
        assert!(ctx.roles().is_empty());
        assert!(!ctx.has_scope("people:write"));
        assert!(ctx.bearer_token().is_none());
    }

    #[test]
    fn builder_sets_every_field() {
        let subject_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();

        let ctx = SecurityContext::builder()
            .subject_id(subject_id)
            .subject_type("user")
            .tenant_id(tenant_id)
            .role("editor")
            .role("viewer")
            .token_scopes(vec!["people:read".to_owned()])
            .bearer_token("token-1".to_owned())
            .build();

        assert!(!ctx.is_anonymous());
        assert_eq!(ctx.subject_id(), subject_id);
        assert_eq!(ctx.subject_type(), Some("user"));
        assert_eq!(ctx.tenant_id(), tenant_id);
        assert!(ctx.has_role("editor"));
        assert!(!ctx.has_role("admin"));
        assert!(ctx.has_scope("people:read"));
        assert!(!ctx.has_scope("people:write"));
        assert_eq!(
            ctx.bearer_token().map(ExposeSecret::expose_secret),
            Some("token-1"),
        );
    }

    #[test]
    fn wildcard_scope_grants_everything() {
        let ctx = SecurityContext::builder()
            .token_scopes(vec![WILDCARD_SCOPE.to_owned()])
            .build();

        assert!(ctx.has_scope("anything"));
    }

    #[test]
    fn bearer_token_is_not_serialized() {
        let original = SecurityContext::builder()
            .subject_id(Uuid::new_v4())
            .role("editor")
            .bearer_token("secret-token".to_owned())
            .build();

        let serialized = serde_json::to_string(&original).unwrap();
        assert!(!serialized.contains("secret-token"));

        let restored: SecurityContext = serde_json::from_str(&serialized).unwrap();
        assert_eq!(restored.subject_id(), original.subject_id());
        assert_eq!(restored.roles(), original.roles());
        assert!(restored.bearer_token().is_none());
    }
}
