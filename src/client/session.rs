use std::path::PathBuf;

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::dto::SignupRequest;
use crate::auth::repo_types::Role;
use crate::client::http::{ApiClient, ClientError};
use crate::matching::dto::MatchingRequestView;
use crate::matching::repo_types::Decision;
use crate::mentors::dto::MentorListItem;
use crate::users::dto::{UpdateProfileRequest, UserProfile};
use crate::users::services::validate_image;

/// Where the bearer token survives between runs.
pub trait TokenStore: Send {
    fn load(&self) -> Option<String>;
    fn save(&mut self, token: &str);
    fn clear(&mut self);
}

/// Token persisted as a plain file, the desktop equivalent of browser
/// local storage.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn save(&mut self, token: &str) {
        if let Err(e) = std::fs::write(&self.path, token) {
            warn!(error = %e, path = %self.path.display(), "failed to persist token");
        }
    }

    fn clear(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, path = %self.path.display(), "failed to clear token");
            }
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryTokenStore(Option<String>);

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.0.clone()
    }

    fn save(&mut self, token: &str) {
        self.0 = Some(token.to_string());
    }

    fn clear(&mut self) {
        self.0 = None;
    }
}

/// The authenticated actor's state, passed explicitly to every view. Holds
/// the last server-confirmed truth; every mutation re-fetches before the
/// view sees anything, so displayed state never runs ahead of the server.
pub struct SessionContext {
    api: ApiClient,
    store: Box<dyn TokenStore>,
    user: Option<UserProfile>,
    requests: Vec<MatchingRequestView>,
    in_flight: bool,
}

impl SessionContext {
    pub fn new(api: ApiClient, store: Box<dyn TokenStore>) -> Self {
        Self {
            api,
            store,
            user: None,
            requests: Vec::new(),
            in_flight: false,
        }
    }

    /// Resume from a persisted token. Any failure discards the token and
    /// starts unauthenticated; the user just logs in again.
    pub async fn init(api: ApiClient, store: Box<dyn TokenStore>) -> Self {
        let mut ctx = Self::new(api, store);
        if let Some(token) = ctx.store.load() {
            ctx.api.set_token(token);
            match ctx.api.me().await {
                Ok(user) => {
                    info!(user_id = %user.id, "session resumed");
                    ctx.user = Some(user);
                }
                Err(e) => {
                    warn!(error = %e, "stored token rejected, starting unauthenticated");
                    ctx.api.clear_token();
                    ctx.store.clear();
                }
            }
        }
        ctx
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn requests(&self) -> &[MatchingRequestView] {
        &self.requests
    }

    /// Mentees browse the directory and send/withdraw requests.
    pub fn can_browse_mentors(&self) -> bool {
        match self.user.as_ref().map(|u| u.role()) {
            Some(Role::Mentee) => true,
            Some(Role::Mentor) | None => false,
        }
    }

    /// Mentors decide on incoming requests.
    pub fn can_decide_requests(&self) -> bool {
        match self.user.as_ref().map(|u| u.role()) {
            Some(Role::Mentor) => true,
            Some(Role::Mentee) | None => false,
        }
    }

    /// One mutation at a time; the triggering control stays disabled until
    /// the previous call resolves.
    fn begin_mutation(&mut self) -> Result<(), ClientError> {
        if self.in_flight {
            return Err(ClientError::Busy);
        }
        self.in_flight = true;
        Ok(())
    }

    fn require_auth(&self) -> Result<(), ClientError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }

    pub async fn signup(&mut self, body: SignupRequest) -> Result<UserProfile, ClientError> {
        self.begin_mutation()?;
        let result = self.api.signup(&body).await;
        self.in_flight = false;
        result
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        self.begin_mutation()?;
        let result = self.login_inner(email, password).await;
        self.in_flight = false;
        result
    }

    async fn login_inner(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        let token = self.api.login(email, password).await?;
        self.api.set_token(token.as_str());
        match self.api.me().await {
            Ok(user) => {
                self.store.save(&token);
                info!(user_id = %user.id, "logged in");
                self.user = Some(user);
                Ok(())
            }
            Err(e) => {
                self.api.clear_token();
                Err(e)
            }
        }
    }

    /// Purely client-side: discard the token and cached state.
    pub fn logout(&mut self) {
        self.api.clear_token();
        self.store.clear();
        self.user = None;
        self.requests.clear();
        info!("logged out");
    }

    pub async fn update_profile(
        &mut self,
        update: UpdateProfileRequest,
    ) -> Result<(), ClientError> {
        self.begin_mutation()?;
        let result = self.update_profile_inner(update).await;
        self.in_flight = false;
        result
    }

    async fn update_profile_inner(
        &mut self,
        update: UpdateProfileRequest,
    ) -> Result<(), ClientError> {
        self.require_auth()?;
        self.api.update_profile(&update).await?;
        // Confirmation fetch; the mutation response is not trusted as the
        // new local truth.
        self.user = Some(self.api.me().await?);
        Ok(())
    }

    pub async fn upload_profile_image(
        &mut self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ClientError> {
        self.begin_mutation()?;
        let result = self.upload_profile_image_inner(bytes, content_type).await;
        self.in_flight = false;
        result
    }

    async fn upload_profile_image_inner(
        &mut self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ClientError> {
        self.require_auth()?;
        // Mirror of the server-side check for a fast local error; the server
        // re-validates regardless.
        validate_image(content_type, bytes.len()).map_err(|e| ClientError::Api {
            kind: e.kind().to_string(),
            detail: e.to_string(),
        })?;
        self.api.upload_avatar(bytes, content_type).await?;
        self.user = Some(self.api.me().await?);
        Ok(())
    }

    pub async fn list_mentors(
        &self,
        search: Option<&str>,
        tech_stack: Option<&str>,
        sort_by: Option<&str>,
    ) -> Result<Vec<MentorListItem>, ClientError> {
        self.require_auth()?;
        self.api.list_mentors(search, tech_stack, sort_by).await
    }

    /// Re-fetch the actor's request list; the cache only changes on success.
    pub async fn refresh_requests(&mut self) -> Result<(), ClientError> {
        self.require_auth()?;
        let requests = self.api.matching_requests().await?;
        self.requests = requests;
        Ok(())
    }

    pub async fn send_request(
        &mut self,
        mentor_id: Uuid,
        message: Option<&str>,
    ) -> Result<(), ClientError> {
        self.begin_mutation()?;
        let result = self.send_request_inner(mentor_id, message).await;
        self.in_flight = false;
        result
    }

    async fn send_request_inner(
        &mut self,
        mentor_id: Uuid,
        message: Option<&str>,
    ) -> Result<(), ClientError> {
        self.require_auth()?;
        self.api.create_matching_request(mentor_id, message).await?;
        self.refresh_requests().await
    }

    pub async fn decide_request(
        &mut self,
        request_id: Uuid,
        decision: Decision,
    ) -> Result<(), ClientError> {
        self.begin_mutation()?;
        let result = self.decide_request_inner(request_id, decision).await;
        self.in_flight = false;
        result
    }

    async fn decide_request_inner(
        &mut self,
        request_id: Uuid,
        decision: Decision,
    ) -> Result<(), ClientError> {
        self.require_auth()?;
        self.api.decide_matching_request(request_id, decision).await?;
        self.refresh_requests().await
    }

    pub async fn withdraw_request(&mut self, request_id: Uuid) -> Result<(), ClientError> {
        self.begin_mutation()?;
        let result = self.withdraw_request_inner(request_id).await;
        self.in_flight = false;
        result
    }

    async fn withdraw_request_inner(&mut self, request_id: Uuid) -> Result<(), ClientError> {
        self.require_auth()?;
        self.api.withdraw_matching_request(request_id).await?;
        self.refresh_requests().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::dto::RoleAttributes;
    use time::OffsetDateTime;

    fn ctx() -> SessionContext {
        SessionContext::new(
            ApiClient::new("http://localhost:8080"),
            Box::<MemoryTokenStore>::default(),
        )
    }

    fn profile(role: Role) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            email: "u@example.com".into(),
            name: "U".into(),
            bio: None,
            attributes: match role {
                Role::Mentor => RoleAttributes::Mentor { tech_stack: vec![] },
                Role::Mentee => RoleAttributes::Mentee { interests: vec![] },
            },
            avatar_url: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn memory_token_store_roundtrip() {
        let mut store = MemoryTokenStore::default();
        assert!(store.load().is_none());
        store.save("tok");
        assert_eq!(store.load().as_deref(), Some("tok"));
        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn file_token_store_roundtrip() {
        let path = std::env::temp_dir().join(format!("mentormatch-token-{}", Uuid::new_v4()));
        let mut store = FileTokenStore::new(&path);
        assert!(store.load().is_none());
        store.save("tok");
        assert_eq!(store.load().as_deref(), Some("tok"));
        store.clear();
        assert!(store.load().is_none());
        // clearing twice is fine
        store.clear();
    }

    #[test]
    fn second_mutation_is_rejected_while_one_is_in_flight() {
        let mut ctx = ctx();
        ctx.begin_mutation().expect("first mutation starts");
        let err = ctx.begin_mutation().unwrap_err();
        assert!(matches!(err, ClientError::Busy));
        ctx.in_flight = false;
        assert!(ctx.begin_mutation().is_ok());
    }

    #[test]
    fn capabilities_follow_role() {
        let mut ctx = ctx();
        assert!(!ctx.can_browse_mentors());
        assert!(!ctx.can_decide_requests());

        ctx.user = Some(profile(Role::Mentee));
        assert!(ctx.can_browse_mentors());
        assert!(!ctx.can_decide_requests());

        ctx.user = Some(profile(Role::Mentor));
        assert!(!ctx.can_browse_mentors());
        assert!(ctx.can_decide_requests());
    }

    #[test]
    fn logout_clears_everything() {
        let mut ctx = ctx();
        ctx.api.set_token("tok");
        ctx.store.save("tok");
        ctx.user = Some(profile(Role::Mentee));
        ctx.logout();
        assert!(!ctx.is_authenticated());
        assert!(ctx.store.load().is_none());
        assert!(!ctx.api.has_token());
        assert!(ctx.requests().is_empty());
    }

    #[tokio::test]
    async fn reads_require_authentication() {
        let ctx = ctx();
        let err = ctx.list_mentors(None, None, None).await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }

    #[tokio::test]
    async fn local_image_check_mirrors_server_rules() {
        let mut ctx = ctx();
        ctx.user = Some(profile(Role::Mentee));
        let err = ctx
            .upload_profile_image(vec![0u8; 16], "image/gif")
            .await
            .unwrap_err();
        match err {
            ClientError::Api { kind, .. } => assert_eq!(kind, "validation_error"),
            other => panic!("unexpected error: {other:?}"),
        }
        // guard released after the failed attempt
        assert!(ctx.begin_mutation().is_ok());
    }
}
