use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::auth::dto::{LoginRequest, LoginResponse, SignupRequest};
use crate::error::ErrorBody;
use crate::matching::dto::{CreateRequestBody, DecideRequestBody, MatchingRequestView};
use crate::matching::repo_types::Decision;
use crate::mentors::dto::MentorListItem;
use crate::users::dto::{UpdateProfileRequest, UserProfile};

/// Client-side failure taxonomy. Server rejections keep their wire kind;
/// transport loss is a separate, retryable case the user re-triggers by hand.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{detail}")]
    Api { kind: String, detail: String },
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("another action is still in progress")]
    Busy,
    #[error("not signed in")]
    NotAuthenticated,
}

impl ClientError {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ClientError::Api { kind, .. } if kind == "unauthenticated")
    }

    /// Only transport loss is worth re-trying as-is; every API rejection
    /// needs a changed request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

/// Typed wrapper over the HTTP API. Holds the bearer token; all calls are
/// plain request/response with no retry loop.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
        if resp.status().is_success() {
            Ok(resp.json::<T>().await?)
        } else {
            Err(Self::into_api_error(resp).await)
        }
    }

    async fn expect_empty(resp: Response) -> Result<(), ClientError> {
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::into_api_error(resp).await)
        }
    }

    async fn into_api_error(resp: Response) -> ClientError {
        let status = resp.status();
        match resp.json::<ErrorBody>().await {
            Ok(body) => ClientError::Api {
                kind: body.error,
                detail: body.detail,
            },
            // Not our error shape; synthesize a kind from the status so the
            // caller still gets something machine-checkable.
            Err(_) => ClientError::Api {
                kind: fallback_kind(status).to_string(),
                detail: format!("request failed with status {status}"),
            },
        }
    }

    pub async fn health(&self) -> Result<(), ClientError> {
        let resp = self.request(Method::GET, "/health").send().await?;
        Self::expect_empty(resp).await
    }

    pub async fn signup(&self, body: &SignupRequest) -> Result<UserProfile, ClientError> {
        let resp = self
            .request(Method::POST, "/api/signup")
            .json(body)
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp = self
            .request(Method::POST, "/api/login")
            .json(&body)
            .send()
            .await?;
        let login: LoginResponse = Self::decode(resp).await?;
        Ok(login.token)
    }

    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        let resp = self.request(Method::GET, "/api/me").send().await?;
        Self::decode(resp).await
    }

    pub async fn update_profile(
        &self,
        body: &UpdateProfileRequest,
    ) -> Result<UserProfile, ClientError> {
        let resp = self
            .request(Method::PUT, "/api/me")
            .json(body)
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn upload_avatar(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<UserProfile, ClientError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("avatar")
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let resp = self
            .request(Method::POST, "/api/me/profile-image")
            .multipart(form)
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn list_mentors(
        &self,
        search: Option<&str>,
        tech_stack: Option<&str>,
        sort_by: Option<&str>,
    ) -> Result<Vec<MentorListItem>, ClientError> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(s) = search {
            params.push(("search", s));
        }
        if let Some(t) = tech_stack {
            params.push(("tech_stack", t));
        }
        if let Some(s) = sort_by {
            params.push(("sort_by", s));
        }
        let resp = self
            .request(Method::GET, "/api/mentors")
            .query(&params)
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn matching_requests(&self) -> Result<Vec<MatchingRequestView>, ClientError> {
        let resp = self
            .request(Method::GET, "/api/matching-requests")
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn create_matching_request(
        &self,
        mentor_id: Uuid,
        message: Option<&str>,
    ) -> Result<MatchingRequestView, ClientError> {
        let body = CreateRequestBody {
            mentor_id,
            message: message.map(str::to_string),
        };
        let resp = self
            .request(Method::POST, "/api/matching-requests")
            .json(&body)
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn decide_matching_request(
        &self,
        request_id: Uuid,
        decision: Decision,
    ) -> Result<MatchingRequestView, ClientError> {
        let body = DecideRequestBody { status: decision };
        let resp = self
            .request(Method::PUT, &format!("/api/matching-requests/{request_id}"))
            .json(&body)
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn withdraw_matching_request(&self, request_id: Uuid) -> Result<(), ClientError> {
        let resp = self
            .request(Method::DELETE, &format!("/api/matching-requests/{request_id}"))
            .send()
            .await?;
        Self::expect_empty(resp).await
    }
}

fn fallback_kind(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED => "unauthenticated",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "not_found",
        _ => "internal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn token_lifecycle() {
        let mut client = ApiClient::new("http://localhost:8080");
        assert!(!client.has_token());
        client.set_token("abc");
        assert!(client.has_token());
        client.clear_token();
        assert!(!client.has_token());
    }

    #[test]
    fn api_error_exposes_wire_kind() {
        let err = ClientError::Api {
            kind: "unauthenticated".into(),
            detail: "authentication required".into(),
        };
        assert!(err.is_unauthenticated());
        assert!(!err.is_retryable());
    }

    #[test]
    fn fallback_kind_tracks_status() {
        assert_eq!(fallback_kind(StatusCode::UNAUTHORIZED), "unauthenticated");
        assert_eq!(fallback_kind(StatusCode::FORBIDDEN), "forbidden");
        assert_eq!(fallback_kind(StatusCode::NOT_FOUND), "not_found");
        assert_eq!(fallback_kind(StatusCode::BAD_GATEWAY), "internal");
    }
}
