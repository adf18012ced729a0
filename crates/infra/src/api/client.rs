//! API client implementing the request pipeline
//!
//! Every outbound call attaches the bearer credential when one is held. A
//! first-time 401 enters the single-flight refresh (see [`super::refresh`])
//! and the request is replayed once with the new token; a second 401 on the
//! replay is surfaced as a final error. All other failures pass through
//! unmodified.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use staffdesk_core::{
    AuthGateway, EmployeeFilter, EmployeeGateway, EmployeeSubmission, FormsGateway, TokenStore,
};
use staffdesk_domain::{
    ApiConfig, EmployeeRecord, FormSchema, ProfileUpdate, Registration, Result as DomainResult,
    StaffDeskError, TokenPair, UserProfile,
};
use tracing::{debug, info, instrument, warn};

use super::errors::ApiError;
use super::refresh::{RefreshGate, RefreshTicket};
use super::wire;
use crate::http::HttpClient;

const AUTH_PREFIX: &str = "/api/main";

/// HTTP client for the EMS backend
///
/// Owns the outbound/inbound interception: bearer attachment, envelope
/// normalization, and the coordinated refresh-and-retry on authorization
/// failure. Implements the core gateway ports.
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    gate: RefreshGate,
}

impl ApiClient {
    /// Create a client against `config.base_url`
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::Config("api base URL is not set".to_string()));
        }

        let mut builder = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds));
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let http = builder.build().map_err(|err| ApiError::Config(err.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
            gate: RefreshGate::default(),
        })
    }

    // ---- request pipeline ----

    /// Run one request through the pipeline, returning the successful
    /// response
    ///
    /// Error statuses become [`ApiError`]s; a first-time 401 triggers the
    /// refresh-and-replay path.
    async fn execute_raw(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, String)]>,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let bearer = self.tokens.access_token().await;
        let response = self.send_once(&method, &url, query, body, bearer.as_deref()).await?;
        let status = response.status();

        if status != StatusCode::UNAUTHORIZED {
            return Self::check_status(response, &url).await;
        }

        // Keep the original error: refresh failure propagates it, not a
        // refresh-specific one.
        let original = Self::status_error(status, &url, response.text().await.unwrap_or_default());
        debug!(%url, "401 received, entering token refresh");

        let Some(token) = self.refresh_access_token().await else {
            return Err(original);
        };

        let retry = self.send_once(&method, &url, query, body, Some(&token)).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            // The refreshed token was itself rejected; do not loop.
            warn!(%url, "request rejected again after refresh");
            let body_text = retry.text().await.unwrap_or_default();
            return Err(Self::status_error(StatusCode::UNAUTHORIZED, &url, body_text));
        }
        Self::check_status(retry, &url).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, String)]>,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let response = self.execute_raw(method, path, query, body).await?;
        Self::parse_body(response).await
    }

    async fn execute_unit(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<(), ApiError> {
        self.execute_raw(method, path, None, body).await.map(|_| ())
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        query: Option<&[(String, String)]>,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut builder =
            self.http.request(method.clone(), url).header(CONTENT_TYPE, "application/json");
        if let Some(pairs) = query {
            builder = builder.query(pairs);
        }
        if let Some(json) = body {
            builder = builder.json(json);
        }
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        self.http.send(builder).await.map_err(|err| match err {
            StaffDeskError::Network(msg) => ApiError::Network(msg),
            other => ApiError::Server(other.to_string()),
        })
    }

    async fn check_status(response: Response, url: &str) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::status_error(status, url, body))
    }

    async fn parse_body<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();

        // 204/205 carry no body per RFC
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return serde_json::from_value(Value::Null).map_err(|_| {
                ApiError::Client(format!(
                    "no content response ({}), but response type cannot be deserialized from an empty body",
                    status.as_u16()
                ))
            });
        }

        response
            .json()
            .await
            .map_err(|err| ApiError::Client(format!("failed to parse response: {err}")))
    }

    fn status_error(status: StatusCode, url: &str, body: String) -> ApiError {
        let message = if body.is_empty() {
            format!("{url} returned status {status}")
        } else {
            format!("{url} returned status {status}: {body}")
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            ApiError::Auth(message)
        } else if status.is_server_error() {
            ApiError::Server(message)
        } else if status.is_client_error() {
            ApiError::Client(message)
        } else {
            ApiError::Network(message)
        }
    }

    // ---- refresh coordination ----

    /// Obtain a fresh access token, joining an in-flight refresh if one is
    /// already running
    ///
    /// Returns `None` when the refresh failed; by then the token store has
    /// been cleared and the session must be re-established by logging in.
    async fn refresh_access_token(&self) -> Option<String> {
        match self.gate.begin().await {
            RefreshTicket::Waiter(rx) => rx.await.unwrap_or(None),
            RefreshTicket::Leader => {
                let outcome = self.run_refresh().await;
                match &outcome {
                    Some(access) => {
                        if let Err(err) = self.tokens.set_access_token(Some(access.clone())).await {
                            warn!(error = %err, "failed to store refreshed access token");
                        }
                        info!("access token refreshed");
                    }
                    None => {
                        info!("token refresh failed, clearing session");
                        if let Err(err) = self.tokens.clear().await {
                            warn!(error = %err, "failed to clear token store");
                        }
                    }
                }
                self.gate.settle(outcome.clone()).await;
                outcome
            }
        }
    }

    /// The refresh HTTP call itself; never recurses into the pipeline
    async fn run_refresh(&self) -> Option<String> {
        let Some(refresh) = self.tokens.refresh_token().await else {
            debug!("no refresh token stored, failing fast");
            return None;
        };

        let url = format!("{}/api/admin/refresh/", self.base_url);
        let builder = self
            .http
            .request(Method::POST, &url)
            .header(CONTENT_TYPE, "application/json")
            .json(&wire::RefreshRequest { refresh });

        let response = match self.http.send(builder).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "refresh call failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "refresh rejected by backend");
            return None;
        }

        match response.json::<wire::RefreshResponse>().await {
            Ok(wire::RefreshResponse { access: Some(access) }) if !access.is_empty() => {
                Some(access)
            }
            Ok(_) => {
                warn!("refresh response missing access token");
                None
            }
            Err(err) => {
                warn!(error = %err, "failed to parse refresh response");
                None
            }
        }
    }

    // ---- verb helpers ----

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::GET, path, None, None).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        self.execute(Method::GET, path, Some(query), None).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let json = to_body(body)?;
        self.execute(Method::POST, path, None, Some(&json)).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let json = to_body(body)?;
        self.execute(Method::PUT, path, None, Some(&json)).await
    }

    async fn delete_unit(&self, path: &str) -> Result<(), ApiError> {
        self.execute_unit(Method::DELETE, path, None).await
    }
}

fn to_body<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|err| ApiError::Client(format!("failed to serialize body: {err}")))
}

// ---- gateway implementations ----

#[async_trait]
impl AuthGateway for ApiClient {
    #[instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> DomainResult<TokenPair> {
        let request =
            wire::LoginRequest { username: username.to_string(), password: password.to_string() };
        let response: wire::LoginResponse =
            self.post(&format!("{AUTH_PREFIX}/login/"), &request).await?;

        match (response.access, response.refresh) {
            (Some(access), Some(refresh)) => Ok(TokenPair { access, refresh }),
            _ => Err(StaffDeskError::Auth("login response missing tokens".to_string())),
        }
    }

    #[instrument(skip(self, registration))]
    async fn register(&self, registration: &Registration) -> DomainResult<()> {
        let request = wire::RegisterRequest {
            username: registration.username.clone(),
            email: registration.email.clone(),
            password: registration.password.clone(),
            name: registration.name.clone(),
        };
        let _: Value = self.post(&format!("{AUTH_PREFIX}/register/"), &request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_profile(&self) -> DomainResult<UserProfile> {
        let dto: wire::ProfileDto = self.get(&format!("{AUTH_PREFIX}/profile/")).await?;
        Ok(dto.into())
    }

    #[instrument(skip(self, update))]
    async fn update_profile(&self, update: &ProfileUpdate) -> DomainResult<UserProfile> {
        let request = wire::ProfileUpdateRequest {
            full_name: update.full_name.clone(),
            phone: update.phone.clone(),
        };
        let dto: wire::ProfileDto =
            self.put(&format!("{AUTH_PREFIX}/profile/"), &request).await?;
        Ok(dto.into())
    }

    #[instrument(skip_all)]
    async fn change_password(&self, old_password: &str, new_password: &str) -> DomainResult<()> {
        let request = wire::ChangePasswordRequest {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        };
        let _: Value = self.put(&format!("{AUTH_PREFIX}/change-password/"), &request).await?;
        Ok(())
    }
}

#[async_trait]
impl FormsGateway for ApiClient {
    #[instrument(skip(self))]
    async fn list_forms(&self) -> DomainResult<Vec<FormSchema>> {
        let page: wire::Paginated<wire::FormDto> = self.get("/api/forms/").await?;
        Ok(page.into_vec().into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, form), fields(name = %form.name))]
    async fn create_form(&self, form: &FormSchema) -> DomainResult<FormSchema> {
        let dto: wire::FormDto =
            self.post("/api/forms/", &wire::FormPayload::from_schema(form)).await?;
        Ok(dto.into())
    }

    #[instrument(skip(self, form), fields(name = %form.name))]
    async fn update_form(&self, id: i64, form: &FormSchema) -> DomainResult<FormSchema> {
        let dto: wire::FormDto =
            self.put(&format!("/api/forms/{id}/"), &wire::FormPayload::from_schema(form)).await?;
        Ok(dto.into())
    }
}

#[async_trait]
impl EmployeeGateway for ApiClient {
    #[instrument(skip(self, filter))]
    async fn list_employees(&self, filter: &EmployeeFilter) -> DomainResult<Vec<EmployeeRecord>> {
        let page: wire::Paginated<wire::EmployeeDto> = if filter.is_empty() {
            self.get("/api/employees/").await?
        } else {
            self.get_with_query("/api/employees/", &filter.fields).await?
        };
        Ok(page.into_vec().into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_employee(&self, id: i64) -> DomainResult<EmployeeRecord> {
        let dto: wire::EmployeeDto = self.get(&format!("/api/employees/{id}/")).await?;
        Ok(dto.into())
    }

    #[instrument(skip(self, submission), fields(form = submission.form_id))]
    async fn create_employee(
        &self,
        submission: &EmployeeSubmission,
    ) -> DomainResult<EmployeeRecord> {
        let dto: wire::EmployeeDto =
            self.post("/api/employees/", &wire::EmployeePayload::from(submission)).await?;
        Ok(dto.into())
    }

    #[instrument(skip(self, submission))]
    async fn update_employee(
        &self,
        id: i64,
        submission: &EmployeeSubmission,
    ) -> DomainResult<EmployeeRecord> {
        let dto: wire::EmployeeDto = self
            .put(&format!("/api/employees/{id}/"), &wire::EmployeePayload::from(submission))
            .await?;
        Ok(dto.into())
    }

    #[instrument(skip(self))]
    async fn soft_delete_employee(&self, id: i64) -> DomainResult<()> {
        self.delete_unit(&format!("/api/employees/{id}/soft-delete/")).await?;
        Ok(())
    }
}
