use crate::auth::TokenStore;
use crate::error::{JobBoardError, Result};
use crate::types::*;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// A client for the job-board platform REST API.
///
/// Handles bearer authentication, request building, and response parsing
/// for the auth, jobs, résumés, applications, chat, and SmartBot
/// endpoints. A successful [`login`](Client::login) stores the issued
/// token in the shared [`TokenStore`]; a 401 from any endpoint clears it
/// again, so observers of the store see the session end.
///
/// # Examples
///
/// ```no_run
/// use jobboard_connector_rs::auth::TokenStore;
/// use jobboard_connector_rs::rest::Client;
/// use jobboard_connector_rs::types::LoginRequest;
///
/// #[tokio::main]
/// async fn main() {
///     let tokens = TokenStore::new();
///     let client = Client::new("http://localhost:8000", tokens.clone(), None)
///         .expect("Failed to create client");
///
///     client
///         .login(&LoginRequest { email: "me@example.com", password: "hunter2" })
///         .await
///         .expect("Login failed");
///     assert!(tokens.is_authenticated());
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    /// The underlying HTTP client used for making requests.
    http_client: HttpClient,
    /// Base URL of the backend, e.g. `http://localhost:8000`.
    base_url: Url,
    /// Shared credential slot, also read by the WebSocket side.
    tokens: TokenStore,
}

impl Client {
    /// Creates a new REST client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Backend origin, without a trailing API path
    /// * `tokens` - Shared token store; may be empty until `login`
    /// * `timeout_sec` - Optional request timeout (defaults to 10s)
    pub fn new(base_url: &str, tokens: TokenStore, timeout_sec: Option<u64>) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let timeout = Duration::from_secs(timeout_sec.unwrap_or(DEFAULT_TIMEOUT_SECONDS));
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url,
            tokens,
        })
    }

    /// Builds a request for `path`, attaching the bearer token when one
    /// is present.
    fn build_request<T: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> Result<Request> {
        let url = self.base_url.join(path)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.tokens.get() {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }

        let mut builder = self.http_client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.build()?)
    }

    async fn send_request<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        debug!("{} {}", request.method(), request.url().path());
        let response = self.http_client.execute(request).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Session credential is no longer valid; drop it so the rest
            // of the process stops presenting it.
            warn!("Received 401, clearing stored auth token");
            self.tokens.clear();
        }

        Self::handle_response(response).await
    }

    /// Shared logic to handle response status and body parsing.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let headers = response.headers().clone();

        if status.is_success() {
            let parsed_body = response.json::<T>().await?;
            return Ok(parsed_body);
        }

        let error_body: Option<Value> = response.json::<Value>().await.ok();
        // FastAPI-style errors carry the human-readable part in `detail`,
        // either as a string or a structured validation payload.
        let message = match error_body.as_ref().map(|body| &body["detail"]) {
            Some(Value::String(detail)) => detail.clone(),
            Some(Value::Null) | None => {
                format!("Request failed with status {}", status)
            }
            Some(detail) => detail.to_string(),
        };

        let error = if status.is_client_error() {
            JobBoardError::ClientError {
                status,
                message,
                detail: error_body,
                header: headers,
            }
        } else {
            JobBoardError::ServerError {
                status,
                message,
                header: headers,
            }
        };
        Err(error)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.build_request::<()>(Method::GET, path, None)?;
        self.send_request(request).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = self.build_request(Method::POST, path, Some(body))?;
        self.send_request(request).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = self.build_request(Method::PUT, path, Some(body))?;
        self.send_request(request).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.build_request::<()>(Method::DELETE, path, None)?;
        self.send_request(request).await
    }

    // --- Auth ---

    /// Registers a new account. Does not log in.
    pub async fn register(&self, request: &RegisterRequest<'_>) -> Result<User> {
        self.post("/api/auth/register", request).await
    }

    /// Logs in and stores the issued access token in the [`TokenStore`].
    pub async fn login(&self, request: &LoginRequest<'_>) -> Result<TokenResponse> {
        let response: TokenResponse = self.post("/api/auth/login", request).await?;
        self.tokens.set(response.access_token.clone());
        Ok(response)
    }

    /// Fetches the profile of the authenticated user.
    pub async fn get_current_user(&self) -> Result<User> {
        self.get("/api/auth/me").await
    }

    // --- Jobs ---

    /// Lists job postings, optionally filtered and paginated.
    pub async fn get_jobs(&self, params: Option<&GetJobsParams<'_>>) -> Result<JobListResponse> {
        let path = match params {
            Some(params) => {
                let query = serde_qs::to_string(params)?;
                if query.is_empty() {
                    "/api/jobs/".to_string()
                } else {
                    format!("/api/jobs/?{}", query)
                }
            }
            None => "/api/jobs/".to_string(),
        };
        self.get(&path).await
    }

    pub async fn get_job(&self, job_id: u64) -> Result<Job> {
        self.get(&format!("/api/jobs/{}", job_id)).await
    }

    pub async fn create_job(&self, request: &CreateJobRequest<'_>) -> Result<Job> {
        self.post("/api/jobs/", request).await
    }

    pub async fn update_job(&self, job_id: u64, request: &UpdateJobRequest<'_>) -> Result<Job> {
        self.put(&format!("/api/jobs/{}", job_id), request).await
    }

    pub async fn delete_job(&self, job_id: u64) -> Result<Ack> {
        self.delete(&format!("/api/jobs/{}", job_id)).await
    }

    /// Lists the postings owned by the authenticated employer.
    pub async fn get_my_jobs(&self) -> Result<Vec<Job>> {
        self.get("/api/jobs/my/jobs").await
    }

    // --- Résumés ---

    pub async fn get_resumes(&self) -> Result<Vec<Resume>> {
        self.get("/api/resumes/").await
    }

    pub async fn get_resume(&self, resume_id: u64) -> Result<Resume> {
        self.get(&format!("/api/resumes/{}", resume_id)).await
    }

    pub async fn create_resume(&self, request: &CreateResumeRequest<'_>) -> Result<Resume> {
        self.post("/api/resumes/", request).await
    }

    pub async fn update_resume(
        &self,
        resume_id: u64,
        request: &UpdateResumeRequest<'_>,
    ) -> Result<Resume> {
        self.put(&format!("/api/resumes/{}", resume_id), request)
            .await
    }

    pub async fn delete_resume(&self, resume_id: u64) -> Result<Ack> {
        self.delete(&format!("/api/resumes/{}", resume_id)).await
    }

    // --- Applications ---

    pub async fn get_applications(&self) -> Result<Vec<Application>> {
        self.get("/api/applications/").await
    }

    pub async fn get_application(&self, application_id: u64) -> Result<Application> {
        self.get(&format!("/api/applications/{}", application_id))
            .await
    }

    pub async fn create_application(
        &self,
        request: &CreateApplicationRequest<'_>,
    ) -> Result<Application> {
        self.post("/api/applications/", request).await
    }

    /// Updates an application; employers use this to change its status.
    pub async fn update_application(
        &self,
        application_id: u64,
        request: &UpdateApplicationRequest<'_>,
    ) -> Result<Application> {
        self.put(&format!("/api/applications/{}", application_id), request)
            .await
    }

    pub async fn delete_application(&self, application_id: u64) -> Result<Ack> {
        self.delete(&format!("/api/applications/{}", application_id))
            .await
    }

    /// Fetches the résumé attached to an application.
    pub async fn get_application_resume(&self, application_id: u64) -> Result<Resume> {
        self.get(&format!("/api/applications/{}/resume", application_id))
            .await
    }

    // --- Chat ---

    /// Sends a message to the general assistant. Omitting `session_id`
    /// starts a new session; the response carries the id to continue it.
    pub async fn send_chat_message(&self, request: &ChatRequest<'_>) -> Result<ChatResponse> {
        self.post("/api/chat/", request).await
    }

    pub async fn get_chat_session(&self, session_id: &str) -> Result<ChatSession> {
        self.get(&format!("/api/chat/sessions/{}", session_id)).await
    }

    pub async fn get_chat_sessions(&self) -> Result<Vec<ChatSession>> {
        self.get("/api/chat/sessions").await
    }

    // --- SmartBot ---

    /// Opens (or resumes) a screening interview for an application. The
    /// first half of the two-call protocol; follow with repeated
    /// [`send_smartbot_message`](Client::send_smartbot_message) calls.
    pub async fn start_analysis(&self, application_id: u64) -> Result<StartAnalysisResponse> {
        self.post(
            "/api/smartbot/start-analysis",
            &StartAnalysisRequest { application_id },
        )
        .await
    }

    /// Employer-initiated variant of [`start_analysis`](Client::start_analysis).
    pub async fn start_employer_analysis(
        &self,
        application_id: u64,
    ) -> Result<StartAnalysisResponse> {
        self.post(
            "/api/smartbot/employer/start-analysis",
            &StartAnalysisRequest { application_id },
        )
        .await
    }

    /// Sends one interview answer; when the interview completes the
    /// response carries the finished [`CandidateAnalysis`].
    pub async fn send_smartbot_message(
        &self,
        request: &SmartBotChatRequest<'_>,
    ) -> Result<SmartBotChatResponse> {
        self.post("/api/smartbot/chat", request).await
    }

    pub async fn get_smartbot_session(&self, session_id: &str) -> Result<SmartBotSession> {
        self.get(&format!("/api/smartbot/sessions/{}", session_id))
            .await
    }

    pub async fn get_smartbot_session_messages(
        &self,
        session_id: &str,
    ) -> Result<Vec<SmartBotMessage>> {
        self.get(&format!("/api/smartbot/sessions/{}/messages", session_id))
            .await
    }

    pub async fn get_candidate_analysis(&self, application_id: u64) -> Result<CandidateAnalysis> {
        self.get(&format!("/api/smartbot/analysis/{}", application_id))
            .await
    }

    /// Lists the screening results for every application to a job.
    pub async fn get_employer_job_analyses(
        &self,
        job_id: u64,
    ) -> Result<Vec<EmployerAnalysisView>> {
        self.get(&format!("/api/smartbot/employer/applications/{}", job_id))
            .await
    }

    pub async fn get_employer_application_analysis(
        &self,
        application_id: u64,
    ) -> Result<EmployerAnalysisView> {
        self.get(&format!(
            "/api/smartbot/employer/application-analysis/{}",
            application_id
        ))
        .await
    }
}
