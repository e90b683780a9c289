use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- Enums ---

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    JobSeeker,
    Employer,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Paused,
}

// --- Request Structs ---

#[derive(Serialize, Debug, Clone)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
    pub user_type: UserType,
}

#[derive(Serialize, Debug, Clone)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct GetJobsParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a str>,
}

#[derive(Serialize, Debug, Clone)]
pub struct CreateJobRequest<'a> {
    pub title: &'a str,
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a str>,
    pub company_name: &'a str,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct UpdateJobRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Serialize, Debug, Clone)]
pub struct CreateResumeRequest<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_position: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct UpdateResumeRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_position: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

#[derive(Serialize, Debug, Clone)]
pub struct CreateApplicationRequest<'a> {
    pub job_id: u64,
    pub resume_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<&'a str>,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct UpdateApplicationRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<&'a str>,
}

#[derive(Serialize, Debug, Clone)]
pub struct StartAnalysisRequest {
    pub application_id: u64,
}

#[derive(Serialize, Debug, Clone)]
pub struct SmartBotChatRequest<'a> {
    pub session_id: &'a str,
    pub message: &'a str,
}

// --- Response Structs ---

#[derive(Deserialize, Debug, Clone)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub user_type: UserType,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Job {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_currency: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
    pub company_name: String,
    pub is_active: bool,
    pub employer_id: u64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Resume {
    pub id: u64,
    pub title: String,
    pub summary: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub skills: Option<String>,
    pub languages: Option<String>,
    pub portfolio_url: Option<String>,
    pub desired_position: Option<String>,
    pub desired_salary: Option<f64>,
    pub location: Option<String>,
    pub is_public: Option<bool>,
    pub user_id: u64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Application {
    pub id: u64,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub user_id: u64,
    pub job_id: u64,
    pub resume_id: u64,
    pub created_at: String,
    pub updated_at: String,
    // Denormalized fields the backend includes on list endpoints
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub resume_title: Option<String>,
    pub user_name: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub created_at: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChatSession {
    pub id: u64,
    pub session_id: String,
    pub user_id: Option<u64>,
    pub created_at: String,
    pub updated_at: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChatResponse {
    pub message: String,
    pub session_id: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SmartBotMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub created_at: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SmartBotSession {
    pub id: u64,
    pub session_id: String,
    pub application_id: u64,
    pub status: SessionStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StartAnalysisResponse {
    pub session_id: String,
    pub initial_message: Option<String>,
    pub is_completed: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CandidateAnalysis {
    pub id: u64,
    pub application_id: u64,
    pub overall_score: f64,
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub created_at: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SmartBotChatResponse {
    pub message: String,
    pub is_completed: bool,
    pub analysis: Option<CandidateAnalysis>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AnalysisCategory {
    pub name: String,
    pub score: f64,
    pub details: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AnalysisChatMessage {
    pub id: String,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// Per-application screening summary surfaced to employers, combining the
/// interview transcript with the scored analysis.
#[derive(Deserialize, Debug, Clone)]
pub struct EmployerAnalysisView {
    pub application_id: u64,
    pub candidate_name: String,
    pub candidate_email: Option<String>,
    pub session_id: String,
    pub session_status: String,
    pub relevance_score: Option<f64>,
    pub recommendation: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub chat_messages: Vec<AnalysisChatMessage>,
    #[serde(default)]
    pub categories: Vec<AnalysisCategory>,
    pub applied_at: String,
    pub analyzed_at: Option<String>,
}

/// Generic body for endpoints that only return an acknowledgement.
pub type Ack = Value;
