use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Enumerations (backed by Postgres enum types) ---

/// Account role, decides which profile table a user lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Mentor,
    Admin,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Mentor => "mentor",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "mentor_approval", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MentorApproval {
    Pending,
    Approved,
    Rejected,
}

/// Lifecycle of a student/mentor assignment
///
/// ```text
/// pending ──► active ──► completed
///    │          │
///    ├──► rejected
///    └──────────┴──► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "assignment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Active,
    Rejected,
    Completed,
    Cancelled,
}

impl AssignmentStatus {
    /// Statuses that occupy the student's single mentor slot
    pub const LIVE: &[Self] = &[Self::Pending, Self::Active];

    pub const fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Active)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::Cancelled)
                | (Self::Active, Self::Completed)
                | (Self::Active, Self::Cancelled)
        )
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "horoscope_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HoroscopeStatus {
    Pending,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_plan", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentPlan {
    Basic,
    Standard,
    Premium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed)
                | (Self::Pending, Self::Failed)
                | (Self::Completed, Self::Refunded)
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Users ---

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<UserCredentials> for User {
    fn from(credentials: UserCredentials) -> Self {
        Self {
            id: credentials.id,
            email: credentials.email,
            full_name: credentials.full_name,
            role: credentials.role,
            created_at: credentials.created_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

// --- Students ---

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentProfile {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub city: Option<String>,
    pub education_level: Option<String>,
    pub institution: Option<String>,
    pub stream: Option<String>,
    pub interests: Vec<String>,
    pub career_goals: Option<String>,
    pub onboarding_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl StudentProfile {
    pub const fn onboarding_completed(&self) -> bool {
        self.onboarding_completed_at.is_some()
    }
}

/// Already-validated student onboarding form
#[derive(Debug, Clone, Default)]
pub struct StudentOnboarding {
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub city: Option<String>,
    pub education_level: String,
    pub institution: Option<String>,
    pub stream: Option<String>,
    pub interests: Vec<String>,
    pub career_goals: Option<String>,
}

// --- Mentors ---

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MentorProfile {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub expertise: Vec<String>,
    pub bio: Option<String>,
    pub years_experience: Option<i32>,
    pub qualification: Option<String>,
    pub languages: Vec<String>,
    pub approval_status: MentorApproval,
    pub onboarding_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Already-validated mentor onboarding form
#[derive(Debug, Clone, Default)]
pub struct MentorOnboarding {
    pub expertise: Vec<String>,
    pub bio: String,
    pub years_experience: i32,
    pub qualification: String,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MentorListItem {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub expertise: Vec<String>,
    pub years_experience: Option<i32>,
    pub approval_status: MentorApproval,
    pub live_students: i64,
    pub created_at: DateTime<Utc>,
}

// --- Assignments ---

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Assignment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub mentor_id: Uuid,
    pub status: AssignmentStatus,
    pub assigned_by: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Assignment as seen by the mentor
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MentorAssignment {
    pub id: Uuid,
    pub status: AssignmentStatus,
    pub notes: Option<String>,
    pub student_id: Uuid,
    pub student_name: String,
    pub student_email: String,
    pub education_level: Option<String>,
    pub interests: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Assignment as seen by the student, with the mentor's public profile
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentAssignment {
    pub id: Uuid,
    pub status: AssignmentStatus,
    pub mentor_id: Uuid,
    pub mentor_name: String,
    pub expertise: Vec<String>,
    pub bio: Option<String>,
    pub years_experience: Option<i32>,
    pub qualification: Option<String>,
    pub languages: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Assignment as listed for admins
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssignmentOverview {
    pub id: Uuid,
    pub status: AssignmentStatus,
    pub student_id: Uuid,
    pub student_name: String,
    pub mentor_id: Uuid,
    pub mentor_name: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Psychometric tests ---

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TestSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub question_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Test {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Question including its scoring key. Never sent to students as-is.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TestQuestion {
    pub id: Uuid,
    pub position: i32,
    pub prompt: String,
    /// RIASEC letter
    pub dimension: String,
    pub reverse_scored: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TestResult {
    pub id: Uuid,
    pub student_id: Uuid,
    pub test_id: Uuid,
    pub test_title: String,
    pub answers: serde_json::Value,
    pub scores: serde_json::Value,
    pub holland_code: String,
    pub created_at: DateTime<Utc>,
}

// --- AI horoscope ---

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Horoscope {
    pub student_id: Uuid,
    pub status: HoroscopeStatus,
    pub report: Option<serde_json::Value>,
    pub error: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

// --- Payments ---

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub plan: PaymentPlan,
    pub amount_minor: i64,
    pub currency: String,
    pub provider_reference: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Admin ---

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentListItem {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub education_level: Option<String>,
    pub onboarding_completed: bool,
    pub live_mentor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlatformStats {
    pub students: i64,
    pub onboarded_students: i64,
    pub mentors_pending: i64,
    pub mentors_approved: i64,
    pub mentors_rejected: i64,
    pub live_assignments: i64,
    pub test_results: i64,
    pub ready_horoscopes: i64,
    /// Filled by a separate query, one entry per currency
    #[sqlx(skip)]
    pub completed_payments: Vec<CurrencyVolume>,
}

/// Completed payment volume in one currency, in minor units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CurrencyVolume {
    pub currency: String,
    pub amount_minor: i64,
}
