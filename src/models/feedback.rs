//! Feedback models.
//!
//! A feedback item is owned by the store; the annotation pipeline only reads
//! its text and rewrites the sentiment/category/priority labels and the
//! attached `AnnotationRecord`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confidence recorded on every machine-generated annotation.
pub const DEFAULT_CONFIDENCE: f64 = 0.85;

/// Workflow status of a feedback item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackStatus {
    #[default]
    Open,
    InProgress,
    Closed,
    Archived,
}

impl FeedbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in-progress",
            Self::Closed => "closed",
            Self::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "in-progress" | "in_progress" => Some(Self::InProgress),
            "closed" => Some(Self::Closed),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
    Mixed,
}

impl Sentiment {
    pub const ALL: [Sentiment; 4] = [
        Sentiment::Positive,
        Sentiment::Neutral,
        Sentiment::Negative,
        Sentiment::Mixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
            Self::Mixed => "mixed",
        }
    }

    /// Parse a label as produced by a model (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "neutral" => Some(Self::Neutral),
            "negative" => Some(Self::Negative),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

/// Feedback category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Feature Request")]
    FeatureRequest,
    #[serde(rename = "Bug Report")]
    BugReport,
    #[serde(rename = "User Experience")]
    UserExperience,
    Performance,
    Design,
    Documentation,
    Security,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FeatureRequest => "Feature Request",
            Self::BugReport => "Bug Report",
            Self::UserExperience => "User Experience",
            Self::Performance => "Performance",
            Self::Design => "Design",
            Self::Documentation => "Documentation",
            Self::Security => "Security",
            Self::Other => "Other",
        }
    }

    /// Parse a category name. Accepts "UX" as shorthand for User Experience,
    /// since the batch prompt offers that spelling.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "feature request" => Some(Self::FeatureRequest),
            "bug report" => Some(Self::BugReport),
            "user experience" | "ux" => Some(Self::UserExperience),
            "performance" => Some(Self::Performance),
            "design" => Some(Self::Design),
            "documentation" => Some(Self::Documentation),
            "security" => Some(Self::Security),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Priority label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// The current machine annotation attached to a feedback item.
///
/// There is exactly one per item; each annotation pass replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub summary: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub suggested_category: Option<String>,
    pub confidence_score: f64,
    pub analyzed_at: DateTime<Utc>,
}

/// A single piece of user feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Submitting user, if the feedback was not anonymous.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: FeedbackStatus,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub votes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AnnotationRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeedbackItem {
    /// Create a new open feedback item with default labels.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            user_id: None,
            status: FeedbackStatus::default(),
            category: Category::default(),
            sentiment: Sentiment::default(),
            priority: Priority::default(),
            votes: 0,
            ai_analysis: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: FeedbackStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_votes(mut self, votes: u32) -> Self {
        self.votes = votes;
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// First `n` whitespace-separated tokens of the title.
    pub fn title_keywords(&self, n: usize) -> Vec<String> {
        self.title
            .split_whitespace()
            .take(n)
            .map(str::to_string)
            .collect()
    }
}
