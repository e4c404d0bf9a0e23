use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mood options offered on the home screen.
///
/// The persisted form is the display label (e.g. "愉快"), so stored histories
/// stay readable and compatible with older records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "愉快")]
    Happy,
    #[serde(rename = "平靜")]
    Calm,
    #[serde(rename = "疲憊")]
    Tired,
    #[serde(rename = "焦慮")]
    Anxious,
}

impl Mood {
    /// All moods in the order the picker shows them
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Tired, Mood::Calm, Mood::Anxious];

    /// Display label, also used as the stored value
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "愉快",
            Mood::Calm => "平靜",
            Mood::Tired => "疲憊",
            Mood::Anxious => "焦慮",
        }
    }

    /// Position on the mood chart's vertical scale (1 = lowest)
    pub fn chart_value(&self) -> i32 {
        match self {
            Mood::Happy => 4,
            Mood::Calm => 3,
            Mood::Tired => 2,
            Mood::Anxious => 1,
        }
    }

    /// Strict label lookup; callers that must never fail fall back to `Mood::default()`
    pub fn from_label(label: &str) -> Result<Mood, MoodLabelError> {
        match label.trim() {
            "愉快" => Ok(Mood::Happy),
            "平靜" => Ok(Mood::Calm),
            "疲憊" => Ok(Mood::Tired),
            "焦慮" => Ok(Mood::Anxious),
            other => Err(MoodLabelError(other.to_string())),
        }
    }
}

impl Default for Mood {
    fn default() -> Self {
        Mood::Calm
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Mood {
    type Err = MoodLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::from_label(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoodLabelError(pub String);

impl fmt::Display for MoodLabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown mood label: {}", self.0)
    }
}

impl std::error::Error for MoodLabelError {}

/// One mood record per calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    /// Day key (YYYY-MM-DD)
    pub date: String,
    /// Raw mood label as stored; unknown labels are tolerated on read
    pub mood: String,
}

impl MoodEntry {
    pub fn new(date: impl Into<String>, mood: Mood) -> Self {
        Self {
            date: date.into(),
            mood: mood.label().to_string(),
        }
    }

    /// Decoded mood, `None` when the stored label is not recognised
    pub fn parsed_mood(&self) -> Option<Mood> {
        Mood::from_label(&self.mood).ok()
    }
}

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    /// Older transcripts stored the assistant role as "model"
    #[serde(alias = "model")]
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp,
        }
    }

    pub fn assistant(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp,
        }
    }
}

/// Elapsed pregnancy time since the last menstrual period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestationalAge {
    pub weeks: u32,
    pub days: u32,
    pub total_days: u32,
}

impl GestationalAge {
    pub fn from_total_days(total_days: u32) -> Self {
        Self {
            weeks: total_days / 7,
            days: total_days % 7,
            total_days,
        }
    }
}

/// Per-user settings record stored under `profile_settings`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSettings {
    /// Last menstrual period (YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Expected delivery date (YYYY-MM-DD), only read from older records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// RFC 3339 timestamp
    #[serde(default)]
    pub updated_at: String,
}

/// Signed-in user of the mocked auth service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// A single point on the mood curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub day_key: String,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMoodRequest {
    /// One of the four labels, e.g. "愉快"
    pub mood: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMoodResponse {
    pub mood: Mood,
    pub history: Vec<MoodEntry>,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentMoodResponse {
    pub mood: Mood,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodHistoryResponse {
    pub history: Vec<MoodEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodChartResponse {
    pub points: Vec<ChartPoint>,
}

/// Edit form payload: exactly one of the two anchors is expected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePregnancyDatesRequest {
    pub lmp: Option<String>,
    pub due_date: Option<String>,
}

/// Both projections of the pregnancy anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PregnancyDatesResponse {
    pub lmp: String,
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PregnancyProgressResponse {
    pub progress: GestationalAge,
    /// False when no anchor is stored and the fallback progress is shown
    pub has_anchor: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    /// Messages of the conversation currently on screen, oldest first
    #[serde(default)]
    pub context: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub user_message: ChatMessage,
    /// `None` when the assistant backend could not answer
    pub reply: Option<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreetingResponse {
    pub message: ChatMessage,
}

/// Everything the profile dashboard renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileOverviewResponse {
    pub user: User,
    pub progress: GestationalAge,
    pub due_date: Option<String>,
    pub days_until_due: Option<i64>,
    pub trimester: Option<u8>,
    pub mood_chart: Vec<ChartPoint>,
    pub recent_queries: Vec<ChatMessage>,
}
