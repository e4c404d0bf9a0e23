//! Domain-level command and result types.
//!
//! The REST layer maps the public DTOs in `shared` onto these; services never
//! see HTTP request types.

pub mod session {
    /// Sign in with optional custom profile data
    #[derive(Debug, Clone, Default)]
    pub struct LoginCommand {
        pub name: Option<String>,
        pub email: Option<String>,
    }

    /// Partial profile update; `None` leaves a field unchanged
    #[derive(Debug, Clone, Default)]
    pub struct UpdateUserCommand {
        pub display_name: Option<String>,
        pub photo_url: Option<String>,
    }
}

pub mod mood {
    use shared::{Mood, MoodEntry};

    #[derive(Debug, Clone)]
    pub struct RecordMoodCommand {
        pub user_id: String,
        pub mood: Mood,
    }

    #[derive(Debug, Clone)]
    pub struct RecordMoodResult {
        pub mood: Mood,
        pub history: Vec<MoodEntry>,
    }
}

pub mod profile {
    use crate::domain::pregnancy_anchor::PregnancyAnchor;
    use shared::{ChartPoint, ChatMessage, GestationalAge, User};

    /// Edit-form submission: exactly one anchor must be present
    #[derive(Debug, Clone)]
    pub struct UpdatePregnancyDatesCommand {
        pub user_id: String,
        pub lmp: Option<String>,
        pub due_date: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct ProgressResult {
        pub progress: GestationalAge,
        pub anchor: Option<PregnancyAnchor>,
    }

    #[derive(Debug, Clone)]
    pub struct ProfileOverview {
        pub user: User,
        pub progress: GestationalAge,
        pub anchor: Option<PregnancyAnchor>,
        pub days_until_due: Option<i64>,
        pub trimester: Option<u8>,
        pub mood_chart: Vec<ChartPoint>,
        pub recent_queries: Vec<ChatMessage>,
    }
}

pub mod chat {
    use shared::ChatMessage;

    #[derive(Debug, Clone)]
    pub struct SendMessageCommand {
        pub user_id: String,
        pub content: String,
        /// Conversation currently on screen, oldest first
        pub context: Vec<ChatMessage>,
    }

    #[derive(Debug, Clone)]
    pub struct SendMessageResult {
        pub user_message: ChatMessage,
        /// `None` when the assistant backend failed
        pub reply: Option<ChatMessage>,
    }
}
