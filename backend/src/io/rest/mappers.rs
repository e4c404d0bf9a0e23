//! Domain results to wire DTOs.

use shared::{
    PregnancyDatesResponse, PregnancyProgressResponse, ProfileOverviewResponse, RecordMoodResponse,
    SendMessageResponse,
};

use crate::domain::commands::chat::SendMessageResult;
use crate::domain::commands::mood::RecordMoodResult;
use crate::domain::commands::profile::{ProfileOverview, ProgressResult};
use crate::domain::PregnancyAnchor;

pub fn to_dates_response(anchor: &PregnancyAnchor) -> PregnancyDatesResponse {
    PregnancyDatesResponse {
        lmp: anchor.lmp_key(),
        due_date: anchor.due_date_key(),
    }
}

pub fn to_progress_response(result: &ProgressResult) -> PregnancyProgressResponse {
    PregnancyProgressResponse {
        progress: result.progress,
        has_anchor: result.anchor.is_some(),
    }
}

pub fn to_record_mood_response(result: RecordMoodResult) -> RecordMoodResponse {
    RecordMoodResponse {
        success_message: format!("今天的心情「{}」已記錄", result.mood.label()),
        mood: result.mood,
        history: result.history,
    }
}

pub fn to_send_message_response(result: SendMessageResult) -> SendMessageResponse {
    SendMessageResponse {
        user_message: result.user_message,
        reply: result.reply,
    }
}

pub fn to_overview_response(overview: ProfileOverview) -> ProfileOverviewResponse {
    ProfileOverviewResponse {
        due_date: overview.anchor.map(|anchor| anchor.due_date_key()),
        user: overview.user,
        progress: overview.progress,
        days_until_due: overview.days_until_due,
        trimester: overview.trimester,
        mood_chart: overview.mood_chart,
        recent_queries: overview.recent_queries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::{GestationalAge, Mood, MoodEntry};

    #[test]
    fn test_dates_and_progress() {
        let anchor = PregnancyAnchor::from_lmp(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).unwrap();
        let dates = to_dates_response(&anchor);
        assert_eq!(dates.lmp, "2024-01-01");
        assert_eq!(dates.due_date, "2024-10-07");

        let progress = to_progress_response(&ProgressResult {
            progress: GestationalAge::from_total_days(3),
            anchor: None,
        });
        assert!(!progress.has_anchor);
    }

    #[test]
    fn test_record_mood_message_names_the_mood() {
        let response = to_record_mood_response(RecordMoodResult {
            mood: Mood::Tired,
            history: vec![MoodEntry::new("2024-03-01", Mood::Tired)],
        });
        assert!(response.success_message.contains("疲憊"));
        assert_eq!(response.history.len(), 1);
    }
}
