//! API models for request and response payloads

use recommender::{Event, NewEvent, RecommendationNotice, Recommendations};
use serde::{Deserialize, Serialize};

/// Event submission form
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitEventRequest {
    pub title: String,
    pub description: String,
    pub organizer: String,
    pub date: String,
}

impl SubmitEventRequest {
    /// Trim the fields and reject empty ones
    pub fn into_new_event(self) -> Result<NewEvent, String> {
        Ok(NewEvent {
            title: required("Title", &self.title)?,
            description: required("Description", &self.description)?,
            organizer: required("Organizer", &self.organizer)?,
            date: required("Date", &self.date)?,
        })
    }
}

fn required(name: &str, value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{} is required", name));
    }
    Ok(value.to_string())
}

/// Dashboard payload
#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub recommended_events: Vec<Event>,
    pub notice: Option<&'static str>,
}

impl From<Recommendations> for DashboardResponse {
    fn from(recommendations: Recommendations) -> Self {
        Self {
            recommended_events: recommendations.events,
            notice: recommendations.notice.map(RecommendationNotice::message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SubmitEventRequest {
        SubmitEventRequest {
            title: "  Music Night ".to_string(),
            description: "Live bands".to_string(),
            organizer: "Music Club".to_string(),
            date: "2025-10-31".to_string(),
        }
    }

    #[test]
    fn test_fields_are_trimmed() {
        let event = request().into_new_event().unwrap();
        assert_eq!(event.title, "Music Night");
        assert_eq!(event.date, "2025-10-31");
    }

    #[test]
    fn test_empty_field_is_rejected() {
        let mut request = request();
        request.organizer = " ".to_string();
        assert_eq!(
            request.into_new_event().unwrap_err(),
            "Organizer is required"
        );
    }
}
