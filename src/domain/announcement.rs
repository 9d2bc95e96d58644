use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    /// Sanitized HTML.
    pub content: String,
    #[serde(rename = "type", default)]
    pub announcement_type: AnnouncementType,
    /// Display date chosen by the author.
    pub date: NaiveDate,
    /// Relative path of the resized image, e.g. `uploads/announcement-1700000000000.jpg`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub date_created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementType {
    #[default]
    General,
    Urgent,
    Admissions,
    Academic,
    Events,
}

impl AnnouncementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementType::General => "general",
            AnnouncementType::Urgent => "urgent",
            AnnouncementType::Admissions => "admissions",
            AnnouncementType::Academic => "academic",
            AnnouncementType::Events => "events",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 50000, message = "must be between 1 and 50000 characters"))]
    pub content: String,
    #[serde(rename = "type", default)]
    pub announcement_type: AnnouncementType,
    pub date: Option<NaiveDate>,
    /// Optional `data:image/...;base64,` URL.
    pub image: Option<String>,
}

/// Announcement as listed publicly: the full content plus a bounded preview
/// for the read-more toggle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementView {
    #[serde(flatten)]
    pub announcement: Announcement,
    pub preview: String,
    pub truncated: bool,
}
