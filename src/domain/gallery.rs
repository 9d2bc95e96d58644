use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_CATEGORY: &str = "general";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPhoto {
    pub id: i64,
    pub title: String,
    #[serde(default = "default_category")]
    pub category: String,
    /// Relative path of the resized image.
    pub image: String,
    pub date: NaiveDate,
    pub date_created: DateTime<Utc>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Collapse whitespace and lowercase so "Sports  Day" and "sports day" group together.
pub fn normalize_category(raw: Option<&str>) -> String {
    let collapsed = raw
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if collapsed.is_empty() {
        default_category()
    } else {
        collapsed
    }
}

/// Title for the `index`-th file of a multi-file upload: "Title", "Title (2)", ...
pub fn numbered_title(base: &str, index: usize) -> String {
    if index == 0 {
        base.to_string()
    } else {
        format!("{} ({})", base, index + 1)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GalleryPatch {
    pub title: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateGalleryPhotoRequest {
    pub id: i64,
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateGalleryTitleRequest {
    pub id: i64,
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GalleryCategory {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedUpload {
    pub filename: String,
    pub message: String,
}
