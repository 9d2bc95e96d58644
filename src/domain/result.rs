use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Pass rate for one subject in one grade and year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcademicResult {
    pub id: i64,
    pub year: i32,
    pub grade: String,
    pub subject: String,
    pub pass_rate: f64,
    #[serde(default)]
    pub enrolled: Option<u32>,
    #[serde(default)]
    pub passed: Option<u32>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_counts"))]
pub struct CreateResultRequest {
    #[validate(range(min = 1900, max = 2200, message = "must be a plausible year"))]
    pub year: i32,
    #[validate(length(min = 1, max = 50, message = "is required"))]
    pub grade: String,
    #[validate(length(min = 1, max = 100, message = "is required"))]
    pub subject: String,
    #[validate(range(min = 0.0, max = 100.0, message = "must be between 0 and 100"))]
    pub pass_rate: f64,
    pub enrolled: Option<u32>,
    pub passed: Option<u32>,
    #[serde(default)]
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub notes: String,
}

fn validate_counts(request: &CreateResultRequest) -> Result<(), ValidationError> {
    if let (Some(enrolled), Some(passed)) = (request.enrolled, request.passed) {
        if passed > enrolled {
            let mut err = ValidationError::new("passed_exceeds_enrolled");
            err.message = Some("passed cannot exceed enrolled".into());
            return Err(err);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultFilter {
    pub year: Option<i32>,
    pub grade: Option<String>,
}

impl ResultFilter {
    pub fn matches(&self, result: &AcademicResult) -> bool {
        self.year.map_or(true, |y| result.year == y)
            && self
                .grade
                .as_deref()
                .map_or(true, |g| result.grade.contains(g))
    }
}
