use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SOURCE_NAME: &str = "Little White Lies";

/// Sentinel written to the CSV for author/date when the field was not found,
/// matching the site export format. The in-memory model uses `None`.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewRecord {
    pub review_id: String,
    pub source_name: String,
    pub source_url: String,
    pub film_title: Option<String>,
    pub review_date: Option<String>,
    pub numerical_rating: Option<f64>,
    pub text_complete: Option<String>,
    pub author: Option<String>,
    pub cited_works_list: String,
}

impl ReviewRecord {
    pub fn new(source_url: &str) -> Self {
        Self {
            review_id: Uuid::new_v4().to_string(),
            source_name: SOURCE_NAME.to_string(),
            source_url: source_url.to_string(),
            film_title: None,
            review_date: None,
            numerical_rating: None,
            text_complete: None,
            author: None,
            cited_works_list: String::new(),
        }
    }
}
