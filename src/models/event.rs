use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Event {
    pub fn new(id: &str, name: &str, slug: &str, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            start_date,
            end_date,
            is_active: true,
        }
    }

    /// Number of calendar days the event spans, counting both ends.
    pub fn duration_days(&self) -> i64 {
        ((self.end_date - self.start_date).num_days() + 1).max(0)
    }
}
