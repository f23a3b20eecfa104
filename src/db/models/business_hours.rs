use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use validator::Validate;

/// Weekly opening hours for one day of the week (0 = Sunday).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHours {
    pub id: Uuid,
    pub day_of_week: i16,
    pub open_time: String,
    pub close_time: String,
    pub is_off: bool,
    pub breaks: Vec<BreakWindow>,
}

/// Row shape of `business_hours`; breaks live in their own table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BusinessHoursRow {
    pub id: Uuid,
    pub day_of_week: i16,
    pub open_time: String,
    pub close_time: String,
    pub is_off: bool,
}

impl BusinessHoursRow {
    pub fn with_breaks(self, breaks: Vec<BreakWindow>) -> BusinessHours {
        BusinessHours {
            id: self.id,
            day_of_week: self.day_of_week,
            open_time: self.open_time,
            close_time: self.close_time,
            is_off: self.is_off,
            breaks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakWindow {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHoursInput {
    #[validate(range(min = 0, max = 6, message = "dayOfWeek must be between 0 and 6"))]
    pub day_of_week: i16,
    pub open_time: String,
    pub close_time: String,
    pub is_off: bool,
}
