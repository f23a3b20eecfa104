use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Replaces the weekly hours for one calendar date. Open and close times are
/// either both present or both absent.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDateOverride {
    pub id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub is_off: bool,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateOverrideInput {
    pub date: Date,
    pub is_off: bool,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
}
