//! Wire models for the fleet backend
//!
//! Shapes follow what the backend actually returns, which is looser than its
//! own schema: optional fields may be missing, history values may be numbers
//! or strings, and event car references may be bare ids or objects.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type CarId = i64;
pub type PartId = i64;
pub type PartTypeId = i64;
pub type EventId = i64;
pub type HistoryId = i64;

// ─────────────────────────────────────────────────────────────────────────────
// Entities
// ─────────────────────────────────────────────────────────────────────────────

/// A vehicle; the chassis number is its display identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    pub chassis_number: String,
    #[serde(default)]
    pub driver: Option<String>,
    #[serde(default)]
    pub last_event: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartType {
    pub id: PartTypeId,
    pub name: String,
    /// Wear threshold; parts of this type are 100% worn at this mileage
    #[serde(default)]
    pub max_mileage: Option<i64>,
}

/// A part as listed by the parts catalog and the single-part endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,
    pub name: String,
    pub part_number: String,
    pub mileage: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub car_id: Option<CarId>,
    #[serde(default)]
    pub car_chassis_number: Option<String>,
    #[serde(default)]
    pub part_type_id: Option<PartTypeId>,
}

/// A part as returned by the parts-for-car endpoint, with wear data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarPart {
    pub id: PartId,
    pub name: String,
    pub part_number: String,
    pub mileage: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub part_type_name: Option<String>,
    #[serde(default)]
    pub max_mileage: Option<i64>,
    #[serde(default)]
    pub usage_percentage: Option<f64>,
}

impl CarPart {
    /// Server-computed wear when present, otherwise derived locally
    pub fn wear_percent(&self) -> Option<f64> {
        self.usage_percentage
            .or_else(|| wear_percent(self.mileage, self.max_mileage))
    }
}

/// `mileage / max_mileage * 100`, rounded to two decimals
///
/// Absent when the threshold is unknown or not positive.
pub fn wear_percent(mileage: i64, max_mileage: Option<i64>) -> Option<f64> {
    let max = max_mileage.filter(|m| *m > 0)?;
    let pct = mileage as f64 / max as f64 * 100.0;
    Some((pct * 100.0).round() / 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// Calendar date as sent by the backend (`YYYY-MM-DD`, possibly with time)
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "de_car_refs")]
    pub cars: Vec<CarId>,
    #[serde(default)]
    pub car_chassis_numbers: Vec<String>,
}

impl Event {
    /// Parsed calendar date; `None` when the backend sent something odd
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let head = self.date.get(..10).unwrap_or(&self.date);
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }
}

/// One audit-log row: a single field change on a part or a vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: HistoryId,
    #[serde(default)]
    pub timestamp: String,
    pub changed_field: String,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub old_value: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub new_value: Option<String>,
}

impl HistoryRecord {
    /// Timestamp rendered for display, raw text when it does not parse
    pub fn display_timestamp(&self) -> String {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return ts.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S").to_string();
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%a, %d %b %Y %H:%M:%S GMT"] {
            if let Ok(ts) = NaiveDateTime::parse_from_str(&self.timestamp, fmt) {
                return ts.format("%Y-%m-%d %H:%M:%S").to_string();
            }
        }
        self.timestamp.clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payloads
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarPayload {
    pub chassis_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartPayload {
    pub name: String,
    pub part_number: String,
    pub mileage: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub car_id: CarId,
    pub part_type_id: PartTypeId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartTypePayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_mileage: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPayload {
    pub name: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventAssignment {
    pub event_id: EventId,
    pub car_id: CarId,
}

/// One line of a batch mileage update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MileageEntry {
    pub part_id: PartId,
    pub mileage: i64,
}

/// Body of `PUT /add-mileage/{car_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MileageBatch {
    pub parts: Vec<MileageEntry>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Lenient deserializers
// ─────────────────────────────────────────────────────────────────────────────

/// History values arrive as strings, numbers or null depending on the field
fn de_loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CarRef {
    Id(CarId),
    Object { id: CarId },
}

/// Event car references: `[1, 2]` or `[{"id": 1, ...}, ...]`
fn de_car_refs<'de, D>(deserializer: D) -> Result<Vec<CarId>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs = Option::<Vec<CarRef>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(refs
        .into_iter()
        .map(|r| match r {
            CarRef::Id(id) | CarRef::Object { id } => id,
        })
        .collect())
}
