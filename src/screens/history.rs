//! Audit-log views for a part or a vehicle
//!
//! Raw history values are ids for some fields; they are shown as labels from
//! the separately fetched vehicle and part-type lists.

use super::{Effect, Loadable, Mutation, Outcome, Request};
use crate::api::models::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySubject {
    Part(PartId),
    Car(CarId),
}

/// One display-ready history line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub timestamp: String,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
}

/// How a changed field's values should be labelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    Car,
    PartType,
    Raw,
}

#[derive(Debug, Clone)]
pub struct HistoryView {
    pub subject: HistorySubject,
    pub records: Loadable<Vec<HistoryRecord>>,
    pub cars: Loadable<Vec<Car>>,
    pub part_types: Loadable<Vec<PartType>>,
    clearing: bool,
}

impl HistoryView {
    pub fn new(subject: HistorySubject) -> Self {
        Self {
            subject,
            records: Loadable::Loading,
            cars: Loadable::Loading,
            // Vehicle history never needs part-type labels
            part_types: match subject {
                HistorySubject::Part(_) => Loadable::Loading,
                HistorySubject::Car(_) => Loadable::Ready(Vec::new()),
            },
            clearing: false,
        }
    }

    pub fn mount(&self) -> Vec<Request> {
        match self.subject {
            HistorySubject::Part(id) => {
                vec![Request::PartHistory(id), Request::Cars, Request::PartTypes]
            }
            HistorySubject::Car(id) => vec![Request::CarHistory(id), Request::Cars],
        }
    }

    fn lookup(&self, field: &str) -> Lookup {
        match self.subject {
            HistorySubject::Part(_) if field == "car_id" => Lookup::Car,
            HistorySubject::Part(_) if field == "part_type_id" => Lookup::PartType,
            HistorySubject::Car(_) if field.starts_with("part_moved") || field == "part_assigned" => {
                Lookup::Car
            }
            _ => Lookup::Raw,
        }
    }

    /// Label for one raw value of a field
    ///
    /// `-` for empty values, `…` while the needed list is loading, and the
    /// raw value when nothing matches.
    pub fn resolve(&self, field: &str, raw: Option<&str>) -> String {
        let raw = match raw.map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => return "-".to_string(),
        };
        let found = match self.lookup(field) {
            Lookup::Raw => return raw.to_string(),
            Lookup::Car => match &self.cars {
                Loadable::Loading => return "…".to_string(),
                Loadable::Failed(_) => None,
                Loadable::Ready(cars) => cars
                    .iter()
                    .find(|c| c.id.to_string() == raw)
                    .map(|c| c.chassis_number.clone()),
            },
            Lookup::PartType => match &self.part_types {
                Loadable::Loading => return "…".to_string(),
                Loadable::Failed(_) => None,
                Loadable::Ready(types) => types
                    .iter()
                    .find(|t| t.id.to_string() == raw)
                    .map(|t| t.name.clone()),
            },
        };
        found.unwrap_or_else(|| raw.to_string())
    }

    pub fn rows(&self) -> Vec<HistoryRow> {
        let Some(records) = self.records.ready() else {
            return Vec::new();
        };
        records
            .iter()
            .map(|rec| HistoryRow {
                timestamp: rec.display_timestamp(),
                field: rec.changed_field.clone(),
                old_value: self.resolve(&rec.changed_field, rec.old_value.as_deref()),
                new_value: self.resolve(&rec.changed_field, rec.new_value.as_deref()),
            })
            .collect()
    }

    pub fn clear_prompt(&self) -> &'static str {
        match self.subject {
            HistorySubject::Part(_) => "Delete the whole history of this part? This cannot be undone.",
            HistorySubject::Car(_) => {
                "Delete the whole history of this vehicle? This cannot be undone."
            }
        }
    }

    /// Issued after the operator confirmed [`HistoryView::clear_prompt`]
    pub fn clear(&mut self) -> Vec<Effect> {
        if self.clearing {
            return Vec::new();
        }
        self.clearing = true;
        vec![Effect::Fetch(match self.subject {
            HistorySubject::Part(id) => Request::ClearPartHistory(id),
            HistorySubject::Car(id) => Request::ClearCarHistory(id),
        })]
    }

    pub fn apply(&mut self, outcome: Outcome) -> Vec<Effect> {
        match outcome {
            Outcome::History(result) => self.records = result.into(),
            Outcome::Cars(result) => self.cars = result.into(),
            Outcome::PartTypes(result) => self.part_types = result.into(),
            Outcome::Done(Mutation::HistoryCleared, result) => {
                self.clearing = false;
                return match result {
                    Ok(()) => {
                        self.records = Loadable::Ready(Vec::new());
                        vec![Effect::info("History cleared")]
                    }
                    Err(err) => vec![Effect::warn(err.user_message())],
                };
            }
            _ => {}
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    fn record(field: &str, old: Option<&str>, new: Option<&str>) -> HistoryRecord {
        HistoryRecord {
            id: 1,
            timestamp: "2024-01-02T03:04:05".into(),
            changed_field: field.into(),
            old_value: old.map(str::to_string),
            new_value: new.map(str::to_string),
        }
    }

    fn cars() -> Vec<Car> {
        vec![Car {
            id: 3,
            chassis_number: "BMW-3".into(),
            driver: None,
            last_event: None,
        }]
    }

    #[test]
    fn part_history_resolves_vehicle_and_type() {
        let mut view = HistoryView::new(HistorySubject::Part(1));
        view.apply(Outcome::History(Ok(vec![
            record("car_id", Some("3"), Some("99")),
            record("part_type_id", None, Some("2")),
            record("mileage", Some("100"), Some("600")),
        ])));

        // Lists still loading
        assert_eq!(view.rows()[0].old_value, "…");

        view.apply(Outcome::Cars(Ok(cars())));
        view.apply(Outcome::PartTypes(Ok(vec![PartType {
            id: 2,
            name: "Brakes".into(),
            max_mileage: None,
        }])));

        let rows = view.rows();
        assert_eq!(rows[0].old_value, "BMW-3");
        assert_eq!(rows[0].new_value, "99");
        assert_eq!(rows[1].old_value, "-");
        assert_eq!(rows[1].new_value, "Brakes");
        assert_eq!(rows[2].new_value, "600");
        assert_eq!(rows[0].timestamp, "2024-01-02 03:04:05");
    }

    #[test]
    fn car_history_resolves_part_moves() {
        let mut view = HistoryView::new(HistorySubject::Car(3));
        view.apply(Outcome::Cars(Ok(cars())));
        assert_eq!(view.resolve("part_moved_from", Some("3")), "BMW-3");
        assert_eq!(view.resolve("part_assigned", Some("3")), "BMW-3");
        assert_eq!(view.resolve("driver", Some("3")), "3");
        assert_eq!(view.resolve("part_assigned", Some("")), "-");
    }

    #[test]
    fn failed_reference_list_falls_back_to_raw() {
        let mut view = HistoryView::new(HistorySubject::Car(3));
        view.apply(Outcome::Cars(Err(ApiError::Network("down".into()))));
        assert_eq!(view.resolve("part_assigned", Some("3")), "3");
    }

    #[test]
    fn clearing_empties_list_on_success_only() {
        let mut view = HistoryView::new(HistorySubject::Part(4));
        view.apply(Outcome::History(Ok(vec![record("mileage", None, Some("1"))])));

        assert_eq!(view.clear(), vec![Effect::Fetch(Request::ClearPartHistory(4))]);
        view.apply(Outcome::Done(
            Mutation::HistoryCleared,
            Err(ApiError::Network("down".into())),
        ));
        assert_eq!(view.records.ready().map(Vec::len), Some(1));

        view.clear();
        view.apply(Outcome::Done(Mutation::HistoryCleared, Ok(())));
        assert_eq!(view.records.ready().map(Vec::len), Some(0));
    }
}
