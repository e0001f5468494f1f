//! Catalog screens: one fetched collection, filtered and sorted client-side
//!
//! The four catalogs (vehicles, parts, part types, events) share a single
//! [`Catalog`] state and differ only through their [`CatalogRow`] impl.

use super::{Effect, Loadable, Mutation, Outcome, Request, Screen};
use crate::api::models::*;
use crate::api::ApiError;
use std::cmp::Ordering;

/// Per-entity behavior of a catalog table
pub trait CatalogRow: Clone {
    /// Column headers, matching [`CatalogRow::cells`]
    const HEADERS: &'static [&'static str];
    /// Columns the sort toggle can cycle through
    const SORT_COLUMNS: &'static [&'static str];
    /// Rows embed labels from other resources, so deletes re-fetch
    const REFETCH_ON_DELETE: bool;
    /// Singular noun for prompts and notices
    const NOUN: &'static str;

    fn id(&self) -> i64;
    /// Text fields the filter searches
    fn filter_fields(&self) -> Vec<&str>;
    /// Ordering by `SORT_COLUMNS[column]`, without the id tie-break
    fn compare(&self, other: &Self, column: usize) -> Ordering;
    fn cells(&self) -> Vec<String>;
    /// Human label for confirmations
    fn label(&self) -> String;

    fn list_request() -> Request;
    fn delete_request(id: i64) -> Request;
    /// Pull this catalog's rows out of an outcome
    fn take_rows(outcome: Outcome) -> Option<Result<Vec<Self>, ApiError>>;

    fn new_route() -> Screen;
    fn open_route(&self) -> Screen;
    fn history_route(&self) -> Option<Screen> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: usize,
    pub ascending: bool,
}

/// Catalog screen state
#[derive(Debug, Clone)]
pub struct Catalog<T: CatalogRow> {
    pub rows: Loadable<Vec<T>>,
    filter: String,
    sort: Option<SortState>,
    selected: usize,
}

impl<T: CatalogRow> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            rows: Loadable::Loading,
            filter: String::new(),
            sort: None,
            selected: 0,
        }
    }
}

impl<T: CatalogRow> Catalog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&self) -> Vec<Request> {
        vec![T::list_request()]
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.clamp_selection();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter.push(c);
        self.clamp_selection();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter.pop();
        self.clamp_selection();
    }

    /// Sort by `column`; picking the active column again flips direction
    pub fn toggle_sort(&mut self, column: usize) {
        if column >= T::SORT_COLUMNS.len() {
            return;
        }
        self.sort = match self.sort {
            Some(s) if s.column == column => Some(SortState {
                column,
                ascending: !s.ascending,
            }),
            _ => Some(SortState {
                column,
                ascending: true,
            }),
        };
    }

    /// Rows after filter and sort, in display order
    pub fn visible(&self) -> Vec<&T> {
        let Some(rows) = self.rows.ready() else {
            return Vec::new();
        };
        let needle = self.filter.trim().to_lowercase();
        let mut out: Vec<&T> = rows
            .iter()
            .filter(|row| {
                needle.is_empty()
                    || row
                        .filter_fields()
                        .iter()
                        .any(|f| f.to_lowercase().contains(&needle))
            })
            .collect();

        if let Some(sort) = self.sort {
            out.sort_by(|a, b| {
                let ord = a.compare(b, sort.column).then_with(|| a.id().cmp(&b.id()));
                if sort.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
        out
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&T> {
        self.visible().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let len = self.visible().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Confirmation text for deleting the selected row
    pub fn delete_prompt(&self) -> Option<String> {
        self.selected()
            .map(|row| format!("Delete {} {}?", T::NOUN, row.label()))
    }

    /// Issued after the operator confirmed the prompt
    pub fn delete_selected(&self) -> Option<Request> {
        self.selected().map(|row| T::delete_request(row.id()))
    }

    fn remove(&mut self, id: i64) {
        if let Some(rows) = self.rows.ready_mut() {
            rows.retain(|row| row.id() != id);
        }
        self.clamp_selection();
    }

    pub fn apply(&mut self, outcome: Outcome) -> Vec<Effect> {
        match outcome {
            Outcome::Done(Mutation::Deleted(id), Ok(())) => {
                let mut effects = vec![Effect::info(format!("Deleted {} #{}", T::NOUN, id))];
                if T::REFETCH_ON_DELETE {
                    effects.push(Effect::Fetch(T::list_request()));
                } else {
                    self.remove(id);
                }
                effects
            }
            Outcome::Done(_, Err(err)) => vec![Effect::warn(err.user_message())],
            other => {
                if let Some(result) = T::take_rows(other) {
                    self.rows = result.into();
                    self.clamp_selection();
                }
                Vec::new()
            }
        }
    }
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row impls
// ─────────────────────────────────────────────────────────────────────────────

impl CatalogRow for Car {
    const HEADERS: &'static [&'static str] = &["ID", "Chassis", "Driver", "Last event"];
    const SORT_COLUMNS: &'static [&'static str] = &["id", "chassis"];
    const REFETCH_ON_DELETE: bool = false;
    const NOUN: &'static str = "vehicle";

    fn id(&self) -> i64 {
        self.id
    }

    fn filter_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.chassis_number.as_str()];
        if let Some(driver) = &self.driver {
            fields.push(driver);
        }
        fields
    }

    fn compare(&self, other: &Self, column: usize) -> Ordering {
        match column {
            1 => cmp_text(&self.chassis_number, &other.chassis_number),
            _ => self.id.cmp(&other.id),
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.chassis_number.clone(),
            or_dash(self.driver.as_deref()),
            or_dash(self.last_event.as_deref()),
        ]
    }

    fn label(&self) -> String {
        self.chassis_number.clone()
    }

    fn list_request() -> Request {
        Request::Cars
    }

    fn delete_request(id: i64) -> Request {
        Request::DeleteCar(id)
    }

    fn take_rows(outcome: Outcome) -> Option<Result<Vec<Self>, ApiError>> {
        match outcome {
            Outcome::Cars(result) => Some(result),
            _ => None,
        }
    }

    fn new_route() -> Screen {
        Screen::CarForm(None)
    }

    fn open_route(&self) -> Screen {
        Screen::CarDetail(self.id)
    }

    fn history_route(&self) -> Option<Screen> {
        Some(Screen::CarHistory(self.id))
    }
}

impl CatalogRow for Part {
    const HEADERS: &'static [&'static str] =
        &["ID", "Name", "Part no.", "Mileage", "Vehicle", "Notes"];
    const SORT_COLUMNS: &'static [&'static str] = &["id", "name", "mileage"];
    const REFETCH_ON_DELETE: bool = true;
    const NOUN: &'static str = "part";

    fn id(&self) -> i64 {
        self.id
    }

    fn filter_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        if let Some(chassis) = &self.car_chassis_number {
            fields.push(chassis);
        }
        fields
    }

    fn compare(&self, other: &Self, column: usize) -> Ordering {
        match column {
            1 => cmp_text(&self.name, &other.name),
            2 => self.mileage.cmp(&other.mileage),
            _ => self.id.cmp(&other.id),
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.part_number.clone(),
            self.mileage.to_string(),
            or_dash(self.car_chassis_number.as_deref()),
            or_dash(self.notes.as_deref()),
        ]
    }

    fn label(&self) -> String {
        format!("{} ({})", self.name, self.part_number)
    }

    fn list_request() -> Request {
        Request::Parts
    }

    fn delete_request(id: i64) -> Request {
        Request::DeletePart(id)
    }

    fn take_rows(outcome: Outcome) -> Option<Result<Vec<Self>, ApiError>> {
        match outcome {
            Outcome::Parts(result) => Some(result),
            _ => None,
        }
    }

    fn new_route() -> Screen {
        Screen::PartForm(None)
    }

    fn open_route(&self) -> Screen {
        Screen::PartForm(Some(self.id))
    }

    fn history_route(&self) -> Option<Screen> {
        Some(Screen::PartHistory(self.id))
    }
}

impl CatalogRow for PartType {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Max mileage"];
    const SORT_COLUMNS: &'static [&'static str] = &["id", "name", "max mileage"];
    const REFETCH_ON_DELETE: bool = false;
    const NOUN: &'static str = "part type";

    fn id(&self) -> i64 {
        self.id
    }

    fn filter_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn compare(&self, other: &Self, column: usize) -> Ordering {
        match column {
            1 => cmp_text(&self.name, &other.name),
            // Unknown thresholds sort first
            2 => self.max_mileage.cmp(&other.max_mileage),
            _ => self.id.cmp(&other.id),
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.max_mileage
                .map_or_else(|| "-".to_string(), |m| m.to_string()),
        ]
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn list_request() -> Request {
        Request::PartTypes
    }

    fn delete_request(id: i64) -> Request {
        Request::DeletePartType(id)
    }

    fn take_rows(outcome: Outcome) -> Option<Result<Vec<Self>, ApiError>> {
        match outcome {
            Outcome::PartTypes(result) => Some(result),
            _ => None,
        }
    }

    fn new_route() -> Screen {
        Screen::PartTypeForm(None)
    }

    fn open_route(&self) -> Screen {
        Screen::PartTypeForm(Some(self.id))
    }
}

impl CatalogRow for Event {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Date", "Vehicles", "Notes"];
    const SORT_COLUMNS: &'static [&'static str] = &["id", "name", "date"];
    const REFETCH_ON_DELETE: bool = true;
    const NOUN: &'static str = "event";

    fn id(&self) -> i64 {
        self.id
    }

    fn filter_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.car_chassis_numbers.iter().map(String::as_str));
        fields
    }

    fn compare(&self, other: &Self, column: usize) -> Ordering {
        match column {
            1 => cmp_text(&self.name, &other.name),
            2 => self
                .parsed_date()
                .cmp(&other.parsed_date())
                .then_with(|| self.date.cmp(&other.date)),
            _ => self.id.cmp(&other.id),
        }
    }

    fn cells(&self) -> Vec<String> {
        let vehicles = if self.car_chassis_numbers.is_empty() {
            "-".to_string()
        } else {
            self.car_chassis_numbers.join(", ")
        };
        vec![
            self.id.to_string(),
            self.name.clone(),
            or_dash(Some(self.date.as_str())),
            vehicles,
            or_dash(self.notes.as_deref()),
        ]
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn list_request() -> Request {
        Request::Events
    }

    fn delete_request(id: i64) -> Request {
        Request::DeleteEvent(id)
    }

    fn take_rows(outcome: Outcome) -> Option<Result<Vec<Self>, ApiError>> {
        match outcome {
            Outcome::Events(result) => Some(result),
            _ => None,
        }
    }

    fn new_route() -> Screen {
        Screen::EventForm(None)
    }

    fn open_route(&self) -> Screen {
        Screen::EventForm(Some(self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::NoticeLevel;

    fn car(id: i64, chassis: &str, driver: Option<&str>) -> Car {
        Car {
            id,
            chassis_number: chassis.to_string(),
            driver: driver.map(str::to_string),
            last_event: None,
        }
    }

    fn part(id: i64, name: &str, mileage: i64, chassis: &str) -> Part {
        Part {
            id,
            name: name.to_string(),
            part_number: format!("PN-{}", id),
            mileage,
            notes: None,
            car_id: Some(1),
            car_chassis_number: Some(chassis.to_string()),
            part_type_id: Some(1),
        }
    }

    fn loaded<T: CatalogRow>(rows: Vec<T>) -> Catalog<T> {
        let mut catalog = Catalog::new();
        catalog.rows = Loadable::Ready(rows);
        catalog
    }

    #[test]
    fn filter_is_case_insensitive_over_label_fields() {
        let mut catalog = loaded(vec![
            car(1, "bmw-e46", None),
            car(2, "AUDI-A4", Some("Jan BMWski")),
            car(3, "VW-GOLF", Some("Ola")),
        ]);
        catalog.set_filter("BMW");
        let ids: Vec<i64> = catalog.visible().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn sort_toggle_reverses_with_id_tie_break() {
        let mut catalog = loaded(vec![
            part(3, "Brake pad", 100, "A"),
            part(1, "Brake pad", 900, "B"),
            part(2, "Air filter", 500, "C"),
        ]);

        catalog.toggle_sort(1);
        let ids: Vec<i64> = catalog.visible().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);

        catalog.toggle_sort(1);
        let ids: Vec<i64> = catalog.visible().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(
            catalog.sort(),
            Some(SortState {
                column: 1,
                ascending: false
            })
        );

        catalog.toggle_sort(2);
        let ids: Vec<i64> = catalog.visible().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn parts_filter_on_vehicle_chassis() {
        let mut catalog = loaded(vec![
            part(1, "Clutch", 10, "BMW-1"),
            part(2, "Clutch", 10, "AUDI-2"),
        ]);
        catalog.set_filter("bmw");
        assert_eq!(catalog.visible().len(), 1);
        assert_eq!(catalog.visible()[0].id, 1);
    }

    #[test]
    fn events_filter_on_any_assigned_chassis() {
        let event = Event {
            id: 5,
            name: "Track day".into(),
            date: "2024-05-01".into(),
            notes: None,
            cars: vec![1, 2],
            car_chassis_numbers: vec!["AUDI-1".into(), "BMW-2".into()],
        };
        let mut catalog = loaded(vec![event]);
        catalog.set_filter("bmw");
        assert_eq!(catalog.visible().len(), 1);
        catalog.set_filter("opel");
        assert!(catalog.visible().is_empty());
    }

    #[test]
    fn delete_splices_cars_but_refetches_parts() {
        let mut cars = loaded(vec![car(1, "A", None), car(2, "B", None)]);
        let effects = cars.apply(Outcome::Done(Mutation::Deleted(1), Ok(())));
        assert_eq!(cars.rows.ready().map(Vec::len), Some(1));
        assert!(!effects.contains(&Effect::Fetch(Request::Cars)));

        let mut parts = loaded(vec![part(1, "X", 0, "A")]);
        let effects = parts.apply(Outcome::Done(Mutation::Deleted(1), Ok(())));
        assert!(effects.contains(&Effect::Fetch(Request::Parts)));
    }

    #[test]
    fn failed_delete_keeps_rows_and_warns() {
        let mut cars = loaded(vec![car(1, "A", None)]);
        let effects = cars.apply(Outcome::Done(
            Mutation::Deleted(1),
            Err(ApiError::Network("refused".into())),
        ));
        assert_eq!(cars.rows.ready().map(Vec::len), Some(1));
        assert!(matches!(effects[0], Effect::Notify(NoticeLevel::Warn, _)));
    }

    #[test]
    fn selection_follows_filter() {
        let mut catalog = loaded(vec![car(1, "A", None), car(2, "B", None), car(3, "C", None)]);
        catalog.select_next();
        catalog.select_next();
        assert_eq!(catalog.selected().map(|c| c.id), Some(3));
        catalog.set_filter("a");
        assert_eq!(catalog.selected().map(|c| c.id), Some(1));
        assert_eq!(catalog.delete_selected(), Some(Request::DeleteCar(1)));
    }
}
