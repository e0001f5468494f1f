//! Batch mileage update
//!
//! Pick a vehicle, type one common delta, and either let each part take the
//! delta or unflag it and give it an individual value. Submission sends one
//! entry per part of the vehicle.

use super::{Effect, Loadable, Mutation, Outcome, Request, Screen};
use crate::api::models::*;
use crate::api::FormError;
use std::collections::HashMap;

/// Which widget of the form has the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MileageFocus {
    Vehicle,
    Delta,
    Parts,
}

/// A validated submission, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub car_id: CarId,
    pub batch: MileageBatch,
    /// Unflagged parts with no override; they are sent with mileage 0
    pub zeroed_parts: Vec<PartId>,
}

#[derive(Debug, Clone)]
pub struct MileageForm {
    pub cars: Loadable<Vec<Car>>,
    selected_car: Option<CarId>,
    delta: String,
    /// `None` until a vehicle is picked
    parts: Option<Loadable<Vec<CarPart>>>,
    apply_common: HashMap<PartId, bool>,
    overrides: HashMap<PartId, String>,
    pub focus: MileageFocus,
    part_cursor: usize,
    error: Option<String>,
    submitting: bool,
}

impl Default for MileageForm {
    fn default() -> Self {
        Self {
            cars: Loadable::Loading,
            selected_car: None,
            delta: String::new(),
            parts: None,
            apply_common: HashMap::new(),
            overrides: HashMap::new(),
            focus: MileageFocus::Vehicle,
            part_cursor: 0,
            error: None,
            submitting: false,
        }
    }
}

impl MileageForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&self) -> Vec<Request> {
        vec![Request::Cars]
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn selected_car(&self) -> Option<CarId> {
        self.selected_car
    }

    pub fn selected_car_label(&self) -> Option<&str> {
        let id = self.selected_car?;
        self.cars
            .ready()?
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.chassis_number.as_str())
    }

    pub fn delta(&self) -> &str {
        &self.delta
    }

    pub fn parts(&self) -> Option<&Loadable<Vec<CarPart>>> {
        self.parts.as_ref()
    }

    pub fn applies_common(&self, part_id: PartId) -> bool {
        self.apply_common.get(&part_id).copied().unwrap_or(true)
    }

    pub fn override_text(&self, part_id: PartId) -> &str {
        self.overrides.get(&part_id).map_or("", String::as_str)
    }

    pub fn part_cursor(&self) -> usize {
        self.part_cursor
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn loaded_parts(&self) -> &[CarPart] {
        self.parts
            .as_ref()
            .and_then(Loadable::ready)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn cursor_part(&self) -> Option<PartId> {
        self.loaded_parts().get(self.part_cursor).map(|p| p.id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Choose a vehicle and request its parts
    pub fn select_vehicle(&mut self, car_id: CarId) -> Vec<Effect> {
        if self.selected_car == Some(car_id) {
            return Vec::new();
        }
        self.selected_car = Some(car_id);
        self.parts = Some(Loadable::Loading);
        self.apply_common.clear();
        self.overrides.clear();
        self.part_cursor = 0;
        self.error = None;
        vec![Effect::Fetch(Request::PartsForCar(car_id))]
    }

    /// Step through the vehicle list (for ←/→ on the vehicle selector)
    pub fn cycle_vehicle(&mut self, step: isize) -> Vec<Effect> {
        let Some(cars) = self.cars.ready() else {
            return Vec::new();
        };
        if cars.is_empty() {
            return Vec::new();
        }
        let len = cars.len() as isize;
        let next = match self
            .selected_car
            .and_then(|id| cars.iter().position(|c| c.id == id))
        {
            Some(pos) => (pos as isize + step).rem_euclid(len),
            None if step < 0 => len - 1,
            None => 0,
        };
        let id = cars[next as usize].id;
        self.select_vehicle(id)
    }

    pub fn set_delta(&mut self, text: impl Into<String>) {
        self.delta = text.into();
    }

    pub fn push_delta_char(&mut self, c: char) {
        self.delta.push(c);
    }

    pub fn pop_delta_char(&mut self) {
        self.delta.pop();
    }

    /// Flip whether a part takes the common delta
    pub fn toggle_part(&mut self, part_id: PartId) {
        let flag = self.applies_common(part_id);
        self.apply_common.insert(part_id, !flag);
    }

    /// Set a part's individual mileage
    ///
    /// Empty text clears the override; text that is not a whole number is
    /// ignored and the previous value stays.
    pub fn set_override(&mut self, part_id: PartId, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            self.overrides.remove(&part_id);
        } else if text.parse::<i64>().is_ok() {
            self.overrides.insert(part_id, text.to_string());
        }
    }

    pub fn toggle_cursor_part(&mut self) {
        if let Some(id) = self.cursor_part() {
            self.toggle_part(id);
        }
    }

    /// Type into the override of the part under the cursor (unflagged only)
    pub fn push_override_char(&mut self, c: char) {
        if let Some(id) = self.cursor_part().filter(|id| !self.applies_common(*id)) {
            let text = format!("{}{}", self.override_text(id), c);
            self.edit_override(id, text);
        }
    }

    pub fn pop_override_char(&mut self) {
        if let Some(id) = self.cursor_part().filter(|id| !self.applies_common(*id)) {
            let mut text = self.override_text(id).to_string();
            text.pop();
            self.edit_override(id, text);
        }
    }

    /// Keystroke edit of an override; a lone sign is kept while typing
    fn edit_override(&mut self, part_id: PartId, text: String) {
        if text == "-" {
            self.overrides.insert(part_id, text);
        } else {
            self.set_override(part_id, &text);
        }
    }

    pub fn cursor_down(&mut self) {
        let len = self.loaded_parts().len();
        if self.part_cursor + 1 < len {
            self.part_cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.part_cursor = self.part_cursor.saturating_sub(1);
    }

    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            MileageFocus::Vehicle => MileageFocus::Delta,
            MileageFocus::Delta => MileageFocus::Parts,
            MileageFocus::Parts => MileageFocus::Vehicle,
        };
    }

    pub fn prev_focus(&mut self) {
        self.focus = match self.focus {
            MileageFocus::Vehicle => MileageFocus::Parts,
            MileageFocus::Delta => MileageFocus::Vehicle,
            MileageFocus::Parts => MileageFocus::Delta,
        };
    }

    /// Validate and build the batch; no side effects
    pub fn submit(&self) -> Result<Submission, FormError> {
        let car_id = match self.selected_car {
            Some(id) if !self.delta.trim().is_empty() => id,
            _ => return Err(FormError::form("Select a vehicle and enter the mileage")),
        };
        let delta: i64 = self
            .delta
            .trim()
            .parse()
            .map_err(|_| FormError::field("mileage", "Mileage must be a whole number"))?;

        let parts = match &self.parts {
            Some(Loadable::Ready(parts)) => parts,
            _ => return Err(FormError::form("Parts for this vehicle are not loaded yet")),
        };

        let mut zeroed_parts = Vec::new();
        let entries = parts
            .iter()
            .map(|part| {
                let mileage = if self.applies_common(part.id) {
                    delta
                } else {
                    match self.overrides.get(&part.id).and_then(|t| t.parse().ok()) {
                        Some(value) => value,
                        None => {
                            zeroed_parts.push(part.id);
                            0
                        }
                    }
                };
                MileageEntry {
                    part_id: part.id,
                    mileage,
                }
            })
            .collect();

        Ok(Submission {
            car_id,
            batch: MileageBatch { parts: entries },
            zeroed_parts,
        })
    }

    /// Submit from the UI: validation errors stay local, otherwise send
    pub fn submit_effects(&mut self) -> Vec<Effect> {
        if self.submitting {
            return Vec::new();
        }
        match self.submit() {
            Err(err) => {
                self.error = Some(err.message);
                Vec::new()
            }
            Ok(submission) => {
                self.error = None;
                self.submitting = true;
                let mut effects = Vec::new();
                if !submission.zeroed_parts.is_empty() {
                    tracing::warn!(
                        car_id = submission.car_id,
                        parts = ?submission.zeroed_parts,
                        "Unflagged parts without a value are sent with mileage 0"
                    );
                    effects.push(Effect::warn(format!(
                        "{} part(s) sent with mileage 0",
                        submission.zeroed_parts.len()
                    )));
                }
                effects.push(Effect::Fetch(Request::AddMileage(
                    submission.car_id,
                    submission.batch,
                )));
                effects
            }
        }
    }

    pub fn apply(&mut self, outcome: Outcome) -> Vec<Effect> {
        match outcome {
            Outcome::Cars(result) => {
                if let Err(err) = &result {
                    self.error = Some(err.user_message());
                }
                self.cars = result.into();
            }
            Outcome::PartsForCar(car_id, result) if self.selected_car == Some(car_id) => {
                if let Err(err) = &result {
                    self.error = Some(err.user_message());
                }
                self.apply_common.clear();
                self.overrides.clear();
                if let Ok(parts) = &result {
                    self.apply_common = parts.iter().map(|p| (p.id, true)).collect();
                }
                self.part_cursor = 0;
                self.parts = Some(result.into());
            }
            Outcome::Done(Mutation::MileageAdded, result) => {
                self.submitting = false;
                return match result {
                    Ok(()) => vec![
                        Effect::info("Part mileage updated"),
                        Effect::Navigate(Screen::Home),
                    ],
                    Err(err) => {
                        self.error = Some(err.user_message());
                        Vec::new()
                    }
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

    fn car_part(id: PartId) -> CarPart {
        CarPart {
            id,
            name: format!("part-{}", id),
            part_number: format!("PN{}", id),
            mileage: 1000,
            notes: None,
            part_type_name: None,
            max_mileage: None,
            usage_percentage: None,
        }
    }

    fn cars() -> Vec<Car> {
        [(1, "BMW-1"), (2, "AUDI-2")]
            .into_iter()
            .map(|(id, chassis)| Car {
                id,
                chassis_number: chassis.to_string(),
                driver: None,
                last_event: None,
            })
            .collect()
    }

    /// Form with vehicle 1 selected and parts 10, 11, 12 loaded
    fn loaded_form() -> MileageForm {
        let mut form = MileageForm::new();
        form.apply(Outcome::Cars(Ok(cars())));
        form.select_vehicle(1);
        form.apply(Outcome::PartsForCar(
            1,
            Ok(vec![car_part(10), car_part(11), car_part(12)]),
        ));
        form
    }

    #[test]
    fn selecting_vehicle_fetches_parts_and_flags_all() {
        let mut form = MileageForm::new();
        form.apply(Outcome::Cars(Ok(cars())));

        let effects = form.select_vehicle(1);
        assert_eq!(effects, vec![Effect::Fetch(Request::PartsForCar(1))]);
        assert!(form.parts().is_some_and(Loadable::is_loading));

        form.apply(Outcome::PartsForCar(1, Ok(vec![car_part(10), car_part(11)])));
        assert!(form.applies_common(10));
        assert!(form.applies_common(11));
        assert_eq!(form.selected_car_label(), Some("BMW-1"));
    }

    #[test]
    fn reselecting_resets_flags_and_overrides() {
        let mut form = loaded_form();
        form.toggle_part(10);
        form.set_override(10, "42");

        form.select_vehicle(2);
        form.apply(Outcome::PartsForCar(2, Ok(vec![car_part(10)])));
        assert!(form.applies_common(10));
        assert_eq!(form.override_text(10), "");
    }

    #[test]
    fn parts_for_previous_vehicle_are_ignored() {
        let mut form = loaded_form();
        form.select_vehicle(2);
        form.apply(Outcome::PartsForCar(1, Ok(vec![car_part(99)])));
        assert!(form.parts().is_some_and(Loadable::is_loading));
    }

    #[test]
    fn common_delta_goes_to_every_flagged_part() {
        let mut form = loaded_form();
        form.set_delta("500");

        let submission = form.submit().unwrap();
        assert_eq!(submission.car_id, 1);
        assert_eq!(
            submission.batch.parts,
            vec![
                MileageEntry { part_id: 10, mileage: 500 },
                MileageEntry { part_id: 11, mileage: 500 },
                MileageEntry { part_id: 12, mileage: 500 },
            ]
        );
        assert!(submission.zeroed_parts.is_empty());
    }

    #[test]
    fn unflagged_part_without_override_sends_zero() {
        let mut form = loaded_form();
        form.set_delta("500");
        form.toggle_part(11);

        let submission = form.submit().unwrap();
        assert_eq!(
            submission.batch.parts[1],
            MileageEntry { part_id: 11, mileage: 0 }
        );
        assert_eq!(submission.zeroed_parts, vec![11]);

        let effects = form.submit_effects();
        assert!(matches!(effects[0], Effect::Notify(crate::screens::NoticeLevel::Warn, _)));
        assert!(matches!(effects[1], Effect::Fetch(Request::AddMileage(1, _))));
    }

    #[test]
    fn unflagged_part_uses_its_override() {
        let mut form = loaded_form();
        form.set_delta("500");
        form.toggle_part(12);
        form.set_override(12, "120");
        form.set_override(12, "12x");

        let submission = form.submit().unwrap();
        assert_eq!(
            submission.batch.parts[2],
            MileageEntry { part_id: 12, mileage: 120 }
        );

        form.set_override(12, "");
        assert_eq!(form.override_text(12), "");
    }

    #[test]
    fn missing_vehicle_is_local_error_without_request() {
        let mut form = MileageForm::new();
        form.apply(Outcome::Cars(Ok(cars())));
        form.set_delta("500");

        assert!(form.submit().is_err());
        let effects = form.submit_effects();
        assert!(effects.is_empty());
        assert!(form.error().is_some());
        assert!(!form.is_submitting());
    }

    #[test]
    fn non_numeric_delta_is_local_error_without_request() {
        let mut form = loaded_form();
        form.set_delta("abc");

        let err = form.submit().unwrap_err();
        assert_eq!(err.field, Some("mileage"));
        assert!(form.submit_effects().is_empty());
        assert_eq!(form.error(), Some("Mileage must be a whole number"));

        // Backend mileage is integral
        form.set_delta("500.5");
        assert_eq!(
            form.submit().unwrap_err().message,
            "Mileage must be a whole number"
        );
    }

    #[test]
    fn empty_delta_is_local_error() {
        let mut form = loaded_form();
        form.set_delta("   ");
        assert!(form.submit_effects().is_empty());
        assert!(form.error().is_some());
    }

    #[test]
    fn success_navigates_home_and_failure_keeps_form() {
        let mut form = loaded_form();
        form.set_delta("500");
        form.submit_effects();
        assert!(form.is_submitting());

        let effects = form.apply(Outcome::Done(
            Mutation::MileageAdded,
            Err(ApiError::Network("refused".into())),
        ));
        assert!(effects.is_empty());
        assert_eq!(form.error(), Some("Backend unreachable"));
        assert_eq!(form.delta(), "500");

        form.submit_effects();
        let effects = form.apply(Outcome::Done(Mutation::MileageAdded, Ok(())));
        assert!(effects.contains(&Effect::Navigate(Screen::Home)));
    }

    #[test]
    fn vehicle_cycling_wraps() {
        let mut form = MileageForm::new();
        form.apply(Outcome::Cars(Ok(cars())));
        form.cycle_vehicle(1);
        assert_eq!(form.selected_car(), Some(1));
        form.cycle_vehicle(1);
        assert_eq!(form.selected_car(), Some(2));
        form.cycle_vehicle(1);
        assert_eq!(form.selected_car(), Some(1));
        form.cycle_vehicle(-1);
        assert_eq!(form.selected_car(), Some(2));
    }

    #[test]
    fn submit_waits_for_parts_of_selected_vehicle() {
        let mut form = MileageForm::new();
        form.apply(Outcome::Cars(Ok(cars())));
        form.select_vehicle(1);
        form.set_delta("500");

        // Parts request still in flight
        assert_eq!(
            form.submit().unwrap_err().message,
            "Parts for this vehicle are not loaded yet"
        );
        assert!(form.submit_effects().is_empty());
        assert!(!form.is_submitting());

        // Parts request failed
        form.apply(Outcome::PartsForCar(
            1,
            Err(ApiError::Network("refused".into())),
        ));
        assert!(form.submit_effects().is_empty());
        assert_eq!(
            form.error(),
            Some("Parts for this vehicle are not loaded yet")
        );
    }

    #[test]
    fn typed_override_goes_to_cursor_part() {
        let mut form = loaded_form();
        form.set_delta("500");

        // Flagged parts take the delta; typing does nothing
        form.push_override_char('7');
        assert_eq!(form.override_text(10), "");

        form.cursor_down();
        form.toggle_cursor_part();
        for c in ['-', '4', 'x', '0'] {
            form.push_override_char(c);
        }
        assert_eq!(form.override_text(11), "-40");

        let submission = form.submit().unwrap();
        assert_eq!(
            submission.batch.parts[1],
            MileageEntry { part_id: 11, mileage: -40 }
        );

        form.pop_override_char();
        form.pop_override_char();
        assert_eq!(form.override_text(11), "-");
        // A lone sign is not a value yet
        assert_eq!(form.submit().unwrap().zeroed_parts, vec![11]);

        form.pop_override_char();
        assert_eq!(form.override_text(11), "");
    }
}
