//! Create/edit screens for vehicles, parts, part types and events

use super::form::{FormField, FormState};
use super::{Effect, Loadable, Mutation, Outcome, Request, Screen};
use crate::api::models::*;
use crate::api::{ErrorKind, FormError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Car,
    Part,
    PartType,
    Event,
}

impl EntityKind {
    fn noun(self) -> &'static str {
        match self {
            Self::Car => "Vehicle",
            Self::Part => "Part",
            Self::PartType => "Part type",
            Self::Event => "Event",
        }
    }

    fn catalog(self) -> Screen {
        match self {
            Self::Car => Screen::Home,
            Self::Part => Screen::Parts,
            Self::PartType => Screen::PartTypes,
            Self::Event => Screen::Events,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Field layouts and payload builders
// ─────────────────────────────────────────────────────────────────────────────

fn car_fields(editing: bool) -> FormState {
    let driver = FormField::text("driver", "Driver");
    FormState::new(vec![
        FormField::text("chassis_number", "Chassis number").required(),
        if editing { driver.required() } else { driver },
    ])
}

fn part_fields() -> FormState {
    FormState::new(vec![
        FormField::text("name", "Name").required(),
        FormField::text("part_number", "Part number").required(),
        FormField::number("mileage", "Mileage").required(),
        FormField::select("car_id", "Vehicle").required(),
        FormField::select("part_type_id", "Part type").required(),
        FormField::text("notes", "Notes"),
    ])
}

fn part_type_fields() -> FormState {
    FormState::new(vec![
        FormField::text("name", "Name").required(),
        FormField::number("max_mileage", "Max mileage"),
    ])
}

fn event_fields() -> FormState {
    FormState::new(vec![
        FormField::text("name", "Name").required(),
        FormField::date("date", "Date").required(),
        FormField::text("notes", "Notes"),
    ])
}

/// Validated field value; `validate()` has already run
fn required_text(form: &FormState, key: &'static str) -> Result<String, FormError> {
    form.text(key)
        .ok_or_else(|| FormError::field(key, format!("{} is required", key)))
}

fn required_number(form: &FormState, key: &'static str) -> Result<i64, FormError> {
    form.number(key)
        .ok_or_else(|| FormError::field(key, format!("{} must be a number", key)))
}

pub fn car_payload(form: &FormState) -> Result<CarPayload, FormError> {
    form.validate()?;
    Ok(CarPayload {
        chassis_number: required_text(form, "chassis_number")?,
        driver: form.text("driver"),
    })
}

pub fn part_payload(form: &FormState) -> Result<PartPayload, FormError> {
    form.validate()?;
    Ok(PartPayload {
        name: required_text(form, "name")?,
        part_number: required_text(form, "part_number")?,
        mileage: required_number(form, "mileage")?,
        notes: form.text("notes"),
        car_id: required_number(form, "car_id")?,
        part_type_id: required_number(form, "part_type_id")?,
    })
}

pub fn part_type_payload(form: &FormState) -> Result<PartTypePayload, FormError> {
    form.validate()?;
    Ok(PartTypePayload {
        name: required_text(form, "name")?,
        max_mileage: form.number("max_mileage"),
    })
}

pub fn event_payload(form: &FormState) -> Result<EventPayload, FormError> {
    form.validate()?;
    Ok(EventPayload {
        name: required_text(form, "name")?,
        date: required_text(form, "date")?,
        notes: form.text("notes"),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Edit screen
// ─────────────────────────────────────────────────────────────────────────────

/// Create or edit one entity
#[derive(Debug, Clone)]
pub struct EditScreen {
    pub kind: EntityKind,
    pub id: Option<i64>,
    pub form: FormState,
    /// Target entity on edit; `Ready(())` straight away on create
    pub entity: Loadable<()>,
    error: Option<String>,
    submitting: bool,
    /// Chassis label of a part whose vehicle id the backend left out
    pending_chassis: Option<String>,
}

impl EditScreen {
    pub fn new(kind: EntityKind, id: Option<i64>) -> Self {
        let form = match kind {
            EntityKind::Car => car_fields(id.is_some()),
            EntityKind::Part => part_fields(),
            EntityKind::PartType => part_type_fields(),
            EntityKind::Event => event_fields(),
        };
        Self {
            kind,
            id,
            form,
            entity: if id.is_some() {
                Loadable::Loading
            } else {
                Loadable::Ready(())
            },
            error: None,
            submitting: false,
            pending_chassis: None,
        }
    }

    pub fn mount(&self) -> Vec<Request> {
        let mut requests = Vec::new();
        if let Some(id) = self.id {
            requests.push(match self.kind {
                EntityKind::Car => Request::Car(id),
                EntityKind::Part => Request::Part(id),
                EntityKind::PartType => Request::PartType(id),
                EntityKind::Event => Request::Event(id),
            });
        }
        if self.kind == EntityKind::Part {
            requests.push(Request::Cars);
            requests.push(Request::PartTypes);
        }
        requests
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validate locally, then build the save request
    pub fn submit(&mut self) -> Vec<Effect> {
        if self.submitting || !matches!(self.entity, Loadable::Ready(())) {
            return Vec::new();
        }
        let request = match self.kind {
            EntityKind::Car => car_payload(&self.form).map(|p| Request::SaveCar(self.id, p)),
            EntityKind::Part => part_payload(&self.form).map(|p| Request::SavePart(self.id, p)),
            EntityKind::PartType => {
                part_type_payload(&self.form).map(|p| Request::SavePartType(self.id, p))
            }
            EntityKind::Event => event_payload(&self.form).map(|p| Request::SaveEvent(self.id, p)),
        };
        match request {
            Ok(request) => {
                self.error = None;
                self.submitting = true;
                vec![Effect::Fetch(request)]
            }
            Err(err) => {
                if let Some(field) = err.field {
                    self.form.focus_field(field);
                }
                self.error = Some(err.message);
                Vec::new()
            }
        }
    }

    pub fn apply(&mut self, outcome: Outcome) -> Vec<Effect> {
        match outcome {
            Outcome::Car(Ok(car)) if self.kind == EntityKind::Car => {
                self.form.set("chassis_number", car.chassis_number);
                self.form.set("driver", car.driver.unwrap_or_default());
                self.entity = Loadable::Ready(());
            }
            Outcome::Part(Ok(part)) if self.kind == EntityKind::Part => {
                self.form.set("name", part.name);
                self.form.set("part_number", part.part_number);
                self.form.set("mileage", part.mileage.to_string());
                self.form.set("notes", part.notes.unwrap_or_default());
                if let Some(id) = part.part_type_id {
                    self.form.set("part_type_id", id.to_string());
                }
                match part.car_id {
                    Some(id) => self.form.set("car_id", id.to_string()),
                    None => self.pending_chassis = part.car_chassis_number,
                }
                self.resolve_pending_chassis();
                self.entity = Loadable::Ready(());
            }
            Outcome::PartType(Ok(pt)) if self.kind == EntityKind::PartType => {
                self.form.set("name", pt.name);
                self.form.set(
                    "max_mileage",
                    pt.max_mileage.map(|m| m.to_string()).unwrap_or_default(),
                );
                self.entity = Loadable::Ready(());
            }
            Outcome::Event(Ok(event)) if self.kind == EntityKind::Event => {
                let date = event
                    .parsed_date()
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or(event.date);
                self.form.set("name", event.name);
                self.form.set("date", date);
                self.form.set("notes", event.notes.unwrap_or_default());
                self.entity = Loadable::Ready(());
            }
            Outcome::Car(Err(err))
            | Outcome::Part(Err(err))
            | Outcome::PartType(Err(err))
            | Outcome::Event(Err(err)) => {
                self.error = Some(match err.kind() {
                    ErrorKind::NotFound => format!("{} no longer exists", self.kind.noun()),
                    _ => err.user_message(),
                });
                self.entity = Loadable::Failed(err);
            }
            Outcome::Cars(Ok(cars)) => {
                let options = cars
                    .into_iter()
                    .map(|c| (c.id, c.chassis_number))
                    .collect();
                self.form.set_options("car_id", options);
                self.resolve_pending_chassis();
            }
            Outcome::PartTypes(Ok(types)) => {
                let options = types.into_iter().map(|t| (t.id, t.name)).collect();
                self.form.set_options("part_type_id", options);
            }
            Outcome::Cars(Err(err)) | Outcome::PartTypes(Err(err)) => {
                self.error = Some(format!("Could not load choices: {}", err.user_message()));
            }
            Outcome::Done(Mutation::Saved, result) => {
                self.submitting = false;
                return match result {
                    Ok(()) => {
                        let verb = if self.id.is_some() { "updated" } else { "added" };
                        vec![
                            Effect::info(format!("{} {}", self.kind.noun(), verb)),
                            Effect::Navigate(self.kind.catalog()),
                        ]
                    }
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

    /// The single-part endpoint only names the vehicle by chassis number
    fn resolve_pending_chassis(&mut self) {
        let Some(chassis) = self.pending_chassis.as_deref() else {
            return;
        };
        let found = self
            .form
            .options("car_id")
            .iter()
            .find(|(_, label)| label == chassis)
            .map(|(id, _)| *id);
        if let Some(id) = found {
            self.form.set("car_id", id.to_string());
            self.pending_chassis = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    #[test]
    fn car_driver_required_only_on_edit() {
        let mut create = EditScreen::new(EntityKind::Car, None);
        create.form.set("chassis_number", "WBA123");
        assert_eq!(
            car_payload(&create.form).unwrap(),
            CarPayload {
                chassis_number: "WBA123".into(),
                driver: None
            }
        );

        let mut edit = EditScreen::new(EntityKind::Car, Some(1));
        edit.apply(Outcome::Car(Ok(Car {
            id: 1,
            chassis_number: "WBA123".into(),
            driver: None,
            last_event: None,
        })));
        assert!(edit.submit().is_empty());
        assert_eq!(edit.error(), Some("Driver is required"));
    }

    #[test]
    fn part_form_requires_numeric_mileage() {
        let mut screen = EditScreen::new(EntityKind::Part, None);
        for (key, value) in [
            ("name", "Brake disc"),
            ("part_number", "BD-2"),
            ("mileage", "ten"),
            ("car_id", "1"),
            ("part_type_id", "2"),
        ] {
            screen.form.set(key, value);
        }
        assert!(screen.submit().is_empty());
        assert_eq!(screen.form.focused(), 2);

        screen.form.set("mileage", "10");
        let effects = screen.submit();
        let Effect::Fetch(Request::SavePart(None, payload)) = &effects[0] else {
            panic!("expected save request, got {:?}", effects);
        };
        assert_eq!(payload.mileage, 10);
        assert_eq!(payload.notes, None);
    }

    #[test]
    fn part_vehicle_resolved_from_chassis_label() {
        let mut screen = EditScreen::new(EntityKind::Part, Some(5));
        assert_eq!(
            screen.mount(),
            vec![Request::Part(5), Request::Cars, Request::PartTypes]
        );

        screen.apply(Outcome::Part(Ok(Part {
            id: 5,
            name: "Clutch".into(),
            part_number: "CL".into(),
            mileage: 100,
            notes: None,
            car_id: None,
            car_chassis_number: Some("BMW-2".into()),
            part_type_id: None,
        })));
        screen.apply(Outcome::Cars(Ok(vec![
            Car {
                id: 1,
                chassis_number: "AUDI-1".into(),
                driver: None,
                last_event: None,
            },
            Car {
                id: 2,
                chassis_number: "BMW-2".into(),
                driver: None,
                last_event: None,
            },
        ])));
        assert_eq!(screen.form.number("car_id"), Some(2));
    }

    #[test]
    fn part_type_max_mileage_optional_but_numeric() {
        let mut form = part_type_fields();
        form.set("name", "Tyres");
        assert_eq!(part_type_payload(&form).unwrap().max_mileage, None);
        form.set("max_mileage", "lots");
        assert!(part_type_payload(&form).is_err());
    }

    #[test]
    fn event_requires_iso_date() {
        let mut form = event_fields();
        form.set("name", "Rally");
        form.set("date", "2024-13-01");
        assert_eq!(event_payload(&form).unwrap_err().field, Some("date"));
        form.set("date", "2024-12-01");
        assert!(event_payload(&form).is_ok());
    }

    #[test]
    fn missing_entity_reports_not_found() {
        let mut screen = EditScreen::new(EntityKind::Event, Some(9));
        screen.apply(Outcome::Event(Err(ApiError::NotFound {
            path: "/get-event/9".into(),
        })));
        assert_eq!(screen.error(), Some("Event no longer exists"));
        assert!(screen.submit().is_empty());
    }

    #[test]
    fn save_navigates_to_catalog() {
        let mut screen = EditScreen::new(EntityKind::PartType, None);
        screen.form.set("name", "Filters");
        assert_eq!(screen.submit().len(), 1);
        let effects = screen.apply(Outcome::Done(Mutation::Saved, Ok(())));
        assert!(effects.contains(&Effect::Navigate(Screen::PartTypes)));
    }
}
