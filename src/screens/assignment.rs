//! Attach vehicles to an event, or detach them

use super::{Effect, Loadable, Mutation, Outcome, Request, Screen};
use crate::api::models::*;
use crate::api::{ErrorKind, FormError};

#[derive(Debug, Clone)]
pub struct Assignment {
    pub event_id: EventId,
    pub event: Loadable<Event>,
    pub cars: Loadable<Vec<Car>>,
    cursor: usize,
    selected: Option<CarId>,
    error: Option<String>,
    submitting: bool,
}

impl Assignment {
    pub fn new(event_id: EventId) -> Self {
        Self {
            event_id,
            event: Loadable::Loading,
            cars: Loadable::Loading,
            cursor: 0,
            selected: None,
            error: None,
            submitting: false,
        }
    }

    pub fn mount(&self) -> Vec<Request> {
        vec![Request::Event(self.event_id), Request::Cars]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<CarId> {
        self.selected
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the vehicle is already attached to the event
    pub fn is_attached(&self, car_id: CarId) -> bool {
        self.event
            .ready()
            .is_some_and(|event| event.cars.contains(&car_id))
    }

    pub fn cursor_down(&mut self) {
        let len = self.cars.ready().map_or(0, Vec::len);
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Mark the vehicle under the cursor (again to unmark)
    pub fn select_cursor(&mut self) {
        let id = self
            .cars
            .ready()
            .and_then(|cars| cars.get(self.cursor))
            .map(|c| c.id);
        self.selected = if self.selected == id { None } else { id };
    }

    fn target(&self) -> Result<EventAssignment, FormError> {
        let car_id = self
            .selected
            .ok_or_else(|| FormError::field("car_id", "Select a vehicle first"))?;
        Ok(EventAssignment {
            event_id: self.event_id,
            car_id,
        })
    }

    fn send(&mut self, build: fn(EventAssignment) -> Request) -> Vec<Effect> {
        if self.submitting {
            return Vec::new();
        }
        match self.target() {
            Ok(target) => {
                self.error = None;
                self.submitting = true;
                vec![Effect::Fetch(build(target))]
            }
            Err(err) => {
                self.error = Some(err.message);
                Vec::new()
            }
        }
    }

    pub fn attach(&mut self) -> Vec<Effect> {
        self.send(Request::AssignCar)
    }

    pub fn detach(&mut self) -> Vec<Effect> {
        self.send(Request::UnassignCar)
    }

    pub fn apply(&mut self, outcome: Outcome) -> Vec<Effect> {
        match outcome {
            Outcome::Event(result) => {
                if let Err(err) = &result {
                    self.error = Some(match err.kind() {
                        ErrorKind::NotFound => "Event no longer exists".to_string(),
                        _ => err.user_message(),
                    });
                }
                self.event = result.into();
            }
            Outcome::Cars(result) => {
                self.cursor = 0;
                self.cars = result.into();
            }
            Outcome::Done(mutation @ (Mutation::Assigned | Mutation::Unassigned), result) => {
                self.submitting = false;
                return match result {
                    Ok(()) => {
                        let text = if mutation == Mutation::Assigned {
                            "Vehicle added to event"
                        } else {
                            "Vehicle removed from event"
                        };
                        vec![Effect::info(text), Effect::Navigate(Screen::Events)]
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
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> Assignment {
        let mut screen = Assignment::new(8);
        screen.apply(Outcome::Event(Ok(Event {
            id: 8,
            name: "Rally".into(),
            date: "2024-07-07".into(),
            notes: None,
            cars: vec![2],
            car_chassis_numbers: vec!["AUDI-2".into()],
        })));
        screen.apply(Outcome::Cars(Ok(vec![
            Car {
                id: 1,
                chassis_number: "BMW-1".into(),
                driver: None,
                last_event: None,
            },
            Car {
                id: 2,
                chassis_number: "AUDI-2".into(),
                driver: None,
                last_event: None,
            },
        ])));
        screen
    }

    #[test]
    fn attach_without_selection_is_local_error() {
        let mut screen = loaded();
        assert!(screen.attach().is_empty());
        assert_eq!(screen.error(), Some("Select a vehicle first"));
    }

    #[test]
    fn attach_posts_event_and_car() {
        let mut screen = loaded();
        screen.select_cursor();
        assert_eq!(
            screen.attach(),
            vec![Effect::Fetch(Request::AssignCar(EventAssignment {
                event_id: 8,
                car_id: 1
            }))]
        );
        let effects = screen.apply(Outcome::Done(Mutation::Assigned, Ok(())));
        assert!(effects.contains(&Effect::Navigate(Screen::Events)));
    }

    #[test]
    fn detach_uses_remove_endpoint() {
        let mut screen = loaded();
        screen.cursor_down();
        screen.select_cursor();
        assert!(screen.is_attached(2));
        assert_eq!(
            screen.detach(),
            vec![Effect::Fetch(Request::UnassignCar(EventAssignment {
                event_id: 8,
                car_id: 2
            }))]
        );
    }
}
