//! One vehicle with its installed parts and the events it attended

use super::{Loadable, Outcome, Request};
use crate::api::models::*;
use crate::api::ErrorKind;

/// Wear at or above this percentage marks a part as worn out
pub const WORN_OUT_PERCENT: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct CarDetail {
    pub id: CarId,
    pub car: Loadable<Car>,
    pub parts: Loadable<Vec<CarPart>>,
    pub events: Loadable<Vec<Event>>,
    part_cursor: usize,
}

impl CarDetail {
    pub fn new(id: CarId) -> Self {
        Self {
            id,
            car: Loadable::Loading,
            parts: Loadable::Loading,
            events: Loadable::Loading,
            part_cursor: 0,
        }
    }

    pub fn mount(&self) -> Vec<Request> {
        vec![
            Request::Car(self.id),
            Request::PartsForCar(self.id),
            Request::EventsForCar(self.id),
        ]
    }

    pub fn is_worn_out(part: &CarPart) -> bool {
        part.wear_percent()
            .is_some_and(|pct| pct >= WORN_OUT_PERCENT)
    }

    pub fn worn_out_count(&self) -> usize {
        self.parts
            .ready()
            .map_or(0, |parts| parts.iter().filter(|p| Self::is_worn_out(p)).count())
    }

    /// Headline when the vehicle itself could not be shown
    pub fn missing_message(&self) -> Option<String> {
        let err = self.car.error()?;
        Some(match err.kind() {
            ErrorKind::NotFound => "Vehicle no longer exists".to_string(),
            _ => err.user_message(),
        })
    }

    pub fn part_cursor(&self) -> usize {
        self.part_cursor
    }

    pub fn selected_part(&self) -> Option<&CarPart> {
        self.parts.ready()?.get(self.part_cursor)
    }

    pub fn cursor_down(&mut self) {
        let len = self.parts.ready().map_or(0, Vec::len);
        if self.part_cursor + 1 < len {
            self.part_cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.part_cursor = self.part_cursor.saturating_sub(1);
    }

    pub fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Car(result) => self.car = result.into(),
            Outcome::PartsForCar(id, result) if id == self.id => {
                self.part_cursor = 0;
                self.parts = result.into();
            }
            Outcome::EventsForCar(result) => self.events = result.into(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    fn car_part(id: PartId, mileage: i64, max: Option<i64>) -> CarPart {
        CarPart {
            id,
            name: "Pads".into(),
            part_number: "P".into(),
            mileage,
            notes: None,
            part_type_name: Some("Brakes".into()),
            max_mileage: max,
            usage_percentage: None,
        }
    }

    #[test]
    fn worn_out_at_or_above_threshold() {
        assert!(CarDetail::is_worn_out(&car_part(1, 10_000, Some(10_000))));
        assert!(CarDetail::is_worn_out(&car_part(2, 12_000, Some(10_000))));
        assert!(!CarDetail::is_worn_out(&car_part(3, 9_999, Some(10_000))));
        assert!(!CarDetail::is_worn_out(&car_part(4, 50_000, None)));
    }

    #[test]
    fn loads_three_resources() {
        let mut detail = CarDetail::new(4);
        assert_eq!(detail.mount().len(), 3);

        detail.apply(Outcome::PartsForCar(
            4,
            Ok(vec![car_part(1, 100, Some(50)), car_part(2, 1, Some(50))]),
        ));
        assert_eq!(detail.worn_out_count(), 1);

        detail.apply(Outcome::Car(Err(ApiError::NotFound {
            path: "/get-car/4".into(),
        })));
        assert_eq!(
            detail.missing_message().as_deref(),
            Some("Vehicle no longer exists")
        );
    }
}
