//! Screen-state models
//!
//! Every screen is a plain struct that owns its local state, asks for data by
//! returning [`Request`]s, and absorbs the matching [`Outcome`]s. Nothing in
//! here touches the terminal or the network, so each screen is unit tested
//! synchronously; the TUI layer maps keys onto these methods and runs the
//! requests.

pub mod assignment;
pub mod car_detail;
pub mod catalog;
pub mod form;
pub mod forms;
pub mod history;
pub mod mileage;

use crate::api::models::*;
use crate::api::ApiError;

// ─────────────────────────────────────────────────────────────────────────────
// Loadable
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle of one fetched resource on a screen
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Loadable<T> {
    #[default]
    Loading,
    Failed(ApiError),
    Ready(T),
}

impl<T> Loadable<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl<T> From<Result<T, ApiError>> for Loadable<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) => Self::Failed(err),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Routes
// ─────────────────────────────────────────────────────────────────────────────

/// Every place the operator can navigate to
///
/// `None` ids on form routes mean "create new".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Vehicle catalog
    Home,
    Parts,
    PartTypes,
    Events,
    Mileage,
    CarDetail(CarId),
    CarForm(Option<CarId>),
    PartForm(Option<PartId>),
    PartTypeForm(Option<PartTypeId>),
    EventForm(Option<EventId>),
    EventAssign(EventId),
    PartHistory(PartId),
    CarHistory(CarId),
}

impl Screen {
    pub fn title(&self) -> String {
        match self {
            Self::Home => "Vehicles".to_string(),
            Self::Parts => "Parts".to_string(),
            Self::PartTypes => "Part types".to_string(),
            Self::Events => "Events".to_string(),
            Self::Mileage => "Add mileage".to_string(),
            Self::CarDetail(id) => format!("Vehicle #{}", id),
            Self::CarForm(None) => "New vehicle".to_string(),
            Self::CarForm(Some(id)) => format!("Edit vehicle #{}", id),
            Self::PartForm(None) => "New part".to_string(),
            Self::PartForm(Some(id)) => format!("Edit part #{}", id),
            Self::PartTypeForm(None) => "New part type".to_string(),
            Self::PartTypeForm(Some(id)) => format!("Edit part type #{}", id),
            Self::EventForm(None) => "New event".to_string(),
            Self::EventForm(Some(id)) => format!("Edit event #{}", id),
            Self::EventAssign(id) => format!("Vehicles at event #{}", id),
            Self::PartHistory(id) => format!("History of part #{}", id),
            Self::CarHistory(id) => format!("History of vehicle #{}", id),
        }
    }

    /// Where Esc leads from this screen
    pub fn parent(&self) -> Screen {
        match self {
            Self::Home | Self::Parts | Self::PartTypes | Self::Events | Self::Mileage => Self::Home,
            Self::CarDetail(_) | Self::CarForm(_) | Self::CarHistory(_) => Self::Home,
            Self::PartForm(_) | Self::PartHistory(_) => Self::Parts,
            Self::PartTypeForm(_) => Self::PartTypes,
            Self::EventForm(_) | Self::EventAssign(_) => Self::Events,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests and outcomes
// ─────────────────────────────────────────────────────────────────────────────

/// One backend call a screen wants made
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Cars,
    Parts,
    PartTypes,
    Events,
    Car(CarId),
    Part(PartId),
    PartType(PartTypeId),
    Event(EventId),
    PartsForCar(CarId),
    EventsForCar(CarId),
    PartHistory(PartId),
    CarHistory(CarId),
    SaveCar(Option<CarId>, CarPayload),
    SavePart(Option<PartId>, PartPayload),
    SavePartType(Option<PartTypeId>, PartTypePayload),
    SaveEvent(Option<EventId>, EventPayload),
    DeleteCar(CarId),
    DeletePart(PartId),
    DeletePartType(PartTypeId),
    DeleteEvent(EventId),
    AddMileage(CarId, MileageBatch),
    AssignCar(EventAssignment),
    UnassignCar(EventAssignment),
    ClearPartHistory(PartId),
    ClearCarHistory(CarId),
}

impl Request {
    /// What kind of mutation this is, `None` for reads
    pub fn mutation(&self) -> Option<Mutation> {
        Some(match self {
            Self::SaveCar(..) | Self::SavePart(..) | Self::SavePartType(..) | Self::SaveEvent(..) => {
                Mutation::Saved
            }
            Self::DeleteCar(id)
            | Self::DeletePart(id)
            | Self::DeletePartType(id)
            | Self::DeleteEvent(id) => Mutation::Deleted(*id),
            Self::AddMileage(..) => Mutation::MileageAdded,
            Self::AssignCar(_) => Mutation::Assigned,
            Self::UnassignCar(_) => Mutation::Unassigned,
            Self::ClearPartHistory(_) | Self::ClearCarHistory(_) => Mutation::HistoryCleared,
            _ => return None,
        })
    }
}

/// Completed mutation, echoed back with its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Saved,
    Deleted(i64),
    MileageAdded,
    Assigned,
    Unassigned,
    HistoryCleared,
}

/// Result of a [`Request`], as delivered back to the screen
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Cars(Result<Vec<Car>, ApiError>),
    Parts(Result<Vec<Part>, ApiError>),
    PartTypes(Result<Vec<PartType>, ApiError>),
    Events(Result<Vec<Event>, ApiError>),
    Car(Result<Car, ApiError>),
    Part(Result<Part, ApiError>),
    PartType(Result<PartType, ApiError>),
    Event(Result<Event, ApiError>),
    PartsForCar(CarId, Result<Vec<CarPart>, ApiError>),
    EventsForCar(Result<Vec<Event>, ApiError>),
    History(Result<Vec<HistoryRecord>, ApiError>),
    Done(Mutation, Result<(), ApiError>),
}

// ─────────────────────────────────────────────────────────────────────────────
// Effects
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
}

/// What a screen asks the app to do after handling input or an outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch(Request),
    Navigate(Screen),
    Notify(NoticeLevel, String),
}

impl Effect {
    pub fn info(text: impl Into<String>) -> Self {
        Self::Notify(NoticeLevel::Info, text.into())
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Self::Notify(NoticeLevel::Warn, text.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loadable_from_result() {
        let ok: Loadable<i32> = Ok(3).into();
        assert_eq!(ok.ready(), Some(&3));

        let failed: Loadable<i32> = Err(ApiError::Network("refused".into())).into();
        assert!(failed.error().is_some());
        assert!(Loadable::<i32>::default().is_loading());
    }

    #[test]
    fn mutations_are_tagged() {
        assert_eq!(Request::DeletePart(7).mutation(), Some(Mutation::Deleted(7)));
        assert_eq!(Request::Cars.mutation(), None);
        assert_eq!(
            Request::ClearCarHistory(2).mutation(),
            Some(Mutation::HistoryCleared)
        );
    }

    #[test]
    fn forms_return_to_their_catalog() {
        assert_eq!(Screen::PartForm(Some(1)).parent(), Screen::Parts);
        assert_eq!(Screen::EventAssign(4).parent(), Screen::Events);
        assert_eq!(Screen::Mileage.parent(), Screen::Home);
    }
}
