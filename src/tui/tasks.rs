// Background request runner
//
// Every backend call a screen asks for runs as its own tokio task. Results
// come back over a channel tagged with the generation of the screen that
// issued them; navigating bumps the generation and aborts reads that are still
// running, so a late answer can never land on the wrong screen. Confirmed
// writes are left to finish; their results arrive stale and are only
// reported if they failed.

use crate::api::FleetClient;
use crate::screens::{Mutation, Outcome, Request};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A finished request, stamped with the screen generation that asked for it
#[derive(Debug)]
pub struct Tagged {
    pub generation: u64,
    pub outcome: Outcome,
}

/// A spawned request and whether it changes backend state
struct Running {
    handle: JoinHandle<()>,
    writes: bool,
}

pub struct TaskRunner {
    client: FleetClient,
    tx: mpsc::Sender<Tagged>,
    running: Vec<Running>,
    generation: u64,
}

impl TaskRunner {
    pub fn new(client: FleetClient, tx: mpsc::Sender<Tagged>) -> Self {
        Self {
            client,
            tx,
            running: Vec::new(),
            generation: 0,
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run a request in the background for the current screen
    pub fn spawn(&mut self, request: Request) {
        self.running.retain(|r| !r.handle.is_finished());

        let client = self.client.clone();
        let tx = self.tx.clone();
        let generation = self.generation;
        let writes = request.mutation().is_some();
        tracing::debug!(generation, ?request, "Dispatching request");

        let handle = tokio::spawn(async move {
            let outcome = execute(&client, request).await;
            // Receiver gone means the UI is shutting down
            let _ = tx.send(Tagged { generation, outcome }).await;
        });
        self.running.push(Running { handle, writes });
    }

    /// Abort reads still running and start a new generation
    ///
    /// Writes the operator already confirmed keep running to completion.
    pub fn begin_screen(&mut self) {
        let mut aborted = 0;
        self.running.retain(|r| {
            if r.handle.is_finished() {
                false
            } else if r.writes {
                true
            } else {
                r.handle.abort();
                aborted += 1;
                false
            }
        });
        if aborted > 0 {
            tracing::debug!(aborted, "Aborted in-flight requests");
        }
        if !self.running.is_empty() {
            tracing::debug!(pending = self.running.len(), "Writes continue past navigation");
        }
        self.generation += 1;
    }

    /// Unwrap a result if it belongs to the current screen
    pub fn accept(&self, tagged: Tagged) -> Option<Outcome> {
        if tagged.generation == self.generation {
            Some(tagged.outcome)
        } else {
            tracing::trace!(
                stale = tagged.generation,
                current = self.generation,
                "Dropping stale result"
            );
            None
        }
    }

    pub fn in_flight(&self) -> usize {
        self.running.iter().filter(|r| !r.handle.is_finished()).count()
    }
}

impl Drop for TaskRunner {
    fn drop(&mut self) {
        for r in &self.running {
            r.handle.abort();
        }
    }
}

/// Perform one backend call and wrap the answer for the screen
pub async fn execute(client: &FleetClient, request: Request) -> Outcome {
    match request {
        Request::Cars => Outcome::Cars(client.list_cars().await),
        Request::Parts => Outcome::Parts(client.list_parts().await),
        Request::PartTypes => Outcome::PartTypes(client.list_part_types().await),
        Request::Events => Outcome::Events(client.list_events().await),
        Request::Car(id) => Outcome::Car(client.get_car(id).await),
        Request::Part(id) => Outcome::Part(client.get_part(id).await),
        Request::PartType(id) => Outcome::PartType(client.get_part_type(id).await),
        Request::Event(id) => Outcome::Event(client.get_event(id).await),
        Request::PartsForCar(id) => Outcome::PartsForCar(id, client.list_parts_for_car(id).await),
        Request::EventsForCar(id) => Outcome::EventsForCar(client.list_events_for_car(id).await),
        Request::PartHistory(id) => Outcome::History(client.part_history(id).await),
        Request::CarHistory(id) => Outcome::History(client.car_history(id).await),

        // Saving creates when there is no id yet
        Request::SaveCar(id, car) => Outcome::Done(
            Mutation::Saved,
            match id {
                Some(id) => client.update_car(id, &car).await,
                None => client.create_car(&car).await,
            },
        ),
        Request::SavePart(id, part) => Outcome::Done(
            Mutation::Saved,
            match id {
                Some(id) => client.update_part(id, &part).await,
                None => client.create_part(&part).await,
            },
        ),
        Request::SavePartType(id, pt) => Outcome::Done(
            Mutation::Saved,
            match id {
                Some(id) => client.update_part_type(id, &pt).await,
                None => client.create_part_type(&pt).await,
            },
        ),
        Request::SaveEvent(id, event) => Outcome::Done(
            Mutation::Saved,
            match id {
                Some(id) => client.update_event(id, &event).await,
                None => client.create_event(&event).await,
            },
        ),

        Request::DeleteCar(id) => Outcome::Done(Mutation::Deleted(id), client.delete_car(id).await),
        Request::DeletePart(id) => {
            Outcome::Done(Mutation::Deleted(id), client.delete_part(id).await)
        }
        Request::DeletePartType(id) => {
            Outcome::Done(Mutation::Deleted(id), client.delete_part_type(id).await)
        }
        Request::DeleteEvent(id) => {
            Outcome::Done(Mutation::Deleted(id), client.delete_event(id).await)
        }
        Request::AddMileage(car_id, batch) => Outcome::Done(
            Mutation::MileageAdded,
            client.add_mileage(car_id, &batch).await,
        ),
        Request::AssignCar(assignment) => Outcome::Done(
            Mutation::Assigned,
            client.add_car_to_event(assignment).await,
        ),
        Request::UnassignCar(assignment) => Outcome::Done(
            Mutation::Unassigned,
            client.remove_car_from_event(assignment).await,
        ),
        Request::ClearPartHistory(id) => Outcome::Done(
            Mutation::HistoryCleared,
            client.clear_part_history(id).await,
        ),
        Request::ClearCarHistory(id) => Outcome::Done(
            Mutation::HistoryCleared,
            client.clear_car_history(id).await,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::PartTypePayload;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn runner(base: &str) -> (TaskRunner, mpsc::Receiver<Tagged>) {
        let (tx, rx) = mpsc::channel(16);
        let client = FleetClient::new(base, None).unwrap();
        (TaskRunner::new(client, tx), rx)
    }

    #[tokio::test]
    async fn results_from_previous_screen_are_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-cars"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"cars": []})))
            .mount(&server)
            .await;

        let (mut runner, mut rx) = runner(&server.uri());
        runner.spawn(Request::Cars);
        let tagged = rx.recv().await.unwrap();

        // Operator navigated before the answer was applied
        runner.begin_screen();
        assert!(runner.accept(tagged).is_none());

        runner.spawn(Request::Cars);
        let tagged = rx.recv().await.unwrap();
        assert!(matches!(runner.accept(tagged), Some(Outcome::Cars(Ok(cars))) if cars.is_empty()));
    }

    #[tokio::test]
    async fn navigation_aborts_slow_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-parts"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"parts": []}))
                    .set_delay(std::time::Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let (mut runner, mut rx) = runner(&server.uri());
        runner.spawn(Request::Parts);
        assert_eq!(runner.in_flight(), 1);

        runner.begin_screen();
        assert_eq!(runner.in_flight(), 0);
        assert_eq!(runner.generation(), 1);

        // The aborted task dropped its sender clone without sending
        drop(runner);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn navigation_lets_confirmed_writes_finish() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/delete-car/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"message": "ok"}))
                    .set_delay(std::time::Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/get-parts"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"parts": []}))
                    .set_delay(std::time::Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let (mut runner, mut rx) = runner(&server.uri());
        runner.spawn(Request::DeleteCar(1));
        runner.spawn(Request::Parts);
        assert_eq!(runner.in_flight(), 2);

        runner.begin_screen();
        // Only the read was aborted
        assert_eq!(runner.in_flight(), 1);

        let tagged = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tagged.generation, 0);
        assert_eq!(tagged.outcome, Outcome::Done(Mutation::Deleted(1), Ok(())));
        assert!(runner.accept(tagged).is_none());
    }

    #[tokio::test]
    async fn save_without_id_creates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/add-part-type"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = FleetClient::new(&server.uri(), None).unwrap();
        let outcome = execute(
            &client,
            Request::SavePartType(
                None,
                PartTypePayload {
                    name: "Brakes".into(),
                    max_mileage: Some(20_000),
                },
            ),
        )
        .await;

        assert_eq!(outcome, Outcome::Done(Mutation::Saved, Ok(())));
    }
}
