//! REST boundary client
//!
//! One method per backend endpoint. Every failure is classified into an
//! [`ApiError`] and logged at warn level before it is returned; nothing here
//! panics or retries.

use super::error::ApiError;
use super::models::*;
use anyhow::{Context, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Typed client for the fleet backend
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct FleetClient {
    http: reqwest::Client,
    base_url: String,
}

impl FleetClient {
    /// Build a client for `base_url`
    ///
    /// `timeout` of `None` leaves the network stack default in place.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(4);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ═════════════════════════════════════════════════════════════════════════
    // Cars
    // ═════════════════════════════════════════════════════════════════════════

    pub async fn list_cars(&self) -> Result<Vec<Car>, ApiError> {
        self.get_list("/get-cars", "cars").await
    }

    pub async fn get_car(&self, id: CarId) -> Result<Car, ApiError> {
        self.get_one(&format!("/get-car/{}", id), "car").await
    }

    pub async fn create_car(&self, car: &CarPayload) -> Result<(), ApiError> {
        self.send(Method::POST, "/add-car", Some(car)).await
    }

    pub async fn update_car(&self, id: CarId, car: &CarPayload) -> Result<(), ApiError> {
        self.send(Method::PUT, &format!("/update-car/{}", id), Some(car))
            .await
    }

    pub async fn delete_car(&self, id: CarId) -> Result<(), ApiError> {
        self.delete(&format!("/delete-car/{}", id)).await
    }

    // ═════════════════════════════════════════════════════════════════════════
    // Parts
    // ═════════════════════════════════════════════════════════════════════════

    pub async fn list_parts(&self) -> Result<Vec<Part>, ApiError> {
        self.get_list("/get-parts", "parts").await
    }

    pub async fn list_parts_for_car(&self, car_id: CarId) -> Result<Vec<CarPart>, ApiError> {
        self.get_list(&format!("/get-parts-for-car/{}", car_id), "parts")
            .await
    }

    pub async fn get_part(&self, id: PartId) -> Result<Part, ApiError> {
        self.get_one(&format!("/get-part/{}", id), "part").await
    }

    pub async fn create_part(&self, part: &PartPayload) -> Result<(), ApiError> {
        self.send(Method::POST, "/add-part", Some(part)).await
    }

    pub async fn update_part(&self, id: PartId, part: &PartPayload) -> Result<(), ApiError> {
        self.send(Method::PUT, &format!("/update-part/{}", id), Some(part))
            .await
    }

    pub async fn delete_part(&self, id: PartId) -> Result<(), ApiError> {
        self.delete(&format!("/delete-part/{}", id)).await
    }

    // ═════════════════════════════════════════════════════════════════════════
    // Part types
    // ═════════════════════════════════════════════════════════════════════════

    pub async fn list_part_types(&self) -> Result<Vec<PartType>, ApiError> {
        self.get_list("/get-part-types", "part_types").await
    }

    pub async fn get_part_type(&self, id: PartTypeId) -> Result<PartType, ApiError> {
        self.get_one(&format!("/get-part-type/{}", id), "part_type")
            .await
    }

    pub async fn create_part_type(&self, pt: &PartTypePayload) -> Result<(), ApiError> {
        self.send(Method::POST, "/add-part-type", Some(pt)).await
    }

    pub async fn update_part_type(
        &self,
        id: PartTypeId,
        pt: &PartTypePayload,
    ) -> Result<(), ApiError> {
        self.send(Method::PUT, &format!("/update-part-type/{}", id), Some(pt))
            .await
    }

    pub async fn delete_part_type(&self, id: PartTypeId) -> Result<(), ApiError> {
        self.delete(&format!("/delete-part-type/{}", id)).await
    }

    // ═════════════════════════════════════════════════════════════════════════
    // Events
    // ═════════════════════════════════════════════════════════════════════════

    pub async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        self.get_list("/get-events", "events").await
    }

    pub async fn get_event(&self, id: EventId) -> Result<Event, ApiError> {
        self.get_one(&format!("/get-event/{}", id), "event").await
    }

    pub async fn list_events_for_car(&self, car_id: CarId) -> Result<Vec<Event>, ApiError> {
        self.get_list(&format!("/get-events-for-car/{}", car_id), "events")
            .await
    }

    pub async fn create_event(&self, event: &EventPayload) -> Result<(), ApiError> {
        self.send(Method::POST, "/add-event", Some(event)).await
    }

    pub async fn update_event(&self, id: EventId, event: &EventPayload) -> Result<(), ApiError> {
        self.send(Method::PUT, &format!("/update-event/{}", id), Some(event))
            .await
    }

    pub async fn delete_event(&self, id: EventId) -> Result<(), ApiError> {
        self.delete(&format!("/delete-event/{}", id)).await
    }

    pub async fn add_car_to_event(&self, assignment: EventAssignment) -> Result<(), ApiError> {
        self.send(Method::POST, "/add-car-to-event", Some(&assignment))
            .await
    }

    pub async fn remove_car_from_event(&self, assignment: EventAssignment) -> Result<(), ApiError> {
        self.send(Method::POST, "/remove-car-from-event", Some(&assignment))
            .await
    }

    // ═════════════════════════════════════════════════════════════════════════
    // Mileage and history
    // ═════════════════════════════════════════════════════════════════════════

    pub async fn add_mileage(&self, car_id: CarId, batch: &MileageBatch) -> Result<(), ApiError> {
        self.send(Method::PUT, &format!("/add-mileage/{}", car_id), Some(batch))
            .await
    }

    pub async fn part_history(&self, part_id: PartId) -> Result<Vec<HistoryRecord>, ApiError> {
        self.get_list(&format!("/part-history/{}", part_id), "history")
            .await
    }

    pub async fn clear_part_history(&self, part_id: PartId) -> Result<(), ApiError> {
        self.delete(&format!("/delete-part-history/{}", part_id))
            .await
    }

    pub async fn car_history(&self, car_id: CarId) -> Result<Vec<HistoryRecord>, ApiError> {
        self.get_list(&format!("/car-history/{}", car_id), "history")
            .await
    }

    pub async fn clear_car_history(&self, car_id: CarId) -> Result<(), ApiError> {
        self.delete(&format!("/delete-car-history/{}", car_id))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plumbing
    // ─────────────────────────────────────────────────────────────────────────

    /// Collection endpoint: `{"<key>": [...]}`, or a bare array
    async fn get_list<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<Vec<T>, ApiError> {
        let body = self.execute(Method::GET, path, None).await?;
        let items = match body {
            Value::Array(_) => body,
            Value::Object(mut map) => map.remove(key).ok_or_else(|| {
                let err = ApiError::decode(format!("{}: missing '{}' field", path, key));
                tracing::warn!(path, error = %err, "Backend call failed");
                err
            })?,
            other => other,
        };
        decode(path, items)
    }

    /// Single-entity endpoint: `{"<key>": {...}}` or the bare object
    async fn get_one<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<T, ApiError> {
        let body = self.execute(Method::GET, path, None).await?;
        decode(path, unwrap_envelope(body, key))
    }

    async fn send<B: Serialize>(&self, method: Method, path: &str, body: Option<&B>) -> Result<(), ApiError> {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| ApiError::decode(e.to_string()))?;
        self.execute(method, path, body).await.map(|_| ())
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, None).await.map(|_| ())
    }

    /// Issue one request; non-success statuses become typed errors
    ///
    /// Success bodies that are empty or not JSON come back as `Value::Null`.
    async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, path, "Backend request");

        let result = self.round_trip(method.clone(), &url, path, body).await;
        if let Err(err) = &result {
            tracing::warn!(%method, path, kind = ?err.kind(), error = %err, "Backend call failed");
        }
        result
    }

    async fn round_trip(&self, method: Method, url: &str, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let mut request = self.http.request(method, url);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), path, error_message(&text)));
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
    }
}

/// Take `body[key]` when it holds an object, else the body itself
fn unwrap_envelope(body: Value, key: &str) -> Value {
    match body {
        Value::Object(mut map) if map.get(key).is_some_and(Value::is_object) => {
            map.remove(key).unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| {
        let err = ApiError::decode(format!("{}: {}", path, e));
        tracing::warn!(path, error = %err, "Backend call failed");
        err
    })
}

/// The backend's `{"error": "..."}` text, or the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> FleetClient {
        FleetClient::new(&server.uri(), Some(Duration::from_secs(5))).unwrap()
    }

    #[tokio::test]
    async fn lists_cars_from_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-cars"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cars": [
                    {"id": 1, "chassis_number": "BMW-01"},
                    {"id": 2, "chassis_number": "AUDI-7", "driver": "Ola"}
                ]
            })))
            .mount(&server)
            .await;

        let cars = client(&server).list_cars().await.unwrap();
        assert_eq!(cars.len(), 2);
        assert_eq!(cars[1].driver.as_deref(), Some("Ola"));
    }

    #[tokio::test]
    async fn single_entity_accepts_wrapped_and_bare() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-car/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "car": {"id": 1, "chassis_number": "BMW-01"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/get-part-type/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3, "name": "Brakes", "max_mileage": 20000
            })))
            .mount(&server)
            .await;

        let c = client(&server);
        assert_eq!(c.get_car(1).await.unwrap().chassis_number, "BMW-01");
        assert_eq!(c.get_part_type(3).await.unwrap().max_mileage, Some(20000));
    }

    #[tokio::test]
    async fn mileage_batch_is_put_with_parts_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/add-mileage/4"))
            .and(body_json(json!({
                "parts": [{"part_id": 10, "mileage": 500}, {"part_id": 11, "mileage": 0}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let batch = MileageBatch {
            parts: vec![
                MileageEntry { part_id: 10, mileage: 500 },
                MileageEntry { part_id: 11, mileage: 0 },
            ],
        };
        client(&server).add_mileage(4, &batch).await.unwrap();
    }

    #[tokio::test]
    async fn statuses_are_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-car/99"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/add-car"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "Missing required data"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/get-cars"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let c = client(&server);
        assert_eq!(c.get_car(99).await.unwrap_err().kind(), ErrorKind::NotFound);

        let err = c
            .create_car(&CarPayload {
                chassis_number: String::new(),
                driver: None,
            })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Validation {
                status: 400,
                message: "Missing required data".into()
            }
        );

        assert_eq!(c.list_cars().await.unwrap_err().kind(), ErrorKind::Server);
    }

    #[tokio::test]
    async fn malformed_success_body_is_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-parts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        let err = client(&server).list_parts().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        // Port 9 (discard) on localhost is almost never listening
        let c = FleetClient::new("http://127.0.0.1:9", Some(Duration::from_secs(2))).unwrap();
        assert_eq!(c.list_cars().await.unwrap_err().kind(), ErrorKind::Network);
    }

    #[test]
    fn error_message_prefers_error_field() {
        assert_eq!(error_message(r#"{"error": "dup"}"#), "dup");
        assert_eq!(error_message(" plain text \n"), "plain text");
    }
}
