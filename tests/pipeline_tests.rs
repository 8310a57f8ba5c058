//! End-to-end pipeline tests against stubbed HTTP services
//!
//! All three external services are replaced by a local wiremock server so
//! the full resolution cycle can be exercised without network access.

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use localcast::config::WeatherConfig;
use localcast::{
    IpapiLocationResolver, IpifyAddressResolver, LocalcastError, OpenWeatherMapClient, Pipeline,
    RenderSink, RunOutcome,
};

const API_KEY: &str = "test_api_key_123";

#[derive(Default)]
struct RecordingSink {
    fields: Vec<(String, String)>,
    notifications: Vec<String>,
}

impl RenderSink for RecordingSink {
    fn set_city(&mut self, name: &str) {
        self.fields.push(("city".into(), name.into()));
    }
    fn set_temperature(&mut self, formatted: &str) {
        self.fields.push(("temperature".into(), formatted.into()));
    }
    fn set_condition(&mut self, main: &str) {
        self.fields.push(("condition".into(), main.into()));
    }
    fn set_description(&mut self, description: &str) {
        self.fields.push(("description".into(), description.into()));
    }
    fn set_icon(&mut self, url: &str) {
        self.fields.push(("icon".into(), url.into()));
    }
    fn notify(&mut self, message: &str) {
        self.notifications.push(message.into());
    }
}

fn pipeline_against(
    server: &MockServer,
) -> Pipeline<IpifyAddressResolver, IpapiLocationResolver, OpenWeatherMapClient> {
    let client = reqwest::Client::new();
    let weather_config = WeatherConfig {
        api_key: Some(API_KEY.to_string()),
        base_url: server.uri(),
    };
    Pipeline::new(
        IpifyAddressResolver::new(client.clone(), server.uri()),
        IpapiLocationResolver::new(client.clone(), server.uri()),
        OpenWeatherMapClient::new(client, &weather_config).unwrap(),
    )
}

async fn mount_address(server: &MockServer, ip: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ip": ip })))
        .mount(server)
        .await;
}

async fn mount_location(server: &MockServer, ip: &str, city: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/{ip}/json/")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "ip": ip, "city": city, "country": "FR" })),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn end_to_end_renders_detected_city_weather() {
    let server = MockServer::start().await;
    mount_address(&server, "203.0.113.5").await;
    mount_location(&server, "203.0.113.5", "Paris").await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Paris"))
        .and(query_param("appid", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Paris",
            "main": { "temp": 290.15, "humidity": 87 },
            "weather": [
                { "id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04d" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = pipeline_against(&server);
    let mut sink = RecordingSink::default();

    let outcome = pipeline.run(&mut sink).await.unwrap();

    assert_eq!(outcome, RunOutcome::Rendered);
    assert_eq!(
        sink.fields,
        vec![
            ("city".to_string(), "Paris".to_string()),
            ("temperature".to_string(), "17°C".to_string()),
            ("condition".to_string(), "Clouds".to_string()),
            ("description".to_string(), "overcast clouds".to_string()),
            (
                "icon".to_string(),
                "https://openweathermap.org/img/wn/04d@2x.png".to_string()
            ),
        ]
    );
    assert!(sink.notifications.is_empty());
}

#[tokio::test]
async fn weather_not_found_shows_notification_and_no_fields() {
    let server = MockServer::start().await;
    mount_address(&server, "203.0.113.5").await;
    mount_location(&server, "203.0.113.5", "Atlantis").await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&server)
        .await;

    let pipeline = pipeline_against(&server);
    let mut sink = RecordingSink::default();

    let outcome = pipeline.run(&mut sink).await.unwrap();

    assert_eq!(outcome, RunOutcome::PlaceNotFound);
    assert!(sink.fields.is_empty());
    assert_eq!(sink.notifications, vec!["Place not found".to_string()]);
}

#[tokio::test]
async fn address_not_found_stops_without_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let pipeline = pipeline_against(&server);
    let mut sink = RecordingSink::default();

    let outcome = pipeline.run(&mut sink).await.unwrap();

    assert_eq!(outcome, RunOutcome::Stopped);
    assert!(sink.fields.is_empty());
    assert!(sink.notifications.is_empty());
}

#[tokio::test]
async fn malformed_address_body_halts_pipeline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not JSON"))
        .mount(&server)
        .await;

    let pipeline = pipeline_against(&server);
    let mut sink = RecordingSink::default();

    let result = pipeline.run(&mut sink).await;

    assert!(matches!(
        result,
        Err(LocalcastError::MalformedResponse { .. })
    ));
    assert!(sink.fields.is_empty());
    // Exactly one request was made; the later stages never ran
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_city_field_is_malformed_response() {
    let server = MockServer::start().await;
    mount_address(&server, "203.0.113.5").await;
    Mock::given(method("GET"))
        .and(path("/203.0.113.5/json/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "ip": "203.0.113.5", "country": "FR" })),
        )
        .mount(&server)
        .await;

    let pipeline = pipeline_against(&server);
    let mut sink = RecordingSink::default();

    let result = pipeline.run(&mut sink).await;

    assert!(matches!(
        result,
        Err(LocalcastError::MalformedResponse { .. })
    ));
    assert!(sink.fields.is_empty());
}

#[tokio::test]
async fn empty_weather_array_is_malformed_response() {
    let server = MockServer::start().await;
    mount_address(&server, "203.0.113.5").await;
    mount_location(&server, "203.0.113.5", "Paris").await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Paris",
            "main": { "temp": 290.15 },
            "weather": []
        })))
        .mount(&server)
        .await;

    let pipeline = pipeline_against(&server);
    let mut sink = RecordingSink::default();

    let result = pipeline.run(&mut sink).await;

    assert!(matches!(
        result,
        Err(LocalcastError::MalformedResponse { .. })
    ));
    assert!(sink.fields.is_empty());
    assert!(sink.notifications.is_empty());
}

#[tokio::test]
async fn hung_service_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "ip": "203.0.113.5" }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let weather_config = WeatherConfig {
        api_key: Some(API_KEY.to_string()),
        base_url: server.uri(),
    };
    let pipeline = Pipeline::new(
        IpifyAddressResolver::new(client.clone(), server.uri()),
        IpapiLocationResolver::new(client.clone(), server.uri()),
        OpenWeatherMapClient::new(client, &weather_config).unwrap(),
    );
    let mut sink = RecordingSink::default();

    let result = pipeline.run(&mut sink).await;

    assert!(matches!(result, Err(LocalcastError::Network { .. })));
    assert!(sink.fields.is_empty());
}

#[tokio::test]
async fn reserved_address_stops_silently() {
    let server = MockServer::start().await;
    mount_address(&server, "10.0.0.1").await;
    Mock::given(method("GET"))
        .and(path("/10.0.0.1/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "10.0.0.1",
            "error": true,
            "reason": "Reserved IP Address"
        })))
        .mount(&server)
        .await;

    let pipeline = pipeline_against(&server);
    let mut sink = RecordingSink::default();

    let outcome = pipeline.run(&mut sink).await.unwrap();

    assert_eq!(outcome, RunOutcome::Stopped);
    assert!(sink.fields.is_empty());
    assert!(sink.notifications.is_empty());
}

#[tokio::test]
async fn user_supplied_city_skips_resolver_stages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "New York"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "New York",
            "main": { "temp": 300.15 },
            "weather": [
                { "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }
            ]
        })))
        .mount(&server)
        .await;

    let pipeline = pipeline_against(&server);
    let mut sink = RecordingSink::default();

    let outcome = pipeline.run_for_city("New York", &mut sink).await.unwrap();

    assert_eq!(outcome, RunOutcome::Rendered);
    assert_eq!(sink.fields[0], ("city".to_string(), "New York".to_string()));
    assert_eq!(
        sink.fields[1],
        ("temperature".to_string(), "27°C".to_string())
    );
    // Only the weather endpoint was hit
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
