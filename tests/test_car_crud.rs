//! End-to-end tests of the car API over HTTP, backed by in-process collections.

use async_trait::async_trait;
use carstore::transport;
use carstore::{Car, CarCollection, CarId, CarPayload, CarService, InMemoryCarCollection};
use reqwest::StatusCode;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use std::time::Duration;

/// Fails every call, like a database that went away after startup.
struct UnreachableCollection;

#[async_trait]
impl CarCollection for UnreachableCollection {
    async fn ping(&self) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("connection refused (os error 111)"))
    }
    async fn find_all(&self) -> anyhow::Result<Vec<Car>> {
        Err(anyhow::anyhow!("connection refused (os error 111)"))
    }
    async fn insert_one(&self, _car: &CarPayload) -> anyhow::Result<CarId> {
        Err(anyhow::anyhow!("connection refused (os error 111)"))
    }
    async fn find_one(&self, _id: &CarId) -> anyhow::Result<Option<Car>> {
        Err(anyhow::anyhow!("connection refused (os error 111)"))
    }
    async fn update_one(&self, _id: &CarId, _car: &CarPayload) -> anyhow::Result<u64> {
        Err(anyhow::anyhow!("connection refused (os error 111)"))
    }
    async fn delete_one(&self, _id: &CarId) -> anyhow::Result<u64> {
        Err(anyhow::anyhow!("connection refused (os error 111)"))
    }
}

/// Never answers within any reasonable deadline.
struct StalledCollection;

impl StalledCollection {
    async fn stall<T>(&self) -> anyhow::Result<T> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(anyhow::anyhow!("stalled"))
    }
}

#[async_trait]
impl CarCollection for StalledCollection {
    async fn ping(&self) -> anyhow::Result<()> {
        self.stall().await
    }
    async fn find_all(&self) -> anyhow::Result<Vec<Car>> {
        self.stall().await
    }
    async fn insert_one(&self, _car: &CarPayload) -> anyhow::Result<CarId> {
        self.stall().await
    }
    async fn find_one(&self, _id: &CarId) -> anyhow::Result<Option<Car>> {
        self.stall().await
    }
    async fn update_one(&self, _id: &CarId, _car: &CarPayload) -> anyhow::Result<u64> {
        self.stall().await
    }
    async fn delete_one(&self, _id: &CarId) -> anyhow::Result<u64> {
        self.stall().await
    }
}

/// Serves the router (with CORS) on an ephemeral port and returns its base URL.
async fn spawn_app(collection: Arc<dyn CarCollection>, timeout: Duration) -> String {
    let service = CarService::new(collection, timeout);
    let router = transport::http::create_router(transport::http::AppState::new(service))
        .layer(transport::http::cors_layer(&["http://localhost:5173".to_string()]));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

async fn spawn_in_memory() -> String {
    spawn_app(Arc::new(InMemoryCarCollection::new()), Duration::from_secs(10)).await
}

async fn error_message(resp: reqwest::Response) -> String {
    let body: JsonValue = resp.json().await.unwrap();
    body["error"].as_str().unwrap_or_default().to_string()
}

async fn create(client: &reqwest::Client, base_url: &str, car: JsonValue) -> JsonValue {
    let resp = client
        .post(format!("{}/cars", base_url))
        .json(&car)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn corolla_lifecycle() {
    let base_url = spawn_in_memory().await;
    let client = reqwest::Client::new();

    let created = create(
        &client,
        &base_url,
        json!({"make": "Toyota", "model": "Corolla", "year": 2020, "price": 19999.99}),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(id.parse::<CarId>().is_ok(), "generated id {} is not well-formed", id);
    assert_eq!(created["make"], "Toyota");
    assert_eq!(created["year"], 2020);

    let fetched: JsonValue = client
        .get(format!("{}/car/{}", base_url, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);

    let resp = client
        .put(format!("{}/car/{}", base_url, id))
        .json(&json!({"make": "Toyota", "model": "Corolla", "year": 2021, "price": 18999.99}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: JsonValue = resp.json().await.unwrap();
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["year"], 2021);
    assert_eq!(updated["price"], 18999.99);

    let resp = client
        .delete(format!("{}/car/{}", base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(resp.text().await.unwrap().is_empty());

    let resp = client
        .get(format!("{}/car/{}", base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Car not found");
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let base_url = spawn_in_memory().await;
    let client = reqwest::Client::new();
    let url = format!("{}/car/not-a-valid-id", base_url);

    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Invalid car ID");

    let resp = client
        .put(&url)
        .json(&json!({"make": "Toyota"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Invalid car ID");

    let resp = client.delete(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 24 characters, but not hex.
    let resp = client
        .get(format!("{}/car/zzzzzzzzzzzzzzzzzzzzzzzz", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn never_issued_ids_are_not_found() {
    let base_url = spawn_in_memory().await;
    let client = reqwest::Client::new();
    let url = format!("{}/car/{}", base_url, CarId::generate());

    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .put(&url)
        .json(&json!({"make": "Ford", "model": "Focus", "year": 2015, "price": 7000.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Car not found");

    let resp = client.delete(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_overwrites_every_field() {
    let base_url = spawn_in_memory().await;
    let client = reqwest::Client::new();

    let created = create(
        &client,
        &base_url,
        json!({"make": "Mazda", "model": "MX-5", "year": 1995, "price": 8500.5}),
    )
    .await;
    let url = format!("{}/car/{}", base_url, created["id"].as_str().unwrap());

    let resp = client
        .put(&url)
        .json(&json!({"make": "Mazda"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let fetched: JsonValue = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(
        fetched,
        json!({"id": created["id"], "make": "Mazda", "model": "", "year": 0, "price": 0.0})
    );
}

#[tokio::test]
async fn list_contains_every_created_car() {
    let base_url = spawn_in_memory().await;
    let client = reqwest::Client::new();

    let before: Vec<JsonValue> = client
        .get(format!("{}/cars", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(before.is_empty());

    let a = create(&client, &base_url, json!({"make": "Volvo", "model": "240", "year": 1988, "price": 3000.0})).await;
    let b = create(&client, &base_url, json!({"make": "Saab", "model": "900", "year": 1990, "price": 4000.0})).await;

    // A rejected create must not change the count.
    let resp = client
        .post(format!("{}/cars", base_url))
        .json(&json!({"year": "not a number"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let after: Vec<JsonValue> = client
        .get(format!("{}/cars", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after.len(), 2);
    assert!(after.contains(&a));
    assert!(after.contains(&b));
}

#[tokio::test]
async fn undecodable_bodies_are_bad_requests() {
    let base_url = spawn_in_memory().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/cars", base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Invalid car data");

    let resp = client
        .post(format!("{}/cars", base_url))
        .header("content-type", "application/json")
        .body("")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let created = create(&client, &base_url, json!({"make": "Fiat", "model": "Panda", "year": 2004, "price": 1500.0})).await;
    let resp = client
        .put(format!("{}/car/{}", base_url, created["id"].as_str().unwrap()))
        .json(&json!({"make": "Fiat", "year": 2004.5}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Invalid car data");
}

#[tokio::test]
async fn bodies_decode_without_a_json_content_type() {
    let base_url = spawn_in_memory().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/cars", base_url))
        .body(r#"{"make":"Toyota","model":"Corolla","year":2020,"price":1.0}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: JsonValue = resp.json().await.unwrap();
    assert_eq!(created["make"], "Toyota");
    assert_eq!(created["price"], 1.0);

    let resp = client
        .put(format!("{}/car/{}", base_url, created["id"].as_str().unwrap()))
        .header("content-type", "text/plain")
        .body(r#"{"make":"Toyota","model":"Corolla","year":2021,"price":2.0}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<JsonValue>().await.unwrap()["year"], 2021);

    let resp = client
        .post(format!("{}/cars", base_url))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Invalid car data");
}

#[tokio::test]
async fn null_body_creates_a_zero_valued_car() {
    let base_url = spawn_in_memory().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/cars", base_url))
        .header("content-type", "application/json")
        .body("null")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: JsonValue = resp.json().await.unwrap();
    assert_eq!(
        created,
        json!({"id": created["id"], "make": "", "model": "", "year": 0, "price": 0.0})
    );
}

#[tokio::test]
async fn unrouted_requests_carry_an_error_body() {
    let base_url = spawn_in_memory().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{}/car/", base_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Not found");

    let resp = client
        .patch(format!("{}/car/{}", base_url, CarId::generate()))
        .json(&json!({"make": "Toyota"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(error_message(resp).await, "Method not allowed");

    let resp = client.delete(format!("{}/cars", base_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(error_message(resp).await, "Method not allowed");
}

#[tokio::test]
async fn client_supplied_id_is_ignored_on_create() {
    let base_url = spawn_in_memory().await;
    let client = reqwest::Client::new();

    let chosen = "000000000000000000000001";
    let created = create(
        &client,
        &base_url,
        json!({"id": chosen, "make": "Kia", "model": "Rio", "year": 2012, "price": 4200.0}),
    )
    .await;
    assert_ne!(created["id"], chosen);
}

#[tokio::test]
async fn storage_failures_are_generic_server_errors() {
    let base_url = spawn_app(Arc::new(UnreachableCollection), Duration::from_secs(10)).await;
    let client = reqwest::Client::new();
    let car_url = format!("{}/car/{}", base_url, CarId::generate());
    let car = json!({"make": "Toyota", "model": "Corolla", "year": 2020, "price": 19999.99});

    let cases = vec![
        (client.get(format!("{}/cars", base_url)), "Failed to fetch cars"),
        (client.post(format!("{}/cars", base_url)).json(&car), "Failed to add car"),
        (client.get(&car_url), "Failed to fetch car"),
        (client.put(&car_url).json(&car), "Failed to update car"),
        (client.delete(&car_url), "Failed to delete car"),
    ];
    for (request, expected) in cases {
        let resp = request.send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = resp.text().await.unwrap();
        assert_eq!(serde_json::from_str::<JsonValue>(&body).unwrap(), json!({"error": expected}));
        assert!(!body.contains("connection refused"));
    }
}

#[tokio::test]
async fn invalid_input_never_reaches_storage() {
    // Any storage call here would answer 500.
    let base_url = spawn_app(Arc::new(UnreachableCollection), Duration::from_secs(10)).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/car/not-a-valid-id", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .put(format!("{}/car/{}", base_url, CarId::generate()))
        .json(&json!({"price": "cheap"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(format!("{}/cars", base_url))
        .json(&json!("a car"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stalled_storage_call_hits_the_deadline() {
    let base_url = spawn_app(Arc::new(StalledCollection), Duration::from_millis(100)).await;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let resp = client
        .get(format!("{}/car/{}", base_url, CarId::generate()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(resp).await, "Failed to fetch car");

    let resp = client.get(format!("{}/cars", base_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_reflects_storage_reachability() {
    let client = reqwest::Client::new();

    let healthy = spawn_in_memory().await;
    let resp = client.get(format!("{}/health", healthy)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<JsonValue>().await.unwrap(), json!({"status": "ok"}));

    let unhealthy = spawn_app(Arc::new(UnreachableCollection), Duration::from_secs(10)).await;
    let resp = client.get(format!("{}/health", unhealthy)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.json::<JsonValue>().await.unwrap()["status"], "unhealthy");
}

#[tokio::test]
async fn cors_allows_the_configured_origin() {
    let base_url = spawn_in_memory().await;
    let client = reqwest::Client::new();

    let resp = client
        .request(reqwest::Method::OPTIONS, format!("{}/cars", base_url))
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );

    let resp = client
        .get(format!("{}/cars", base_url))
        .header("origin", "http://evil.test")
        .send()
        .await
        .unwrap();
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}
