use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Days, NaiveTime, Utc};
use serde_json::{json, Value};
use service_marketplace::api::rest::router;
use service_marketplace::catalog::seed::seed_catalog;
use service_marketplace::state::AppState;
use tower::ServiceExt;

async fn setup_with_delay(delay: Duration) -> (axum::Router, Arc<AppState>) {
    let state = AppState::in_memory(delay, 64).unwrap();
    seed_catalog(state.catalog.as_ref()).await.unwrap();
    let shared = Arc::new(state);
    (router(shared.clone()), shared)
}

async fn setup() -> axum::Router {
    setup_with_delay(Duration::from_millis(20)).await.0
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    empty_request("GET", uri)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn booking_date() -> String {
    (Utc::now().date_naive() + Days::new(2))
        .format("%Y-%m-%d")
        .to_string()
}

async fn login(app: &axum::Router, email: &str) -> Value {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/session/login",
            json!({ "email": email, "password": "pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await
}

async fn open_workflow(app: &axum::Router, service_id: &str) -> String {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/workflows",
            json!({ "serviceId": service_id }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let workflow = body_json(res).await;
    assert_eq!(workflow["phase"], "collecting");
    workflow["id"].as_str().unwrap().to_string()
}

async fn select_slot(app: &axum::Router, workflow_id: &str) {
    let res = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/workflows/{workflow_id}"),
            json!({ "date": booking_date(), "time": "10:00", "notes": "Gate code 1234" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_returns_ok() {
    let app = setup().await;
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["services"], 2);
    assert_eq!(body["workflows"], 0);
    assert_eq!(body["bookings"], 0);
    assert_eq!(body["signed_in"], false);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup().await;
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("workflows_open"));
}

#[tokio::test]
async fn login_role_follows_identity_provider() {
    let app = setup().await;

    let worker = login(&app, "pat.worker@x.com").await;
    assert_eq!(worker["role"], "worker");

    let user = login(&app, "pat@x.com").await;
    assert_eq!(user["role"], "user");
    assert_eq!(user["name"], "pat");

    let res = app.oneshot(get_request("/session")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let current = body_json(res).await;
    assert_eq!(current["id"], user["id"]);
}

#[tokio::test]
async fn logout_clears_session() {
    let app = setup().await;
    login(&app, "pat@x.com").await;

    let res = app
        .clone()
        .oneshot(empty_request("DELETE", "/session"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = app.oneshot(get_request("/session")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_as_admin_is_rejected() {
    let app = setup().await;
    let res = app
        .oneshot(json_request(
            "POST",
            "/session/register",
            json!({ "email": "x@x.com", "password": "pw", "name": "X", "role": "admin" }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn register_as_worker_starts_session() {
    let app = setup().await;
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/session/register",
            json!({ "email": "sam@x.com", "password": "pw", "name": "Sam", "role": "worker" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.oneshot(get_request("/session")).await.unwrap();
    let current = body_json(res).await;
    assert_eq!(current["role"], "worker");
    assert_eq!(current["name"], "Sam");
}

#[tokio::test]
async fn category_filter_selects_gardening() {
    let app = setup().await;
    let res = app
        .oneshot(get_request("/services?q=&category=gardening"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], "2");
    assert_eq!(list[0]["category"], "gardening");
}

#[tokio::test]
async fn text_query_is_case_insensitive() {
    let app = setup().await;
    let res = app
        .oneshot(get_request("/services?q=SUPPLIES"))
        .await
        .unwrap();

    let body = body_json(res).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], "1");
}

#[tokio::test]
async fn services_sort_by_proximity_when_origin_given() {
    let app = setup().await;
    let res = app
        .oneshot(get_request("/services?near_lat=40.76&near_lng=-73.98"))
        .await
        .unwrap();

    let body = body_json(res).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["location"]["address"], "Manhattan, NY");
}

#[tokio::test]
async fn unknown_service_returns_404() {
    let app = setup().await;
    let res = app.oneshot(get_request("/services/missing")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn worker_profile_includes_services() {
    let app = setup().await;
    let res = app.oneshot(get_request("/workers/1")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["name"], "Alice Johnson");
    assert_eq!(body["role"], "worker");
    assert_eq!(body["availability"], "available");
    assert_eq!(body["services"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn creating_services_requires_provider_role() {
    let app = setup().await;
    let listing = json!({
        "workerId": "2",
        "title": "Hedge Trimming",
        "description": "Neat hedges in an afternoon",
        "category": "gardening",
        "price": 60.0,
        "duration": 90,
        "location": { "lat": 40.75, "lng": -73.99, "address": "Midtown, NY" }
    });

    let res = app
        .clone()
        .oneshot(json_request("POST", "/services", listing.clone()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    login(&app, "pat@x.com").await;
    let res = app
        .clone()
        .oneshot(json_request("POST", "/services", listing.clone()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    login(&app, "bob.worker@x.com").await;
    let res = app
        .clone()
        .oneshot(json_request("POST", "/services", listing))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(get_request("/services?category=gardening"))
        .await
        .unwrap();
    let body = body_json(res).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn patching_service_to_wildcard_or_blank_title_is_rejected() {
    let app = setup().await;
    login(&app, "bob.worker@x.com").await;

    for patch in [json!({ "category": "all" }), json!({ "title": "" })] {
        let res = app
            .clone()
            .oneshot(json_request("PATCH", "/services/2", patch))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    let res = app
        .oneshot(get_request("/services?category=gardening"))
        .await
        .unwrap();
    let body = body_json(res).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Garden Maintenance & Landscaping");
}

#[tokio::test]
async fn rejected_workflow_update_changes_nothing() {
    let app = setup().await;
    let id = open_workflow(&app, "1").await;

    let res = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/workflows/{id}"),
            json!({ "date": booking_date(), "time": "08:00", "notes": "n" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = app
        .oneshot(get_request(&format!("/workflows/{id}")))
        .await
        .unwrap();
    let workflow = body_json(res).await;
    assert!(workflow["date"].is_null());
    assert!(workflow["time"].is_null());
    assert_eq!(workflow["notes"], "");
}

#[tokio::test]
async fn confirm_without_selection_returns_422_and_keeps_collecting() {
    let app = setup().await;
    let id = open_workflow(&app, "1").await;

    let res = app
        .clone()
        .oneshot(empty_request("POST", &format!("/workflows/{id}/confirm")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = app
        .clone()
        .oneshot(get_request(&format!("/workflows/{id}")))
        .await
        .unwrap();
    let workflow = body_json(res).await;
    assert_eq!(workflow["phase"], "collecting");
    assert_eq!(workflow["busy"], false);

    let res = app.oneshot(get_request("/bookings")).await.unwrap();
    let bookings = body_json(res).await;
    assert!(bookings.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn past_dates_are_rejected() {
    let app = setup().await;
    let id = open_workflow(&app, "1").await;
    let yesterday = (Utc::now().date_naive() - Days::new(1))
        .format("%Y-%m-%d")
        .to_string();

    let res = app
        .oneshot(json_request(
            "PATCH",
            &format!("/workflows/{id}"),
            json!({ "date": yesterday }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn full_booking_flow() {
    let app = setup().await;
    let customer = login(&app, "pat@x.com").await;
    let id = open_workflow(&app, "1").await;
    select_slot(&app, &id).await;

    let res = app
        .clone()
        .oneshot(empty_request("POST", &format!("/workflows/{id}/confirm")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let workflow = body_json(res).await;
    assert_eq!(workflow["phase"], "submitting");
    assert_eq!(workflow["busy"], true);

    tokio::time::sleep(Duration::from_millis(200)).await;

    // confirmed workflows are disposed
    let res = app
        .clone()
        .oneshot(get_request(&format!("/workflows/{id}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.clone().oneshot(get_request("/bookings")).await.unwrap();
    let bookings = body_json(res).await;
    let list = bookings.as_array().unwrap();
    assert_eq!(list.len(), 1);

    let booking = &list[0];
    assert_eq!(booking["serviceId"], "1");
    assert_eq!(booking["workerId"], "1");
    assert_eq!(booking["customerId"], customer["id"]);
    assert_eq!(booking["totalAmount"], 80.0);
    assert_eq!(booking["status"], "confirmed");
    assert_eq!(booking["paymentStatus"], "paid");
    assert_eq!(booking["notes"], "Gate code 1234");

    let scheduled: DateTime<Utc> = booking["scheduledAt"].as_str().unwrap().parse().unwrap();
    let expected = (Utc::now().date_naive() + Days::new(2))
        .and_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap())
        .and_utc();
    assert_eq!(scheduled, expected);

    let booking_id = booking["id"].as_str().unwrap().to_string();
    let res = app
        .clone()
        .oneshot(get_request(&format!("/bookings/{booking_id}/messages")))
        .await
        .unwrap();
    let thread = body_json(res).await;
    assert_eq!(thread.as_array().unwrap().len(), 1);
    assert_eq!(thread[0]["type"], "system");

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/bookings/{booking_id}/messages"),
            json!({ "message": "Thanks!" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let posted = body_json(res).await;
    assert_eq!(posted["senderId"], customer["id"]);
    assert_eq!(posted["type"], "text");

    let res = app
        .oneshot(get_request("/workers/1/dashboard"))
        .await
        .unwrap();
    let dashboard = body_json(res).await;
    assert_eq!(dashboard["activeBookings"].as_array().unwrap().len(), 1);
    assert!(dashboard["earnings"]["thisMonth"].as_f64().is_some());
}

#[tokio::test]
async fn second_confirm_while_submitting_conflicts() {
    let (app, state) = setup_with_delay(Duration::from_millis(200)).await;
    let id = open_workflow(&app, "2").await;
    select_slot(&app, &id).await;

    let res = app
        .clone()
        .oneshot(empty_request("POST", &format!("/workflows/{id}/confirm")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let res = app
        .clone()
        .oneshot(empty_request("POST", &format!("/workflows/{id}/confirm")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(state.ledger.len(), 1);
}

#[tokio::test]
async fn dismissing_during_submission_drops_the_booking() {
    let (app, state) = setup_with_delay(Duration::from_millis(200)).await;
    let id = open_workflow(&app, "1").await;
    select_slot(&app, &id).await;

    let res = app
        .clone()
        .oneshot(empty_request("POST", &format!("/workflows/{id}/confirm")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let res = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/workflows/{id}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let dismissed = body_json(res).await;
    assert_eq!(dismissed["phase"], "dismissed");

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(state.ledger.is_empty());
    assert_eq!(state.desk.open_count(), 0);
}

#[tokio::test]
async fn locations_sort_nearest_first() {
    let app = setup().await;
    let res = app
        .oneshot(get_request("/locations?near_lat=41.9&near_lng=-87.6"))
        .await
        .unwrap();

    let body = body_json(res).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 4);
    assert_eq!(list[0]["address"], "Chicago, IL");
    assert_eq!(list[0]["services"], 8);
}

#[tokio::test]
async fn selecting_location_publishes_event() {
    let (app, state) = setup_with_delay(Duration::from_millis(20)).await;
    let mut events = state.events.subscribe();

    let res = app
        .oneshot(json_request(
            "POST",
            "/locations/select",
            json!({ "lat": 29.7604, "lng": -95.3698, "address": "Houston, TX" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let event = serde_json::to_value(events.try_recv().unwrap()).unwrap();
    assert_eq!(event["kind"], "location_selected");
    assert_eq!(event["location"]["address"], "Houston, TX");
}

#[tokio::test]
async fn categories_include_wildcard() {
    let app = setup().await;
    let res = app.oneshot(get_request("/categories")).await.unwrap();

    let body = body_json(res).await;
    assert_eq!(body[0], "all");
    assert_eq!(body.as_array().unwrap().len(), 6);
}
