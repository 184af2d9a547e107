use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use openjobmarket::config::Config;
use tower::ServiceExt;

/// Default API key seeded by migration (must match m20260301_initial.rs)
const ADMIN_API_KEY: &str = "ojm_default_api_key_please_regenerate";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single pooled connection keeps every query on the same in-memory database.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = openjobmarket::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    openjobmarket::api::router(state).await
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    api_key: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(key) = api_key {
        builder = builder.header("X-Api-Key", key);
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

/// Signs up an account and returns (api_key, profile_id).
async fn signup(app: &Router, username: &str, role: &str) -> (String, i64) {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "username": username,
            "password": "hunter2hunter2",
            "role": role,
            "display_name": format!("{username} display"),
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "signup failed: {body}");
    let api_key = body["data"]["api_key"].as_str().unwrap().to_string();
    let profile_id = body["data"]["profile_id"].as_i64().unwrap();
    (api_key, profile_id)
}

fn job_payload(title: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "description": "General maintenance work around the property",
        "location": "Camden, London, UK",
        "latitude": 51.55,
        "longitude": -0.13,
        "salary_min": 15.0,
        "salary_max": 20.0,
        "salary_period": "per_hour",
        "job_type": "full_time",
        "experience_level": "entry",
    })
}

#[tokio::test]
async fn test_auth_endpoints() {
    let app = spawn_app().await;

    let (status, _) = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some("wrong-key"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(ADMIN_API_KEY), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "admin");
    assert_eq!(body["data"]["is_admin"], true);
}

#[tokio::test]
async fn test_signup_then_login() {
    let app = spawn_app().await;

    let (api_key, profile_id) = signup(&app, "alice", "employer").await;
    assert!(profile_id > 0);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "username": "alice",
            "password": "hunter2hunter2",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["api_key"].as_str().unwrap(), api_key);
    assert_eq!(body["data"]["is_admin"], false);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "username": "alice",
            "password": "not-the-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_rejects_duplicates_and_bad_roles() {
    let app = spawn_app().await;

    signup(&app, "bob", "homeowner").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "username": "bob",
            "password": "hunter2hunter2",
            "role": "homeowner",
            "display_name": "Bob again",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "username": "carol",
            "password": "hunter2hunter2",
            "role": "landlord",
            "display_name": "Carol",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_job_lifecycle_and_search() {
    let app = spawn_app().await;
    let (key, _) = signup(&app, "acme", "employer").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(&key),
        Some(job_payload("Plumber needed")),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "job create failed: {body}");
    let job_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/api/jobs/{job_id}"), Some(&key), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Plumber needed");

    // Search is public and matches the title substring.
    let (status, body) = send(&app, "GET", "/api/jobs/search?search=plumber", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["jobs"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["jobs"][0]["poster"]["rating_count"], 0);

    // Mismatched job type filters it out.
    let (_, body) = send(
        &app,
        "GET",
        "/api/jobs/search?search=plumber&type=part_time",
        None,
        None,
    )
    .await;
    assert!(body["data"]["jobs"].as_array().unwrap().is_empty());

    // Deactivation hides it from search.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/jobs/{job_id}/deactivate"),
        Some(&key),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/jobs/search?search=plumber", None, None).await;
    assert!(body["data"]["jobs"].as_array().unwrap().is_empty());

    // The poster can still open the detail page.
    let (status, _) = send(&app, "GET", &format!("/api/jobs/{job_id}"), Some(&key), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_search_without_parameters_returns_nothing() {
    let app = spawn_app().await;
    let (key, _) = signup(&app, "acme", "employer").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(&key),
        Some(job_payload("Visible job")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/jobs/search", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["jobs"].as_array().unwrap().is_empty());
    assert_eq!(body["data"]["truncated"], false);

    // No parameters and no results: the map centers on the London default.
    assert_eq!(body["data"]["map_center"]["lat"].as_f64().unwrap(), 51.5074);
}

#[tokio::test]
async fn test_expired_job_is_excluded() {
    let app = spawn_app().await;
    let (key, _) = signup(&app, "acme", "employer").await;

    let mut payload = job_payload("Short gig");
    payload["expires_at"] = serde_json::json!("2020-01-01T00:00:00+00:00");

    let (status, _) = send(&app, "POST", "/api/jobs", Some(&key), Some(payload)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/jobs/search?search=gig", None, None).await;
    assert!(body["data"]["jobs"].as_array().unwrap().is_empty());

    // Extending the listing brings it back.
    let (_, body) = send(&app, "GET", "/api/jobs/mine", Some(&key), None).await;
    let job_id = body["data"][0]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/jobs/{job_id}/extend"),
        Some(&key),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/jobs/search?search=gig", None, None).await;
    assert_eq!(body["data"]["jobs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_geographic_search_modes() {
    let app = spawn_app().await;
    let (key, _) = signup(&app, "acme", "employer").await;

    let mut near = job_payload("Roof repair near town");
    near["location"] = serde_json::json!("Islington, London");
    near["latitude"] = serde_json::json!(51.6);
    near["longitude"] = serde_json::json!(-0.12);

    let mut far = job_payload("Roof repair far away");
    far["location"] = serde_json::json!("York");
    far["latitude"] = serde_json::json!(51.8);
    far["longitude"] = serde_json::json!(-0.12);

    for payload in [near, far] {
        let (status, _) = send(&app, "POST", "/api/jobs", Some(&key), Some(payload)).await;
        assert_eq!(status, StatusCode::OK);
    }

    // Coordinate-derived location: bounding box only, no text rescue.
    // 10 miles at lat 51.5 is roughly 0.145 degrees of latitude.
    let (_, body) = send(
        &app,
        "GET",
        "/api/jobs/search?location=geo:51.5,-0.12",
        None,
        None,
    )
    .await;
    let jobs = body["data"]["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["title"], "Roof repair near town");
    assert_eq!(body["data"]["map_center"]["lat"].as_f64().unwrap(), 51.5);

    // Place-name search without coordinates falls back to a text match on
    // the primary token.
    let (_, body) = send(&app, "GET", "/api/jobs/search?location=York", None, None).await;
    let jobs = body["data"]["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["title"], "Roof repair far away");
}

#[tokio::test]
async fn test_salary_filter_boundary() {
    let app = spawn_app().await;
    let (key, _) = signup(&app, "acme", "employer").await;

    let mut payload = job_payload("Warehouse operative");
    payload["salary_min"] = serde_json::Value::Null;
    payload["salary_max"] = serde_json::json!(2500.0);
    payload["salary_period"] = serde_json::json!("per_month");

    let (status, _) = send(&app, "POST", "/api/jobs", Some(&key), Some(payload)).await;
    assert_eq!(status, StatusCode::OK);

    // 2500/month is exactly 30000/year: the inclusive boundary matches.
    let (_, body) = send(
        &app,
        "GET",
        "/api/jobs/search?salaryMin=30000&salaryPeriod=per_year",
        None,
        None,
    )
    .await;
    assert_eq!(body["data"]["jobs"].as_array().unwrap().len(), 1);

    let (_, body) = send(
        &app,
        "GET",
        "/api/jobs/search?salaryMin=30001&salaryPeriod=per_year",
        None,
        None,
    )
    .await;
    assert!(body["data"]["jobs"].as_array().unwrap().is_empty());

    // Unparseable salary input is ignored rather than rejected.
    let (status, body) = send(
        &app,
        "GET",
        "/api/jobs/search?search=warehouse&salaryMin=lots",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["jobs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_any_search_truncates_at_fifty() {
    let app = spawn_app().await;
    let (key, _) = signup(&app, "acme", "employer").await;

    for i in 0..55 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/jobs",
            Some(&key),
            Some(job_payload(&format!("Listing {i}"))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, "GET", "/api/jobs/search?search=any", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["jobs"].as_array().unwrap().len(), 50);
    assert_eq!(body["data"]["truncated"], true);
    assert!(body["data"]["notice"].as_str().unwrap().contains("Narrow"));

    // Newest first: the most recent listing leads the page.
    assert_eq!(body["data"]["jobs"][0]["title"], "Listing 54");

    // A non-wildcard search over the same rows is not capped.
    let (_, body) = send(&app, "GET", "/api/jobs/search?search=listing", None, None).await;
    assert_eq!(body["data"]["jobs"].as_array().unwrap().len(), 55);
    assert_eq!(body["data"]["truncated"], false);
}

#[tokio::test]
async fn test_saved_jobs_filter() {
    let app = spawn_app().await;
    let (poster_key, _) = signup(&app, "acme", "employer").await;
    let (seeker_key, _) = signup(&app, "dana", "jobseeker").await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(&poster_key),
        Some(job_payload("Saveable job")),
    )
    .await;
    let job_id = body["data"]["id"].as_i64().unwrap();

    let (_, _) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(&poster_key),
        Some(job_payload("Other job")),
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/jobs/{job_id}/save"),
        Some(&seeker_key),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/jobs/saved", Some(&seeker_key), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["id"].as_i64().unwrap(), job_id);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/jobs/{job_id}/save"),
        Some(&seeker_key),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/jobs/saved", Some(&seeker_key), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_messaging_flow() {
    let app = spawn_app().await;
    let (alice_key, alice_id) = signup(&app, "alice", "homeowner").await;
    let (bob_key, bob_id) = signup(&app, "bob", "tradesperson").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/messages",
        Some(&alice_key),
        Some(serde_json::json!({
            "recipient_id": bob_id,
            "body": "Are you available next week?",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let message_id = body["data"]["id"].as_i64().unwrap();

    let (_, body) = send(&app, "GET", "/api/messages", Some(&bob_key), None).await;
    assert_eq!(body["data"]["unread"], 1);
    assert_eq!(body["data"]["messages"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/messages/{message_id}/read"),
        Some(&bob_key),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/messages", Some(&bob_key), None).await;
    assert_eq!(body["data"]["unread"], 0);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/messages/with/{alice_id}"),
        Some(&bob_key),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Messaging yourself is rejected.
    let (status, _) = send(
        &app,
        "POST",
        "/api/messages",
        Some(&alice_key),
        Some(serde_json::json!({
            "recipient_id": alice_id,
            "body": "note to self",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ratings_aggregate_on_search() {
    let app = spawn_app().await;
    let (poster_key, poster_id) = signup(&app, "acme", "employer").await;
    let (rater_key, _) = signup(&app, "dana", "jobseeker").await;

    let (_, _) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(&poster_key),
        Some(job_payload("Rated job")),
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/profiles/{poster_id}/ratings"),
        Some(&rater_key),
        Some(serde_json::json!({ "stars": 4, "comment": "Paid on time" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/jobs/search?search=rated", None, None).await;
    let poster = &body["data"]["jobs"][0]["poster"];
    assert_eq!(poster["rating_count"], 1);
    assert_eq!(poster["rating_average"].as_f64().unwrap(), 4.0);

    // Rating again replaces the previous score instead of stacking.
    let (_, _) = send(
        &app,
        "POST",
        &format!("/api/profiles/{poster_id}/ratings"),
        Some(&rater_key),
        Some(serde_json::json!({ "stars": 2 })),
    )
    .await;

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/profiles/{poster_id}"),
        Some(&rater_key),
        None,
    )
    .await;
    assert_eq!(body["data"]["rating_count"], 1);
    assert_eq!(body["data"]["rating_average"].as_f64().unwrap(), 2.0);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/profiles/{poster_id}/ratings"),
        Some(&rater_key),
        Some(serde_json::json!({ "stars": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_moderation_workflow() {
    let app = spawn_app().await;
    let (owner_key, owner_id) = signup(&app, "suspicious", "homeowner").await;
    let (reporter_key, _) = signup(&app, "vigilant", "tradesperson").await;

    let (_, _) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(&owner_key),
        Some(job_payload("Dubious listing")),
    )
    .await;

    // Non-admins cannot reach the back-office.
    let (status, _) = send(&app, "GET", "/api/admin/stats", Some(&reporter_key), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        "/api/reports",
        Some(&reporter_key),
        Some(serde_json::json!({
            "reported_id": owner_id,
            "reason": "Listing looks like a scam",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let report_id = body["data"]["id"].as_i64().unwrap();

    let (_, body) = send(
        &app,
        "GET",
        "/api/admin/reports?status=open",
        Some(ADMIN_API_KEY),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/admin/profiles/{owner_id}/ban"),
        Some(ADMIN_API_KEY),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A banned poster's jobs drop out of search.
    let (_, body) = send(&app, "GET", "/api/jobs/search?search=dubious", None, None).await;
    assert!(body["data"]["jobs"].as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/admin/reports/{report_id}/resolve"),
        Some(ADMIN_API_KEY),
        Some(serde_json::json!({ "resolution": "Poster banned" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        "GET",
        "/api/admin/reports?status=open",
        Some(ADMIN_API_KEY),
        None,
    )
    .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    // Unbanning restores visibility.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/admin/profiles/{owner_id}/unban"),
        Some(ADMIN_API_KEY),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/jobs/search?search=dubious", None, None).await;
    assert_eq!(body["data"]["jobs"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, "GET", "/api/admin/stats", Some(ADMIN_API_KEY), None).await;
    assert_eq!(body["data"]["homeowners"], 1);
    assert_eq!(body["data"]["tradespeople"], 1);
    assert_eq!(body["data"]["total_jobs"], 1);
}

#[tokio::test]
async fn test_subscription_flow() {
    let app = spawn_app().await;
    let (key, _) = signup(&app, "acme", "employer").await;

    let (_, body) = send(&app, "GET", "/api/subscriptions/current", Some(&key), None).await;
    assert_eq!(body["data"]["plan"], "free");

    let (status, body) = send(
        &app,
        "POST",
        "/api/subscriptions",
        Some(&key),
        Some(serde_json::json!({ "plan": "pro" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["plan"], "pro");
    assert_eq!(body["data"]["status"], "active");

    let (_, body) = send(&app, "GET", "/api/subscriptions/current", Some(&key), None).await;
    assert_eq!(body["data"]["plan"], "pro");

    let (status, _) = send(
        &app,
        "POST",
        "/api/subscriptions",
        Some(&key),
        Some(serde_json::json!({ "plan": "platinum" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", "/api/subscriptions", Some(&key), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/subscriptions/current", Some(&key), None).await;
    assert_eq!(body["data"]["plan"], "free");
}

#[tokio::test]
async fn test_only_posters_can_create_jobs() {
    let app = spawn_app().await;
    let (seeker_key, _) = signup(&app, "dana", "jobseeker").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(&seeker_key),
        Some(job_payload("Should not exist")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_job_ownership_is_enforced() {
    let app = spawn_app().await;
    let (owner_key, _) = signup(&app, "acme", "employer").await;
    let (other_key, _) = signup(&app, "rival", "employer").await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(&owner_key),
        Some(job_payload("Owned job")),
    )
    .await;
    let job_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/jobs/{job_id}/deactivate"),
        Some(&other_key),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/jobs/{job_id}"),
        Some(&other_key),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admins can remove any posting.
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/jobs/{job_id}"),
        Some(ADMIN_API_KEY),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
