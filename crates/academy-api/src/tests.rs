//! Router tests against a fixture-seeded `MemoryStore`.

use std::sync::Arc;

use academy_store_memory::MemoryStore;
use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn send(
  store: &Arc<MemoryStore>,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let resp = api_router(store.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

fn store() -> Arc<MemoryStore> { Arc::new(MemoryStore::fixtures()) }

// ── Collections ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_filters_and_sorts() {
  let s = store();
  let (status, body) = send(&s, "GET", "/programs?category=draft&sort=name_asc", None).await;
  assert_eq!(status, StatusCode::OK);
  let names: Vec<_> = body.as_array().unwrap().iter().map(|p| p["name"].clone()).collect();
  assert_eq!(names, vec![json!("Cybersecurity Essentials"), json!("Mobile App Development")]);

  let (_, body) = send(&s, "GET", "/modules?owner=1", None).await;
  assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn create_returns_201_with_a_new_id() {
  let s = store();
  let (status, body) = send(
    &s,
    "POST",
    "/programs",
    Some(json!({
      "name": "Test Program",
      "dates": { "start": "2025-01-01", "end": "2025-02-01" },
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["id"], 7);
  assert_eq!(body["status"], "draft");
}

#[tokio::test]
async fn invalid_draft_is_422_with_fields() {
  let s = store();
  let (status, body) = send(&s, "POST", "/students", Some(json!({ "email": "nope" }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["error"], "Student name is required");
  assert_eq!(body["fields"][0]["field"], "name");
  assert_eq!(body["fields"][1]["field"], "email");
}

#[tokio::test]
async fn reversed_dates_are_rejected() {
  let s = store();
  let (status, body) = send(
    &s,
    "POST",
    "/programs",
    Some(json!({
      "name": "Backwards",
      "dates": { "start": "2025-03-01", "end": "2025-02-01" },
    })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["fields"][0]["field"], "dates");
}

#[tokio::test]
async fn dangling_reference_is_422() {
  let s = store();
  let (status, _) = send(&s, "POST", "/modules", Some(json!({ "name": "x", "program_id": 50 }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn module_prefills_program_from_query() {
  let s = store();
  let (status, body) =
    send(&s, "POST", "/modules?programId=3", Some(json!({ "name": "Visualization" }))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["program_id"], 3);
}

#[tokio::test]
async fn update_missing_is_404() {
  let s = store();
  let (status, _) = send(
    &s,
    "PUT",
    "/parents/99",
    Some(json!({ "name": "A", "email": "a@example.com", "phone": "1" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_id_is_400() {
  let s = store();
  let (status, _) = send(&s, "GET", "/students/abc", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_400() {
  let req = Request::builder()
    .method("POST")
    .uri("/parents")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{\"name\": "))
    .unwrap();
  let resp = api_router(store()).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Deletes ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn blocked_delete_is_409() {
  let s = store();
  let (status, body) = send(&s, "DELETE", "/programs/1", None).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["dependents"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn cascade_delete_reports_affected() {
  let s = store();
  let (status, body) = send(&s, "DELETE", "/programs/2?cascade=true", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["outcome"], "cascaded_deleted");
  assert_eq!(body["affected"], json!([{ "kind": "module", "id": 4 }]));

  let (status, _) = send(&s, "GET", "/modules/4", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_missing_record_is_404() {
  let s = store();
  let (status, _) = send(&s, "DELETE", "/students/3", None).await;
  assert_eq!(status, StatusCode::OK);
  let (status, _) = send(&s, "DELETE", "/students/3", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Detail views ────────────────────────────────────────────────────────────

#[tokio::test]
async fn module_detail_lists_curriculum_in_order() {
  let s = store();
  let (status, body) = send(&s, "GET", "/modules/1", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["program"]["id"], 1);
  let positions: Vec<_> = body["curriculum"]
    .as_array()
    .unwrap()
    .iter()
    .map(|i| i["position"].as_u64().unwrap())
    .collect();
  assert_eq!(positions, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn curriculum_detail_includes_renderer() {
  let s = store();
  let (_, body) = send(&s, "GET", "/curriculum/1", None).await;
  assert_eq!(body["content"]["kind"], "pdf");
  assert_eq!(body["content"]["renderer"], "document_frame");
  assert_eq!(body["content"]["src"], "/curriculum/html-intro.pdf#toolbar=0&navpanes=0");
}

#[tokio::test]
async fn dashboard_counts_fixtures() {
  let s = store();
  let (_, body) = send(&s, "GET", "/dashboard", None).await;
  assert_eq!(body["students"], 7);
  assert_eq!(body["active_programs"], 2);
}

#[tokio::test]
async fn organization_page_lists_enrolled_programs() {
  let s = store();
  let (status, body) = send(&s, "GET", "/organizations/1", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["student_count"], 3);
  let programs: Vec<_> =
    body["programs"].as_array().unwrap().iter().map(|p| p["id"].clone()).collect();
  assert_eq!(programs, vec![json!(1), json!(3)]);

  let (_, body) = send(&s, "GET", "/organizations/2", None).await;
  assert_eq!(body["programs"], json!([]));
}

#[tokio::test]
async fn summaries_carry_counts() {
  let s = store();
  let (status, body) = send(&s, "GET", "/programs/summaries?sort=name_asc", None).await;
  assert_eq!(status, StatusCode::OK);
  let web = body
    .as_array()
    .unwrap()
    .iter()
    .find(|p| p["name"] == "Web Development Fundamentals")
    .unwrap();
  assert_eq!(web["module_count"], 3);
  assert_eq!(web["id"], 1);

  let (_, body) = send(&s, "GET", "/organizations/summaries?text=tech", None).await;
  assert_eq!(body.as_array().unwrap().len(), 1);
  assert_eq!(body[0]["student_count"], 3);

  let (_, body) = send(&s, "GET", "/programs/1", None).await;
  assert_eq!(body["module_count"], 3);
}

// ── Curriculum ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn nested_curriculum_gets_next_position() {
  let s = store();
  let (status, body) = send(
    &s,
    "POST",
    "/modules/2/curriculum",
    Some(json!({
      "title": "Flexbox",
      "content": { "url": "https://css-tricks.com/snippets/css/a-guide-to-flexbox/" },
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["module_id"], 2);
  assert_eq!(body["position"], 3);
}

#[tokio::test]
async fn concurrent_appends_take_distinct_positions() {
  let s = store();
  let item = |title: &str| {
    Some(json!({ "title": title, "content": { "url": "https://example.com/grid" } }))
  };
  let ((a, first), (b, second)) = tokio::join!(
    send(&s, "POST", "/modules/2/curriculum", item("Grid")),
    send(&s, "POST", "/modules/2/curriculum", item("Subgrid")),
  );
  assert_eq!((a, b), (StatusCode::CREATED, StatusCode::CREATED));
  let mut positions = vec![first["position"].clone(), second["position"].clone()];
  positions.sort_by_key(|p| p.as_u64());
  assert_eq!(positions, vec![json!(3), json!(4)]);
}

#[tokio::test]
async fn curriculum_position_past_the_end_is_422() {
  let s = store();
  let (status, _) = send(
    &s,
    "POST",
    "/modules/1/curriculum",
    Some(json!({ "title": "Tables", "position": 10, "content": { "url": "/tables.pdf" } })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let (_, body) = send(&s, "GET", "/modules/1/curriculum", None).await;
  assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn curriculum_without_content_is_422() {
  let s = store();
  let (status, body) =
    send(&s, "POST", "/modules/2/curriculum", Some(json!({ "title": "Grid" }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["error"], "Please upload a file or provide a URL");
}

#[tokio::test]
async fn move_reports_whether_it_moved() {
  let s = store();
  let (_, body) = send(&s, "POST", "/curriculum/2/move", Some(json!({ "direction": "up" }))).await;
  assert_eq!(body["moved"], true);
  let (_, body) = send(&s, "POST", "/curriculum/2/move", Some(json!({ "direction": "up" }))).await;
  assert_eq!(body["moved"], false);
}

// ── Links ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn attach_achievements_to_module() {
  let s = store();
  let (status, body) =
    send(&s, "POST", "/modules/2/achievements", Some(json!({ "ids": [3, 7] }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["attached"], json!([3, 7]));

  let (_, body) = send(&s, "GET", "/modules/2/achievements", None).await;
  let linked = body.as_array().unwrap();
  assert_eq!(linked.len(), 2);
  assert!(linked.iter().all(|a| a["is_default"] == false));
  assert_eq!(linked[0]["name"], "CSS Stylist");
}

#[tokio::test]
async fn toggle_default_and_detach() {
  let s = store();
  let (status, _) = send(
    &s,
    "PUT",
    "/programs/1/achievements/2/default",
    Some(json!({ "is_default": true })),
  )
  .await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = send(&s, "DELETE", "/programs/1/achievements/2", None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&s, "DELETE", "/programs/1/achievements/2", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn enrollment_progress_round_trip() {
  let s = store();
  let (_, body) = send(&s, "POST", "/students/2/programs", Some(json!({ "ids": [1] }))).await;
  assert_eq!(body["attached"], json!([1]));

  let (status, _) = send(
    &s,
    "PUT",
    "/students/2/programs/1/progress",
    Some(json!({ "progress": 40 })),
  )
  .await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, body) = send(&s, "GET", "/students/2/programs", None).await;
  assert_eq!(body[0]["progress"], 40);
  assert_eq!(body[0]["program"]["name"], "Web Development Fundamentals");
}

#[tokio::test]
async fn progress_above_100_is_clamped() {
  let s = store();
  for sent in [300, 1000] {
    let (status, _) = send(
      &s,
      "PUT",
      "/students/1/programs/1/progress",
      Some(json!({ "progress": sent })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&s, "GET", "/students/1/programs", None).await;
    let enrolled = body.as_array().unwrap().iter().find(|e| e["program"]["id"] == 1).unwrap();
    assert_eq!(enrolled["progress"], 100);
  }

  let (status, _) = send(
    &s,
    "PUT",
    "/students/1/programs/1/progress",
    Some(json!({ "progress": -5 })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn parents_and_children_are_symmetric() {
  let s = store();
  send(&s, "POST", "/students/3/parents", Some(json!({ "ids": [6] }))).await;
  let (_, body) = send(&s, "GET", "/parents/6/students", None).await;
  assert_eq!(body[0]["name"], "Michael Brown");
  let (_, body) = send(&s, "GET", "/students/3/parents", None).await;
  assert_eq!(body[0]["name"], "Patricia Brown");
}

#[tokio::test]
async fn links_on_missing_owner_are_404() {
  let s = store();
  let (status, _) = send(&s, "GET", "/students/99/achievements", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) =
    send(&s, "POST", "/programs/99/achievements", Some(json!({ "ids": [1] }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}
