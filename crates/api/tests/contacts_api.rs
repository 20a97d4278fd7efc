//! HTTP-level integration tests for emergency contacts.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json_auth, signup_and_login};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_contacts_are_listed_by_priority(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signup_and_login(&app, "contacts@example.com").await;

    let response = post_json_auth(
        app.clone(),
        "/v1/me/contacts",
        &token,
        serde_json::json!({ "name": "Neighbour", "phone": "+66 2 555 0100", "priority": 2 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json_auth(
        app.clone(),
        "/v1/me/contacts",
        &token,
        serde_json::json!({
            "name": "Sister",
            "phone": "+66 81 555 0199",
            "email": " Sister@Example.com ",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let sister = body_json(response).await;
    assert_eq!(sister["email"], "sister@example.com");
    assert_eq!(sister["priority"], 1);

    let response = get_auth(app, "/v1/me/contacts", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Sister", "Neighbour"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_contact_validation(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signup_and_login(&app, "invalid@example.com").await;

    for body in [
        serde_json::json!({ "name": " ", "phone": "+66 81 555 0199" }),
        serde_json::json!({ "name": "Mum", "phone": "" }),
        serde_json::json!({ "name": "Mum", "phone": "+66 81 555 0199", "email": "nope" }),
        serde_json::json!({ "name": "Mum", "phone": "+66 81 555 0199", "priority": 0 }),
    ] {
        let response = post_json_auth(app.clone(), "/v1/me/contacts", &token, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_contact_is_scoped_to_owner(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = signup_and_login(&app, "owner@example.com").await;
    let other = signup_and_login(&app, "other@example.com").await;

    let response = post_json_auth(
        app.clone(),
        "/v1/me/contacts",
        &owner,
        serde_json::json!({ "name": "Dad", "phone": "+66 81 555 0123" }),
    )
    .await;
    let contact_id = body_json(response).await["id"].as_i64().unwrap();

    let response = delete_auth(app.clone(), &format!("/v1/me/contacts/{contact_id}"), &other).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app.clone(), &format!("/v1/me/contacts/{contact_id}"), &owner).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app, &format!("/v1/me/contacts/{contact_id}"), &owner).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
