//! Ticket API integration tests against the in-process router.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestFixture;

#[tokio::test]
async fn test_create_ticket_starts_open() {
    let fixture = TestFixture::new();
    let token = fixture.admin_token().await;

    let response = fixture
        .post(
            "/api/v1/tickets",
            Some(&token),
            json!({
                "client_name": "  João Silva ",
                "address": "Rua das Flores, 10",
                "description": "Geladeira não gela",
            }),
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    let body = &response.body;
    assert_eq!(body["client_name"], "João Silva");
    assert_eq!(body["status"], "open");
    assert_eq!(body["created_at"], body["updated_at"]);
    assert_eq!(body["status_meta"]["label"], "Aberto");
    assert_eq!(body["next_status"], "in_progress");
    assert_eq!(body["next_action"], "Iniciar");
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));

    assert!(fixture
        .notifier
        .descriptions()
        .contains(&"Chamado criado com sucesso".to_string()));
}

#[tokio::test]
async fn test_create_ticket_with_blank_field_is_rejected() {
    let fixture = TestFixture::new();
    let token = fixture.admin_token().await;

    let response = fixture
        .post(
            "/api/v1/tickets",
            Some(&token),
            json!({ "client_name": "Ana", "address": "   ", "description": "" }),
        )
        .await;

    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["error"],
        "Preencha todos os campos obrigatórios"
    );
    assert_eq!(response.body["fields"], json!(["address", "description"]));

    let list = fixture.get("/api/v1/tickets", Some(&token)).await;
    assert_eq!(list.body["total"], 0);
}

#[tokio::test]
async fn test_full_lifecycle() {
    let fixture = TestFixture::new();
    let token = fixture.admin_token().await;
    let created = fixture.create_ticket(&token, "Ana").await;
    let id = created["id"].as_str().unwrap();

    let first = fixture
        .post_empty(&format!("/api/v1/tickets/{}/advance", id), Some(&token))
        .await;
    assert_status!(first, StatusCode::OK);
    assert_eq!(first.body["status"], "in_progress");
    assert_eq!(first.body["next_action"], "Concluir");

    let second = fixture
        .post_empty(&format!("/api/v1/tickets/{}/advance", id), Some(&token))
        .await;
    assert_status!(second, StatusCode::OK);
    assert_eq!(second.body["status"], "completed");
    assert_eq!(second.body["created_at"], created["created_at"]);
    assert_ne!(second.body["updated_at"], created["updated_at"]);
    assert!(second.body["next_status"].is_null());

    let third = fixture
        .post_empty(&format!("/api/v1/tickets/{}/advance", id), Some(&token))
        .await;
    assert_status!(third, StatusCode::CONFLICT);

    let deleted = fixture
        .delete(&format!("/api/v1/tickets/{}", id), Some(&token))
        .await;
    assert_status!(deleted, StatusCode::OK);

    let missing = fixture
        .get(&format!("/api/v1/tickets/{}", id), Some(&token))
        .await;
    assert_status!(missing, StatusCode::NOT_FOUND);

    let list = fixture.get("/api/v1/tickets", Some(&token)).await;
    assert_eq!(list.body["tickets"], json!([]));
}

#[tokio::test]
async fn test_set_status_only_accepts_next_status() {
    let fixture = TestFixture::new();
    let token = fixture.admin_token().await;
    let created = fixture.create_ticket(&token, "Ana").await;
    let path = format!("/api/v1/tickets/{}/status", created["id"].as_str().unwrap());

    let skip = fixture
        .put(&path, Some(&token), json!({ "status": "completed" }))
        .await;
    assert_status!(skip, StatusCode::CONFLICT);

    let next = fixture
        .put(&path, Some(&token), json!({ "status": "in_progress" }))
        .await;
    assert_status!(next, StatusCode::OK);
    assert_eq!(next.body["status"], "in_progress");

    let back = fixture.put(&path, Some(&token), json!({ "status": "open" })).await;
    assert_status!(back, StatusCode::CONFLICT);

    assert!(fixture
        .notifier
        .descriptions()
        .contains(&"Status alterado para \"Em Andamento\"".to_string()));
}

#[tokio::test]
async fn test_set_status_to_current_status_is_rejected() {
    let fixture = TestFixture::new();
    let token = fixture.admin_token().await;
    let created = fixture.create_ticket(&token, "Ana").await;
    let id = created["id"].as_str().unwrap();
    let path = format!("/api/v1/tickets/{}/status", id);

    fixture
        .put(&path, Some(&token), json!({ "status": "in_progress" }))
        .await;
    let completed = fixture
        .put(&path, Some(&token), json!({ "status": "completed" }))
        .await;
    assert_status!(completed, StatusCode::OK);
    fixture.notifier.clear();

    let again = fixture
        .put(&path, Some(&token), json!({ "status": "completed" }))
        .await;
    assert_status!(again, StatusCode::CONFLICT);
    assert!(fixture.notifier.descriptions().is_empty());

    let fetched = fixture
        .get(&format!("/api/v1/tickets/{}", id), Some(&token))
        .await;
    assert_eq!(fetched.body["status"], "completed");
    assert_eq!(fetched.body["updated_at"], completed.body["updated_at"]);
}

#[tokio::test]
async fn test_edit_keeps_status_and_created_at() {
    let fixture = TestFixture::new();
    let token = fixture.admin_token().await;
    let created = fixture.create_ticket(&token, "Ana").await;
    let id = created["id"].as_str().unwrap();
    fixture
        .post_empty(&format!("/api/v1/tickets/{}/advance", id), Some(&token))
        .await;

    let response = fixture
        .patch(
            &format!("/api/v1/tickets/{}", id),
            Some(&token),
            json!({ "description": "Troca de compressor" }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["description"], "Troca de compressor");
    assert_eq!(response.body["client_name"], "Ana");
    assert_eq!(response.body["status"], "in_progress");
    assert_eq!(response.body["created_at"], created["created_at"]);
}

#[tokio::test]
async fn test_edit_rejects_immutable_and_blank_fields() {
    let fixture = TestFixture::new();
    let token = fixture.admin_token().await;
    let created = fixture.create_ticket(&token, "Ana").await;
    let path = format!("/api/v1/tickets/{}", created["id"].as_str().unwrap());

    let with_id = fixture
        .patch(&path, Some(&token), json!({ "id": "other", "client_name": "X" }))
        .await;
    assert_status!(with_id, StatusCode::UNPROCESSABLE_ENTITY);

    let with_created_at = fixture
        .patch(&path, Some(&token), json!({ "created_at": "2020-01-01T00:00:00Z" }))
        .await;
    assert_status!(with_created_at, StatusCode::UNPROCESSABLE_ENTITY);

    let blank = fixture
        .patch(&path, Some(&token), json!({ "client_name": "  " }))
        .await;
    assert_status!(blank, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(blank.body["fields"], json!(["client_name"]));

    let empty = fixture.patch(&path, Some(&token), json!({})).await;
    assert_status!(empty, StatusCode::BAD_REQUEST);

    let unchanged = fixture.get(&path, Some(&token)).await;
    assert_eq!(unchanged.body["client_name"], "Ana");
    assert_eq!(unchanged.body["updated_at"], created["updated_at"]);
}

#[tokio::test]
async fn test_edit_missing_ticket_is_not_found() {
    let fixture = TestFixture::new();
    let token = fixture.admin_token().await;

    let response = fixture
        .patch(
            "/api/v1/tickets/does-not-exist",
            Some(&token),
            json!({ "client_name": "X" }),
        )
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);

    let response = fixture
        .delete("/api/v1/tickets/does-not-exist", Some(&token))
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_and_counts() {
    let fixture = TestFixture::new();
    let token = fixture.admin_token().await;

    let joao = fixture.create_ticket(&token, "João Silva").await;
    fixture.create_ticket(&token, "Maria Souza").await;
    let pedro = fixture.create_ticket(&token, "Pedro Lima").await;
    for ticket in [&joao, &pedro] {
        fixture
            .post_empty(
                &format!("/api/v1/tickets/{}/advance", ticket["id"].as_str().unwrap()),
                Some(&token),
            )
            .await;
    }

    let all = fixture.get("/api/v1/tickets", Some(&token)).await;
    assert_status!(all, StatusCode::OK);
    assert_eq!(all.body["total"], 3);
    assert_eq!(
        all.body["counts"],
        json!({ "all": 3, "open": 1, "in_progress": 2, "completed": 0 })
    );
    // Newest first
    assert_eq!(all.body["tickets"][0]["client_name"], "Pedro Lima");
    assert_eq!(all.body["tickets"][2]["client_name"], "João Silva");

    let in_progress = fixture
        .get("/api/v1/tickets?tab=in_progress", Some(&token))
        .await;
    assert_eq!(in_progress.body["total"], 2);
    assert_eq!(in_progress.body["counts"]["all"], 3);

    let search = fixture
        .get("/api/v1/tickets?tab=all&search=silva", Some(&token))
        .await;
    assert_eq!(search.body["total"], 1);
    assert_eq!(search.body["tickets"][0]["client_name"], "João Silva");

    let accentless = fixture
        .get("/api/v1/tickets?search=joao", Some(&token))
        .await;
    assert_eq!(accentless.body["total"], 0);

    let bad_tab = fixture.get("/api/v1/tickets?tab=todos", Some(&token)).await;
    assert_status!(bad_tab, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_viewer_can_read_but_not_mutate() {
    let fixture = TestFixture::new();
    let admin = fixture.admin_token().await;
    let viewer = fixture.viewer_token().await;
    let created = fixture.create_ticket(&admin, "Ana").await;
    let id = created["id"].as_str().unwrap();

    let list = fixture.get("/api/v1/tickets", Some(&viewer)).await;
    assert_status!(list, StatusCode::OK);
    assert_eq!(list.body["total"], 1);

    let one = fixture
        .get(&format!("/api/v1/tickets/{}", id), Some(&viewer))
        .await;
    assert_status!(one, StatusCode::OK);

    let create = fixture
        .post(
            "/api/v1/tickets",
            Some(&viewer),
            json!({ "client_name": "A", "address": "B", "description": "C" }),
        )
        .await;
    assert_status!(create, StatusCode::FORBIDDEN);

    let edit = fixture
        .patch(
            &format!("/api/v1/tickets/{}", id),
            Some(&viewer),
            json!({ "client_name": "X" }),
        )
        .await;
    assert_status!(edit, StatusCode::FORBIDDEN);

    let advance = fixture
        .post_empty(&format!("/api/v1/tickets/{}/advance", id), Some(&viewer))
        .await;
    assert_status!(advance, StatusCode::FORBIDDEN);

    let status = fixture
        .put(
            &format!("/api/v1/tickets/{}/status", id),
            Some(&viewer),
            json!({ "status": "in_progress" }),
        )
        .await;
    assert_status!(status, StatusCode::FORBIDDEN);

    let delete = fixture
        .delete(&format!("/api/v1/tickets/{}", id), Some(&viewer))
        .await;
    assert_status!(delete, StatusCode::FORBIDDEN);

    let after = fixture
        .get(&format!("/api/v1/tickets/{}", id), Some(&admin))
        .await;
    assert_eq!(after.body["status"], "open");
    assert_eq!(after.body["client_name"], "Ana");
}

#[tokio::test]
async fn test_store_failure_maps_to_server_error() {
    let fixture = TestFixture::new();
    let token = fixture.admin_token().await;
    let created = fixture.create_ticket(&token, "Ana").await;
    let id = created["id"].as_str().unwrap();

    fixture.store.set_failing(true);

    let list = fixture.get("/api/v1/tickets", Some(&token)).await;
    assert_status!(list, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(list.body["error"].as_str().is_some());

    let advance = fixture
        .post_empty(&format!("/api/v1/tickets/{}/advance", id), Some(&token))
        .await;
    assert_status!(advance, StatusCode::INTERNAL_SERVER_ERROR);

    fixture.store.set_failing(false);
    let after = fixture
        .get(&format!("/api/v1/tickets/{}", id), Some(&token))
        .await;
    assert_eq!(after.body["status"], "open");
}

#[tokio::test]
async fn test_statuses_table() {
    let fixture = TestFixture::new();
    let token = fixture.viewer_token().await;

    let response = fixture.get("/api/v1/statuses", Some(&token)).await;
    assert_status!(response, StatusCode::OK);

    let statuses = response.body.as_array().unwrap();
    assert_eq!(statuses.len(), 3);
    assert_eq!(statuses[0]["status"], "open");
    assert_eq!(statuses[0]["next_status"], "in_progress");
    assert_eq!(statuses[1]["label"], "Em Andamento");
    assert_eq!(statuses[1]["advance_label"], "Iniciar");
    assert_eq!(statuses[2]["label"], "Concluído");
    assert_eq!(statuses[2]["color"], "success");
    assert!(statuses[2]["next_status"].is_null());
}
