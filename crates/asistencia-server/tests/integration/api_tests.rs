use axum::http::StatusCode;
use serde_json::json;

use crate::integration::common::{auth_token, request, setup_test_app};

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let (status, body) = request(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn unauthenticated_request_returns_401() {
    let app = setup_test_app().await;

    let (status, body) = request(&app, "GET", "/talleres", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn garbage_token_returns_401() {
    let app = setup_test_app().await;

    let (status, _) = request(&app, "GET", "/talleres", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Talleres
// ---------------------------------------------------------------------------

#[tokio::test]
async fn taller_crud_round_trip() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    // Create
    let (status, created) = request(
        &app,
        "POST",
        "/talleres",
        Some(&token),
        Some(json!({"nombre": "Ajedrez", "dias": ["Lunes", "Miercoles"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["nombre"], "Ajedrez");
    assert_eq!(created["dias"], json!(["Lunes", "Miercoles"]));
    let id = created["id"].as_i64().unwrap();

    // List
    let (status, list) = request(&app, "GET", "/talleres", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], id);

    // Update
    let (status, updated) = request(
        &app,
        "PUT",
        &format!("/talleres/{id}"),
        Some(&token),
        Some(json!({"dias": ["Viernes"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["nombre"], "Ajedrez");
    assert_eq!(updated["dias"], json!(["Viernes"]));

    // Delete
    let (status, body) = request(
        &app,
        "DELETE",
        &format!("/talleres/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Taller eliminado correctamente");

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/talleres/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_taller_requires_nombre() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (status, body) = request(
        &app,
        "POST",
        "/talleres",
        Some(&token),
        Some(json!({"dias": ["Lunes"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn update_taller_requires_some_field() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (_, created) = request(
        &app,
        "POST",
        "/talleres",
        Some(&token),
        Some(json!({"nombre": "Teatro"})),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        "PUT",
        &format!("/talleres/{id}"),
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn update_missing_taller_returns_404() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (status, body) = request(
        &app,
        "PUT",
        "/talleres/999",
        Some(&token),
        Some(json!({"nombre": "Nada"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

// ---------------------------------------------------------------------------
// Alumnos
// ---------------------------------------------------------------------------

#[tokio::test]
async fn alumno_crud_round_trip() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (_, taller) = request(
        &app,
        "POST",
        "/talleres",
        Some(&token),
        Some(json!({"nombre": "Musica"})),
    )
    .await;
    let taller_id = taller["id"].as_i64().unwrap();

    // Create enrolled in the taller
    let (status, created) = request(
        &app,
        "POST",
        "/alumnos",
        Some(&token),
        Some(json!({
            "nombre": "Ana",
            "apellidos": "Gomez",
            "direccion": "Calle Mayor 1",
            "telefono": "600111222",
            "tallerId": taller_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["talleres"], json!([taller_id]));
    let id = created["id"].as_i64().unwrap();

    // List is ordered by apellidos and includes memberships
    let (_, _) = request(
        &app,
        "POST",
        "/alumnos",
        Some(&token),
        Some(json!({"nombre": "Berta", "apellidos": "Alonso"})),
    )
    .await;
    let (status, list) = request(&app, "GET", "/alumnos", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["apellidos"], "Alonso");
    assert_eq!(list[1]["apellidos"], "Gomez");
    assert_eq!(list[1]["talleres"], json!([taller_id]));

    // Update clears the membership set
    let (status, updated) = request(
        &app,
        "PUT",
        &format!("/alumnos/{id}"),
        Some(&token),
        Some(json!({"telefono": "600999888", "talleres": []})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["telefono"], "600999888");
    assert_eq!(updated["talleres"], json!([]));

    // Delete
    let (status, body) = request(
        &app,
        "DELETE",
        &format!("/alumnos/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Alumno eliminado correctamente");

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/alumnos/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_alumno_with_unknown_taller_returns_400() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (status, body) = request(
        &app,
        "POST",
        "/alumnos",
        Some(&token),
        Some(json!({"nombre": "Eva", "apellidos": "Santos", "tallerId": 999})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn bulk_import_partitions_rows() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (_, taller) = request(
        &app,
        "POST",
        "/talleres",
        Some(&token),
        Some(json!({"nombre": "Musica"})),
    )
    .await;
    let taller_id = taller["id"].as_i64().unwrap();

    let rows = json!([
        {"nombre": "Ana", "apellidos": "Gomez", "tallerId": taller_id},
        {"nombre": "SinApellidos"},
        {"nombre": "Eva", "apellidos": "Santos", "tallerId": 999}
    ]);

    let (status, body) = request(&app, "POST", "/alumnos/bulk", Some(&token), Some(rows)).await;
    assert_eq!(status, StatusCode::OK);

    let creados = body["creados"].as_array().unwrap();
    assert_eq!(creados.len(), 1);
    assert_eq!(creados[0]["apellidos"], "Gomez");

    let errores = body["errores"].as_array().unwrap();
    assert_eq!(errores.len(), 2);
    assert_eq!(errores[0]["fila"], 1);
    assert_eq!(errores[1]["fila"], 2);

    // Only the valid row was committed.
    let (_, list) = request(&app, "GET", "/alumnos", Some(&token), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Asistencias
// ---------------------------------------------------------------------------

async fn setup_roster(
    app: &crate::integration::common::TestApp,
    token: &str,
) -> (i64, i64, i64) {
    let (_, taller) = request(
        app,
        "POST",
        "/talleres",
        Some(token),
        Some(json!({"nombre": "Ajedrez", "dias": ["Lunes"]})),
    )
    .await;
    let taller_id = taller["id"].as_i64().unwrap();

    let mut ids = Vec::new();
    for (nombre, apellidos) in [("Ana", "Gomez"), ("Luis", "Perez")] {
        let (_, alumno) = request(
            app,
            "POST",
            "/alumnos",
            Some(token),
            Some(json!({"nombre": nombre, "apellidos": apellidos, "tallerId": taller_id})),
        )
        .await;
        ids.push(alumno["id"].as_i64().unwrap());
    }

    (taller_id, ids[0], ids[1])
}

#[tokio::test]
async fn asistencias_save_and_roster_round_trip() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;
    let (taller_id, ana, luis) = setup_roster(&app, &token).await;

    // Roster defaults to absent before any save.
    let uri = format!("/asistencias?tallerId={taller_id}&fecha=2025-03-10");
    let (status, roster) = request(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let roster = roster.as_array().unwrap();
    assert_eq!(roster.len(), 2);
    assert_eq!(roster[0]["apellidos"], "Gomez");
    assert_eq!(roster[0]["presente"], false);

    // Save the day's marks.
    let (status, body) = request(
        &app,
        "POST",
        "/asistencias",
        Some(&token),
        Some(json!({
            "tallerId": taller_id,
            "fecha": "2025-03-10",
            "asistencias": [
                {"alumnoId": ana, "presente": true},
                {"alumnoId": luis, "presente": false}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["guardadas"], 2);
    assert_eq!(body["message"], "Asistencias guardadas correctamente");

    let (_, roster) = request(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(roster[0]["presente"], true); // Gomez
    assert_eq!(roster[1]["presente"], false); // Perez

    // Re-saving replaces the previous records.
    let (status, _) = request(
        &app,
        "POST",
        "/asistencias",
        Some(&token),
        Some(json!({
            "tallerId": taller_id,
            "fecha": "2025-03-10",
            "asistencias": [
                {"alumnoId": ana, "presente": false},
                {"alumnoId": luis, "presente": true}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, roster) = request(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(roster[0]["presente"], false);
    assert_eq!(roster[1]["presente"], true);

    // Another date is untouched.
    let other = format!("/asistencias?tallerId={taller_id}&fecha=2025-03-11");
    let (_, roster) = request(&app, "GET", &other, Some(&token), None).await;
    assert_eq!(roster[0]["presente"], false);
    assert_eq!(roster[1]["presente"], false);
}

#[tokio::test]
async fn asistencias_unknown_taller_returns_404() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (status, _) = request(
        &app,
        "GET",
        "/asistencias?tallerId=999&fecha=2025-03-10",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = request(
        &app,
        "POST",
        "/asistencias",
        Some(&token),
        Some(json!({"tallerId": 999, "fecha": "2025-03-10", "asistencias": []})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn asistencias_reject_non_enrolled_alumno() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;
    let (taller_id, ana, _) = setup_roster(&app, &token).await;

    let (_, outsider) = request(
        &app,
        "POST",
        "/alumnos",
        Some(&token),
        Some(json!({"nombre": "Eva", "apellidos": "Santos"})),
    )
    .await;
    let outsider_id = outsider["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        "POST",
        "/asistencias",
        Some(&token),
        Some(json!({
            "tallerId": taller_id,
            "fecha": "2025-03-10",
            "asistencias": [
                {"alumnoId": ana, "presente": true},
                {"alumnoId": outsider_id, "presente": true}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    // The valid mark rolled back with the rest.
    let uri = format!("/asistencias?tallerId={taller_id}&fecha=2025-03-10");
    let (_, roster) = request(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(roster[0]["presente"], false);
}
