use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use asistencia_core::error::AppError;
use asistencia_core::models::{AlumnoUpdate, AsistenciaMark, NewAlumno, NewTaller, TallerUpdate};

use crate::auth::{self, require_auth};
use crate::dto::{
    AlumnoResponse, AsistenciaQuery, BulkImportResponse, BulkRowError, CreateAlumnoRequest,
    CreateTallerRequest, HealthResponse, LoginRequest, MessageResponse, RegisterRequest,
    RosterEntryResponse, SaveAsistenciasRequest, SaveAsistenciasResponse, TallerResponse,
    TokenResponse, UpdateAlumnoRequest, UpdateTallerRequest, UserResponse,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/talleres", get(list_talleres))
        .route("/talleres", post(create_taller))
        .route("/talleres/{id}", put(update_taller))
        .route("/talleres/{id}", delete(delete_taller))
        .route("/alumnos", get(list_alumnos))
        .route("/alumnos", post(create_alumno))
        .route("/alumnos/bulk", post(bulk_import_alumnos))
        .route("/alumnos/{id}", put(update_alumno))
        .route("/alumnos/{id}", delete(delete_alumno))
        .route("/asistencias", get(get_asistencias))
        .route("/asistencias", post(save_asistencias))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public.merge(api).with_state(state)
}

// ---------------------------------------------------------------------------
// Talleres
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/talleres",
    responses(
        (status = 200, description = "All talleres ordered by nombre", body = [TallerResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "talleres"
)]
pub async fn list_talleres(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let talleres = state.db.taller_repo().list().await?;

    Ok(axum::Json(
        talleres
            .into_iter()
            .map(TallerResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    post,
    path = "/talleres",
    request_body = CreateTallerRequest,
    responses(
        (status = 201, description = "Taller created", body = TallerResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "talleres"
)]
pub async fn create_taller(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<CreateTallerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let nombre = body
        .nombre
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("nombre is required".to_string()))?;

    let taller = state
        .db
        .taller_repo()
        .create(&NewTaller {
            nombre,
            dias: body.dias.unwrap_or_default(),
        })
        .await?;

    Ok((StatusCode::CREATED, axum::Json(TallerResponse::from(taller))))
}

#[utoipa::path(
    put,
    path = "/talleres/{id}",
    params(
        ("id" = i64, Path, description = "Taller id")
    ),
    request_body = UpdateTallerRequest,
    responses(
        (status = 200, description = "Taller updated", body = TallerResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "talleres"
)]
pub async fn update_taller(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    axum::Json(body): axum::Json<UpdateTallerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = TallerUpdate {
        nombre: body.nombre.filter(|n| !n.is_empty()),
        dias: body.dias,
    };

    if update.nombre.is_none() && update.dias.is_none() {
        return Err(AppError::Validation("Either nombre or dias must be provided".to_string()).into());
    }

    let taller = state
        .db
        .taller_repo()
        .update(id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Taller not found: {id}")))?;

    Ok(axum::Json(TallerResponse::from(taller)))
}

#[utoipa::path(
    delete,
    path = "/talleres/{id}",
    params(
        ("id" = i64, Path, description = "Taller id")
    ),
    responses(
        (status = 200, description = "Taller deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "talleres"
)]
pub async fn delete_taller(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.db.taller_repo().delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Taller not found: {id}")).into());
    }

    Ok(axum::Json(MessageResponse {
        message: "Taller eliminado correctamente".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Alumnos
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/alumnos",
    responses(
        (status = 200, description = "All alumnos ordered by apellidos", body = [AlumnoResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "alumnos"
)]
pub async fn list_alumnos(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let alumnos = state.db.alumno_repo().list().await?;

    Ok(axum::Json(
        alumnos
            .into_iter()
            .map(AlumnoResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    post,
    path = "/alumnos",
    request_body = CreateAlumnoRequest,
    responses(
        (status = 201, description = "Alumno created", body = AlumnoResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "alumnos"
)]
pub async fn create_alumno(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<CreateAlumnoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let nuevo = validate_alumno_row(body)?;
    let alumno = state.db.alumno_repo().create(&nuevo).await?;

    Ok((StatusCode::CREATED, axum::Json(AlumnoResponse::from(alumno))))
}

#[utoipa::path(
    put,
    path = "/alumnos/{id}",
    params(
        ("id" = i64, Path, description = "Alumno id")
    ),
    request_body = UpdateAlumnoRequest,
    responses(
        (status = 200, description = "Alumno updated", body = AlumnoResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "alumnos"
)]
pub async fn update_alumno(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    axum::Json(body): axum::Json<UpdateAlumnoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = AlumnoUpdate {
        nombre: body.nombre.filter(|n| !n.is_empty()),
        apellidos: body.apellidos.filter(|a| !a.is_empty()),
        direccion: body.direccion,
        telefono: body.telefono,
        talleres: body.talleres,
    };

    let alumno = state
        .db
        .alumno_repo()
        .update(id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Alumno not found: {id}")))?;

    Ok(axum::Json(AlumnoResponse::from(alumno)))
}

#[utoipa::path(
    delete,
    path = "/alumnos/{id}",
    params(
        ("id" = i64, Path, description = "Alumno id")
    ),
    responses(
        (status = 200, description = "Alumno deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "alumnos"
)]
pub async fn delete_alumno(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.db.alumno_repo().delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Alumno not found: {id}")).into());
    }

    Ok(axum::Json(MessageResponse {
        message: "Alumno eliminado correctamente".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/alumnos/bulk",
    request_body = [CreateAlumnoRequest],
    responses(
        (status = 200, description = "Batch processed", body = BulkImportResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "alumnos"
)]
pub async fn bulk_import_alumnos(
    State(state): State<Arc<AppState>>,
    axum::Json(rows): axum::Json<Vec<CreateAlumnoRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = state.db.alumno_repo();
    let mut creados = Vec::new();
    let mut errores = Vec::new();

    // Best-effort: every row is validated and inserted on its own, so one
    // bad row never blocks the rest of the batch.
    for (fila, row) in rows.into_iter().enumerate() {
        let nuevo = match validate_alumno_row(row) {
            Ok(nuevo) => nuevo,
            Err(e) => {
                errores.push(BulkRowError {
                    fila,
                    error: e.to_string(),
                });
                continue;
            }
        };

        match repo.create(&nuevo).await {
            Ok(alumno) => creados.push(AlumnoResponse::from(alumno)),
            Err(e) => errores.push(BulkRowError {
                fila,
                error: e.to_string(),
            }),
        }
    }

    Ok(axum::Json(BulkImportResponse { creados, errores }))
}

fn validate_alumno_row(row: CreateAlumnoRequest) -> Result<NewAlumno, AppError> {
    let nombre = row
        .nombre
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("nombre is required".to_string()))?;
    let apellidos = row
        .apellidos
        .filter(|a| !a.is_empty())
        .ok_or_else(|| AppError::Validation("apellidos is required".to_string()))?;

    Ok(NewAlumno {
        nombre,
        apellidos,
        direccion: row.direccion,
        telefono: row.telefono,
        taller_id: row.taller_id,
    })
}

// ---------------------------------------------------------------------------
// Asistencias
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/asistencias",
    params(AsistenciaQuery),
    responses(
        (status = 200, description = "Roster for the taller and date", body = [RosterEntryResponse]),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "asistencias"
)]
pub async fn get_asistencias(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AsistenciaQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.taller_repo().exists(query.taller_id).await? {
        return Err(AppError::NotFound(format!("Taller not found: {}", query.taller_id)).into());
    }

    let roster = state
        .db
        .asistencia_repo()
        .roster(query.taller_id, query.fecha)
        .await?;

    Ok(axum::Json(
        roster
            .into_iter()
            .map(RosterEntryResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    post,
    path = "/asistencias",
    request_body = SaveAsistenciasRequest,
    responses(
        (status = 200, description = "Attendance saved", body = SaveAsistenciasResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "asistencias"
)]
pub async fn save_asistencias(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<SaveAsistenciasRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.taller_repo().exists(body.taller_id).await? {
        return Err(AppError::NotFound(format!("Taller not found: {}", body.taller_id)).into());
    }

    let marks: Vec<AsistenciaMark> = body
        .asistencias
        .iter()
        .map(|m| AsistenciaMark {
            alumno_id: m.alumno_id,
            presente: m.presente,
        })
        .collect();

    let guardadas = state
        .db
        .asistencia_repo()
        .save(body.taller_id, body.fecha, &marks)
        .await?;

    Ok(axum::Json(SaveAsistenciasResponse {
        message: "Asistencias guardadas correctamente".to_string(),
        guardadas,
    }))
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
        (status = 409, description = "Username taken", body = crate::dto::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.username.is_empty() || body.password.is_empty() {
        return Err(
            AppError::Validation("username and password are required".to_string()).into(),
        );
    }

    let hash = auth::hash_password(&body.password)?;
    let user = state.db.user_repo().create(&body.username, &hash).await?;

    Ok((StatusCode::CREATED, axum::Json(UserResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = crate::dto::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .user_repo()
        .find_by_username(&body.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !auth::verify_password(&body.password, &user.password_hash) {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()).into());
    }

    let token = auth::create_access_token(user.id, &state.auth)?;

    Ok(axum::Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_status = match state.db.health_check().await {
        Ok(()) => "ok",
        Err(_) => "error",
    };

    let status = if db_status == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if db_status == "ok" {
            "healthy"
        } else {
            "unhealthy"
        },
        database: db_status,
    };

    (status, axum::Json(response))
}
