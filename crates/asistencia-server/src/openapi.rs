use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Asistencia API",
        version = "0.1.0",
        description = "Attendance tracking for workshops and their students."
    ),
    paths(
        crate::routes::list_talleres,
        crate::routes::create_taller,
        crate::routes::update_taller,
        crate::routes::delete_taller,
        crate::routes::list_alumnos,
        crate::routes::create_alumno,
        crate::routes::update_alumno,
        crate::routes::delete_alumno,
        crate::routes::bulk_import_alumnos,
        crate::routes::get_asistencias,
        crate::routes::save_asistencias,
        crate::routes::register,
        crate::routes::login,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::TallerResponse,
        crate::dto::CreateTallerRequest,
        crate::dto::UpdateTallerRequest,
        crate::dto::AlumnoResponse,
        crate::dto::CreateAlumnoRequest,
        crate::dto::UpdateAlumnoRequest,
        crate::dto::BulkRowError,
        crate::dto::BulkImportResponse,
        crate::dto::RosterEntryResponse,
        crate::dto::AsistenciaMarkRequest,
        crate::dto::SaveAsistenciasRequest,
        crate::dto::SaveAsistenciasResponse,
        crate::dto::RegisterRequest,
        crate::dto::LoginRequest,
        crate::dto::UserResponse,
        crate::dto::TokenResponse,
        crate::dto::MessageResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "talleres", description = "Workshop management"),
        (name = "alumnos", description = "Student management and bulk import"),
        (name = "asistencias", description = "Daily attendance rosters"),
        (name = "auth", description = "Account registration and login"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token obtained from POST /auth/login."))
                        .build(),
                ),
            );
        }
    }
}
