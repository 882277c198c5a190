use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use asistencia_core::models::{Alumno, RosterEntry, Taller, User};

// ---------------------------------------------------------------------------
// Talleres
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TallerResponse {
    pub id: i64,
    pub nombre: String,
    pub dias: Vec<String>,
}

impl From<Taller> for TallerResponse {
    fn from(t: Taller) -> Self {
        Self {
            id: t.id,
            nombre: t.nombre,
            dias: t.dias,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateTallerRequest {
    /// Workshop name (required, non-empty)
    pub nombre: Option<String>,
    /// Weekday labels, e.g. ["Lunes", "Miercoles"]
    pub dias: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateTallerRequest {
    pub nombre: Option<String>,
    pub dias: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Alumnos
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AlumnoResponse {
    pub id: i64,
    pub nombre: String,
    pub apellidos: String,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    /// Ids of the talleres the alumno is enrolled in
    pub talleres: Vec<i64>,
}

impl From<Alumno> for AlumnoResponse {
    fn from(a: Alumno) -> Self {
        Self {
            id: a.id,
            nombre: a.nombre,
            apellidos: a.apellidos,
            direccion: a.direccion,
            telefono: a.telefono,
            talleres: a.talleres,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateAlumnoRequest {
    /// First name (required, non-empty)
    pub nombre: Option<String>,
    /// Surname (required, non-empty)
    pub apellidos: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    /// Enroll the new alumno in this taller
    #[serde(rename = "tallerId")]
    pub taller_id: Option<i64>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateAlumnoRequest {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    /// Replaces the whole membership set when present
    pub talleres: Option<Vec<i64>>,
}

// ---------------------------------------------------------------------------
// Bulk import
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BulkRowError {
    /// Zero-based index of the failed row in the submitted batch
    pub fila: usize,
    pub error: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BulkImportResponse {
    pub creados: Vec<AlumnoResponse>,
    pub errores: Vec<BulkRowError>,
}

// ---------------------------------------------------------------------------
// Asistencias
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct AsistenciaQuery {
    #[serde(rename = "tallerId")]
    pub taller_id: i64,
    /// Roster date, ISO 8601 (YYYY-MM-DD)
    pub fecha: NaiveDate,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RosterEntryResponse {
    #[serde(rename = "alumnoId")]
    pub alumno_id: i64,
    pub nombre: String,
    pub apellidos: String,
    pub presente: bool,
}

impl From<RosterEntry> for RosterEntryResponse {
    fn from(e: RosterEntry) -> Self {
        Self {
            alumno_id: e.alumno_id,
            nombre: e.nombre,
            apellidos: e.apellidos,
            presente: e.presente,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AsistenciaMarkRequest {
    #[serde(rename = "alumnoId")]
    pub alumno_id: i64,
    pub presente: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SaveAsistenciasRequest {
    #[serde(rename = "tallerId")]
    pub taller_id: i64,
    pub fecha: NaiveDate,
    pub asistencias: Vec<AsistenciaMarkRequest>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SaveAsistenciasResponse {
    pub message: String,
    /// Number of records written for the (taller, fecha) pair
    pub guardadas: usize,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
