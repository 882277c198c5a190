use chrono::NaiveDate;

/// A workshop ("taller") students enroll in.
///
/// `dias` holds the weekday labels the workshop runs on. The database stores
/// them as a single comma-delimited column; the rest of the system only ever
/// sees the decoded list.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Taller {
    pub id: i64,
    pub nombre: String,
    pub dias: Vec<String>,
}

/// DTO for inserting a new taller.
#[derive(Debug, Clone)]
pub struct NewTaller {
    pub nombre: String,
    pub dias: Vec<String>,
}

/// Partial update for a taller. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TallerUpdate {
    pub nombre: Option<String>,
    pub dias: Option<Vec<String>>,
}

/// A student ("alumno"), with the ids of the talleres they are enrolled in.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Alumno {
    pub id: i64,
    pub nombre: String,
    pub apellidos: String,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub talleres: Vec<i64>,
}

/// DTO for inserting a new alumno, optionally enrolled in one taller.
#[derive(Debug, Clone)]
pub struct NewAlumno {
    pub nombre: String,
    pub apellidos: String,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub taller_id: Option<i64>,
}

/// Partial update for an alumno. A `Some` in `talleres` replaces the whole
/// membership set.
#[derive(Debug, Clone, Default)]
pub struct AlumnoUpdate {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub talleres: Option<Vec<i64>>,
}

/// One attendance record: at most one per (alumno, fecha).
#[derive(Debug, Clone, serde::Serialize)]
pub struct Asistencia {
    pub id: i64,
    pub fecha: NaiveDate,
    pub presente: bool,
    pub alumno_id: i64,
}

/// A present/absent mark submitted for one alumno on a roster save.
#[derive(Debug, Clone, Copy)]
pub struct AsistenciaMark {
    pub alumno_id: i64,
    pub presente: bool,
}

/// One line of a workshop's roster for a given date: the enrolled alumno
/// plus their recorded flag (false when no record exists yet).
#[derive(Debug, Clone, serde::Serialize)]
pub struct RosterEntry {
    pub alumno_id: i64,
    pub nombre: String,
    pub apellidos: String,
    pub presente: bool,
}

/// A local account for bearer-token auth.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// Encode weekday labels into the delimited column format.
pub fn join_dias(dias: &[String]) -> String {
    dias.join(",")
}

/// Decode the delimited column format back into weekday labels.
/// An empty column means "no days", not one empty label.
pub fn split_dias(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::to_string).collect()
}
