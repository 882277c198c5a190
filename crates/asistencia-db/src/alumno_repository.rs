use std::collections::HashMap;

use asistencia_core::error::AppError;
use asistencia_core::models::{Alumno, AlumnoUpdate, NewAlumno};
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Repository for alumno (student) persistence, including workshop
/// membership rows.
#[derive(Clone)]
pub struct AlumnoRepository {
    pool: SqlitePool,
}

impl AlumnoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all alumnos ordered by apellidos, each with the ids of the
    /// talleres they are enrolled in.
    pub async fn list(&self) -> Result<Vec<Alumno>, AppError> {
        let rows = sqlx::query_as::<_, AlumnoRow>(
            r#"
            SELECT id, nombre, apellidos, direccion, telefono
            FROM alumnos
            ORDER BY apellidos, nombre
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let memberships: Vec<(i64, i64)> = sqlx::query_as(
            r#"SELECT alumno_id, taller_id FROM alumno_taller ORDER BY taller_id"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let mut by_alumno: HashMap<i64, Vec<i64>> = HashMap::new();
        for (alumno_id, taller_id) in memberships {
            by_alumno.entry(alumno_id).or_default().push(taller_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let talleres = by_alumno.remove(&row.id).unwrap_or_default();
                row.into_alumno(talleres)
            })
            .collect())
    }

    /// Get a single alumno by id, with their enrolled taller ids.
    pub async fn get(&self, id: i64) -> Result<Option<Alumno>, AppError> {
        let row = sqlx::query_as::<_, AlumnoRow>(
            r#"SELECT id, nombre, apellidos, direccion, telefono FROM alumnos WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let talleres: Vec<i64> = sqlx::query_scalar(
            r#"SELECT taller_id FROM alumno_taller WHERE alumno_id = ? ORDER BY taller_id"#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(Some(row.into_alumno(talleres)))
    }

    /// Insert a new alumno, enrolling them in `taller_id` when given.
    /// An unknown taller id fails validation before anything is written.
    pub async fn create(&self, alumno: &NewAlumno) -> Result<Alumno, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if let Some(taller_id) = alumno.taller_id {
            ensure_taller_exists(&mut tx, taller_id).await?;
        }

        let result = sqlx::query(
            r#"
            INSERT INTO alumnos (nombre, apellidos, direccion, telefono)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&alumno.nombre)
        .bind(&alumno.apellidos)
        .bind(&alumno.direccion)
        .bind(&alumno.telefono)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let id = result.last_insert_rowid();

        if let Some(taller_id) = alumno.taller_id {
            sqlx::query(r#"INSERT INTO alumno_taller (alumno_id, taller_id) VALUES (?, ?)"#)
                .bind(id)
                .bind(taller_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(Alumno {
            id,
            nombre: alumno.nombre.clone(),
            apellidos: alumno.apellidos.clone(),
            direccion: alumno.direccion.clone(),
            telefono: alumno.telefono.clone(),
            talleres: alumno.taller_id.into_iter().collect(),
        })
    }

    /// Apply a partial update. A `Some` in `talleres` replaces the whole
    /// membership set. Returns `None` when the id does not exist.
    pub async fn update(&self, id: i64, update: &AlumnoUpdate) -> Result<Option<Alumno>, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE alumnos
            SET nombre = COALESCE(?, nombre),
                apellidos = COALESCE(?, apellidos),
                direccion = COALESCE(?, direccion),
                telefono = COALESCE(?, telefono)
            WHERE id = ?
            "#,
        )
        .bind(&update.nombre)
        .bind(&update.apellidos)
        .bind(&update.direccion)
        .bind(&update.telefono)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        if let Some(talleres) = &update.talleres {
            for taller_id in talleres {
                ensure_taller_exists(&mut tx, *taller_id).await?;
            }

            sqlx::query(r#"DELETE FROM alumno_taller WHERE alumno_id = ?"#)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;

            for taller_id in talleres {
                sqlx::query(r#"INSERT INTO alumno_taller (alumno_id, taller_id) VALUES (?, ?)"#)
                    .bind(id)
                    .bind(taller_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| AppError::DatabaseError(e.to_string()))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        self.get(id).await
    }

    /// Delete an alumno. Their asistencias and membership rows go with
    /// them (FK cascade). Returns false when the id is unknown.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM alumnos WHERE id = ?"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

async fn ensure_taller_exists(
    tx: &mut Transaction<'_, Sqlite>,
    taller_id: i64,
) -> Result<(), AppError> {
    let row: Option<(i64,)> = sqlx::query_as(r#"SELECT 1 FROM talleres WHERE id = ?"#)
        .bind(taller_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    if row.is_none() {
        return Err(AppError::Validation(format!(
            "Taller {taller_id} does not exist"
        )));
    }
    Ok(())
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct AlumnoRow {
    id: i64,
    nombre: String,
    apellidos: String,
    direccion: Option<String>,
    telefono: Option<String>,
}

impl AlumnoRow {
    fn into_alumno(self, talleres: Vec<i64>) -> Alumno {
        Alumno {
            id: self.id,
            nombre: self.nombre,
            apellidos: self.apellidos,
            direccion: self.direccion,
            telefono: self.telefono,
            talleres,
        }
    }
}
