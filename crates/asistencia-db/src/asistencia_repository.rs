use std::collections::HashSet;

use asistencia_core::error::AppError;
use asistencia_core::models::{AsistenciaMark, RosterEntry};
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// Repository for daily attendance records.
#[derive(Clone)]
pub struct AsistenciaRepository {
    pool: SqlitePool,
}

impl AsistenciaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Build a workshop's roster for one date: every enrolled alumno with
    /// their recorded flag, false when no record exists for that date.
    pub async fn roster(
        &self,
        taller_id: i64,
        fecha: NaiveDate,
    ) -> Result<Vec<RosterEntry>, AppError> {
        let rows = sqlx::query_as::<_, RosterRow>(
            r#"
            SELECT a.id AS alumno_id, a.nombre, a.apellidos,
                   COALESCE(s.presente, 0) AS presente
            FROM alumnos a
            JOIN alumno_taller m ON m.alumno_id = a.id
            LEFT JOIN asistencias s ON s.alumno_id = a.id AND s.fecha = ?
            WHERE m.taller_id = ?
            ORDER BY a.apellidos, a.nombre
            "#,
        )
        .bind(fecha)
        .bind(taller_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Save a workshop's attendance for one date.
    ///
    /// Runs in a single transaction: the existing records for that date
    /// belonging to the workshop's enrolled students are deleted, then one
    /// record per submitted mark is inserted. Re-saving the same
    /// (taller, fecha) therefore replaces the previous roster. A mark for
    /// a student not enrolled in the workshop fails the whole save and
    /// nothing is committed.
    pub async fn save(
        &self,
        taller_id: i64,
        fecha: NaiveDate,
        marks: &[AsistenciaMark],
    ) -> Result<usize, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let enrolled: Vec<i64> =
            sqlx::query_scalar(r#"SELECT alumno_id FROM alumno_taller WHERE taller_id = ?"#)
                .bind(taller_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        let enrolled: HashSet<i64> = enrolled.into_iter().collect();

        for mark in marks {
            if !enrolled.contains(&mark.alumno_id) {
                // Dropping the transaction rolls back.
                return Err(AppError::Validation(format!(
                    "Alumno {} is not enrolled in taller {taller_id}",
                    mark.alumno_id
                )));
            }
        }

        sqlx::query(
            r#"
            DELETE FROM asistencias
            WHERE fecha = ?
              AND alumno_id IN (SELECT alumno_id FROM alumno_taller WHERE taller_id = ?)
            "#,
        )
        .bind(fecha)
        .bind(taller_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        for mark in marks {
            sqlx::query(r#"INSERT INTO asistencias (fecha, presente, alumno_id) VALUES (?, ?, ?)"#)
                .bind(fecha)
                .bind(mark.presente)
                .bind(mark.alumno_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(marks.len())
    }

    /// Count the stored records for one alumno (used by tests and the
    /// cascade checks).
    pub async fn count_for_alumno(&self, alumno_id: i64) -> Result<i64, AppError> {
        let (count,): (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM asistencias WHERE alumno_id = ?"#)
                .bind(alumno_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(count)
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct RosterRow {
    alumno_id: i64,
    nombre: String,
    apellidos: String,
    presente: bool,
}

impl From<RosterRow> for RosterEntry {
    fn from(row: RosterRow) -> Self {
        RosterEntry {
            alumno_id: row.alumno_id,
            nombre: row.nombre,
            apellidos: row.apellidos,
            presente: row.presente,
        }
    }
}
