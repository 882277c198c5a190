use asistencia_core::error::AppError;
use asistencia_core::models::{NewTaller, Taller, TallerUpdate, join_dias, split_dias};
use sqlx::SqlitePool;

/// Repository for taller (workshop) persistence.
#[derive(Clone)]
pub struct TallerRepository {
    pool: SqlitePool,
}

impl TallerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all talleres ordered by nombre.
    pub async fn list(&self) -> Result<Vec<Taller>, AppError> {
        let rows = sqlx::query_as::<_, TallerRow>(
            r#"
            SELECT id, nombre, dias
            FROM talleres
            ORDER BY nombre
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a single taller by id.
    pub async fn get(&self, id: i64) -> Result<Option<Taller>, AppError> {
        let row = sqlx::query_as::<_, TallerRow>(
            r#"SELECT id, nombre, dias FROM talleres WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    /// Check whether a taller exists.
    pub async fn exists(&self, id: i64) -> Result<bool, AppError> {
        let row: Option<(i64,)> = sqlx::query_as(r#"SELECT 1 FROM talleres WHERE id = ?"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.is_some())
    }

    /// Insert a new taller. Returns the stored entity with its generated id.
    pub async fn create(&self, taller: &NewTaller) -> Result<Taller, AppError> {
        let result = sqlx::query(r#"INSERT INTO talleres (nombre, dias) VALUES (?, ?)"#)
            .bind(&taller.nombre)
            .bind(join_dias(&taller.dias))
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(Taller {
            id: result.last_insert_rowid(),
            nombre: taller.nombre.clone(),
            dias: taller.dias.clone(),
        })
    }

    /// Apply a partial update. Returns the updated taller, or `None` when
    /// the id does not exist.
    pub async fn update(&self, id: i64, update: &TallerUpdate) -> Result<Option<Taller>, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE talleres
            SET nombre = COALESCE(?, nombre),
                dias = COALESCE(?, dias)
            WHERE id = ?
            "#,
        )
        .bind(&update.nombre)
        .bind(update.dias.as_deref().map(join_dias))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    /// Delete a taller. Membership rows go with it (FK cascade); alumnos
    /// themselves are never touched. Returns false when the id is unknown.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM talleres WHERE id = ?"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct TallerRow {
    id: i64,
    nombre: String,
    dias: String,
}

impl From<TallerRow> for Taller {
    fn from(row: TallerRow) -> Self {
        Taller {
            id: row.id,
            nombre: row.nombre,
            dias: split_dias(&row.dias),
        }
    }
}
