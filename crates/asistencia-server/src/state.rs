use asistencia_db::Database;

use crate::auth::AuthConfig;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    pub auth: AuthConfig,
}
