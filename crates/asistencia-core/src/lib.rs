pub mod error;
pub mod models;

pub use error::AppError;
pub use models::{Alumno, Asistencia, Taller, User, join_dias, split_dias};
