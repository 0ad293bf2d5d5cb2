// src/db/mod.rs
pub mod almacen;
pub mod memoria;
pub mod models;
pub mod mongodb;

pub use almacen::{IntentLog, SessionStore};
pub use memoria::MemoryStore;
pub use models::{IntencionReserva, Operacion, Paso, Sesion};
pub use self::mongodb::MongoRepo;

pub type Result<T> = std::result::Result<T, crate::api::AppError>;
