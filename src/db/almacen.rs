//! Contratos de almacenamiento del estado propio del servidor
//!
//! Hay dos implementaciones: [`super::MongoRepo`] para producción y
//! [`super::MemoryStore`] para pruebas y para `STORAGE=memoria`.

use async_trait::async_trait;

use super::models::{IntencionReserva, Sesion};
use super::Result;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn guardar_sesion(&self, sesion: &Sesion) -> Result<()>;

    async fn buscar_sesion(&self, token: &str) -> Result<Option<Sesion>>;

    async fn eliminar_sesion(&self, token: &str) -> Result<()>;

    /// Borra las sesiones con `expira_en` anterior a `ahora` y devuelve cuántas
    async fn purgar_sesiones(&self, ahora: i64) -> Result<u64>;
}

#[async_trait]
pub trait IntentLog: Send + Sync {
    /// Inserta o reemplaza la intención por su id
    async fn registrar(&self, intencion: &IntencionReserva) -> Result<()>;

    /// Reemplaza la intención sólo si la guardada sigue en `version_leida`
    ///
    /// Devuelve `false` sin escribir nada si otro proceso la actualizó antes.
    async fn actualizar(&self, intencion: &IntencionReserva, version_leida: i64) -> Result<bool>;

    /// Intenciones que no han llegado a un paso terminal, más antiguas primero
    async fn pendientes(&self) -> Result<Vec<IntencionReserva>>;
}
