//! # Utilidades de logging para errores
//!
//! Registro de la cadena completa de `source()` de un error junto con la
//! pantalla u operación que falló. Los fallos atribuibles a la petición
//! (validación, no encontrado, sin permiso) se registran como `warn`; el resto
//! como `error`.

use std::error::Error as StdError;

use super::AppError;
use crate::servicios::{ErrorKind, ServiceError};

/// Distingue los fallos causados por la petición de los del sistema
pub trait Gravedad {
    fn es_del_cliente(&self) -> bool;
}

impl Gravedad for ServiceError {
    fn es_del_cliente(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::Validation | ErrorKind::Unauthorized
        )
    }
}

impl Gravedad for AppError {
    fn es_del_cliente(&self) -> bool {
        match self {
            AppError::Remote(error) => error.es_del_cliente(),
            AppError::Flujo(error) => error.source.es_del_cliente(),
            AppError::ValidationWithField { .. }
            | AppError::Validation(_)
            | AppError::Unauthorized(_)
            | AppError::Forbidden(_)
            | AppError::NotFoundWithId { .. }
            | AppError::NotFound(_)
            | AppError::Conflict(_) => true,
            AppError::Database { .. } | AppError::Internal(_) => false,
        }
    }
}

/// Mensajes de la cadena de errores, del más externo al más interno
fn cadena(error: &(dyn StdError + 'static)) -> Vec<String> {
    let mut mensajes = Vec::new();
    let mut actual = Some(error);
    while let Some(e) = actual {
        mensajes.push(e.to_string());
        actual = e.source();
    }
    mensajes
}

/// Registra la cadena completa de errores con su contexto
pub fn log_error_chain<E>(error: &E, context: &str)
where
    E: StdError + Gravedad + 'static,
{
    let error_chain = cadena(error);

    if error.es_del_cliente() {
        tracing::warn!(context = %context, error_chain = ?error_chain, "Petición rechazada");
    } else {
        tracing::error!(context = %context, error_chain = ?error_chain, "Error with full chain");
    }
}

/// Extension trait para Results que añade logging automático de error chains
///
/// # Ejemplo de uso
/// ```ignore
/// api.locales()
///     .listar()
///     .await
///     .log_error_context("cargando locales")?;
/// ```
pub trait ErrorLogExt<T, E> {
    fn log_error_context(self, context: &str) -> Result<T, E>;
}

impl<T, E> ErrorLogExt<T, E> for Result<T, E>
where
    E: StdError + Gravedad + 'static,
{
    fn log_error_context(self, context: &str) -> Result<T, E> {
        if let Err(ref error) = self {
            log_error_chain(error, context);
        }
        self
    }
}
