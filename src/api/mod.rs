//! # Módulo API
//!
//! Rutas y controladores del servidor. Cada pantalla de la aplicación es un
//! grupo de endpoints JSON que compone los clientes de la API remota.
//!
//! ## Módulos principales
//!
//! - [`auth`] - login, logout, sesión actual y registro
//! - [`panel`] - paneles de cliente y de administrador
//! - [`usuarios`], [`locales`], [`recursos`], [`disponibilidad`], [`reservas`] - gestión
//! - [`intenciones`] - operaciones de varios pasos pendientes
//! - [`local_recursos`] - recursos reservables de un local y reserva
//! - [`mis_reservas`] - reservas del cliente conectado
//! - [`errors`] - manejo de errores de la aplicación

pub mod auth;
pub mod disponibilidad;
pub mod errors;
pub mod intenciones;
pub mod local_recursos;
pub mod locales;
pub mod mis_reservas;
pub mod panel;
pub mod recursos;
pub mod reservas;
pub mod usuarios;
mod middleware;

// Re-exportar tipos comunes para facilitar su uso
pub use errors::{AppError, AppResult, ErrorResponse};
pub use middleware::ErrorLogExt;

use actix_web::web;
use serde::Serialize;
use std::error::Error as StdError;
use std::sync::Arc;

use crate::db::IntentLog;
use crate::flujo::FlujoReserva;
use crate::servicios::auth::AuthService;
use crate::servicios::ApiClient;
use crate::sesion::Sesiones;

/// Estado compartido por todos los controladores
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub sesiones: Sesiones,
    pub intenciones: Arc<dyn IntentLog>,
}

impl AppState {
    pub fn new(api: ApiClient, sesiones: Sesiones, intenciones: Arc<dyn IntentLog>) -> Self {
        Self {
            api,
            sesiones,
            intenciones,
        }
    }

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.api, &self.sesiones)
    }

    pub fn flujo(&self) -> FlujoReserva<'_> {
        FlujoReserva::new(&self.api, self.intenciones.as_ref())
    }
}

/// Datos de la pantalla leídos de nuevo tras una modificación ya hecha
///
/// Si la lectura falla la modificación sigue contando como realizada: la
/// respuesta conserva su código 2xx e indica el fallo en `refresco_error`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Recarga<T> {
    Vista(T),
    Fallida { message: String, refresco_error: String },
}

impl<T> Recarga<T> {
    pub(crate) fn de<E>(contexto: &str, resultado: Result<T, E>) -> Self
    where
        E: StdError + middleware::Gravedad + 'static,
    {
        match resultado {
            Ok(vista) => Self::Vista(vista),
            Err(error) => {
                middleware::log_error_chain(&error, contexto);
                Self::Fallida {
                    message: "Operación realizada, pero no se pudieron recargar los datos".to_string(),
                    refresco_error: error.to_string(),
                }
            }
        }
    }
}

/// Configura todas las rutas de la API
///
/// # Ejemplo
///
/// ```no_run
/// use actix_web::{web, App};
/// use reservas_locales::api;
///
/// let app = App::new()
///     .configure(api::init_routes);
/// ```
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    auth::routes(cfg);
    panel::routes(cfg);
    usuarios::routes(cfg);
    locales::routes(cfg);
    recursos::routes(cfg);
    disponibilidad::routes(cfg);
    reservas::routes(cfg);
    intenciones::routes(cfg);
    local_recursos::routes(cfg);
    mis_reservas::routes(cfg);
}
