//! # Clientes de la API remota
//!
//! Un cliente por recurso REST, todos sobre el mismo [`ApiClient`]:
//!
//! - [`usuarios`] - `/servicio-usuarios/usuarios`
//! - [`locales`] - `/servicio/locales`
//! - [`recursos`] - `/servicio/recursos`
//! - [`disponibilidad`] - `/servicio/disponibilidad`
//! - [`reservas`] - `/servicio/reservas`
//! - [`auth`] - `/servicio-usuarios/login` y la sesión resultante
//!
//! Cada operación hace exactamente una petición HTTP. Los fallos se registran
//! con `tracing` y se devuelven como [`ServiceError`] etiquetado.

pub mod auth;
pub mod disponibilidad;
pub mod error;
pub mod locales;
pub mod recursos;
pub mod reservas;
pub mod usuarios;

pub use error::{ErrorKind, ServiceError, ServiceResult};

use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Cliente HTTP compartido por todos los servicios
///
/// Es barato de clonar (`reqwest::Client` comparte su pool de conexiones).
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Crea el cliente contra `base_url` (sin barra final) con un timeout por
    /// petición
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Tiempo máximo de cada petición
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn usuarios(&self) -> usuarios::UsuariosService<'_> {
        usuarios::UsuariosService::new(self)
    }

    pub fn locales(&self) -> locales::LocalesService<'_> {
        locales::LocalesService::new(self)
    }

    pub fn recursos(&self) -> recursos::RecursosService<'_> {
        recursos::RecursosService::new(self)
    }

    pub fn disponibilidad(&self) -> disponibilidad::DisponibilidadService<'_> {
        disponibilidad::DisponibilidadService::new(self)
    }

    pub fn reservas(&self) -> reservas::ReservasService<'_> {
        reservas::ReservasService::new(self)
    }

    pub(crate) fn peticion(
        &self,
        recurso: &'static str,
        method: Method,
        path: impl Into<String>,
    ) -> Peticion<'_> {
        Peticion {
            api: self,
            recurso,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }
}

/// Una petición pendiente de enviar
pub(crate) struct Peticion<'a> {
    api: &'a ApiClient,
    recurso: &'static str,
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    body: Option<serde_json::Value>,
}

impl Peticion<'_> {
    pub(crate) fn query(mut self, clave: &'static str, valor: impl ToString) -> Self {
        self.query.push((clave, valor.to_string()));
        self
    }

    pub(crate) fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ServiceResult<Self> {
        let body = serde_json::to_value(body).map_err(|source| ServiceError::Malformed {
            recurso: self.recurso,
            source,
        })?;
        self.body = Some(body);
        Ok(self)
    }

    /// Envía la petición y deserializa la respuesta JSON
    pub(crate) async fn recibir<T: DeserializeOwned>(self) -> ServiceResult<T> {
        let recurso = self.recurso;
        let bytes = self.ejecutar().await?;

        serde_json::from_slice(&bytes).map_err(|source| {
            tracing::error!(recurso, error = %source, "Respuesta JSON malformada");
            ServiceError::Malformed { recurso, source }
        })
    }

    /// Envía la petición descartando el cuerpo de la respuesta
    pub(crate) async fn sin_respuesta(self) -> ServiceResult<()> {
        self.ejecutar().await.map(|_| ())
    }

    async fn ejecutar(self) -> ServiceResult<Vec<u8>> {
        let recurso = self.recurso;
        let url = format!("{}{}", self.api.base_url, self.path);

        tracing::debug!(recurso, method = %self.method, url = %url, "Llamada a la API remota");

        let mut request = self.api.http.request(self.method.clone(), &url);
        if !self.query.is_empty() {
            request = request.query(&self.query);
        }
        if let Some(body) = &self.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| {
            tracing::error!(recurso, url = %url, error = %source, "Error de red");
            ServiceError::Network { recurso, source }
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ServiceError::Network { recurso, source })?;

        if !status.is_success() {
            let error = ServiceError::from_response(recurso, status.as_u16(), &bytes);
            tracing::warn!(
                recurso,
                method = %self.method,
                status = status.as_u16(),
                kind = ?error.kind(),
                error = %error,
                "La API remota rechazó la petición"
            );
            return Err(error);
        }

        tracing::debug!(recurso, status = status.as_u16(), "Respuesta recibida");
        Ok(bytes.to_vec())
    }
}
