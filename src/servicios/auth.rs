//! # Autenticación
//!
//! Intercambia credenciales por el usuario en `POST /servicio-usuarios/login`
//! y, si el servidor las acepta, abre una sesión en [`Sesiones`].

use reqwest::Method;
use serde::Serialize;

use super::ApiClient;
use crate::api::AppResult;
use crate::db::Sesion;
use crate::modelos::Usuario;
use crate::sesion::Sesiones;

const RECURSO: &str = "login";
const PATH: &str = "/servicio-usuarios/login";

#[derive(Serialize)]
struct Credenciales<'a> {
    correo: &'a str,
    contrasena: &'a str,
}

/// Resultado de un login correcto
#[derive(Debug, Clone)]
pub struct SesionIniciada {
    pub usuario: Usuario,
    pub sesion: Sesion,
}

pub struct AuthService<'a> {
    api: &'a ApiClient,
    sesiones: &'a Sesiones,
}

impl<'a> AuthService<'a> {
    pub fn new(api: &'a ApiClient, sesiones: &'a Sesiones) -> Self {
        Self { api, sesiones }
    }

    /// Login con el motivo del fallo
    ///
    /// # Errores
    /// - `Remote(Unauthorized | NotFound)`: credenciales rechazadas
    /// - `Remote(Network | Server | Malformed)`: servidor inalcanzable o respuesta inválida
    /// - `Database`: no se pudo guardar la sesión
    pub async fn intentar_login(&self, correo: &str, contrasena: &str) -> AppResult<SesionIniciada> {
        let usuario: Usuario = self
            .api
            .peticion(RECURSO, Method::POST, PATH)
            .json(&Credenciales { correo, contrasena })?
            .recibir()
            .await?;

        let sesion = self.sesiones.iniciar(&usuario).await?;

        Ok(SesionIniciada {
            usuario: usuario.sin_contrasena(),
            sesion,
        })
    }

    /// Login que colapsa cualquier fallo en `None` sin persistir nada
    pub async fn login(&self, correo: &str, contrasena: &str) -> Option<SesionIniciada> {
        match self.intentar_login(correo, contrasena).await {
            Ok(iniciada) => Some(iniciada),
            Err(error) => {
                tracing::warn!(error = %error, "Login fallido");
                None
            }
        }
    }
}
