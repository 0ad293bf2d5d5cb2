//! # Sesiones
//!
//! Única fuente de verdad sobre quién está conectado. El login emite un token
//! aleatorio que se guarda en el [`SessionStore`] junto con una copia del
//! usuario; cada petición privilegiada lo presenta (cookie `sesion` o cabecera
//! `Authorization: Bearer`) y se valida contra el almacén, incluida su
//! expiración. El rol se toma siempre de la sesión guardada, nunca de datos
//! enviados por el navegador.

use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::HttpRequest;
use std::sync::Arc;

use crate::api::{AppError, AppResult};
use crate::db::{Sesion, SessionStore};
use crate::modelos::{Rol, Usuario};

pub const COOKIE_SESION: &str = "sesion";

#[derive(Clone)]
pub struct Sesiones {
    store: Arc<dyn SessionStore>,
    ttl_dias: i64,
}

impl Sesiones {
    pub fn new(store: Arc<dyn SessionStore>, ttl_dias: i64) -> Self {
        Self { store, ttl_dias }
    }

    pub fn ttl_dias(&self) -> i64 {
        self.ttl_dias
    }

    /// Abre una sesión nueva para el usuario y la persiste
    pub async fn iniciar(&self, usuario: &Usuario) -> AppResult<Sesion> {
        let ahora = chrono::Utc::now().timestamp();

        let purgadas = self.store.purgar_sesiones(ahora).await?;
        if purgadas > 0 {
            tracing::debug!(purgadas, "Sesiones expiradas eliminadas");
        }

        let sesion = Sesion {
            token: nuevo_token(),
            usuario: usuario.sin_contrasena(),
            creada_en: ahora,
            expira_en: ahora + self.ttl_dias * 24 * 60 * 60,
        };

        self.store.guardar_sesion(&sesion).await?;
        tracing::info!(usuario_id = usuario.id, rol = ?usuario.rol, "Sesión iniciada");
        Ok(sesion)
    }

    /// Devuelve la sesión del token si existe y no ha expirado
    pub async fn validar(&self, token: &str) -> AppResult<Sesion> {
        let sesion = self
            .store
            .buscar_sesion(token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Sesión inválida".to_string()))?;

        if sesion.expirada(chrono::Utc::now().timestamp()) {
            self.store.eliminar_sesion(token).await?;
            return Err(AppError::Unauthorized("Sesión expirada".to_string()));
        }

        Ok(sesion)
    }

    pub async fn cerrar(&self, token: &str) -> AppResult<()> {
        self.store.eliminar_sesion(token).await?;
        tracing::info!("Sesión cerrada");
        Ok(())
    }

    /// Valida la sesión de la petición y, si se indica, su rol
    ///
    /// # Errores
    /// - `Unauthorized`: falta el token, no existe o ha expirado
    /// - `Forbidden`: la sesión es válida pero el rol no coincide
    pub async fn requerir(&self, req: &HttpRequest, rol: Option<Rol>) -> AppResult<Sesion> {
        let token = extract_token(req)
            .ok_or_else(|| AppError::Unauthorized("Falta el token de sesión".to_string()))?;
        let sesion = self.validar(&token).await?;

        match rol {
            Some(requerido) if sesion.usuario.rol != requerido => Err(AppError::Forbidden(format!(
                "Esta pantalla requiere el rol {:?}",
                requerido
            ))),
            _ => Ok(sesion),
        }
    }

    /// Cookie con el token, con la misma vida que la sesión
    pub fn cookie(&self, sesion: &Sesion) -> Cookie<'static> {
        Cookie::build(COOKIE_SESION, sesion.token.clone())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::days(self.ttl_dias))
            .finish()
    }

    /// Cookie que borra la de sesión en el navegador
    pub fn cookie_expirada() -> Cookie<'static> {
        let mut cookie = Cookie::build(COOKIE_SESION, "").path("/").finish();
        cookie.make_removal();
        cookie
    }
}

/// Extrae el token de la cabecera `Authorization: Bearer` o, si no está, de la
/// cookie de sesión
pub fn extract_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get("authorization")
        .and_then(|valor| valor.to_str().ok())
        .and_then(|valor| valor.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    bearer.or_else(|| req.cookie(COOKIE_SESION).map(|c| c.value().to_string()))
}

fn nuevo_token() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}
