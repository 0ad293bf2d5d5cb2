//! # Login y registro
//!
//! El login delega las credenciales en la API remota y, si las acepta, emite
//! una sesión propia (cookie `sesion` y token en el cuerpo). Las pantallas
//! privilegiadas validan ese token en cada petición.

use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use super::{AppError, AppResult, AppState, ErrorLogExt};
use crate::formularios::{requerido, FormularioRegistro};
use crate::servicios::ErrorKind;
use crate::sesion::{extract_token, Sesiones};

#[derive(Deserialize)]
struct Login {
    correo: String,
    contrasena: String,
}

/// Inicia sesión
///
/// # Respuesta
/// ```json
/// {
///   "usuario": { "id": 1, "nombre": "Ana", "correo": "ana@correo.com", "rol": "cliente", "activo": true },
///   "token": "9f1c...",
///   "expira_en": 1735689600,
///   "redirigir": "/client-panel"
/// }
/// ```
///
/// # Errores
/// - `400 Bad Request`: correo o contraseña vacíos
/// - `401 Unauthorized`: credenciales rechazadas por la API remota
/// - `502 Bad Gateway`: la API remota no responde o responde mal
#[post("/login")]
async fn login(state: web::Data<AppState>, data: web::Json<Login>) -> AppResult<impl Responder> {
    let correo = requerido("correo", &data.correo)?;
    if data.contrasena.is_empty() {
        return Err(AppError::validation_field("contrasena", "es requerida"));
    }

    let iniciada = match state.auth().intentar_login(&correo, &data.contrasena).await {
        Ok(iniciada) => iniciada,
        Err(AppError::Remote(error))
            if matches!(
                error.kind(),
                ErrorKind::Unauthorized | ErrorKind::NotFound | ErrorKind::Validation
            ) =>
        {
            tracing::warn!(kind = ?error.kind(), status = ?error.status(), "Credenciales rechazadas");
            return Err(AppError::Unauthorized("Correo o contraseña incorrectos".to_string()));
        }
        Err(error) => return Err(error),
    };

    let redirigir = iniciada.usuario.rol.panel();

    Ok(HttpResponse::Ok()
        .cookie(state.sesiones.cookie(&iniciada.sesion))
        .json(serde_json::json!({
            "usuario": iniciada.usuario,
            "token": iniciada.sesion.token,
            "expira_en": iniciada.sesion.expira_en,
            "redirigir": redirigir
        })))
}

/// Cierra la sesión actual; sin sesión no hace nada
#[post("/logout")]
async fn logout(state: web::Data<AppState>, req: HttpRequest) -> AppResult<impl Responder> {
    if let Some(token) = extract_token(&req) {
        state
            .sesiones
            .cerrar(&token)
            .await
            .log_error_context("cerrando sesión")?;
    }

    Ok(HttpResponse::Ok()
        .cookie(Sesiones::cookie_expirada())
        .json(serde_json::json!({
            "message": "Sesión cerrada",
            "redirigir": "/login"
        })))
}

/// Usuario de la sesión actual
#[get("/sesion")]
async fn sesion_actual(state: web::Data<AppState>, req: HttpRequest) -> AppResult<impl Responder> {
    let sesion = state.sesiones.requerir(&req, None).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "usuario": sesion.usuario,
        "expira_en": sesion.expira_en,
        "redirigir": sesion.usuario.rol.panel()
    })))
}

/// Registro público de clientes
///
/// # Respuesta
/// `201 Created` con el usuario creado y `"redirigir": "/login"`.
#[post("/register")]
async fn register(
    state: web::Data<AppState>,
    data: web::Json<FormularioRegistro>,
) -> AppResult<impl Responder> {
    let nuevo = data.a_usuario()?;

    let usuario = state
        .api
        .usuarios()
        .crear(&nuevo)
        .await
        .log_error_context("registrando usuario")?;

    tracing::info!(usuario_id = usuario.id, "Usuario registrado");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "usuario": usuario.sin_contrasena(),
        "redirigir": "/login"
    })))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login);
    cfg.service(logout);
    cfg.service(sesion_actual);
    cfg.service(register);
}
