//! # Recursos de un local
//!
//! Pantalla pública (con sesión) que muestra los recursos reservables de un
//! local y permite reservar uno con la franja que se le ha emparejado.

use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};

use super::{AppError, AppResult, AppState, ErrorLogExt, Recarga};
use crate::modelos::Local;
use crate::servicios::ServiceResult;
use crate::vista::filtros::recursos_reservables;
use crate::vista::RecursoReservable;

async fn cargar(state: &AppState, local_id: i64) -> ServiceResult<(Option<Local>, Vec<RecursoReservable>)> {
    let api = &state.api;
    let (locales, recursos, disponibilidad) = tokio::try_join!(
        api.locales().listar(),
        api.recursos().listar(Some(local_id)),
        api.disponibilidad().listar(),
    )?;

    let local = locales.into_iter().find(|l| l.id == local_id);
    Ok((local, recursos_reservables(recursos, &disponibilidad)))
}

/// Recursos que se pueden reservar ahora, cada uno con su franja
///
/// # Respuesta
/// ```json
/// {
///   "local": { "id": 1, "nombre": "Cafe X", ... },
///   "recursos": [
///     { "recurso": { "id": 10, "estado": "disponible", ... },
///       "disponibilidad": { "id": 3, "fecha": "2024-12-25", "hora_inicio": "20:00", ... } }
///   ]
/// }
/// ```
#[get("/locales/{local_id}/recursos")]
async fn listar(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, None).await?;
    let local_id = path.into_inner();

    let (local, recursos) = cargar(&state, local_id)
        .await
        .log_error_context("cargando recursos del local")?;
    let local = local.ok_or_else(|| AppError::not_found_id("Local", local_id))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "local": local,
        "recursos": recursos
    })))
}

/// Reserva el recurso para el usuario de la sesión
///
/// # Errores
/// - `404 Not Found`: el local no existe
/// - `409 Conflict`: el recurso ya no es reservable
/// - `4xx/502`: un paso falló; la respuesta indica si se deshizo
#[post("/locales/{local_id}/recursos/{recurso_id}/reservar")]
async fn reservar(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> AppResult<impl Responder> {
    let sesion = state.sesiones.requerir(&req, None).await?;
    let (local_id, recurso_id) = path.into_inner();

    let (local, recursos) = cargar(&state, local_id).await?;
    if local.is_none() {
        return Err(AppError::not_found_id("Local", local_id));
    }

    let elegido = recursos
        .into_iter()
        .find(|r| r.recurso.id == recurso_id)
        .ok_or_else(|| AppError::Conflict("El recurso ya no está disponible".to_string()))?;

    let reserva = state
        .flujo()
        .reservar(sesion.usuario.id, local_id, &elegido.recurso, &elegido.disponibilidad)
        .await
        .log_error_context("reservando recurso")?;

    let recursos = Recarga::de(
        "recargando recursos del local",
        cargar(&state, local_id).await.map(|(_, recursos)| recursos),
    );

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Reserva realizada con éxito",
        "reserva": reserva,
        "recursos": recursos
    })))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(listar);
    cfg.service(reservar);
}
