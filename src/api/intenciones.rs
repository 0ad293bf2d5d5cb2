//! Operaciones de reserva o cancelación que quedaron a medias

use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use super::{AppResult, AppState, ErrorLogExt};
use crate::modelos::Rol;

#[get("/admin/intenciones")]
async fn pendientes(state: web::Data<AppState>, req: HttpRequest) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;

    let pendientes = state
        .intenciones
        .pendientes()
        .await
        .log_error_context("listando intenciones pendientes")?;
    Ok(HttpResponse::Ok().json(pendientes))
}

#[derive(Deserialize)]
struct Reanudar {
    /// Sólo las que llevan al menos estos segundos sin cambios; nunca menos
    /// que [`crate::flujo::FlujoReserva::antiguedad_minima`]
    antiguedad_segs: Option<i64>,
}

/// Compensa las reservas a medias y completa las cancelaciones pendientes
#[post("/admin/intenciones/reanudar")]
async fn reanudar(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<Reanudar>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;

    let flujo = state.flujo();
    let minima = flujo.antiguedad_minima();
    let procesadas = flujo
        .reanudar_pendientes(query.antiguedad_segs.unwrap_or(minima).max(minima))
        .await
        .log_error_context("reanudando intenciones")?;
    let restantes = procesadas.iter().filter(|i| !i.paso.es_terminal()).count();

    tracing::info!(procesadas = procesadas.len(), restantes, "Intenciones reanudadas");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "procesadas": procesadas,
        "restantes": restantes
    })))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(pendientes);
    cfg.service(reanudar);
}
