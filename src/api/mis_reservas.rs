//! Reservas del cliente conectado

use actix_web::{delete, get, patch, web, HttpRequest, HttpResponse, Responder};

use super::{AppError, AppResult, AppState, ErrorLogExt, Recarga};
use crate::db::{Operacion, Sesion};
use crate::formularios::{CambioEstado, Confirmacion};
use crate::modelos::{EstadoReserva, Reserva, ReservaCambios, Rol};
use crate::servicios::ServiceResult;
use crate::vista::filtros::detallar;
use crate::vista::sincronizar_recurso;

async fn vista(state: &AppState, sesion: &Sesion) -> ServiceResult<serde_json::Value> {
    let api = &state.api;
    let (reservas, locales, recursos) = tokio::try_join!(
        api.reservas().listar_por_usuario(sesion.usuario.id),
        api.locales().listar(),
        api.recursos().listar(None),
    )?;

    let reservas = detallar(reservas, std::slice::from_ref(&sesion.usuario), &locales, &recursos);
    Ok(serde_json::json!({ "reservas": reservas }))
}

/// Reserva del usuario; las de otros usuarios no existen para él
async fn propia(state: &AppState, sesion: &Sesion, id: i64) -> AppResult<Reserva> {
    let reservas = state.api.reservas().listar_por_usuario(sesion.usuario.id).await?;
    reservas
        .into_iter()
        .find(|r| r.id == id && r.usuario_id == sesion.usuario.id)
        .ok_or_else(|| AppError::not_found_id("Reserva", id))
}

#[get("/mis-reservas")]
async fn listar(state: web::Data<AppState>, req: HttpRequest) -> AppResult<impl Responder> {
    let sesion = state.sesiones.requerir(&req, Some(Rol::Cliente)).await?;

    let vista = vista(&state, &sesion)
        .await
        .log_error_context("listando mis reservas")?;
    Ok(HttpResponse::Ok().json(vista))
}

/// Cambia el estado de una reserva propia
///
/// Cancelar libera la franja y el recurso; volver a confirmar deja el
/// recurso reservado.
#[patch("/mis-reservas/{id}/estado")]
async fn cambiar_estado(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    data: web::Json<CambioEstado>,
) -> AppResult<impl Responder> {
    let sesion = state.sesiones.requerir(&req, Some(Rol::Cliente)).await?;
    let reserva = propia(&state, &sesion, path.into_inner()).await?;

    if reserva.estado != data.estado {
        if data.es_cancelacion() {
            state
                .flujo()
                .cancelar(&reserva, Operacion::Cancelar)
                .await
                .log_error_context("cancelando reserva")?;
        } else {
            let cambios = ReservaCambios {
                estado: Some(EstadoReserva::Confirmada),
                ..Default::default()
            };
            state
                .api
                .reservas()
                .actualizar(reserva.id, &cambios)
                .await
                .log_error_context("confirmando reserva")?;
            sincronizar_recurso(&state.api, reserva.recurso_id, EstadoReserva::Confirmada).await?;
        }
        tracing::info!(reserva_id = reserva.id, estado = ?data.estado, "Estado de reserva cambiado");
    }

    let vista = Recarga::de("recargando mis reservas", vista(&state, &sesion).await);
    Ok(HttpResponse::Ok().json(vista))
}

/// Borra una reserva propia; si estaba confirmada libera la franja y el recurso
#[delete("/mis-reservas/{id}")]
async fn eliminar(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    confirmacion: web::Query<Confirmacion>,
) -> AppResult<impl Responder> {
    let sesion = state.sesiones.requerir(&req, Some(Rol::Cliente)).await?;
    confirmacion.exigir("la reserva")?;
    let reserva = propia(&state, &sesion, path.into_inner()).await?;

    match reserva.estado {
        EstadoReserva::Confirmada => state
            .flujo()
            .cancelar(&reserva, Operacion::Eliminar)
            .await
            .log_error_context("eliminando reserva")?,
        EstadoReserva::Cancelada => state
            .api
            .reservas()
            .eliminar(reserva.id)
            .await
            .log_error_context("eliminando reserva")?,
    }
    tracing::info!(reserva_id = reserva.id, "Reserva eliminada");

    let vista = Recarga::de("recargando mis reservas", vista(&state, &sesion).await);
    Ok(HttpResponse::Ok().json(vista))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(listar);
    cfg.service(cambiar_estado);
    cfg.service(eliminar);
}
