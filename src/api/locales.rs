//! Gestión de locales (administrador)

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};

use super::{AppError, AppResult, AppState, ErrorLogExt, Recarga};
use crate::formularios::{Confirmacion, FormularioLocal};
use crate::modelos::Rol;

#[get("/admin/locales")]
async fn listar(state: web::Data<AppState>, req: HttpRequest) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;

    let locales = state
        .api
        .locales()
        .listar()
        .await
        .log_error_context("listando locales")?;
    Ok(HttpResponse::Ok().json(locales))
}

#[post("/admin/locales")]
async fn crear(
    state: web::Data<AppState>,
    req: HttpRequest,
    data: web::Json<FormularioLocal>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    let nuevo = data.a_local(None)?;

    let creado = state
        .api
        .locales()
        .crear(&nuevo)
        .await
        .log_error_context("creando local")?;
    tracing::info!(local_id = creado.id, tipo = %creado.tipo, "Local creado");

    let locales = Recarga::de("recargando locales", state.api.locales().listar().await);
    Ok(HttpResponse::Created().json(locales))
}

/// Reemplaza el local conservando su fecha de creación
#[put("/admin/locales/{id}")]
async fn actualizar(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    data: web::Json<FormularioLocal>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    let id = path.into_inner();

    let locales = state.api.locales().listar().await?;
    let existente = locales
        .iter()
        .find(|l| l.id == id)
        .ok_or_else(|| AppError::not_found_id("Local", id))?;
    let local = data.a_local(Some(existente))?;

    state
        .api
        .locales()
        .actualizar(id, &local)
        .await
        .log_error_context("actualizando local")?;

    let locales = Recarga::de("recargando locales", state.api.locales().listar().await);
    Ok(HttpResponse::Ok().json(locales))
}

#[delete("/admin/locales/{id}")]
async fn eliminar(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    confirmacion: web::Query<Confirmacion>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    confirmacion.exigir("el local")?;
    let id = path.into_inner();

    state
        .api
        .locales()
        .eliminar(id)
        .await
        .log_error_context("eliminando local")?;
    tracing::info!(local_id = id, "Local eliminado");

    let locales = Recarga::de("recargando locales", state.api.locales().listar().await);
    Ok(HttpResponse::Ok().json(locales))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(listar);
    cfg.service(crear);
    cfg.service(actualizar);
    cfg.service(eliminar);
}
