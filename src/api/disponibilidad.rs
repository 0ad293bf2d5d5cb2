//! Gestión de franjas de disponibilidad (administrador)

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};

use super::recursos::FiltroLocal;
use super::{AppResult, AppState, ErrorLogExt, Recarga};
use crate::formularios::{Confirmacion, FormularioDisponibilidad};
use crate::modelos::Rol;
use crate::servicios::ServiceResult;
use crate::vista::filtros::disponibilidad_por_local;

/// Franjas del local elegido, con los locales y recursos para los selectores
async fn vista(state: &AppState, local_id: Option<i64>) -> ServiceResult<serde_json::Value> {
    let (locales, recursos, disponibilidad) = tokio::try_join!(
        state.api.locales().listar(),
        state.api.recursos().listar(None),
        state.api.disponibilidad().listar(),
    )?;

    let disponibilidad = disponibilidad_por_local(disponibilidad, &recursos, local_id);
    let recursos: Vec<_> = recursos
        .into_iter()
        .filter(|r| local_id.map_or(true, |id| r.local_id == id))
        .collect();

    Ok(serde_json::json!({
        "local_id": local_id,
        "locales": locales,
        "recursos": recursos,
        "disponibilidad": disponibilidad
    }))
}

#[get("/admin/disponibilidad")]
async fn listar(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<FiltroLocal>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;

    let vista = vista(&state, query.local_id)
        .await
        .log_error_context("listando disponibilidad")?;
    Ok(HttpResponse::Ok().json(vista))
}

/// Crea la misma franja para cada recurso seleccionado
#[post("/admin/disponibilidad")]
async fn crear(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<FiltroLocal>,
    data: web::Json<FormularioDisponibilidad>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    let nuevas = data.para_crear()?;

    let recursos = state.api.recursos().listar(None).await?;
    data.validar_recursos(&recursos)?;

    for nueva in &nuevas {
        let creada = state
            .api
            .disponibilidad()
            .crear(nueva)
            .await
            .log_error_context("creando disponibilidad")?;
        tracing::info!(disponibilidad_id = creada.id, recurso_id = creada.recurso_id, "Franja creada");
    }

    let vista = Recarga::de("recargando disponibilidad", vista(&state, query.local_id).await);
    Ok(HttpResponse::Created().json(vista))
}

/// Edita sólo la franja indicada
#[put("/admin/disponibilidad/{id}")]
async fn actualizar(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<FiltroLocal>,
    data: web::Json<FormularioDisponibilidad>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    let id = path.into_inner();
    let cambios = data.para_editar()?;

    state
        .api
        .disponibilidad()
        .actualizar(id, &cambios)
        .await
        .log_error_context("actualizando disponibilidad")?;

    let vista = Recarga::de("recargando disponibilidad", vista(&state, query.local_id).await);
    Ok(HttpResponse::Ok().json(vista))
}

#[delete("/admin/disponibilidad/{id}")]
async fn eliminar(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    confirmacion: web::Query<Confirmacion>,
    query: web::Query<FiltroLocal>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    confirmacion.exigir("la franja")?;
    let id = path.into_inner();

    state
        .api
        .disponibilidad()
        .eliminar(id)
        .await
        .log_error_context("eliminando disponibilidad")?;
    tracing::info!(disponibilidad_id = id, "Franja eliminada");

    let vista = Recarga::de("recargando disponibilidad", vista(&state, query.local_id).await);
    Ok(HttpResponse::Ok().json(vista))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(listar);
    cfg.service(crear);
    cfg.service(actualizar);
    cfg.service(eliminar);
}
