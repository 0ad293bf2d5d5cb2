//! Gestión de recursos (administrador)

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use super::{AppResult, AppState, ErrorLogExt, Recarga};
use crate::formularios::{Confirmacion, FormularioRecurso};
use crate::modelos::Rol;
use crate::servicios::ServiceResult;

#[derive(Deserialize)]
pub(crate) struct FiltroLocal {
    pub local_id: Option<i64>,
}

/// Locales para el selector y recursos del local elegido
async fn vista(state: &AppState, local_id: Option<i64>) -> ServiceResult<serde_json::Value> {
    let (locales, recursos) = tokio::try_join!(
        state.api.locales().listar(),
        state.api.recursos().listar(local_id),
    )?;

    Ok(serde_json::json!({
        "local_id": local_id,
        "locales": locales,
        "recursos": recursos
    }))
}

#[get("/admin/recursos")]
async fn listar(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<FiltroLocal>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;

    let vista = vista(&state, query.local_id)
        .await
        .log_error_context("listando recursos")?;
    Ok(HttpResponse::Ok().json(vista))
}

/// Crea uno o varios recursos iguales (`cantidad`)
#[post("/admin/recursos")]
async fn crear(
    state: web::Data<AppState>,
    req: HttpRequest,
    data: web::Json<FormularioRecurso>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    let nuevos = data.para_crear()?;

    for nuevo in &nuevos {
        let creado = state
            .api
            .recursos()
            .crear(nuevo)
            .await
            .log_error_context("creando recurso")?;
        tracing::info!(recurso_id = creado.id, local_id = creado.local_id, "Recurso creado");
    }

    let vista = Recarga::de("recargando recursos", vista(&state, Some(data.local_id)).await);
    Ok(HttpResponse::Created().json(vista))
}

#[put("/admin/recursos/{id}")]
async fn actualizar(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    data: web::Json<FormularioRecurso>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    let id = path.into_inner();
    let recurso = data.a_recurso()?;

    state
        .api
        .recursos()
        .actualizar(id, &recurso)
        .await
        .log_error_context("actualizando recurso")?;

    let vista = Recarga::de("recargando recursos", vista(&state, Some(recurso.local_id)).await);
    Ok(HttpResponse::Ok().json(vista))
}

#[delete("/admin/recursos/{id}")]
async fn eliminar(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    confirmacion: web::Query<Confirmacion>,
    query: web::Query<FiltroLocal>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    confirmacion.exigir("el recurso")?;
    let id = path.into_inner();

    state
        .api
        .recursos()
        .eliminar(id)
        .await
        .log_error_context("eliminando recurso")?;
    tracing::info!(recurso_id = id, "Recurso eliminado");

    let vista = Recarga::de("recargando recursos", vista(&state, query.local_id).await);
    Ok(HttpResponse::Ok().json(vista))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(listar);
    cfg.service(crear);
    cfg.service(actualizar);
    cfg.service(eliminar);
}
