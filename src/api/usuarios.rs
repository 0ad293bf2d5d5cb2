//! Gestión de usuarios (administrador)

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};

use super::{AppResult, AppState, ErrorLogExt, Recarga};
use crate::formularios::{Confirmacion, FormularioUsuario};
use crate::modelos::{Rol, Usuario};
use crate::servicios::ServiceResult;

async fn listado(state: &AppState) -> ServiceResult<Vec<Usuario>> {
    let usuarios = state.api.usuarios().listar().await?;
    Ok(usuarios.iter().map(Usuario::sin_contrasena).collect())
}

#[get("/admin/usuarios")]
async fn listar(state: web::Data<AppState>, req: HttpRequest) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;

    let usuarios = listado(&state).await.log_error_context("listando usuarios")?;
    Ok(HttpResponse::Ok().json(usuarios))
}

#[post("/admin/usuarios")]
async fn crear(
    state: web::Data<AppState>,
    req: HttpRequest,
    data: web::Json<FormularioUsuario>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    let nuevo = data.para_crear()?;

    let creado = state
        .api
        .usuarios()
        .crear(&nuevo)
        .await
        .log_error_context("creando usuario")?;
    tracing::info!(usuario_id = creado.id, "Usuario creado");

    let usuarios = Recarga::de("recargando usuarios", listado(&state).await);
    Ok(HttpResponse::Created().json(usuarios))
}

/// Edita un usuario; con la contraseña vacía se conserva la actual
#[put("/admin/usuarios/{id}")]
async fn actualizar(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    data: web::Json<FormularioUsuario>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    let id = path.into_inner();
    let cambios = data.para_editar()?;

    state
        .api
        .usuarios()
        .actualizar(id, &cambios)
        .await
        .log_error_context("actualizando usuario")?;

    let usuarios = Recarga::de("recargando usuarios", listado(&state).await);
    Ok(HttpResponse::Ok().json(usuarios))
}

#[delete("/admin/usuarios/{id}")]
async fn eliminar(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    confirmacion: web::Query<Confirmacion>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    confirmacion.exigir("el usuario")?;
    let id = path.into_inner();

    state
        .api
        .usuarios()
        .eliminar(id)
        .await
        .log_error_context("eliminando usuario")?;
    tracing::info!(usuario_id = id, "Usuario eliminado");

    let usuarios = Recarga::de("recargando usuarios", listado(&state).await);
    Ok(HttpResponse::Ok().json(usuarios))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(listar);
    cfg.service(crear);
    cfg.service(actualizar);
    cfg.service(eliminar);
}
