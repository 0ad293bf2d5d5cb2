//! Paneles de inicio de cada rol

use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use serde::Serialize;

use super::{AppResult, AppState, ErrorLogExt};
use crate::modelos::Rol;
use crate::vista::filtros::detallar;

#[derive(Serialize)]
struct Seccion {
    nombre: &'static str,
    ruta: &'static str,
    total: usize,
}

/// Panel del cliente: locales para explorar y sus propias reservas
#[get("/client-panel")]
async fn client_panel(state: web::Data<AppState>, req: HttpRequest) -> AppResult<impl Responder> {
    let sesion = state.sesiones.requerir(&req, Some(Rol::Cliente)).await?;
    let api = &state.api;

    let (locales, reservas, recursos) = tokio::try_join!(
        api.locales().listar(),
        api.reservas().listar_por_usuario(sesion.usuario.id),
        api.recursos().listar(None),
    )
    .log_error_context("cargando panel de cliente")?;

    let reservas = detallar(reservas, std::slice::from_ref(&sesion.usuario), &locales, &recursos);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "usuario": sesion.usuario,
        "locales": locales,
        "reservas": reservas
    })))
}

/// Panel del administrador: accesos a cada gestión con el número de registros
#[get("/admin-panel")]
async fn admin_panel(state: web::Data<AppState>, req: HttpRequest) -> AppResult<impl Responder> {
    let sesion = state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    let api = &state.api;

    let (usuarios, locales, recursos, disponibilidad, reservas) = tokio::try_join!(
        api.usuarios().listar(),
        api.locales().listar(),
        api.recursos().listar(None),
        api.disponibilidad().listar(),
        api.reservas().listar(),
    )
    .log_error_context("cargando panel de administración")?;

    let secciones = [
        Seccion { nombre: "Usuarios", ruta: "/admin/usuarios", total: usuarios.len() },
        Seccion { nombre: "Locales", ruta: "/admin/locales", total: locales.len() },
        Seccion { nombre: "Recursos", ruta: "/admin/recursos", total: recursos.len() },
        Seccion { nombre: "Disponibilidad", ruta: "/admin/disponibilidad", total: disponibilidad.len() },
        Seccion { nombre: "Reservas", ruta: "/admin/reservas", total: reservas.len() },
    ];

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "usuario": sesion.usuario,
        "secciones": secciones
    })))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(client_panel);
    cfg.service(admin_panel);
}
