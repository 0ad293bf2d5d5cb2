//! # Gestión de reservas (administrador)
//!
//! Listado con nombres de usuario, local y recurso, filtrable por local, y el
//! formulario de alta/edición apoyado en [`LogicaReserva`]. Guardar una
//! reserva deja su recurso reservado o disponible según el estado; borrarla
//! lo deja disponible.

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use super::recursos::FiltroLocal;
use super::{AppError, AppResult, AppState, ErrorLogExt, Recarga};
use crate::formularios::{Confirmacion, FormularioReserva, Opcion, SelectorBuscable};
use crate::modelos::{Reserva, ReservaCambios, Rol};
use crate::servicios::ServiceResult;
use crate::vista::filtros::{detallar, filtrar_por_local};
use crate::vista::{liberar_recurso, sincronizar_recurso, LogicaReserva};

async fn vista(state: &AppState, local_id: Option<i64>) -> ServiceResult<serde_json::Value> {
    let api = &state.api;
    let (reservas, usuarios, locales, recursos) = tokio::try_join!(
        api.reservas().listar(),
        api.usuarios().listar(),
        api.locales().listar(),
        api.recursos().listar(None),
    )?;

    let reservas = detallar(filtrar_por_local(reservas, local_id), &usuarios, &locales, &recursos);

    Ok(serde_json::json!({
        "local_id": local_id,
        "locales": locales,
        "reservas": reservas
    }))
}

async fn buscar_reserva(state: &AppState, id: i64) -> AppResult<Reserva> {
    let reservas = state.api.reservas().listar().await?;
    reservas
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::not_found_id("Reserva", id))
}

#[get("/admin/reservas")]
async fn listar(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<FiltroLocal>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;

    let vista = vista(&state, query.local_id)
        .await
        .log_error_context("listando reservas")?;
    Ok(HttpResponse::Ok().json(vista))
}

#[derive(Deserialize)]
struct ParametrosFormulario {
    reserva_id: Option<i64>,
    local_id: Option<i64>,
    recurso_id: Option<i64>,
    num_personas: Option<i32>,
}

/// Estado del formulario de reserva: opciones de cada selector, recursos del
/// local elegido y capacidad
///
/// Con `reserva_id` se carga en modo edición.
#[get("/admin/reservas/formulario")]
async fn formulario(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ParametrosFormulario>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;

    let existente = match query.reserva_id {
        Some(id) => Some(buscar_reserva(&state, id).await?),
        None => None,
    };
    let mut logica = LogicaReserva::cargar(&state.api, existente.as_ref())
        .await
        .log_error_context("cargando formulario de reserva")?;

    if let Some(local_id) = query.local_id {
        logica.seleccionar_local(local_id)?;
    }
    if let Some(recurso_id) = query.recurso_id {
        logica.seleccionar_recurso(recurso_id)?;
    }
    if let Some(personas) = query.num_personas {
        logica.ajustar_personas(personas);
    }

    Ok(HttpResponse::Ok().json(logica.vista()))
}

#[post("/admin/reservas")]
async fn crear(
    state: web::Data<AppState>,
    req: HttpRequest,
    data: web::Json<FormularioReserva>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;

    let mut logica = LogicaReserva::cargar(&state.api, None).await?;
    let nueva = logica.aplicar(data.into_inner())?;

    let creada = state
        .api
        .reservas()
        .crear(&nueva)
        .await
        .log_error_context("creando reserva")?;
    sincronizar_recurso(&state.api, creada.recurso_id, creada.estado)
        .await
        .log_error_context("sincronizando recurso de la reserva")?;
    tracing::info!(reserva_id = creada.id, recurso_id = creada.recurso_id, "Reserva creada");

    let vista = Recarga::de("recargando reservas", vista(&state, Some(creada.local_id)).await);
    Ok(HttpResponse::Created().json(vista))
}

/// Edita una reserva; si cambia de recurso, el anterior queda disponible
#[put("/admin/reservas/{id}")]
async fn actualizar(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    data: web::Json<FormularioReserva>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    let existente = buscar_reserva(&state, path.into_inner()).await?;

    let mut logica = LogicaReserva::cargar(&state.api, Some(&existente)).await?;
    let cambios = logica.aplicar(data.into_inner())?;
    let recurso_id = cambios.recurso_id;
    let estado = cambios.estado;

    state
        .api
        .reservas()
        .actualizar(existente.id, &ReservaCambios::from(cambios))
        .await
        .log_error_context("actualizando reserva")?;

    if recurso_id != existente.recurso_id {
        liberar_recurso(&state.api, existente.recurso_id)
            .await
            .log_error_context("liberando recurso anterior")?;
    }
    sincronizar_recurso(&state.api, recurso_id, estado)
        .await
        .log_error_context("sincronizando recurso de la reserva")?;

    let vista = Recarga::de("recargando reservas", vista(&state, Some(existente.local_id)).await);
    Ok(HttpResponse::Ok().json(vista))
}

#[delete("/admin/reservas/{id}")]
async fn eliminar(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    confirmacion: web::Query<Confirmacion>,
    query: web::Query<FiltroLocal>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    confirmacion.exigir("la reserva")?;
    let existente = buscar_reserva(&state, path.into_inner()).await?;

    state
        .api
        .reservas()
        .eliminar(existente.id)
        .await
        .log_error_context("eliminando reserva")?;
    liberar_recurso(&state.api, existente.recurso_id)
        .await
        .log_error_context("liberando recurso")?;
    tracing::info!(reserva_id = existente.id, "Reserva eliminada");

    let vista = Recarga::de("recargando reservas", vista(&state, query.local_id).await);
    Ok(HttpResponse::Ok().json(vista))
}

#[derive(Deserialize)]
struct Busqueda {
    #[serde(default)]
    q: String,
    local_id: Option<i64>,
}

#[derive(Serialize)]
struct Candidato {
    id: i64,
    texto: String,
}

fn candidatos<T: Opcion>(opciones: &[T], termino: &str) -> Vec<Candidato> {
    SelectorBuscable::para(opciones)
        .buscar(termino)
        .into_iter()
        .map(|opcion| Candidato {
            id: opcion.clave(),
            texto: opcion.texto().to_string(),
        })
        .collect()
}

/// Candidatos de los selectores con búsqueda del formulario de reservas
///
/// `entidad` es `usuarios`, `locales` o `recursos`; los recursos se pueden
/// limitar a un local con `local_id`.
#[get("/admin/buscar/{entidad}")]
async fn buscar(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<Busqueda>,
) -> AppResult<impl Responder> {
    state.sesiones.requerir(&req, Some(Rol::Administrador)).await?;
    let termino = query.q.trim();

    let resultado = match path.as_str() {
        "usuarios" => candidatos(&state.api.usuarios().listar().await?, termino),
        "locales" => candidatos(&state.api.locales().listar().await?, termino),
        "recursos" => candidatos(&state.api.recursos().listar(query.local_id).await?, termino),
        otra => return Err(AppError::NotFound(format!("No se puede buscar en '{}'", otra))),
    };

    Ok(HttpResponse::Ok().json(resultado))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(listar);
    cfg.service(formulario);
    cfg.service(crear);
    cfg.service(actualizar);
    cfg.service(eliminar);
    cfg.service(buscar);
}
