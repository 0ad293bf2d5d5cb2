//! Vistas derivadas de las colecciones remotas
//!
//! Funciones puras: no hacen peticiones, sólo filtran y cruzan lo que cada
//! pantalla ya ha descargado.

use serde::Serialize;

use crate::modelos::{solo_fecha, Disponibilidad, EstadoRecurso, Local, Recurso, Reserva, Usuario};

pub const DESCONOCIDO: &str = "Desconocido";

/// Reservas del local elegido, o todas sin local
pub fn filtrar_por_local(reservas: Vec<Reserva>, local_id: Option<i64>) -> Vec<Reserva> {
    match local_id {
        Some(local_id) => reservas.into_iter().filter(|r| r.local_id == local_id).collect(),
        None => reservas,
    }
}

/// Franjas cuyos recursos pertenecen al local elegido
pub fn disponibilidad_por_local(
    disponibilidad: Vec<Disponibilidad>,
    recursos: &[Recurso],
    local_id: Option<i64>,
) -> Vec<Disponibilidad> {
    let Some(local_id) = local_id else {
        return disponibilidad;
    };

    disponibilidad
        .into_iter()
        .filter(|slot| {
            recursos
                .iter()
                .any(|recurso| recurso.id == slot.recurso_id && recurso.local_id == local_id)
        })
        .collect()
}

/// Recurso que se puede reservar junto con la franja que consumiría
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecursoReservable {
    pub recurso: Recurso,
    pub disponibilidad: Disponibilidad,
}

/// Un recurso se ofrece si no está reservado y tiene al menos una franja
/// disponible; se empareja con la primera de ellas
pub fn recursos_reservables(
    recursos: Vec<Recurso>,
    disponibilidad: &[Disponibilidad],
) -> Vec<RecursoReservable> {
    recursos
        .into_iter()
        .filter(|recurso| recurso.estado != EstadoRecurso::Reservado)
        .filter_map(|recurso| {
            let slot = disponibilidad
                .iter()
                .find(|slot| slot.recurso_id == recurso.id && slot.disponible)?;
            Some(RecursoReservable {
                disponibilidad: slot.clone(),
                recurso,
            })
        })
        .collect()
}

/// Franja que corresponde a una reserva: la de su fecha y hora de inicio o,
/// si no hay, la primera del recurso
pub fn franja_de_reserva<'a>(
    disponibilidad: &'a [Disponibilidad],
    reserva: &Reserva,
) -> Option<&'a Disponibilidad> {
    let recurso_id = reserva.recurso_id;
    let fecha = solo_fecha(&reserva.fecha);

    disponibilidad
        .iter()
        .find(|s| s.recurso_id == recurso_id && s.fecha_dia() == fecha && s.hora_inicio == reserva.hora)
        .or_else(|| disponibilidad.iter().find(|s| s.recurso_id == recurso_id))
}

pub fn nombre_local(locales: &[Local], id: i64) -> String {
    locales
        .iter()
        .find(|l| l.id == id)
        .map(|l| l.nombre.clone())
        .unwrap_or_else(|| DESCONOCIDO.to_string())
}

pub fn tipo_recurso(recursos: &[Recurso], id: i64) -> String {
    recursos
        .iter()
        .find(|r| r.id == id)
        .map(|r| r.tipo_recurso.clone())
        .unwrap_or_else(|| DESCONOCIDO.to_string())
}

pub fn nombre_usuario(usuarios: &[Usuario], id: i64) -> String {
    usuarios
        .iter()
        .find(|u| u.id == id)
        .map(|u| u.nombre.clone())
        .unwrap_or_else(|| DESCONOCIDO.to_string())
}

/// Reserva con los nombres de sus entidades relacionadas
#[derive(Debug, Clone, Serialize)]
pub struct ReservaDetallada {
    #[serde(flatten)]
    pub reserva: Reserva,
    pub nombre_usuario: String,
    pub nombre_local: String,
    pub tipo_recurso: String,
}

pub fn detallar(
    reservas: Vec<Reserva>,
    usuarios: &[Usuario],
    locales: &[Local],
    recursos: &[Recurso],
) -> Vec<ReservaDetallada> {
    reservas
        .into_iter()
        .map(|reserva| ReservaDetallada {
            nombre_usuario: nombre_usuario(usuarios, reserva.usuario_id),
            nombre_local: nombre_local(locales, reserva.local_id),
            tipo_recurso: tipo_recurso(recursos, reserva.recurso_id),
            reserva,
        })
        .collect()
}
