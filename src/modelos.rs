//! # Modelos de la API remota
//!
//! Registros que se intercambian tal cual con el servicio REST. Los nombres de
//! campo son los del JSON remoto; no se normaliza nada salvo la parte de fecha
//! de las disponibilidades (ver [`Disponibilidad::fecha_dia`]).
//!
//! Cada entidad tiene además su cuerpo de creación (`Nuevo*`) y, para las que
//! se actualizan con PATCH, un cuerpo parcial (`*Cambios`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rol de un usuario. Sólo decide qué pantallas se ofrecen; la autorización
/// real la hace la sesión emitida por este servidor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rol {
    Cliente,
    #[serde(alias = "admin")]
    Administrador,
}

impl Rol {
    /// Pantalla a la que se redirige tras iniciar sesión
    pub fn panel(&self) -> &'static str {
        match self {
            Rol::Cliente => "/client-panel",
            Rol::Administrador => "/admin-panel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usuario {
    pub id: i64,
    pub nombre: String,
    pub correo: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contrasena: String,
    pub rol: Rol,
    #[serde(default)]
    pub activo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_creacion: Option<String>,
}

impl Usuario {
    /// Copia del usuario apta para devolver al navegador o guardar en sesión
    pub fn sin_contrasena(&self) -> Usuario {
        Usuario {
            contrasena: String::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NuevoUsuario {
    pub nombre: String,
    pub correo: String,
    pub contrasena: String,
    pub rol: Rol,
    pub activo: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsuarioCambios {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrasena: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rol: Option<Rol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

/// Tipo de local. Cualquier valor fuera de los tres conocidos se conserva
/// como texto libre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TipoLocal {
    Bar,
    Restaurante,
    Hotel,
    Otro(String),
}

impl From<String> for TipoLocal {
    fn from(valor: String) -> Self {
        match valor.as_str() {
            "bar" => TipoLocal::Bar,
            "restaurante" => TipoLocal::Restaurante,
            "hotel" => TipoLocal::Hotel,
            _ => TipoLocal::Otro(valor),
        }
    }
}

impl From<TipoLocal> for String {
    fn from(tipo: TipoLocal) -> Self {
        tipo.to_string()
    }
}

impl fmt::Display for TipoLocal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TipoLocal::Bar => f.write_str("bar"),
            TipoLocal::Restaurante => f.write_str("restaurante"),
            TipoLocal::Hotel => f.write_str("hotel"),
            TipoLocal::Otro(libre) => f.write_str(libre),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Local {
    pub id: i64,
    pub nombre: String,
    pub direccion: String,
    pub telefono: String,
    pub tipo: TipoLocal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_creacion: Option<String>,
}

/// Cuerpo de creación y de reemplazo (PUT) de un local
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NuevoLocal {
    pub nombre: String,
    pub direccion: String,
    pub telefono: String,
    pub tipo: TipoLocal,
    pub fecha_creacion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoRecurso {
    Disponible,
    Reservado,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recurso {
    pub id: i64,
    pub local_id: i64,
    pub tipo_recurso: String,
    pub capacidad: i32,
    pub estado: EstadoRecurso,
}

impl Recurso {
    /// Cuerpo PUT con todos los datos del recurso y el estado indicado
    pub fn con_estado(&self, estado: EstadoRecurso) -> NuevoRecurso {
        NuevoRecurso {
            local_id: self.local_id,
            tipo_recurso: self.tipo_recurso.clone(),
            capacidad: self.capacidad,
            estado,
        }
    }
}

/// Cuerpo de creación y de reemplazo (PUT) de un recurso
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NuevoRecurso {
    pub local_id: i64,
    pub tipo_recurso: String,
    pub capacidad: i32,
    pub estado: EstadoRecurso,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disponibilidad {
    pub id: i64,
    pub recurso_id: i64,
    /// `YYYY-MM-DD` o marca ISO completa, según el servidor
    pub fecha: String,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub disponible: bool,
}

impl Disponibilidad {
    /// Parte de fecha (`YYYY-MM-DD`) del campo `fecha`
    pub fn fecha_dia(&self) -> &str {
        solo_fecha(&self.fecha)
    }
}

/// Recorta una marca ISO (`2024-12-25T00:00:00.000Z`) a su parte de fecha
pub fn solo_fecha(valor: &str) -> &str {
    valor.split('T').next().unwrap_or(valor)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NuevaDisponibilidad {
    pub recurso_id: i64,
    pub fecha: String,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub disponible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisponibilidadCambios {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurso_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hora_inicio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hora_fin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disponible: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoReserva {
    Confirmada,
    Cancelada,
}

impl EstadoReserva {
    /// Estado que debe tomar el recurso cuando la reserva queda en este estado
    pub fn estado_recurso(&self) -> EstadoRecurso {
        match self {
            EstadoReserva::Confirmada => EstadoRecurso::Reservado,
            EstadoReserva::Cancelada => EstadoRecurso::Disponible,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reserva {
    pub id: i64,
    pub usuario_id: i64,
    pub local_id: i64,
    pub recurso_id: i64,
    pub fecha: String,
    pub hora: String,
    pub num_personas: i32,
    pub estado: EstadoReserva,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NuevaReserva {
    pub usuario_id: i64,
    pub local_id: i64,
    pub recurso_id: i64,
    pub fecha: String,
    pub hora: String,
    pub num_personas: i32,
    pub estado: EstadoReserva,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReservaCambios {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usuario_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurso_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hora: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_personas: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<EstadoReserva>,
}

impl From<NuevaReserva> for ReservaCambios {
    fn from(reserva: NuevaReserva) -> Self {
        ReservaCambios {
            usuario_id: Some(reserva.usuario_id),
            local_id: Some(reserva.local_id),
            recurso_id: Some(reserva.recurso_id),
            fecha: Some(reserva.fecha),
            hora: Some(reserva.hora),
            num_personas: Some(reserva.num_personas),
            estado: Some(reserva.estado),
        }
    }
}
