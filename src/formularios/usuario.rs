use serde::Deserialize;

use super::{requerido, validate_email};
use crate::api::{AppError, AppResult};
use crate::modelos::{NuevoUsuario, Rol, UsuarioCambios};

/// Alta y edición de usuarios desde la gestión de usuarios
#[derive(Debug, Clone, Deserialize)]
pub struct FormularioUsuario {
    pub nombre: String,
    pub correo: String,
    /// Vacía en edición significa "no cambiar"
    #[serde(default)]
    pub contrasena: String,
    #[serde(default = "rol_por_defecto")]
    pub rol: Rol,
    #[serde(default)]
    pub activo: bool,
}

fn rol_por_defecto() -> Rol {
    Rol::Cliente
}

impl FormularioUsuario {
    fn validar_comunes(&self) -> AppResult<(String, String)> {
        let nombre = requerido("nombre", &self.nombre)?;
        let correo = requerido("correo", &self.correo)?;
        if !validate_email(&correo) {
            return Err(AppError::validation_field("correo", "email inválido"));
        }
        Ok((nombre, correo))
    }

    pub fn para_crear(&self) -> AppResult<NuevoUsuario> {
        let (nombre, correo) = self.validar_comunes()?;
        if self.contrasena.is_empty() {
            return Err(AppError::validation_field("contrasena", "es requerida"));
        }

        Ok(NuevoUsuario {
            nombre,
            correo,
            contrasena: self.contrasena.clone(),
            rol: self.rol,
            activo: self.activo,
        })
    }

    pub fn para_editar(&self) -> AppResult<UsuarioCambios> {
        let (nombre, correo) = self.validar_comunes()?;

        Ok(UsuarioCambios {
            nombre: Some(nombre),
            correo: Some(correo),
            contrasena: Some(self.contrasena.clone()).filter(|c| !c.is_empty()),
            rol: Some(self.rol),
            activo: Some(self.activo),
        })
    }
}

/// Registro público: siempre crea clientes activos
#[derive(Debug, Clone, Deserialize)]
pub struct FormularioRegistro {
    pub nombre: String,
    pub correo: String,
    pub contrasena: String,
}

impl FormularioRegistro {
    pub fn a_usuario(&self) -> AppResult<NuevoUsuario> {
        FormularioUsuario {
            nombre: self.nombre.clone(),
            correo: self.correo.clone(),
            contrasena: self.contrasena.clone(),
            rol: Rol::Cliente,
            activo: true,
        }
        .para_crear()
    }
}
