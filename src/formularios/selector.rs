//! # Selector con búsqueda
//!
//! Control genérico sobre cualquier registro: un texto filtra los candidatos
//! por subcadena sin distinguir mayúsculas en el campo visible, y elegir uno
//! fija el texto al valor elegido. En modo edición el control queda en sólo
//! lectura con el valor actual.

use crate::api::{AppError, AppResult};
use crate::modelos::{Local, Recurso, Usuario};

/// Registro que puede ofrecerse en un [`SelectorBuscable`]
pub trait Opcion {
    fn clave(&self) -> i64;
    fn texto(&self) -> &str;
}

impl Opcion for Usuario {
    fn clave(&self) -> i64 {
        self.id
    }

    fn texto(&self) -> &str {
        &self.nombre
    }
}

impl Opcion for Local {
    fn clave(&self) -> i64 {
        self.id
    }

    fn texto(&self) -> &str {
        &self.nombre
    }
}

impl Opcion for Recurso {
    fn clave(&self) -> i64 {
        self.id
    }

    fn texto(&self) -> &str {
        &self.tipo_recurso
    }
}

pub struct SelectorBuscable<'a, T> {
    opciones: &'a [T],
    clave: fn(&T) -> i64,
    mostrar: fn(&T) -> &str,
    editando: bool,
    termino: String,
    seleccionado: Option<&'a T>,
}

impl<'a, T: Opcion> SelectorBuscable<'a, T> {
    /// Selector con la clave y el texto de [`Opcion`]
    pub fn para(opciones: &'a [T]) -> Self {
        Self::new(opciones, T::clave, T::texto)
    }
}

impl<'a, T> SelectorBuscable<'a, T> {
    pub fn new(opciones: &'a [T], clave: fn(&T) -> i64, mostrar: fn(&T) -> &str) -> Self {
        Self {
            opciones,
            clave,
            mostrar,
            editando: false,
            termino: String::new(),
            seleccionado: None,
        }
    }

    /// Pasa a modo edición bloqueado en el registro con `clave`, si existe
    pub fn editando(mut self, clave: i64) -> Self {
        self.editando = true;
        self.seleccionado = self.buscar_clave(clave);
        self.termino = self
            .seleccionado
            .map(|opcion| (self.mostrar)(opcion).to_string())
            .unwrap_or_default();
        self
    }

    pub fn solo_lectura(&self) -> bool {
        self.editando
    }

    pub fn termino(&self) -> &str {
        &self.termino
    }

    pub fn seleccionado(&self) -> Option<&'a T> {
        self.seleccionado
    }

    /// Cambia el texto de búsqueda y devuelve los candidatos
    pub fn buscar(&mut self, termino: &str) -> Vec<&'a T> {
        if !self.editando {
            self.termino = termino.to_string();
        }
        self.candidatos()
    }

    /// Candidatos para el texto actual; ninguno con el texto vacío o en edición
    pub fn candidatos(&self) -> Vec<&'a T> {
        if self.editando || self.termino.is_empty() {
            return Vec::new();
        }

        let termino = self.termino.to_lowercase();
        let mostrar = self.mostrar;
        self.opciones
            .iter()
            .filter(|opcion| mostrar(opcion).to_lowercase().contains(&termino))
            .collect()
    }

    /// Elige el registro con `clave`
    ///
    /// # Errores
    /// - `Validation`: el selector está bloqueado por edición en otro registro
    /// - `NotFoundWithId`: no hay ningún registro con esa clave
    pub fn seleccionar(&mut self, clave: i64) -> AppResult<&'a T> {
        if self.editando {
            return match self.seleccionado {
                Some(actual) if (self.clave)(actual) == clave => Ok(actual),
                _ => Err(AppError::Validation(
                    "No se puede cambiar esta selección al editar".to_string(),
                )),
            };
        }

        let elegido = self
            .buscar_clave(clave)
            .ok_or_else(|| AppError::not_found_id("Opción", clave))?;
        self.termino = (self.mostrar)(elegido).to_string();
        self.seleccionado = Some(elegido);
        Ok(elegido)
    }

    fn buscar_clave(&self, clave: i64) -> Option<&'a T> {
        let clave_de = self.clave;
        self.opciones.iter().find(|opcion| clave_de(opcion) == clave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modelos::Rol;

    fn usuarios() -> Vec<Usuario> {
        ["Ana Marisa", "Mariano", "Luis"]
            .iter()
            .enumerate()
            .map(|(i, nombre)| Usuario {
                id: i as i64 + 1,
                nombre: nombre.to_string(),
                correo: format!("u{}@correo.com", i),
                contrasena: String::new(),
                rol: Rol::Cliente,
                activo: true,
                fecha_creacion: None,
            })
            .collect()
    }

    #[test]
    fn filtra_sin_distinguir_mayusculas() {
        let opciones = usuarios();
        let mut selector = SelectorBuscable::para(&opciones);

        let nombres: Vec<&str> = selector.buscar("MARI").iter().map(|u| u.nombre.as_str()).collect();
        assert_eq!(nombres, vec!["Ana Marisa", "Mariano"]);
    }

    #[test]
    fn texto_vacio_no_ofrece_candidatos() {
        let opciones = usuarios();
        let mut selector = SelectorBuscable::para(&opciones);
        assert!(selector.buscar("").is_empty());
    }

    #[test]
    fn seleccionar_fija_el_texto() {
        let opciones = usuarios();
        let mut selector = SelectorBuscable::para(&opciones);
        selector.buscar("lu");

        let elegido = selector.seleccionar(3).unwrap();
        assert_eq!(elegido.nombre, "Luis");
        assert_eq!(selector.termino(), "Luis");
    }

    #[test]
    fn edicion_bloquea_el_selector() {
        let opciones = usuarios();
        let mut selector = SelectorBuscable::para(&opciones).editando(2);

        assert!(selector.solo_lectura());
        assert_eq!(selector.termino(), "Mariano");
        assert!(selector.buscar("ana").is_empty());
        assert_eq!(selector.termino(), "Mariano");
        assert!(selector.seleccionar(2).is_ok());
        assert!(selector.seleccionar(1).is_err());
    }

    #[test]
    fn clave_y_texto_configurables() {
        let opciones = usuarios();
        let mut selector = SelectorBuscable::new(&opciones, |u| u.id * 10, |u| u.correo.as_str());

        assert_eq!(selector.buscar("u0@").len(), 1);
        assert_eq!(selector.seleccionar(20).unwrap().nombre, "Mariano");
    }
}
