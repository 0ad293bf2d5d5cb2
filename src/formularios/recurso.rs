use serde::Deserialize;

use super::{positivo, requerido};
use crate::api::{AppError, AppResult};
use crate::modelos::{EstadoRecurso, NuevoRecurso};

/// Máximo de recursos idénticos por alta
pub const CANTIDAD_MAXIMA: u32 = 50;

/// Alta y edición de recursos
///
/// La casilla `disponible` decide el estado. En el alta, `cantidad` crea
/// varios recursos iguales de una vez.
#[derive(Debug, Clone, Deserialize)]
pub struct FormularioRecurso {
    #[serde(default)]
    pub local_id: i64,
    pub tipo_recurso: String,
    pub capacidad: i32,
    #[serde(default = "por_defecto_true")]
    pub disponible: bool,
    #[serde(default = "cantidad_por_defecto")]
    pub cantidad: u32,
}

fn por_defecto_true() -> bool {
    true
}

fn cantidad_por_defecto() -> u32 {
    1
}

impl FormularioRecurso {
    pub fn a_recurso(&self) -> AppResult<NuevoRecurso> {
        if self.capacidad <= 0 {
            return Err(AppError::validation_field("capacidad", "debe ser mayor a 0"));
        }

        Ok(NuevoRecurso {
            local_id: positivo("local_id", self.local_id)?,
            tipo_recurso: requerido("tipo_recurso", &self.tipo_recurso)?,
            capacidad: self.capacidad,
            estado: if self.disponible {
                EstadoRecurso::Disponible
            } else {
                EstadoRecurso::Reservado
            },
        })
    }

    /// Cuerpos de alta: `cantidad` copias del mismo recurso
    pub fn para_crear(&self) -> AppResult<Vec<NuevoRecurso>> {
        if self.cantidad == 0 || self.cantidad > CANTIDAD_MAXIMA {
            return Err(AppError::validation_field(
                "cantidad",
                &format!("debe estar entre 1 y {}", CANTIDAD_MAXIMA),
            ));
        }
        let recurso = self.a_recurso()?;
        Ok(vec![recurso; self.cantidad as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn disponible_por_defecto() {
        let form: FormularioRecurso = serde_json::from_value(json!({
            "local_id": 2,
            "tipo_recurso": "mesa",
            "capacidad": 4
        }))
        .unwrap();

        let nuevos = form.para_crear().unwrap();
        assert_eq!(nuevos.len(), 1);
        assert_eq!(nuevos[0].estado, EstadoRecurso::Disponible);
    }

    #[test]
    fn casilla_desmarcada_es_reservado() {
        let form = FormularioRecurso {
            local_id: 2,
            tipo_recurso: "sala".to_string(),
            capacidad: 10,
            disponible: false,
            cantidad: 3,
        };
        let nuevos = form.para_crear().unwrap();
        assert_eq!(nuevos.len(), 3);
        assert!(nuevos.iter().all(|r| r.estado == EstadoRecurso::Reservado));
    }

    #[test]
    fn rechaza_capacidad_y_local_invalidos() {
        let mut form = FormularioRecurso {
            local_id: 0,
            tipo_recurso: "mesa".to_string(),
            capacidad: 4,
            disponible: true,
            cantidad: 1,
        };
        assert!(form.a_recurso().is_err());
        form.local_id = 1;
        form.capacidad = 0;
        assert!(form.a_recurso().is_err());
        form.capacidad = 2;
        form.cantidad = CANTIDAD_MAXIMA + 1;
        assert!(form.para_crear().is_err());
    }
}
