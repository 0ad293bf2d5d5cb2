use serde::Deserialize;

use super::{validate_date, validate_time};
use crate::api::{AppError, AppResult};
use crate::modelos::{DisponibilidadCambios, NuevaDisponibilidad, Recurso};

/// Franja de disponibilidad para uno o varios recursos de un mismo local
///
/// En el alta se crea una franja por recurso seleccionado; en la edición sólo
/// se modifica la franja editada.
#[derive(Debug, Clone, Deserialize)]
pub struct FormularioDisponibilidad {
    #[serde(default)]
    pub recursos: Vec<i64>,
    pub fecha: String,
    pub hora_inicio: String,
    pub hora_fin: String,
    #[serde(default = "por_defecto_true")]
    pub disponible: bool,
}

fn por_defecto_true() -> bool {
    true
}

/// Franja ya validada y normalizada
struct Franja {
    fecha: String,
    hora_inicio: String,
    hora_fin: String,
}

impl FormularioDisponibilidad {
    fn franja(&self) -> AppResult<Franja> {
        let fecha = validate_date("fecha", &self.fecha)?;
        let inicio = validate_time("hora_inicio", &self.hora_inicio)?;
        let fin = validate_time("hora_fin", &self.hora_fin)?;

        if fin <= inicio {
            return Err(AppError::validation_field(
                "hora_fin",
                "debe ser posterior a la hora de inicio",
            ));
        }

        Ok(Franja {
            fecha: fecha.format("%Y-%m-%d").to_string(),
            hora_inicio: self.hora_inicio.trim().to_string(),
            hora_fin: self.hora_fin.trim().to_string(),
        })
    }

    /// Comprueba que los recursos elegidos existen y son de un solo local
    pub fn validar_recursos(&self, conocidos: &[Recurso]) -> AppResult<()> {
        let mut local: Option<i64> = None;

        for id in &self.recursos {
            let recurso = conocidos
                .iter()
                .find(|r| r.id == *id)
                .ok_or_else(|| AppError::not_found_id("Recurso", id))?;

            match local {
                Some(local_id) if local_id != recurso.local_id => {
                    return Err(AppError::validation_field(
                        "recursos",
                        "todos los recursos deben pertenecer al mismo local",
                    ));
                }
                _ => local = Some(recurso.local_id),
            }
        }
        Ok(())
    }

    pub fn para_crear(&self) -> AppResult<Vec<NuevaDisponibilidad>> {
        let franja = self.franja()?;

        let mut recursos = self.recursos.clone();
        recursos.sort_unstable();
        recursos.dedup();
        if recursos.is_empty() {
            return Err(AppError::validation_field("recursos", "selecciona al menos un recurso"));
        }

        Ok(recursos
            .into_iter()
            .map(|recurso_id| NuevaDisponibilidad {
                recurso_id,
                fecha: franja.fecha.clone(),
                hora_inicio: franja.hora_inicio.clone(),
                hora_fin: franja.hora_fin.clone(),
                disponible: self.disponible,
            })
            .collect())
    }

    pub fn para_editar(&self) -> AppResult<DisponibilidadCambios> {
        let franja = self.franja()?;

        Ok(DisponibilidadCambios {
            recurso_id: self.recursos.first().copied(),
            fecha: Some(franja.fecha),
            hora_inicio: Some(franja.hora_inicio),
            hora_fin: Some(franja.hora_fin),
            disponible: Some(self.disponible),
        })
    }
}
