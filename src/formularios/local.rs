use serde::Deserialize;

use super::requerido;
use crate::api::{AppError, AppResult};
use crate::modelos::{Local, NuevoLocal, TipoLocal};

/// Alta y edición de locales
///
/// `tipo = "otro"` obliga a indicar `tipo_personalizado`, que es lo que se
/// guarda como tipo.
#[derive(Debug, Clone, Deserialize)]
pub struct FormularioLocal {
    pub nombre: String,
    pub direccion: String,
    pub telefono: String,
    #[serde(default = "tipo_por_defecto")]
    pub tipo: String,
    #[serde(default)]
    pub tipo_personalizado: Option<String>,
}

fn tipo_por_defecto() -> String {
    "bar".to_string()
}

impl FormularioLocal {
    /// Cuerpo de creación o de reemplazo; al editar conserva la fecha de
    /// creación del local existente
    pub fn a_local(&self, existente: Option<&Local>) -> AppResult<NuevoLocal> {
        let tipo = match self.tipo.trim() {
            "otro" => {
                let libre = self.tipo_personalizado.as_deref().unwrap_or_default();
                let libre = requerido("tipo_personalizado", libre)
                    .map_err(|_| AppError::validation_field("tipo_personalizado", "especifica el tipo de local"))?;
                TipoLocal::from(libre)
            }
            "" => return Err(AppError::validation_field("tipo", "es requerido")),
            conocido => TipoLocal::from(conocido.to_string()),
        };

        let fecha_creacion = existente
            .and_then(|local| local.fecha_creacion.clone())
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

        Ok(NuevoLocal {
            nombre: requerido("nombre", &self.nombre)?,
            direccion: requerido("direccion", &self.direccion)?,
            telefono: requerido("telefono", &self.telefono)?,
            tipo,
            fecha_creacion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formulario(tipo: &str, libre: Option<&str>) -> FormularioLocal {
        FormularioLocal {
            nombre: "Cafe X".to_string(),
            direccion: "Calle 1".to_string(),
            telefono: "555".to_string(),
            tipo: tipo.to_string(),
            tipo_personalizado: libre.map(str::to_string),
        }
    }

    #[test]
    fn tipo_otro_usa_el_texto_libre() {
        let local = formulario("otro", Some("discoteca")).a_local(None).unwrap();
        assert_eq!(local.tipo, TipoLocal::Otro("discoteca".to_string()));
    }

    #[test]
    fn tipo_otro_sin_texto_falla() {
        assert!(formulario("otro", Some("  ")).a_local(None).is_err());
        assert!(formulario("otro", None).a_local(None).is_err());
    }

    #[test]
    fn edicion_conserva_fecha_creacion() {
        let existente = Local {
            id: 4,
            nombre: "Viejo".to_string(),
            direccion: "Calle 2".to_string(),
            telefono: "1".to_string(),
            tipo: TipoLocal::Hotel,
            fecha_creacion: Some("2024-01-01T00:00:00Z".to_string()),
        };
        let local = formulario("bar", None).a_local(Some(&existente)).unwrap();
        assert_eq!(local.fecha_creacion, "2024-01-01T00:00:00Z");
        assert_eq!(local.tipo, TipoLocal::Bar);
    }
}
