use serde::Deserialize;

use crate::api::{AppError, AppResult};

/// Confirmación explícita de un borrado (`?confirmar=true`)
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Confirmacion {
    #[serde(default)]
    pub confirmar: bool,
}

impl Confirmacion {
    pub fn exigir(&self, que: &str) -> AppResult<()> {
        if !self.confirmar {
            return Err(AppError::Validation(format!(
                "Confirma la eliminación de {} con confirmar=true",
                que
            )));
        }
        Ok(())
    }
}
