//! Lógica compartida del formulario de reservas
//!
//! Reúne los usuarios, locales y recursos que necesita el alta o edición de
//! una reserva, mantiene el formulario coherente (recursos del local elegido,
//! personas dentro de la capacidad) y aplica el efecto sobre el estado del
//! recurso al guardar o borrar.

use serde::Serialize;

use crate::api::AppResult;
use crate::formularios::{positivo, FormularioReserva, SelectorBuscable};
use crate::modelos::{EstadoRecurso, EstadoReserva, Local, NuevaReserva, Recurso, Reserva, Usuario};
use crate::servicios::{ApiClient, ServiceResult};

#[derive(Debug, Clone)]
pub struct LogicaReserva {
    usuarios: Vec<Usuario>,
    locales: Vec<Local>,
    recursos: Vec<Recurso>,
    formulario: FormularioReserva,
    editando: Option<i64>,
}

/// Estado del formulario tal como se envía al navegador
#[derive(Debug, Serialize)]
pub struct VistaFormularioReserva<'a> {
    pub formulario: &'a FormularioReserva,
    pub editando: Option<i64>,
    pub usuarios: Vec<Usuario>,
    pub locales: &'a [Local],
    pub recursos: Vec<&'a Recurso>,
    pub capacidad: Option<i32>,
}

impl LogicaReserva {
    /// Descarga usuarios, locales y recursos en paralelo
    pub async fn cargar(api: &ApiClient, reserva: Option<&Reserva>) -> ServiceResult<Self> {
        let (usuarios, locales, recursos) = tokio::try_join!(
            api.usuarios().listar(),
            api.locales().listar(),
            api.recursos().listar(None),
        )?;
        Ok(Self::new(usuarios, locales, recursos, reserva))
    }

    /// Sólo se ofrecen recursos no reservados, más el de la reserva editada
    pub fn new(
        usuarios: Vec<Usuario>,
        locales: Vec<Local>,
        recursos: Vec<Recurso>,
        reserva: Option<&Reserva>,
    ) -> Self {
        let propio = reserva.map(|r| r.recurso_id);
        let recursos = recursos
            .into_iter()
            .filter(|r| r.estado != EstadoRecurso::Reservado || Some(r.id) == propio)
            .collect();

        Self {
            usuarios,
            locales,
            recursos,
            formulario: reserva.map(FormularioReserva::from).unwrap_or_default(),
            editando: reserva.map(|r| r.id),
        }
    }

    pub fn formulario(&self) -> &FormularioReserva {
        &self.formulario
    }

    /// Recursos del local seleccionado; ninguno sin local
    pub fn recursos_filtrados(&self) -> Vec<&Recurso> {
        self.recursos
            .iter()
            .filter(|r| self.formulario.local_id != 0 && r.local_id == self.formulario.local_id)
            .collect()
    }

    pub fn capacidad(&self) -> Option<i32> {
        self.recursos
            .iter()
            .find(|r| r.id == self.formulario.recurso_id)
            .map(|r| r.capacidad)
    }

    pub fn selector_usuarios(&self) -> SelectorBuscable<'_, Usuario> {
        let selector = SelectorBuscable::para(&self.usuarios);
        match self.editando {
            Some(_) => selector.editando(self.formulario.usuario_id),
            None => selector,
        }
    }

    pub fn selector_locales(&self) -> SelectorBuscable<'_, Local> {
        let selector = SelectorBuscable::para(&self.locales);
        match self.editando {
            Some(_) => selector.editando(self.formulario.local_id),
            None => selector,
        }
    }

    pub fn seleccionar_usuario(&mut self, id: i64) -> AppResult<()> {
        let elegido = self.selector_usuarios().seleccionar(id)?.id;
        self.formulario.usuario_id = elegido;
        Ok(())
    }

    /// Cambiar de local deja el recurso sin seleccionar
    pub fn seleccionar_local(&mut self, id: i64) -> AppResult<()> {
        let elegido = self.selector_locales().seleccionar(id)?.id;
        if elegido != self.formulario.local_id {
            self.formulario.local_id = elegido;
            self.formulario.recurso_id = 0;
        }
        Ok(())
    }

    /// Elige un recurso del local seleccionado y recorta las personas a su
    /// capacidad
    pub fn seleccionar_recurso(&mut self, id: i64) -> AppResult<()> {
        let candidatos: Vec<Recurso> = self.recursos_filtrados().into_iter().cloned().collect();
        let elegido = SelectorBuscable::para(&candidatos).seleccionar(id)?.id;
        self.formulario.recurso_id = elegido;
        self.ajustar_personas(self.formulario.num_personas);
        Ok(())
    }

    /// Fija el número de personas entre 1 y la capacidad del recurso elegido
    pub fn ajustar_personas(&mut self, personas: i32) {
        let personas = personas.max(1);
        self.formulario.num_personas = match self.capacidad() {
            Some(capacidad) => personas.min(capacidad.max(1)),
            None => personas,
        };
    }

    /// Vuelca un formulario recibido pasando por las mismas reglas que la
    /// pantalla y devuelve el cuerpo a enviar
    pub fn aplicar(&mut self, formulario: FormularioReserva) -> AppResult<NuevaReserva> {
        // Un selector sin elegir llega como 0: es un campo vacío, no un registro inexistente
        positivo("usuario_id", formulario.usuario_id)?;
        positivo("local_id", formulario.local_id)?;
        positivo("recurso_id", formulario.recurso_id)?;

        self.seleccionar_usuario(formulario.usuario_id)?;
        self.seleccionar_local(formulario.local_id)?;
        self.seleccionar_recurso(formulario.recurso_id)?;

        self.formulario.fecha = formulario.fecha;
        self.formulario.hora = formulario.hora;
        self.formulario.estado = formulario.estado;
        self.ajustar_personas(formulario.num_personas);

        self.formulario.a_reserva()
    }

    pub fn vista(&self) -> VistaFormularioReserva<'_> {
        VistaFormularioReserva {
            formulario: &self.formulario,
            editando: self.editando,
            usuarios: self.usuarios.iter().map(Usuario::sin_contrasena).collect(),
            locales: &self.locales,
            recursos: self.recursos_filtrados(),
            capacidad: self.capacidad(),
        }
    }
}

/// Deja el recurso en el estado que corresponde a la reserva guardada
///
/// Reenvía el registro completo del recurso (PUT) con el nuevo estado.
pub async fn sincronizar_recurso(
    api: &ApiClient,
    recurso_id: i64,
    estado: EstadoReserva,
) -> ServiceResult<Recurso> {
    let recurso = api.recursos().obtener(recurso_id).await?;
    let actualizado = api
        .recursos()
        .actualizar(recurso.id, &recurso.con_estado(estado.estado_recurso()))
        .await?;
    tracing::debug!(recurso_id, estado = ?actualizado.estado, "Estado del recurso sincronizado");
    Ok(actualizado)
}

/// Vuelve a dejar disponible el recurso de una reserva borrada
pub async fn liberar_recurso(api: &ApiClient, recurso_id: i64) -> ServiceResult<Recurso> {
    sincronizar_recurso(api, recurso_id, EstadoReserva::Cancelada).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AppError;
    use crate::modelos::{Rol, TipoLocal};

    fn usuario(id: i64, nombre: &str) -> Usuario {
        Usuario {
            id,
            nombre: nombre.to_string(),
            correo: format!("{}@correo.com", nombre),
            contrasena: "x".to_string(),
            rol: Rol::Cliente,
            activo: true,
            fecha_creacion: None,
        }
    }

    fn local(id: i64, nombre: &str) -> Local {
        Local {
            id,
            nombre: nombre.to_string(),
            direccion: "Calle".to_string(),
            telefono: "1".to_string(),
            tipo: TipoLocal::Bar,
            fecha_creacion: None,
        }
    }

    fn recurso(id: i64, local_id: i64, capacidad: i32, estado: EstadoRecurso) -> Recurso {
        Recurso {
            id,
            local_id,
            tipo_recurso: format!("mesa {}", id),
            capacidad,
            estado,
        }
    }

    fn logica(reserva: Option<&Reserva>) -> LogicaReserva {
        LogicaReserva::new(
            vec![usuario(1, "ana"), usuario(2, "luis")],
            vec![local(1, "Cafe X"), local(2, "Hotel Y")],
            vec![
                recurso(10, 1, 4, EstadoRecurso::Disponible),
                recurso(11, 1, 2, EstadoRecurso::Reservado),
                recurso(20, 2, 6, EstadoRecurso::Disponible),
            ],
            reserva,
        )
    }

    fn reserva() -> Reserva {
        Reserva {
            id: 5,
            usuario_id: 1,
            local_id: 1,
            recurso_id: 11,
            fecha: "2024-12-25".to_string(),
            hora: "20:00".to_string(),
            num_personas: 2,
            estado: EstadoReserva::Confirmada,
        }
    }

    #[test]
    fn sin_local_no_hay_recursos() {
        assert!(logica(None).recursos_filtrados().is_empty());
    }

    #[test]
    fn oculta_recursos_reservados() {
        let mut logica = logica(None);
        logica.seleccionar_local(1).unwrap();
        let ids: Vec<i64> = logica.recursos_filtrados().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10]);
    }

    #[test]
    fn edicion_conserva_su_recurso_reservado() {
        let existente = reserva();
        let logica = logica(Some(&existente));
        let ids: Vec<i64> = logica.recursos_filtrados().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[test]
    fn cambiar_local_reinicia_recurso() {
        let mut logica = logica(None);
        logica.seleccionar_local(1).unwrap();
        logica.seleccionar_recurso(10).unwrap();
        logica.seleccionar_local(2).unwrap();
        assert_eq!(logica.formulario().recurso_id, 0);
    }

    #[test]
    fn recurso_de_otro_local_se_rechaza() {
        let mut logica = logica(None);
        logica.seleccionar_local(1).unwrap();
        assert!(logica.seleccionar_recurso(20).is_err());
    }

    #[test]
    fn personas_se_recortan_a_la_capacidad() {
        let mut logica = logica(None);
        logica.seleccionar_local(1).unwrap();
        logica.seleccionar_recurso(10).unwrap();

        logica.ajustar_personas(9);
        assert_eq!(logica.formulario().num_personas, 4);
        logica.ajustar_personas(0);
        assert_eq!(logica.formulario().num_personas, 1);
    }

    #[test]
    fn aplicar_construye_la_reserva() {
        let mut logica = logica(None);
        let nueva = logica
            .aplicar(FormularioReserva {
                usuario_id: 2,
                local_id: 2,
                recurso_id: 20,
                fecha: "2024-12-31".to_string(),
                hora: "21:00".to_string(),
                num_personas: 10,
                estado: EstadoReserva::Confirmada,
            })
            .unwrap();

        assert_eq!(nueva.num_personas, 6);
        assert_eq!(nueva.recurso_id, 20);
    }

    #[test]
    fn edicion_no_permite_cambiar_de_usuario() {
        let existente = reserva();
        let mut logica = logica(Some(&existente));
        let mut cambios = FormularioReserva::from(&existente);
        cambios.usuario_id = 2;

        assert!(matches!(logica.aplicar(cambios), Err(AppError::Validation(_))));
    }

    #[test]
    fn selector_sin_elegir_es_error_de_validacion() {
        let mut logica = logica(None);
        let formulario = FormularioReserva {
            usuario_id: 1,
            local_id: 1,
            fecha: "2024-12-31".to_string(),
            hora: "21:00".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            logica.aplicar(formulario),
            Err(AppError::ValidationWithField { field, .. }) if field == "recurso_id"
        ));
    }

    #[test]
    fn vista_no_expone_contrasenas() {
        let logica = logica(None);
        assert!(logica.vista().usuarios.iter().all(|u| u.contrasena.is_empty()));
    }
}
