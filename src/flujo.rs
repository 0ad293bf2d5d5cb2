//! # Reservar y cancelar
//!
//! Las operaciones que tocan varias entidades remotas se ejecutan como una
//! saga: cada paso se anota en el [`IntentLog`] antes de pasar al siguiente.
//!
//! Reservar:
//! 1. `POST` de la reserva confirmada
//! 2. `PUT` del recurso como reservado
//! 3. `PATCH` de la franja con `disponible = false`
//!
//! Si falla el paso 2 se borra la reserva; si falla el 3 además se restaura el
//! recurso, y la franja si el fallo deja en duda que se ocupara. Una
//! compensación fallida deja la intención en [`Paso::CompensacionPendiente`].
//!
//! Cancelar o eliminar: cambio de estado (o borrado) de la reserva, franja
//! liberada y recurso de nuevo disponible. Un fallo tras el primer paso deja
//! la intención pendiente y [`FlujoReserva::reanudar_pendientes`] termina los
//! pasos que faltan.
//!
//! Cada escritura en el registro compara la versión leída: una ejecución que
//! pierde la intención frente a otra (una reanudación, por ejemplo) se detiene
//! con `409` sin tocar nada más.

use std::time::Duration;
use thiserror::Error;

use crate::api::{AppError, AppResult};
use crate::db::{IntencionReserva, IntentLog, Operacion, Paso};
use crate::modelos::{
    solo_fecha, Disponibilidad, DisponibilidadCambios, EstadoRecurso, EstadoReserva, NuevaReserva,
    Recurso, Reserva, ReservaCambios,
};
use crate::servicios::{ApiClient, ErrorKind, ServiceError, ServiceResult};
use crate::vista::filtros::franja_de_reserva;

/// Llamadas remotas del camino más largo: tres pasos de reserva y tres de
/// compensación
const LLAMADAS_MAX: u32 = 6;

/// Operación de varios pasos que no llegó a completarse
#[derive(Error, Debug)]
#[error("{operacion:?} interrumpida en '{}' (intención {intencion}): {source}", .paso.as_str())]
pub struct FlujoError {
    pub intencion: String,
    pub operacion: Operacion,
    /// Paso en el que quedó la intención
    pub paso: Paso,
    /// Los pasos ya hechos se han deshecho
    pub compensada: bool,
    #[source]
    pub source: ServiceError,
}

pub struct FlujoReserva<'a> {
    api: &'a ApiClient,
    intenciones: &'a dyn IntentLog,
}

impl<'a> FlujoReserva<'a> {
    pub fn new(api: &'a ApiClient, intenciones: &'a dyn IntentLog) -> Self {
        Self { api, intenciones }
    }

    /// Segundos sin cambios tras los que ninguna ejecución puede seguir en
    /// curso sobre una intención
    pub fn antiguedad_minima(&self) -> i64 {
        let peor_caso = self.api.timeout() * LLAMADAS_MAX + Duration::from_secs(1);
        peor_caso.as_secs() as i64
    }

    /// Reserva `recurso` en la franja `slot` para el usuario
    ///
    /// La reserva toma la fecha de la franja, su hora de inicio y la capacidad
    /// del recurso como número de personas.
    pub async fn reservar(
        &self,
        usuario_id: i64,
        local_id: i64,
        recurso: &Recurso,
        slot: &Disponibilidad,
    ) -> AppResult<Reserva> {
        let mut intencion = IntencionReserva::nueva(Operacion::Reservar, usuario_id, local_id, recurso.id);
        intencion.recurso = Some(recurso.clone());
        intencion.disponibilidad = Some(slot.clone());
        self.intenciones.registrar(&intencion).await?;

        tracing::info!(
            intencion = %intencion.id,
            usuario_id,
            recurso_id = recurso.id,
            disponibilidad_id = slot.id,
            "Iniciando reserva"
        );

        let nueva = NuevaReserva {
            usuario_id,
            local_id,
            recurso_id: recurso.id,
            fecha: slot.fecha_dia().to_string(),
            hora: slot.hora_inicio.clone(),
            num_personas: recurso.capacidad,
            estado: EstadoReserva::Confirmada,
        };

        let reserva = match self.api.reservas().crear(&nueva).await {
            Ok(reserva) => reserva,
            Err(error) => {
                intencion.fallar(Paso::Fallida, &error);
                self.guardar(&mut intencion).await?;
                return Err(flujo_error(&intencion, false, error).into());
            }
        };
        intencion.reserva = Some(reserva.clone());
        intencion.avanzar(Paso::ReservaCreada);
        if let Err(error) = self.guardar(&mut intencion).await {
            return Err(self.abandonar(&intencion, false, error).await);
        }

        let ocupado = recurso.con_estado(EstadoRecurso::Reservado);
        if let Err(error) = self.api.recursos().actualizar(recurso.id, &ocupado).await {
            return Err(self.deshacer(&mut intencion, false, error).await?.into());
        }
        intencion.avanzar(Paso::RecursoReservado);
        if let Err(error) = self.guardar(&mut intencion).await {
            return Err(self.abandonar(&intencion, true, error).await);
        }

        let cambios = DisponibilidadCambios {
            disponible: Some(false),
            ..Default::default()
        };
        if let Err(error) = self.api.disponibilidad().actualizar(slot.id, &cambios).await {
            // Sin respuesta del servidor no se sabe si la franja quedó ocupada
            intencion.franja_ocupada = error.kind() == ErrorKind::Network;
            return Err(self.deshacer(&mut intencion, true, error).await?.into());
        }
        intencion.franja_ocupada = true;
        intencion.avanzar(Paso::Completada);
        if let Err(error) = self.guardar(&mut intencion).await {
            return Err(self.abandonar(&intencion, true, error).await);
        }

        tracing::info!(intencion = %intencion.id, reserva_id = reserva.id, "Reserva completada");
        Ok(reserva)
    }

    /// Cancela (`Operacion::Cancelar`) o borra (`Operacion::Eliminar`) la
    /// reserva y libera su franja y su recurso
    pub async fn cancelar(&self, reserva: &Reserva, operacion: Operacion) -> AppResult<()> {
        let mut intencion =
            IntencionReserva::nueva(operacion, reserva.usuario_id, reserva.local_id, reserva.recurso_id);
        intencion.reserva = Some(reserva.clone());
        self.intenciones.registrar(&intencion).await?;

        tracing::info!(
            intencion = %intencion.id,
            operacion = ?operacion,
            reserva_id = reserva.id,
            "Iniciando cancelación"
        );

        if let Err(error) = self.quitar_reserva(reserva, operacion).await {
            intencion.fallar(Paso::Fallida, &error);
            self.guardar(&mut intencion).await?;
            return Err(flujo_error(&intencion, false, error).into());
        }
        intencion.avanzar(Paso::ReservaCancelada);
        self.guardar(&mut intencion).await?;

        self.completar_cancelacion(&mut intencion).await
    }

    /// Retoma las intenciones sin terminar cuya última actualización tiene al
    /// menos `antiguedad_min_segs` segundos
    ///
    /// Cada intención se toma antes de tocarla; las que otro proceso actualiza
    /// entre medias se omiten. Las reservas a medias se deshacen y las
    /// cancelaciones se completan. Devuelve las intenciones procesadas en su
    /// nuevo estado.
    pub async fn reanudar_pendientes(&self, antiguedad_min_segs: i64) -> AppResult<Vec<IntencionReserva>> {
        let ahora = chrono::Utc::now().timestamp();
        let mut procesadas = Vec::new();

        for mut intencion in self.intenciones.pendientes().await? {
            if ahora - intencion.actualizada_en < antiguedad_min_segs {
                continue;
            }

            intencion.actualizada_en = ahora;
            if let Err(error) = self.guardar(&mut intencion).await {
                tracing::info!(intencion = %intencion.id, error = %error, "Intención ocupada, se omite");
                continue;
            }

            tracing::info!(
                intencion = %intencion.id,
                operacion = ?intencion.operacion,
                paso = intencion.paso.as_str(),
                "Reanudando intención"
            );

            let resultado = match intencion.operacion {
                Operacion::Reservar => self.reanudar_reserva(&mut intencion).await,
                Operacion::Cancelar | Operacion::Eliminar => self.reanudar_cancelacion(&mut intencion).await,
            };

            if let Err(error) = resultado {
                tracing::warn!(intencion = %intencion.id, error = %error, "La intención sigue pendiente");
            }
            procesadas.push(intencion);
        }

        Ok(procesadas)
    }

    async fn reanudar_reserva(&self, intencion: &mut IntencionReserva) -> AppResult<()> {
        if intencion.reserva.is_none() {
            // La creación pudo llegar al servidor sin quedar anotada
            match self.buscar_sin_registrar(intencion).await {
                Ok(Some(reserva)) => intencion.reserva = Some(reserva),
                Ok(None) => {
                    intencion.fallar(Paso::Fallida, "sin reserva registrada");
                    return self.guardar(intencion).await;
                }
                Err(error) => return Err(self.dejar_pendiente(intencion, error).await?.into()),
            }
        }

        if intencion.paso == Paso::RecursoReservado {
            intencion.franja_ocupada = true;
        }
        let restaurar_recurso = intencion.paso != Paso::Iniciada;

        let pendiente = intencion.error.clone().unwrap_or_else(|| "interrumpida".to_string());
        match self.compensar(intencion, restaurar_recurso).await {
            Ok(()) => {
                intencion.fallar(Paso::Compensada, pendiente);
                self.guardar(intencion).await
            }
            Err(error) => {
                intencion.fallar(Paso::CompensacionPendiente, &error);
                self.guardar(intencion).await?;
                Err(flujo_error(intencion, false, error).into())
            }
        }
    }

    /// Reserva confirmada del usuario para el recurso y la franja de la
    /// intención
    async fn buscar_sin_registrar(&self, intencion: &IntencionReserva) -> ServiceResult<Option<Reserva>> {
        let Some(slot) = intencion.disponibilidad.as_ref() else {
            return Ok(None);
        };

        let reservas = self.api.reservas().listar_por_usuario(intencion.usuario_id).await?;
        Ok(reservas.into_iter().find(|r| {
            r.recurso_id == intencion.recurso_id
                && r.estado == EstadoReserva::Confirmada
                && solo_fecha(&r.fecha) == slot.fecha_dia()
                && r.hora == slot.hora_inicio
        }))
    }

    async fn reanudar_cancelacion(&self, intencion: &mut IntencionReserva) -> AppResult<()> {
        if intencion.paso == Paso::Iniciada {
            let Some(reserva) = intencion.reserva.clone() else {
                intencion.fallar(Paso::Fallida, "sin reserva registrada");
                return self.guardar(intencion).await;
            };

            if let Err(error) = self.quitar_reserva(&reserva, intencion.operacion).await {
                if error.kind() != ErrorKind::NotFound {
                    return Err(self.dejar_pendiente(intencion, error).await?.into());
                }
            }
            intencion.avanzar(Paso::ReservaCancelada);
            self.guardar(intencion).await?;
        }

        self.completar_cancelacion(intencion).await
    }

    async fn quitar_reserva(&self, reserva: &Reserva, operacion: Operacion) -> ServiceResult<()> {
        match operacion {
            Operacion::Eliminar => self.api.reservas().eliminar(reserva.id).await,
            _ => {
                let cambios = ReservaCambios {
                    estado: Some(EstadoReserva::Cancelada),
                    ..Default::default()
                };
                self.api.reservas().actualizar(reserva.id, &cambios).await.map(|_| ())
            }
        }
    }

    /// Pasos 2 y 3 de la cancelación a partir del paso registrado
    async fn completar_cancelacion(&self, intencion: &mut IntencionReserva) -> AppResult<()> {
        if intencion.paso == Paso::ReservaCancelada {
            if let Err(error) = self.liberar_franja(intencion).await {
                return Err(self.dejar_pendiente(intencion, error).await?.into());
            }
            intencion.avanzar(Paso::DisponibilidadLiberada);
            self.guardar(intencion).await?;
        }

        if intencion.paso == Paso::DisponibilidadLiberada {
            match self.api.recursos().obtener(intencion.recurso_id).await {
                Ok(recurso) => {
                    let libre = recurso.con_estado(EstadoRecurso::Disponible);
                    if let Err(error) = self.api.recursos().actualizar(recurso.id, &libre).await {
                        return Err(self.dejar_pendiente(intencion, error).await?.into());
                    }
                    intencion.recurso = Some(recurso);
                }
                Err(error) => return Err(self.dejar_pendiente(intencion, error).await?.into()),
            }
            intencion.avanzar(Paso::Completada);
            self.guardar(intencion).await?;
            tracing::info!(intencion = %intencion.id, "Cancelación completada");
        }

        Ok(())
    }

    async fn liberar_franja(&self, intencion: &mut IntencionReserva) -> ServiceResult<()> {
        let Some(reserva) = intencion.reserva.as_ref() else {
            return Ok(());
        };

        let disponibilidad = self.api.disponibilidad().listar().await?;
        let Some(slot) = franja_de_reserva(&disponibilidad, reserva) else {
            tracing::warn!(
                intencion = %intencion.id,
                recurso_id = reserva.recurso_id,
                "Sin franja que liberar para el recurso"
            );
            return Ok(());
        };

        let cambios = DisponibilidadCambios {
            disponible: Some(true),
            ..Default::default()
        };
        self.api.disponibilidad().actualizar(slot.id, &cambios).await?;
        intencion.disponibilidad = Some(slot.clone());
        Ok(())
    }

    /// Deshace la reserva tras un fallo en el paso 2 o 3
    async fn deshacer(
        &self,
        intencion: &mut IntencionReserva,
        restaurar_recurso: bool,
        error: ServiceError,
    ) -> AppResult<FlujoError> {
        tracing::warn!(
            intencion = %intencion.id,
            paso = intencion.paso.as_str(),
            error = %error,
            "Fallo en la reserva, compensando"
        );

        match self.compensar(intencion, restaurar_recurso).await {
            Ok(()) => {
                intencion.fallar(Paso::Compensada, &error);
                self.guardar(intencion).await?;
                Ok(flujo_error(intencion, true, error))
            }
            Err(fallo) => {
                tracing::error!(intencion = %intencion.id, error = %fallo, "La compensación falló");
                intencion.fallar(Paso::CompensacionPendiente, &fallo);
                self.guardar(intencion).await?;
                Ok(flujo_error(intencion, false, error))
            }
        }
    }

    /// Libera la franja si pudo quedar ocupada, restaura el recurso (si se
    /// pide) a su estado anterior y borra la reserva
    ///
    /// Todos los pasos se pueden repetir; una reserva que ya no existe cuenta
    /// como borrada.
    async fn compensar(&self, intencion: &IntencionReserva, restaurar_recurso: bool) -> ServiceResult<()> {
        if intencion.franja_ocupada {
            if let Some(slot) = &intencion.disponibilidad {
                let cambios = DisponibilidadCambios {
                    disponible: Some(true),
                    ..Default::default()
                };
                self.api.disponibilidad().actualizar(slot.id, &cambios).await?;
            }
        }

        if restaurar_recurso {
            if let Some(recurso) = &intencion.recurso {
                self.api
                    .recursos()
                    .actualizar(recurso.id, &recurso.con_estado(recurso.estado))
                    .await?;
            }
        }

        if let Some(reserva) = &intencion.reserva {
            match self.api.reservas().eliminar(reserva.id).await {
                Err(error) if error.kind() != ErrorKind::NotFound => return Err(error),
                _ => {}
            }
        }

        Ok(())
    }

    /// Deshace en remoto una reserva cuyo último paso no se pudo anotar
    ///
    /// Si la intención la ha tomado otro proceso no se toca: es suya.
    async fn abandonar(&self, intencion: &IntencionReserva, restaurar_recurso: bool, error: AppError) -> AppError {
        if matches!(error, AppError::Conflict(_)) {
            return error;
        }

        tracing::error!(
            intencion = %intencion.id,
            paso = intencion.paso.as_str(),
            error = %error,
            "No se pudo anotar el paso, deshaciendo la reserva"
        );
        if let Err(fallo) = self.compensar(intencion, restaurar_recurso).await {
            tracing::error!(intencion = %intencion.id, error = %fallo, "La compensación falló");
        }
        error
    }

    async fn dejar_pendiente(&self, intencion: &mut IntencionReserva, error: ServiceError) -> AppResult<FlujoError> {
        tracing::warn!(
            intencion = %intencion.id,
            paso = intencion.paso.as_str(),
            error = %error,
            "Operación incompleta, queda pendiente"
        );
        let paso = intencion.paso;
        intencion.fallar(paso, &error);
        self.guardar(intencion).await?;
        Ok(flujo_error(intencion, false, error))
    }

    /// Anota el estado de la intención si nadie la ha cambiado desde que se
    /// leyó
    async fn guardar(&self, intencion: &mut IntencionReserva) -> AppResult<()> {
        let leida = intencion.version;
        intencion.version += 1;
        if self.intenciones.actualizar(intencion, leida).await? {
            return Ok(());
        }

        tracing::warn!(
            intencion = %intencion.id,
            paso = intencion.paso.as_str(),
            "La intención la actualizó otro proceso"
        );
        Err(AppError::Conflict(format!(
            "La intención {} la está procesando otro proceso",
            intencion.id
        )))
    }
}

fn flujo_error(intencion: &IntencionReserva, compensada: bool, source: ServiceError) -> FlujoError {
    FlujoError {
        intencion: intencion.id.clone(),
        operacion: intencion.operacion,
        paso: intencion.paso,
        compensada,
        source,
    }
}
