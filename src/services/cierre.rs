//! Till closing ("cierre de caja")
//!
//! Once a day every till session still open is closed automatically: its
//! sales are totalled into a `cierres_caja` record and the session is marked
//! closed.

use async_trait::async_trait;
use chrono::{DateTime, Days, FixedOffset, NaiveTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::time::Duration;

use super::scheduler::PeriodicTask;
use crate::config::scheduler::SchedulerConfig;
use crate::db::DbConn;
use crate::models::prelude::*;
use crate::models::{caja, cierre_caja, venta};

/// A fixed local wall-clock time, repeated every day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
    offset: FixedOffset,
}

impl DailySchedule {
    pub fn new(at: NaiveTime, offset: FixedOffset) -> Self {
        Self { at, offset }
    }

    /// Parse `HH:MM` plus an offset from UTC in minutes
    pub fn parse(hora: &str, utc_offset_minutes: i32) -> Result<Self, String> {
        let at = NaiveTime::parse_from_str(hora.trim(), "%H:%M")
            .map_err(|e| format!("Invalid closing time '{}': {}", hora, e))?;
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
            .ok_or_else(|| format!("Invalid UTC offset: {} minutes", utc_offset_minutes))?;
        Ok(Self { at, offset })
    }

    /// The first occurrence strictly after `now`
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_now = now.with_timezone(&self.offset);
        let today = local_now.date_naive().and_time(self.at);

        let candidate = if today > local_now.naive_local() {
            today
        } else {
            today + Days::new(1)
        };

        // A fixed offset has no gaps, so every local time maps to one instant
        candidate
            .and_local_timezone(self.offset)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(now + chrono::Duration::days(1))
    }
}

/// Counts from one closing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CierreSummary {
    pub cerradas: usize,
    /// Closed by someone else between the scan and our transaction
    pub omitidas: usize,
    pub fallidas: usize,
}

/// Close every till opened before `cutoff` that is still open.
///
/// Each till is closed in its own transaction; one failing till is logged
/// and does not stop the others.
pub async fn cerrar_cajas_abiertas(
    db: &DbConn,
    cutoff: DateTime<Utc>,
) -> Result<CierreSummary, sea_orm::DbErr> {
    let abiertas = Caja::find()
        .filter(caja::Column::Estado.eq(caja::ESTADO_ABIERTA))
        .filter(caja::Column::AbiertaAt.lt(cutoff))
        .order_by_asc(caja::Column::Id)
        .all(db)
        .await?;

    let mut summary = CierreSummary::default();

    for caja in abiertas {
        let caja_id = caja.id;
        match cerrar_caja(db, caja, cutoff).await {
            Ok(Some(cierre)) => {
                tracing::info!(
                    caja_id,
                    total_ventas = cierre.total_ventas,
                    cantidad_ventas = cierre.cantidad_ventas,
                    "Caja closed automatically"
                );
                summary.cerradas += 1;
            }
            Ok(None) => {
                tracing::info!(caja_id, "Caja already closed, skipping");
                summary.omitidas += 1;
            }
            Err(e) => {
                tracing::error!(caja_id, error = %e, "Failed to close caja");
                summary.fallidas += 1;
            }
        }
    }

    Ok(summary)
}

/// Close one till and record its cierre.
///
/// The state change is conditional on the till still being open, so a till
/// closed concurrently (another replica, a cashier) is left alone and
/// `None` is returned.
pub async fn cerrar_caja(
    db: &DbConn,
    caja: caja::Model,
    closed_at: DateTime<Utc>,
) -> Result<Option<cierre_caja::Model>, sea_orm::DbErr> {
    let txn = db.begin().await?;

    let claimed = Caja::update_many()
        .col_expr(caja::Column::Estado, Expr::value(caja::ESTADO_CERRADA))
        .col_expr(caja::Column::CerradaAt, Expr::value(Some(closed_at)))
        .filter(caja::Column::Id.eq(caja.id))
        .filter(caja::Column::Estado.eq(caja::ESTADO_ABIERTA))
        .exec(&txn)
        .await?
        .rows_affected;
    if claimed == 0 {
        txn.rollback().await?;
        return Ok(None);
    }

    let ventas = Venta::find()
        .filter(venta::Column::CajaId.eq(caja.id))
        .all(&txn)
        .await?;
    let total_ventas: i64 = ventas.iter().map(|v| v.total).sum();

    let cierre = cierre_caja::ActiveModel {
        caja_id: Set(caja.id),
        total_ventas: Set(total_ventas),
        cantidad_ventas: Set(ventas.len() as i32),
        monto_final: Set(caja.monto_inicial + total_ventas),
        automatico: Set(true),
        created_at: Set(closed_at),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(Some(cierre))
}

/// Closes open tills once a day
pub struct CierreCajaTask {
    schedule: DailySchedule,
}

impl CierreCajaTask {
    pub fn new(schedule: DailySchedule) -> Self {
        Self { schedule }
    }

    pub fn from_config(config: &SchedulerConfig) -> Result<Self, String> {
        DailySchedule::parse(&config.cierre_hora, config.utc_offset_minutes).map(Self::new)
    }
}

#[async_trait]
impl PeriodicTask for CierreCajaTask {
    fn name(&self) -> &'static str {
        "cierre_caja"
    }

    fn next_run_in(&self, now: DateTime<Utc>) -> Duration {
        (self.schedule.next_after(now) - now)
            .to_std()
            .unwrap_or(Duration::from_secs(60))
    }

    async fn run(&self, db: &DbConn) -> anyhow::Result<()> {
        let summary = cerrar_cajas_abiertas(db, Utc::now()).await?;

        if summary.fallidas > 0 {
            anyhow::bail!(
                "{} of {} cajas could not be closed",
                summary.fallidas,
                summary.cerradas + summary.fallidas
            );
        }
        if summary.cerradas > 0 {
            tracing::info!(cerradas = summary.cerradas, "Daily cierre de caja completed");
        }
        Ok(())
    }
}
