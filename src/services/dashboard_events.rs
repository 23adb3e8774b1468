// src/services/dashboard_events.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DashboardEventKind {
    SaleRecorded,
    ReceiptRecorded,
    StatsRolledOver,
    MonthlyReset,
}

/// "Os dados do dashboard mudaram". O front recarrega o que precisar.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardEvent {
    pub kind: DashboardEventKind,
    // None = afeta todos os funcionários
    pub employee_id: Option<Uuid>,
    pub at: DateTime<Utc>,
}

// Canal de push. Quem publica é a camada de API, nunca o motor.
#[derive(Debug, Clone)]
pub struct DashboardEvents {
    tx: broadcast::Sender<DashboardEvent>,
}

impl DashboardEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, kind: DashboardEventKind, employee_id: Option<Uuid>) {
        let event = DashboardEvent {
            kind,
            employee_id,
            at: Utc::now(),
        };
        // Sem assinantes não é erro
        if self.tx.send(event).is_err() {
            tracing::trace!("Evento de dashboard sem assinantes: {:?}", kind);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.tx.subscribe()
    }
}
