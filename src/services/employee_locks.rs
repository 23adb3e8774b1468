// src/services/employee_locks.rs

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Um mutex por funcionário.
///
/// Toda sequência "ler registro -> alterar -> gravar" de um funcionário passa por aqui,
/// então um incremento diário nunca se perde no meio de um rollover.
/// Funcionários diferentes não disputam o mesmo lock.
#[derive(Clone, Default)]
pub struct EmployeeLocks {
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl EmployeeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, employee_id: Uuid) -> OwnedMutexGuard<()> {
        // O clone do Arc sai do shard do DashMap antes do await
        let lock = self
            .locks
            .entry(employee_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        lock.lock_owned().await
    }
}
