// src/db/memory.rs
//
// Implementações em memória das portas, usadas apenas nos testes.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, period::DateWindow},
    db::{EmployeeDirectory, LedgerReader, LedgerWriter, StatsStore},
    models::{
        employee::{Employee, EmployeeRole},
        ledger::{PackageSale, Receipt},
        stats::EmployeeStatsRecord,
    },
};

#[derive(Default)]
pub struct MemoryEmployees {
    employees: Mutex<Vec<Employee>>,
}

impl MemoryEmployees {
    pub fn add(&self, percentage: Decimal) -> Uuid {
        self.add_with_role(percentage, EmployeeRole::Employee)
    }

    pub fn add_with_role(&self, percentage: Decimal, role: EmployeeRole) -> Uuid {
        let id = Uuid::new_v4();
        self.employees.lock().unwrap().push(Employee {
            id,
            name: format!("emp-{}", id.simple()),
            commission_percentage: percentage,
            role,
            created_at: None,
        });
        id
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryEmployees {
    async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
        Ok(self
            .employees
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn list_employee_ids(&self) -> Result<Vec<Uuid>, AppError> {
        Ok(self.employees.lock().unwrap().iter().map(|e| e.id).collect())
    }
}

#[derive(Default)]
pub struct MemoryLedger {
    sales: Mutex<Vec<PackageSale>>,
    receipts: Mutex<Vec<Receipt>>,
}

impl MemoryLedger {
    pub fn sale(&self, employee_id: Uuid, client: &str, amount: Decimal, date: NaiveDate) {
        self.sales.lock().unwrap().push(PackageSale {
            id: Uuid::new_v4(),
            employee_id,
            package_ref: None,
            client_name: client.to_string(),
            amount,
            sale_date: date,
            created_at: None,
        });
    }

    pub fn receipt(&self, employee_id: Uuid, client: &str, amount: Decimal, date: NaiveDate) {
        self.receipts.lock().unwrap().push(Receipt {
            id: Uuid::new_v4(),
            employee_id,
            client_name: client.to_string(),
            amount,
            receipt_date: date,
            created_at: None,
        });
    }
}

#[async_trait]
impl LedgerReader for MemoryLedger {
    async fn list_sales(
        &self,
        employee_id: Uuid,
        window: DateWindow,
    ) -> Result<Vec<PackageSale>, AppError> {
        Ok(self
            .sales
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.employee_id == employee_id && window.contains(s.sale_date))
            .cloned()
            .collect())
    }

    async fn list_receipts(
        &self,
        employee_id: Uuid,
        window: DateWindow,
    ) -> Result<Vec<Receipt>, AppError> {
        Ok(self
            .receipts
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.employee_id == employee_id && window.contains(r.receipt_date))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LedgerWriter for MemoryLedger {
    async fn insert_sale(
        &self,
        employee_id: Uuid,
        package_ref: Option<&str>,
        client_name: &str,
        amount: Decimal,
        sale_date: NaiveDate,
    ) -> Result<PackageSale, AppError> {
        let sale = PackageSale {
            id: Uuid::new_v4(),
            employee_id,
            package_ref: package_ref.map(str::to_string),
            client_name: client_name.to_string(),
            amount,
            sale_date,
            created_at: Some(Utc::now()),
        };
        self.sales.lock().unwrap().push(sale.clone());
        Ok(sale)
    }

    async fn insert_receipt(
        &self,
        employee_id: Uuid,
        client_name: &str,
        amount: Decimal,
        receipt_date: NaiveDate,
    ) -> Result<Receipt, AppError> {
        let receipt = Receipt {
            id: Uuid::new_v4(),
            employee_id,
            client_name: client_name.to_string(),
            amount,
            receipt_date,
            created_at: Some(Utc::now()),
        };
        self.receipts.lock().unwrap().push(receipt.clone());
        Ok(receipt)
    }
}

/// Store em memória. `failing` faz o save falhar para os ids escolhidos
/// e `fail_once` só no próximo save;
/// `yield_between` cede o executor entre leitura e escrita para expor corridas.
#[derive(Default)]
pub struct MemoryStatsStore {
    records: Mutex<HashMap<Uuid, EmployeeStatsRecord>>,
    failing: Mutex<HashSet<Uuid>>,
    fail_once: Mutex<HashSet<Uuid>>,
    pub yield_between: bool,
}

impl MemoryStatsStore {
    pub fn racy() -> Self {
        Self {
            yield_between: true,
            ..Default::default()
        }
    }

    pub fn fail_saves_for(&self, employee_id: Uuid) {
        self.failing.lock().unwrap().insert(employee_id);
    }

    pub fn fail_next_save_for(&self, employee_id: Uuid) {
        self.fail_once.lock().unwrap().insert(employee_id);
    }

    pub fn heal(&self, employee_id: Uuid) {
        self.failing.lock().unwrap().remove(&employee_id);
    }

    pub fn put(&self, record: EmployeeStatsRecord) {
        self.records.lock().unwrap().insert(record.employee_id, record);
    }

    pub fn get(&self, employee_id: Uuid) -> Option<EmployeeStatsRecord> {
        self.records.lock().unwrap().get(&employee_id).cloned()
    }
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn find(&self, employee_id: Uuid) -> Result<Option<EmployeeStatsRecord>, AppError> {
        let found = self.get(employee_id);
        if self.yield_between {
            tokio::task::yield_now().await;
        }
        Ok(found)
    }

    async fn insert_if_absent(
        &self,
        employee_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(EmployeeStatsRecord, bool), AppError> {
        let mut records = self.records.lock().unwrap();
        match records.get(&employee_id) {
            Some(existing) => Ok((existing.clone(), false)),
            None => {
                let record = EmployeeStatsRecord::empty(employee_id, now);
                records.insert(employee_id, record.clone());
                Ok((record, true))
            }
        }
    }

    async fn save(&self, record: &EmployeeStatsRecord) -> Result<(), AppError> {
        if self.yield_between {
            tokio::task::yield_now().await;
        }
        let once = self.fail_once.lock().unwrap().remove(&record.employee_id);
        if once || self.failing.lock().unwrap().contains(&record.employee_id) {
            return Err(AppError::Persistence(sqlx::Error::PoolTimedOut));
        }
        self.records
            .lock()
            .unwrap()
            .insert(record.employee_id, record.clone());
        Ok(())
    }
}
