//! In-memory store used by the engine tests. Upholds the same contract as
//! the MySQL store: unique (employee_id, date) key on insert, CAS on
//! `updated_at` for updates.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::model::attendance::AttendanceRecord;
use crate::store::{
    AttendanceStore, CompanyRangeQuery, EmployeeRangeQuery, Page, StoreError, StoreResult,
};

#[derive(Default)]
pub struct MemoryAttendanceStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<(u64, NaiveDate), AttendanceRecord>,
    next_id: u64,
}

impl MemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, employee_id: u64, date: NaiveDate) -> Option<AttendanceRecord> {
        self.inner
            .lock()
            .unwrap()
            .records
            .get(&(employee_id, date))
            .cloned()
    }
}

#[async_trait]
impl AttendanceStore for MemoryAttendanceStore {
    async fn insert(&self, record: &mut AttendanceRecord) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let key = (record.employee_id, record.date);
        if inner.records.contains_key(&key) {
            return Err(StoreError::Duplicate);
        }
        inner.next_id += 1;
        record.id = inner.next_id;
        inner.records.insert(key, record.clone());
        Ok(())
    }

    async fn update(
        &self,
        record: &AttendanceRecord,
        expected_updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let key = (record.employee_id, record.date);
        match inner.records.get_mut(&key) {
            Some(stored) if stored.updated_at == expected_updated_at => {
                *stored = record.clone();
                Ok(())
            }
            _ => Err(StoreError::Conflict),
        }
    }

    async fn find_by_day(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        Ok(self.get(employee_id, date))
    }

    async fn list_for_employee(
        &self,
        employee_id: u64,
        query: &EmployeeRangeQuery,
    ) -> StoreResult<Page<AttendanceRecord>> {
        let inner = self.inner.lock().unwrap();
        let mut items: Vec<_> = inner
            .records
            .values()
            .filter(|r| r.employee_id == employee_id)
            .filter(|r| query.start_date.is_none_or(|s| r.date >= s))
            .filter(|r| query.end_date.is_none_or(|e| r.date <= e))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        let total = items.len() as i64;
        let items = items
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok(Page { items, total })
    }

    async fn list_for_company(
        &self,
        company_id: u64,
        query: &CompanyRangeQuery,
    ) -> StoreResult<Page<AttendanceRecord>> {
        let inner = self.inner.lock().unwrap();
        let mut items: Vec<_> = inner
            .records
            .values()
            .filter(|r| r.company_id == company_id)
            .filter(|r| query.start_date.is_none_or(|s| r.date >= s))
            .filter(|r| query.end_date.is_none_or(|e| r.date <= e))
            .filter(|r| query.employee_id.is_none_or(|id| r.employee_id == id))
            .filter(|r| query.status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        let total = items.len() as i64;
        let items = items
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok(Page { items, total })
    }

    async fn find_company_range(
        &self,
        company_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let inner = self.inner.lock().unwrap();
        let mut items: Vec<_> = inner
            .records
            .values()
            .filter(|r| r.company_id == company_id && r.date >= start && r.date <= end)
            .cloned()
            .collect();
        items.sort_by_key(|r| r.date);
        Ok(items)
    }
}
