use crate::domain::{LoanStatus, UserId, loan::LoanRecord, value_objects::LoanId};
use crate::ports::loan_repository::{LoanRepository as LoanRepositoryTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// インメモリLoanRepository実装
///
/// 一覧は貸出日時の降順で返す。
pub struct LoanRepository {
    loans: Mutex<HashMap<LoanId, LoanRecord>>,
}

impl LoanRepository {
    pub fn new() -> Self {
        Self {
            loans: Mutex::new(HashMap::new()),
        }
    }

    fn select(&self, predicate: impl Fn(&LoanRecord) -> bool) -> Vec<LoanRecord> {
        let loans = self.loans.lock().unwrap_or_else(|e| e.into_inner());
        let mut selected: Vec<LoanRecord> =
            loans.values().filter(|l| predicate(l)).cloned().collect();
        selected.sort_by(|a, b| b.loaned_at.cmp(&a.loaned_at));
        selected
    }
}

impl Default for LoanRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn load(&self, loan_id: LoanId) -> Result<Option<LoanRecord>> {
        let loans = self.loans.lock().unwrap_or_else(|e| e.into_inner());
        Ok(loans.get(&loan_id).cloned())
    }

    async fn save(&self, loan: &LoanRecord) -> Result<()> {
        let mut loans = self.loans.lock().unwrap_or_else(|e| e.into_inner());
        loans.insert(loan.loan_id, loan.clone());
        Ok(())
    }

    async fn list_by_borrower(&self, borrower_id: UserId) -> Result<Vec<LoanRecord>> {
        Ok(self.select(|l| l.borrower_id == borrower_id))
    }

    async fn list_all(&self) -> Result<Vec<LoanRecord>> {
        Ok(self.select(|_| true))
    }

    async fn list_by_status(&self, status: LoanStatus) -> Result<Vec<LoanRecord>> {
        Ok(self.select(|l| l.status == status))
    }
}
