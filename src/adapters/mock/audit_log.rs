use crate::domain::AuditEntry;
use crate::ports::audit_log::{AuditLog as AuditLogTrait, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Mock implementation of AuditLog
///
/// Collects entries in memory. Can be switched to fail every write so
/// callers' best-effort handling can be exercised.
pub struct AuditLog {
    entries: Mutex<Vec<AuditEntry>>,
    failing: AtomicBool,
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write fail
    pub fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditLogTrait for AuditLog {
    async fn record(&self, entry: AuditEntry) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("audit log unavailable".into());
        }
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
        Ok(())
    }
}
