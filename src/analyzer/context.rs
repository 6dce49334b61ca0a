use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::{AnalyzerError, AnalyzerResult};

/// Session state the rules consult.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub current_database: String,
    /// `sql_select_limit` session variable. Applies to top-level queries without a LIMIT.
    pub sql_select_limit: Option<u64>,
    pub autocommit: bool,
}

impl Session {
    pub fn new(current_database: impl Into<String>) -> Self {
        Self {
            current_database: current_database.into(),
            sql_select_limit: None,
            autocommit: true,
        }
    }

    pub fn with_sql_select_limit(mut self, limit: u64) -> Self {
        self.sql_select_limit = Some(limit);
        self
    }

    pub fn with_autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit = autocommit;
        self
    }
}

/// Carries the session along with cancellation and deadline of one analysis run.
#[derive(Debug, Clone)]
pub struct Context {
    session: Session,
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Cancels this context and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn check(&self) -> AnalyzerResult<()> {
        if self.is_cancelled() {
            return Err(AnalyzerError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(AnalyzerError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn test_context_cancel_is_shared_by_clones() {
        let ctx = Context::new(Session::new("mydb"));
        let clone = ctx.clone();
        assert!(ctx.check().is_ok());
        clone.cancel();
        assert_eq!(ctx.check(), Err(AnalyzerError::Cancelled));
    }

    #[test]
    fn test_context_deadline() {
        let past = Instant::now() - Duration::from_millis(1);
        let ctx = Context::new(Session::new("mydb")).with_deadline(past);
        assert_eq!(ctx.check(), Err(AnalyzerError::DeadlineExceeded));

        let future = Instant::now() + Duration::from_secs(3600);
        let ctx = Context::new(Session::new("mydb")).with_deadline(future);
        assert!(ctx.check().is_ok());
    }
}
