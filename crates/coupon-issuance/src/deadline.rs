//! Deadlines for coordination store round-trips.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use coupon_core::error::AppError;
use coupon_core::result::AppResult;

/// How long a store round-trip may take before it is abandoned.
#[derive(Debug, Clone, Copy)]
pub enum Deadline {
    /// Each round-trip gets the full budget.
    PerOperation(Duration),
    /// Every round-trip must finish before this instant.
    Until(Instant),
}

impl Deadline {
    /// A single deadline `budget` from now, shared by all following round-trips.
    pub fn after(budget: Duration) -> Self {
        Self::Until(Instant::now() + budget)
    }

    /// Run `operation` against this deadline.
    ///
    /// An elapsed deadline drops the in-flight future and reports a
    /// coordination error.
    pub(crate) async fn run<T, F>(self, operation: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let (until, budget) = match self {
            Self::PerOperation(budget) => (Instant::now() + budget, budget),
            Self::Until(until) => (until, until.saturating_duration_since(Instant::now())),
        };

        match tokio::time::timeout_at(until, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    budget_ms = budget.as_millis() as u64,
                    "Coordination store round-trip timed out"
                );
                Err(AppError::coordination_timeout(operation, budget))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coupon_core::error::ErrorKind;

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_deadline_is_coordination_error() {
        let deadline = Deadline::PerOperation(Duration::from_millis(50));
        let err = deadline
            .run("slow", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, AppError>(())
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Coordination);
    }

    #[tokio::test]
    async fn test_fast_operation_passes_through() {
        let deadline = Deadline::after(Duration::from_secs(1));
        let value = deadline.run("fast", async { Ok::<_, AppError>(7) }).await;
        assert_eq!(value.unwrap(), 7);
    }
}
