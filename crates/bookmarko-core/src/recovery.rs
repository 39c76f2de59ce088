//! Write-or-recover strategy for uniqueness races.
//!
//! Two writers can both observe "row X is missing" and both try to insert
//! X. The loser of that race gets a uniqueness violation; instead of failing
//! it re-reads the rows the winner created and carries on with those.
//!
//! The recovery is attempted once. If the re-read also fails, that error is
//! returned unchanged.

use std::future::Future;

use tracing::warn;

use crate::error::Result;

/// How a [`write_or_recover`] call produced its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome<T> {
    /// The write succeeded.
    Written(T),
    /// The write hit a uniqueness violation and the value was re-read.
    Recovered(T),
}

impl<T> WriteOutcome<T> {
    /// Unwrap the produced value regardless of how it was obtained.
    pub fn into_inner(self) -> T {
        match self {
            WriteOutcome::Written(v) | WriteOutcome::Recovered(v) => v,
        }
    }

    /// True when the value came from the recovery read.
    pub fn was_recovered(&self) -> bool {
        matches!(self, WriteOutcome::Recovered(_))
    }
}

/// Attempt `write`; on a conflict-class error run `recover` once.
///
/// Errors that are not uniqueness violations are returned without calling
/// `recover`.
pub async fn write_or_recover<T, W, WFut, R, RFut>(write: W, recover: R) -> Result<WriteOutcome<T>>
where
    W: FnOnce() -> WFut,
    WFut: Future<Output = Result<T>>,
    R: FnOnce() -> RFut,
    RFut: Future<Output = Result<T>>,
{
    match write().await {
        Ok(value) => Ok(WriteOutcome::Written(value)),
        Err(e) if e.is_unique_violation() => {
            warn!(
                subsystem = "tags",
                component = "recovery",
                error = %e,
                "Write conflicted with a concurrent writer, re-reading"
            );
            recover().await.map(WriteOutcome::Recovered)
        }
        Err(e) => Err(e),
    }
}
