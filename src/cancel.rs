// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-cycle cancellation and deadline token.
//!
//! Every Kubernetes API call made during a reconciliation cycle goes through
//! [`CycleToken::run`], which races the call against process shutdown and the
//! cycle deadline. An interrupted call returns [`Error::Cancelled`] or
//! [`Error::DeadlineExceeded`] instead of completing silently.

use crate::errors::Error;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation token and optional deadline of one reconciliation cycle.
#[derive(Clone, Debug, Default)]
pub struct CycleToken {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CycleToken {
    /// A token that is only cancelled through [`CycleToken::cancel`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A cycle token bound to `parent` that also expires after `timeout`.
    ///
    /// Cancelling `parent` cancels this token; cancelling this token leaves
    /// `parent` untouched.
    #[must_use]
    pub fn child_with_timeout(parent: &CancellationToken, timeout: Duration) -> Self {
        Self {
            token: parent.child_token(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Cancels every call made through this token.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the token was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The cycle deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Runs `fut` unless the token is cancelled or the deadline passes first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] or [`Error::DeadlineExceeded`] when interrupted,
    /// otherwise whatever `fut` returns.
    pub async fn run<T, F>(&self, operation: &str, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled {
                operation: operation.to_string(),
            });
        }

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(Error::Cancelled {
                operation: operation.to_string(),
            }),
            () = deadline => Err(Error::DeadlineExceeded {
                operation: operation.to_string(),
            }),
            result = fut => result,
        }
    }
}

#[cfg(test)]
#[path = "cancel_tests.rs"]
mod cancel_tests;
