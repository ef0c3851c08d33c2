// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::shared::error::{DeployerError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Cancellation token for a single lifecycle call.
///
/// Every subprocess-invoking step receives the deadline explicitly and runs
/// inside [`Deadline::bound`]. When the deadline passes, the step's future is
/// dropped; children are spawned with `kill_on_drop`, so this kills them.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Option<Instant>,
    budget: Duration,
}

impl Deadline {
    /// A budget too large to represent as an instant never expires.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(budget),
            budget,
        }
    }

    pub async fn bound<F, T>(&self, step: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.at {
            None => step.await,
            Some(at) => match tokio::time::timeout_at(at, step).await {
                Ok(result) => result,
                Err(_) => Err(DeployerError::DeadlineExceeded(self.budget)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bound_expires() {
        let deadline = Deadline::after(Duration::from_millis(1));
        let result = deadline
            .bound(async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(DeployerError::DeadlineExceeded(_))));
    }

    #[tokio::test]
    async fn test_unrepresentable_budget_never_expires() {
        let deadline = Deadline::after(Duration::from_secs(u64::MAX));
        let value = deadline
            .bound(async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(7)
            })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_inner_error_wins_before_expiry() {
        let deadline = Deadline::after(Duration::from_secs(60));
        let result: Result<()> = deadline
            .bound(async { Err(DeployerError::config_error("bad")) })
            .await;
        assert!(matches!(result, Err(DeployerError::Config(_))));
    }
}
