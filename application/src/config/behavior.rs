//! Per-call behavior: deadlines for external collaborators.

use std::future::Future;
use std::time::Duration;

/// Application behavior configuration.
///
/// Controls runtime behavior of use cases like the deadline applied to each
/// LLM, search and store call. A call that misses its deadline is treated
/// exactly like a failed call.
#[derive(Debug, Clone, Default)]
pub struct BehaviorConfig {
    /// Maximum time to wait for an external call before timing out.
    pub timeout: Option<Duration>,
}

impl BehaviorConfig {
    /// Creates a BehaviorConfig from an optional timeout in seconds.
    ///
    /// If `seconds` is `None`, no timeout is applied.
    pub fn from_timeout_seconds(seconds: Option<u64>) -> Self {
        Self {
            timeout: seconds.map(Duration::from_secs),
        }
    }

    /// Await `future` under the configured deadline; `None` means it timed out.
    pub async fn within_deadline<F: Future>(&self, future: F) -> Option<F::Output> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, future).await.ok(),
            None => Some(future.await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_timeout_seconds() {
        assert_eq!(
            BehaviorConfig::from_timeout_seconds(Some(30)).timeout,
            Some(Duration::from_secs(30))
        );
        assert_eq!(BehaviorConfig::from_timeout_seconds(None).timeout, None);
    }

    #[tokio::test]
    async fn test_within_deadline_without_timeout() {
        let behavior = BehaviorConfig::default();
        assert_eq!(behavior.within_deadline(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn test_within_deadline_times_out() {
        let behavior = BehaviorConfig {
            timeout: Some(Duration::from_millis(10)),
        };
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            1
        };
        assert_eq!(behavior.within_deadline(slow).await, None);
    }
}
