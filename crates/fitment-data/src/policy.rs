//! Per-level fetch policies and the provider wrapper that enforces them.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use fitment_core::selector::OptionsProvider;
use fitment_core::vehicle::{Level, VehicleOption};
use fitment_core::{FetchError, OptionId};

use crate::retry::RetryPolicy;
use crate::timeout::TimeoutConfig;

/// Default fetch settings for a cascade level.
pub trait LevelDefaults {
    fn default_timeout(&self) -> Duration;
    fn default_max_retries(&self) -> u32;
}

impl LevelDefaults for Level {
    fn default_timeout(&self) -> Duration {
        match self {
            Level::Brand => Duration::from_millis(2000), // Largest list
            Level::Model => Duration::from_millis(1000),
            Level::Year | Level::Engine => Duration::from_millis(800),
        }
    }

    fn default_max_retries(&self) -> u32 {
        match self {
            Level::Brand => 2, // Nothing works without brands
            _ => 1,
        }
    }
}

/// Timeout plus retry settings for one level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchPolicy {
    pub timeout: TimeoutConfig,
    pub retry: RetryPolicy,
}

impl FetchPolicy {
    pub fn new(timeout: TimeoutConfig, retry: RetryPolicy) -> Self {
        Self { timeout, retry }
    }

    /// Create from a level's defaults.
    pub fn for_level(level: Level) -> Self {
        Self {
            timeout: TimeoutConfig::from_total(level.default_timeout()),
            retry: RetryPolicy::new(level.default_max_retries()),
        }
    }
}

/// One policy per level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelPolicies {
    policies: [FetchPolicy; Level::COUNT],
}

impl LevelPolicies {
    /// The same policy at every level.
    pub fn uniform(policy: FetchPolicy) -> Self {
        Self {
            policies: std::array::from_fn(|_| policy.clone()),
        }
    }

    pub fn with(mut self, level: Level, policy: FetchPolicy) -> Self {
        self.policies[level.index()] = policy;
        self
    }

    pub fn get(&self, level: Level) -> &FetchPolicy {
        &self.policies[level.index()]
    }
}

impl Default for LevelPolicies {
    fn default() -> Self {
        Self {
            policies: Level::ALL.map(FetchPolicy::for_level),
        }
    }
}

/// Wraps a provider with per-level timeouts and retries.
///
/// A timed-out attempt is reported as [`FetchError::Timeout`]. Errors not
/// covered by the level's retry conditions are returned immediately.
#[derive(Debug)]
pub struct PolicyProvider<P> {
    inner: P,
    policies: LevelPolicies,
}

impl<P: OptionsProvider> PolicyProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            policies: LevelPolicies::default(),
        }
    }

    pub fn with_policies(mut self, policies: LevelPolicies) -> Self {
        self.policies = policies;
        self
    }

    pub fn policies(&self) -> &LevelPolicies {
        &self.policies
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: OptionsProvider> OptionsProvider for PolicyProvider<P> {
    async fn fetch_options(
        &self,
        level: Level,
        parent: Option<&OptionId>,
    ) -> Result<Vec<VehicleOption>, FetchError> {
        let policy = self.policies.get(level);
        let started = Instant::now();
        let mut attempt = 0;

        loop {
            let budget = policy.timeout.next_attempt_budget(started.elapsed());
            if budget.is_zero() {
                return Err(FetchError::Timeout(format!(
                    "{} options: gave up after {:?}",
                    level, policy.timeout.total
                )));
            }

            let result = match tokio::time::timeout(budget, self.inner.fetch_options(level, parent)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(format!(
                    "{} options: no answer within {:?}",
                    level, budget
                ))),
            };

            match result {
                Ok(options) => return Ok(options),
                Err(e) if policy.retry.should_retry(&e, attempt) => {
                    let delay = policy.retry.backoff.delay_for_attempt(attempt);
                    tracing::debug!(%level, attempt, error = %e, ?delay, "retrying options fetch");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::BackoffStrategy;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails with `error` for the first `failures` calls, then succeeds.
    struct Flaky {
        failures: u32,
        error: FetchError,
        delay: Duration,
        calls: AtomicU32,
    }

    impl Flaky {
        fn new(failures: u32, error: FetchError) -> Self {
            Self {
                failures,
                error,
                delay: Duration::ZERO,
                calls: AtomicU32::new(0),
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::new(0, FetchError::Transport("unused".into()))
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OptionsProvider for Flaky {
        async fn fetch_options(
            &self,
            _level: Level,
            _parent: Option<&OptionId>,
        ) -> Result<Vec<VehicleOption>, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if call < self.failures {
                Err(self.error.clone())
            } else {
                Ok(vec![VehicleOption::root("bmw", "BMW")])
            }
        }
    }

    fn quick(max_retries: u32, attempt_ms: u64, total_ms: u64) -> LevelPolicies {
        LevelPolicies::uniform(FetchPolicy::new(
            TimeoutConfig::new(Duration::from_millis(attempt_ms), Duration::from_millis(total_ms)),
            RetryPolicy::new(max_retries).with_backoff(BackoffStrategy::Fixed(Duration::from_millis(1))),
        ))
    }

    #[test]
    fn test_level_defaults() {
        let policies = LevelPolicies::default();
        assert_eq!(policies.get(Level::Brand).retry.max_attempts, 2);
        assert_eq!(policies.get(Level::Engine).retry.max_attempts, 1);
        assert_eq!(policies.get(Level::Model).timeout.total, Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_retries_transient_failure() {
        let provider = PolicyProvider::new(Flaky::new(2, FetchError::Transport("reset".into())))
            .with_policies(quick(2, 200, 2000));
        let options = provider.fetch_options(Level::Brand, None).await.unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(provider.inner().calls(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let provider = PolicyProvider::new(Flaky::new(5, FetchError::Transport("reset".into())))
            .with_policies(quick(1, 200, 2000));
        let err = provider.fetch_options(Level::Brand, None).await.unwrap_err();
        assert_eq!(err, FetchError::Transport("reset".into()));
        assert_eq!(provider.inner().calls(), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let provider = PolicyProvider::new(Flaky::new(1, FetchError::NotFound("tesla".into())))
            .with_policies(quick(3, 200, 2000));
        let err = provider
            .fetch_options(Level::Model, Some(&"tesla".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));
        assert_eq!(provider.inner().calls(), 1);
    }

    #[tokio::test]
    async fn test_slow_attempt_times_out() {
        let provider = PolicyProvider::new(Flaky::slow(Duration::from_millis(500)))
            .with_policies(quick(0, 20, 1000));
        let err = provider.fetch_options(Level::Brand, None).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)));
    }
}
