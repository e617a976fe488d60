//! Failure-isolation circuit breaker around flaky external providers.
//!
//! # State Machine
//!
//! ```text
//! Closed --[threshold consecutive failures]--> Open
//! Open --[cooldown elapsed]--> HalfOpen (single probe allowed)
//! HalfOpen --[probe success]--> Closed
//! HalfOpen --[probe failure]--> Open (cooldown doubled, capped)
//! ```
//!
//! One breaker instance per provider, shared across all workers calling that
//! provider. Interior mutability via `Mutex` keeps state updates atomic.

use crate::shared::errors::{AppError, AppResult};
use crate::{log_info, log_warn};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Configuration for a provider circuit breaker.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive failures that trip a closed circuit.
    pub failure_threshold: u32,
    /// Initial open-state cooldown before a probe is admitted.
    pub cooldown: Duration,
    /// Cap on the cooldown as repeated probe failures double it.
    pub max_cooldown: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
            max_cooldown: Duration::from_secs(300),
        }
    }
}

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through, failures counted.
    Closed,
    /// Calls fail fast until the cooldown elapses.
    Open,
    /// One probe call in flight; its outcome decides the next state.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half-open"),
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    /// When the open cooldown ends and a probe may be admitted.
    open_until: Option<Instant>,
    /// Cooldown applied on the most recent trip (doubles on probe failure).
    current_cooldown: Duration,
    /// Whether the half-open probe slot is taken.
    probe_in_flight: bool,
}

impl BreakerInner {
    fn new(cooldown: Duration) -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            open_until: None,
            current_cooldown: cooldown,
            probe_in_flight: false,
        }
    }
}

/// Per-provider circuit breaker shared by all workers calling that provider.
pub struct CircuitBreaker {
    config: BreakerConfig,
    provider_name: String,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(provider_name: &str, config: BreakerConfig) -> Self {
        let cooldown = config.cooldown;
        Self {
            config,
            provider_name: provider_name.to_string(),
            inner: Mutex::new(BreakerInner::new(cooldown)),
        }
    }

    /// Ask permission to call the provider.
    ///
    /// Fails fast with `CircuitOpen` while open; in half-open, admits exactly
    /// one probe and rejects the rest until its outcome is recorded.
    pub fn try_acquire(&self) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();

        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let cooldown_over = inner
                    .open_until
                    .map(|until| Instant::now() >= until)
                    .unwrap_or(true);

                if cooldown_over {
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_in_flight = true;
                    log_info!(
                        "Circuit breaker for {} half-open, admitting probe",
                        self.provider_name
                    );
                    Ok(())
                } else {
                    Err(AppError::CircuitOpen(format!(
                        "{}: circuit open, cooling down",
                        self.provider_name
                    )))
                }
            }
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    Err(AppError::CircuitOpen(format!(
                        "{}: half-open, probe already in flight",
                        self.provider_name
                    )))
                } else {
                    inner.probe_in_flight = true;
                    Ok(())
                }
            }
        }
    }

    /// Record a successful provider call.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.consecutive_failures = 0;

        if inner.state != CircuitState::Closed {
            log_info!("Circuit breaker for {} closed", self.provider_name);
        }
        inner.state = CircuitState::Closed;
        inner.open_until = None;
        inner.current_cooldown = self.config.cooldown;
        inner.probe_in_flight = false;
    }

    /// Record a failed provider call (transport-level failures only).
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap();

        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.open_until = Some(Instant::now() + inner.current_cooldown);
                    log_warn!(
                        "Circuit breaker for {} OPEN after {} consecutive failures (cooldown {:?})",
                        self.provider_name,
                        inner.consecutive_failures,
                        inner.current_cooldown
                    );
                }
            }
            CircuitState::HalfOpen => {
                // Probe failed: back to open with the cooldown doubled
                inner.consecutive_failures += 1;
                inner.current_cooldown =
                    (inner.current_cooldown * 2).min(self.config.max_cooldown);
                inner.state = CircuitState::Open;
                inner.open_until = Some(Instant::now() + inner.current_cooldown);
                inner.probe_in_flight = false;
                log_warn!(
                    "Circuit breaker for {} probe failed, re-opening (cooldown {:?})",
                    self.provider_name,
                    inner.current_cooldown
                );
            }
            CircuitState::Open => {
                inner.consecutive_failures += 1;
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().unwrap().state
    }

    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }
}
