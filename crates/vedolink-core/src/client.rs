//! The seam between the reconciliation engine and the alarm controller.
//!
//! [`RemoteStateClient`] is all the engine knows about the controller:
//! two reads that may suspend, may return nothing, and may fail. The HTTP
//! implementation lives in `vedolink-api`; an in-memory scripted client is
//! available for tests behind the `test-utils` feature.

use async_trait::async_trait;

use vedolink_api::{AreaState, TransportConfig, VedoClient, ZoneState};

use crate::config::PlatformConfig;
use crate::error::CoreError;

/// Async access to live controller state.
#[async_trait]
pub trait RemoteStateClient: Send + Sync {
    /// Current state of every configured area. `None` means nothing to report.
    async fn check_alarm(&self) -> Result<Option<Vec<AreaState>>, CoreError>;

    /// Current state of every configured zone. `None` means no zones.
    async fn fetch_zones(&self) -> Result<Option<Vec<ZoneState>>, CoreError>;

    /// Release the controller session. Best effort.
    async fn close(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

#[async_trait]
impl RemoteStateClient for VedoClient {
    async fn check_alarm(&self) -> Result<Option<Vec<AreaState>>, CoreError> {
        Ok(VedoClient::check_alarm(self).await?)
    }

    async fn fetch_zones(&self) -> Result<Option<Vec<ZoneState>>, CoreError> {
        Ok(VedoClient::fetch_zones(self).await?)
    }

    async fn close(&self) -> Result<(), CoreError> {
        if self.is_logged_in() {
            self.logout().await?;
        }
        Ok(())
    }
}

/// Build the HTTP client described by `config`.
pub fn build_vedo_client(config: &PlatformConfig) -> Result<VedoClient, CoreError> {
    let transport = TransportConfig::default()
        .with_timeout(config.advanced.request_timeout())
        .with_cookie_jar();
    Ok(VedoClient::new(
        config.base_url()?,
        config.alarm_code.clone(),
        config.advanced.endpoints.clone(),
        &transport,
    )?)
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Scripted in-memory controller for exercising the engine.

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    use vedolink_api::{AreaState, ZoneState};

    use super::RemoteStateClient;
    use crate::error::CoreError;

    /// One scripted reply.
    #[derive(Debug, Clone)]
    pub enum Reply<T> {
        Data(Vec<T>),
        Nothing,
        Fail(String),
    }

    impl<T: Clone> Reply<T> {
        fn resolve(&self) -> Result<Option<Vec<T>>, CoreError> {
            match self {
                Self::Data(items) => Ok(Some(items.clone())),
                Self::Nothing => Ok(None),
                Self::Fail(message) => Err(CoreError::Api {
                    message: message.clone(),
                }),
            }
        }
    }

    /// Which read was invoked.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Call {
        CheckAlarm,
        FetchZones,
    }

    /// A mock controller replaying queued replies, then a sticky fallback.
    pub struct MockStateClient {
        alarm_queue: Mutex<VecDeque<Reply<AreaState>>>,
        alarm_fallback: Mutex<Reply<AreaState>>,
        zone_queue: Mutex<VecDeque<Reply<ZoneState>>>,
        zone_fallback: Mutex<Reply<ZoneState>>,
        latency: Mutex<Duration>,
        calls: Mutex<Vec<(Call, Instant)>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        closed: AtomicUsize,
    }

    impl Default for MockStateClient {
        fn default() -> Self {
            Self {
                alarm_queue: Mutex::new(VecDeque::new()),
                alarm_fallback: Mutex::new(Reply::Nothing),
                zone_queue: Mutex::new(VecDeque::new()),
                zone_fallback: Mutex::new(Reply::Nothing),
                latency: Mutex::new(Duration::ZERO),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                closed: AtomicUsize::new(0),
            }
        }
    }

    impl MockStateClient {
        /// Create a mock that reports nothing until scripted.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Reply used for `check_alarm` once the queue is drained.
        pub fn set_areas(&self, reply: Reply<AreaState>) {
            *self.alarm_fallback.lock() = reply;
        }

        /// Reply used for `fetch_zones` once the queue is drained.
        pub fn set_zones(&self, reply: Reply<ZoneState>) {
            *self.zone_fallback.lock() = reply;
        }

        /// Queue a one-shot `check_alarm` reply.
        pub fn push_areas(&self, reply: Reply<AreaState>) {
            self.alarm_queue.lock().push_back(reply);
        }

        /// Queue a one-shot `fetch_zones` reply.
        pub fn push_zones(&self, reply: Reply<ZoneState>) {
            self.zone_queue.lock().push_back(reply);
        }

        /// Delay every read by `latency` (virtual time under a paused clock).
        pub fn set_latency(&self, latency: Duration) {
            *self.latency.lock() = latency;
        }

        /// Every read so far, with the instant it started.
        #[must_use]
        pub fn calls(&self) -> Vec<(Call, Instant)> {
            self.calls.lock().clone()
        }

        /// Number of reads of the given kind.
        #[must_use]
        pub fn call_count(&self, kind: Call) -> usize {
            self.calls.lock().iter().filter(|(c, _)| *c == kind).count()
        }

        /// Highest number of reads that were running at the same time.
        #[must_use]
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        /// Number of `close` calls.
        #[must_use]
        pub fn close_count(&self) -> usize {
            self.closed.load(Ordering::SeqCst)
        }

        async fn record<T: Clone>(
            &self,
            kind: Call,
            queue: &Mutex<VecDeque<Reply<T>>>,
            fallback: &Mutex<Reply<T>>,
        ) -> Result<Option<Vec<T>>, CoreError> {
            self.calls.lock().push((kind, Instant::now()));
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let latency = *self.latency.lock();
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }

            let reply = queue
                .lock()
                .pop_front()
                .unwrap_or_else(|| fallback.lock().clone());
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            reply.resolve()
        }
    }

    #[async_trait]
    impl RemoteStateClient for MockStateClient {
        async fn check_alarm(&self) -> Result<Option<Vec<AreaState>>, CoreError> {
            self.record(Call::CheckAlarm, &self.alarm_queue, &self.alarm_fallback)
                .await
        }

        async fn fetch_zones(&self) -> Result<Option<Vec<ZoneState>>, CoreError> {
            self.record(Call::FetchZones, &self.zone_queue, &self.zone_fallback)
                .await
        }

        async fn close(&self) -> Result<(), CoreError> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
