//! Supervised per-host refresh loops.
//!
//! One task per host drives the certificate source on a steady cadence,
//! dropping to a shorter retry cadence while attempts fail. A shared watch
//! channel carries cancellation; every task observes it at its next
//! suspension point, so an in-flight attempt always runs to completion.

use std::sync::Arc;
use std::time::Duration;

use certfleet_common::{noop_counter_vec, CounterVecInc, HelloInfo};
use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::{RefreshError, RefreshResult};
use crate::source::{BoxError, CertificateSource};

/// Steady-state refresh cadence when none is configured.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Retry cadence while a host is failing, when none is configured.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(60);

/// How long [`RefreshHandle::stop`] waits for cooperative shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Outcome of one refresh attempt, reported as the `status` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The source resolved a certificate that is still valid.
    Ok,
    /// The source resolved a certificate whose expiry has already passed.
    /// Reported, but not treated as a request error.
    Expired,
    /// The source failed to resolve a certificate.
    Failed,
}

impl RefreshOutcome {
    /// The metric label for this outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshOutcome::Ok => "ok",
            RefreshOutcome::Expired => "expired",
            RefreshOutcome::Failed => "failed",
        }
    }
}

/// Periodically refreshes certificates for a set of hosts through a
/// [`CertificateSource`].
///
/// Each host gets one independent task: an attempt runs immediately at
/// start, then on the normal cadence, switching to the retry cadence while
/// attempts fail. One host's failures never delay another's schedule.
pub struct RefreshClient {
    source: Arc<dyn CertificateSource>,
    interval: Duration,
    retry_interval: Duration,
    outcome_counter: CounterVecInc,
}

impl RefreshClient {
    /// Create a client with the default cadences and a no-op outcome
    /// counter.
    pub fn new(source: Arc<dyn CertificateSource>) -> Self {
        Self {
            source,
            interval: DEFAULT_REFRESH_INTERVAL,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            outcome_counter: noop_counter_vec(),
        }
    }

    /// Set the steady-state refresh cadence. Zero keeps the default of
    /// one hour.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.interval = interval;
        }
        self
    }

    /// Set the cadence used while refreshes for a host are failing. Zero
    /// keeps the default of one minute.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.retry_interval = interval;
        }
        self
    }

    /// Report the outcome of every refresh attempt through `counter`,
    /// with labels `(host, status)`.
    pub fn with_outcome_counter(mut self, counter: CounterVecInc) -> Self {
        self.outcome_counter = counter;
        self
    }

    /// Launch one refresh task per host plus a supervising task, and
    /// return the handle that stops them.
    pub fn start(&self, hosts: &[String]) -> RefreshHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut tasks = Vec::with_capacity(hosts.len());
        for host in hosts {
            let handle = tokio::spawn(run_host(
                Arc::clone(&self.source),
                host.clone(),
                self.interval,
                self.retry_interval,
                self.outcome_counter.clone(),
                shutdown_rx.clone(),
            ));
            tasks.push((host.clone(), handle));
        }

        let supervisor = tokio::spawn(async move {
            let mut result = Ok(());
            for (host, handle) in tasks {
                if let Err(source) = handle.await {
                    error!(host = %host, error = %source, "refresh task terminated abnormally");
                    if result.is_ok() {
                        result = Err(RefreshError::Task { host, source });
                    }
                }
            }
            result
        });

        RefreshHandle {
            shutdown: shutdown_tx,
            supervisor,
        }
    }
}

/// Running refresh tasks, stopped through [`RefreshHandle::stop`].
///
/// Consuming `stop` makes "call at most once" structural. Dropping the
/// handle without calling `stop` also signals cancellation (the watch
/// sender closes) but waits for nothing.
pub struct RefreshHandle {
    shutdown: watch::Sender<bool>,
    supervisor: JoinHandle<RefreshResult<()>>,
}

impl RefreshHandle {
    /// Signal every host task to stop and wait for them to exit
    /// cooperatively, up to a five second grace period.
    ///
    /// In-flight refresh attempts run to completion. A task still busy
    /// when the grace period ends is reported as
    /// [`RefreshError::ShutdownTimeout`] and left running; nothing is
    /// force-killed.
    pub async fn stop(mut self) -> RefreshResult<()> {
        let _ = self.shutdown.send(true);
        info!("stopping certificate refresh client");
        match time::timeout(SHUTDOWN_GRACE, &mut self.supervisor).await {
            Ok(Ok(result)) => {
                match &result {
                    Ok(()) => info!("certificate refresh client stopped"),
                    Err(e) => error!(error = %e, "certificate refresh client stopped with error"),
                }
                result
            }
            Ok(Err(source)) => Err(RefreshError::Supervisor { source }),
            Err(_) => {
                warn!("timeout waiting for refresh tasks to stop");
                Err(RefreshError::ShutdownTimeout {
                    grace: SHUTDOWN_GRACE,
                })
            }
        }
    }
}

/// True once cancellation has been signalled or the handle dropped.
fn stopped(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow() || shutdown.has_changed().is_err()
}

async fn run_host(
    source: Arc<dyn CertificateSource>,
    host: String,
    interval: Duration,
    retry_interval: Duration,
    counter: CounterVecInc,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(host = %host, interval = ?interval, "starting certificate refresh loop");
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        refresh_until_ok(
            source.as_ref(),
            &host,
            retry_interval,
            &counter,
            &mut shutdown,
        )
        .await;
        // The retry sub-loop may have consumed the cancellation
        // notification; re-check the flag before sleeping.
        if stopped(&shutdown) {
            break;
        }
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }
    }
    debug!(host = %host, "certificate refresh loop stopped");
}

/// Attempt refreshes at the retry cadence until one succeeds or
/// cancellation is observed.
async fn refresh_until_ok(
    source: &dyn CertificateSource,
    host: &str,
    retry_interval: Duration,
    counter: &CounterVecInc,
    shutdown: &mut watch::Receiver<bool>,
) {
    let mut ticker = time::interval_at(Instant::now() + retry_interval, retry_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        match refresh_host(source, host, counter).await {
            Ok(()) => return,
            Err(e) => {
                error!(host = %host, error = %e, "failed to refresh certificate using tls hello");
            }
        }
        tokio::select! {
            _ = shutdown.changed() => return,
            _ = ticker.tick() => {}
        }
    }
}

/// One refresh attempt: resolve a certificate for the host through a
/// synthetic hello and report the outcome.
async fn refresh_host(
    source: &dyn CertificateSource,
    host: &str,
    counter: &CounterVecInc,
) -> Result<(), BoxError> {
    let hello = HelloInfo::for_server(host);
    info!(host = %host, "refreshing certificate using tls hello");
    let cert = match source.resolve(&hello).await {
        Ok(cert) => cert,
        Err(e) => {
            counter(&[host, RefreshOutcome::Failed.as_str()]);
            return Err(e);
        }
    };

    let serial = cert.serial_hex();
    info!(
        host = %host,
        expiry = %cert.not_after,
        serial = %serial,
        "refreshed certificate using tls hello"
    );
    if cert.is_expired_at(Utc::now()) {
        warn!(
            host = %host,
            expiry = %cert.not_after,
            serial = %serial,
            "certificate has expired"
        );
        counter(&[host, RefreshOutcome::Expired.as_str()]);
    } else {
        counter(&[host, RefreshOutcome::Ok.as_str()]);
    }
    Ok(())
}
