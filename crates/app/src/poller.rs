//! Poller — the single-flight delta loop.
//!
//! Each cycle fetches the delta since the stored cursor, feeds it to the
//! [`UpdateDispatcher`], then refreshes the out-of-band channels
//! (global-variable switches and the security state). The next cycle starts
//! a fixed delay after the previous one finished.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use hcbridge_domain::capability::{Capability, CapabilityKind, CapabilitySubtype};
use hcbridge_domain::delta::{INITIAL_CURSOR, RefreshResponse};
use hcbridge_domain::event::ChangeOrigin;
use hcbridge_domain::facet::FacetKind;
use hcbridge_domain::id::IdentityKey;
use hcbridge_domain::security::SECURITY_VARIABLE;
use tokio::task::JoinHandle;

use crate::dispatcher::UpdateDispatcher;
use crate::out_of_band;
use crate::ports::{EventPublisher, HubClient};
use crate::settings::BridgeSettings;
use crate::state::EngineState;

/// Result of one [`Poller::tick`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Another cycle was in flight; nothing was fetched.
    Skipped,
    Completed,
}

/// Clears the in-flight flag when a cycle ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Poller<H, P> {
    hub: H,
    dispatcher: Arc<UpdateDispatcher<P>>,
    state: Arc<EngineState>,
    settings: Arc<BridgeSettings>,
    cursor: AtomicU64,
    running: AtomicBool,
}

impl<H, P> Poller<H, P>
where
    H: HubClient,
    P: EventPublisher + Send + Sync,
{
    pub fn new(
        hub: H,
        dispatcher: Arc<UpdateDispatcher<P>>,
        state: Arc<EngineState>,
        settings: Arc<BridgeSettings>,
    ) -> Self {
        Self {
            hub,
            dispatcher,
            state,
            settings,
            cursor: AtomicU64::new(INITIAL_CURSOR),
            running: AtomicBool::new(false),
        }
    }

    /// The cursor the next cycle will fetch from.
    pub fn cursor(&self) -> u64 {
        self.cursor.load(Ordering::Acquire)
    }

    /// Run one poll cycle, unless one is already running.
    pub async fn tick(&self) -> TickOutcome {
        let Some(_guard) = RunningGuard::acquire(&self.running) else {
            tracing::debug!("poll cycle already in flight, dropping tick");
            return TickOutcome::Skipped;
        };

        let cursor = self.cursor();
        match self.hub.refresh_states(cursor).await {
            Ok(delta) => self.apply_delta(delta).await,
            Err(err) if err.is_expired_cursor() => {
                tracing::info!(cursor, "delta cursor expired, resetting for a full resync");
                self.cursor.store(INITIAL_CURSOR, Ordering::Release);
            }
            Err(err) => tracing::warn!(%err, cursor, "failed to fetch delta"),
        }

        self.refresh_variable_switches().await;
        if self.settings.security_system {
            self.refresh_security().await;
        }
        TickOutcome::Completed
    }

    /// Tick forever, sleeping the poll interval between cycles.
    pub async fn run(&self) {
        tracing::info!(interval = ?self.settings.poll_interval, "poller started");
        loop {
            self.tick().await;
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    async fn apply_delta(&self, delta: RefreshResponse) {
        if let Some(last) = delta.last {
            self.cursor.fetch_max(last, Ordering::AcqRel);
        }
        let mut fired = 0;
        for change in delta.changes {
            fired += self.dispatcher.dispatch_change(&change.normalized()).await;
        }
        for event in &delta.events {
            if let Some(mode_id) = event.mode_change() {
                fired += self
                    .dispatcher
                    .dispatch_mode_change(mode_id, event.new_mode())
                    .await;
            }
        }
        if fired > 0 {
            tracing::debug!(fired, cursor = self.cursor(), "delta dispatched");
        }
    }

    async fn refresh_variable_switches(&self) {
        for name in &self.settings.switch_global_variables {
            let key = out_of_band::variable_switch_key(name);
            let subtype = CapabilitySubtype::global_variable(name);
            let Some(capability) = self.capability(&key, CapabilityKind::Switch, &subtype).await
            else {
                continue;
            };
            let Some(facet) = capability.facet(FacetKind::On) else {
                continue;
            };
            match self.hub.get_global_variable(name).await {
                Ok(variable) => {
                    let value = out_of_band::read_variable_switch(&variable);
                    self.dispatcher
                        .push_value(&key, &capability, facet, value, ChangeOrigin::Hub)
                        .await;
                }
                Err(err) => tracing::warn!(%err, variable = %name, "failed to refresh variable"),
            }
        }
    }

    async fn refresh_security(&self) {
        let key = out_of_band::security_key();
        let subtype = CapabilitySubtype::security_system();
        let Some(capability) = self
            .capability(&key, CapabilityKind::SecuritySystem, &subtype)
            .await
        else {
            return;
        };
        let variable = match self.hub.get_global_variable(SECURITY_VARIABLE).await {
            Ok(variable) => variable,
            Err(err) => {
                tracing::warn!(%err, "failed to refresh security state");
                return;
            }
        };
        let Some(facet) = capability.facet(FacetKind::SecuritySystemCurrentState) else {
            return;
        };
        match out_of_band::read_security(facet.kind(), &variable, facet.value()) {
            Ok(value) => {
                self.dispatcher
                    .push_value(&key, &capability, facet, value, ChangeOrigin::Hub)
                    .await;
            }
            Err(err) => tracing::warn!(%err, facet = %facet.kind(), "bad security state"),
        }
    }

    async fn capability(
        &self,
        key: &IdentityKey,
        kind: CapabilityKind,
        subtype: &CapabilitySubtype,
    ) -> Option<Arc<Capability>> {
        let directory = self.state.directory.read().await;
        let found = directory
            .get(key)
            .and_then(|accessory| accessory.capability(Some(kind), subtype))
            .cloned();
        if found.is_none() {
            tracing::trace!(%key, "out-of-band accessory not registered yet");
        }
        found
    }
}

impl<H, P> Poller<H, P>
where
    H: HubClient + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    /// Start the loop on the runtime. It only stops with the process.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }
}
