//! Facet service — the host's read and write entry points for a facet.

use std::sync::Arc;

use hcbridge_domain::capability::{Capability, CapabilityKind, CapabilitySubtype};
use hcbridge_domain::error::{BridgeError, NotFoundError};
use hcbridge_domain::event::ChangeOrigin;
use hcbridge_domain::facet::{Facet, FacetKind, FacetValue};
use hcbridge_domain::id::IdentityKey;
use hcbridge_domain::security::SECURITY_VARIABLE;
use hcbridge_domain::snapshot;
use hcbridge_domain::temperature::TemperatureUnit;

use crate::dispatch::DispatchRegistry;
use crate::dispatcher::UpdateDispatcher;
use crate::out_of_band;
use crate::ports::{EventPublisher, HubClient, HubCommand, ReadRequest, WriteRequest};
use crate::state::EngineState;

/// Addresses one facet of one capability of one accessory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetTarget {
    pub key: IdentityKey,
    /// Narrows the capability lookup when two capabilities share a subtype.
    pub kind: Option<CapabilityKind>,
    pub subtype: CapabilitySubtype,
    pub facet: FacetKind,
}

/// Where a write comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteContext {
    /// The host user changed the value.
    Host,
    /// The engine re-set a value it received from the hub.
    HubPush,
    /// A synthetic set issued by a resolver.
    Internal,
}

/// What a write did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Commands were sent and the cached value updated.
    Applied,
    /// The write came from a reserved internal context.
    Ignored,
    /// No write resolver for this facet kind.
    Unhandled,
}

/// Routes host reads and writes through the dispatch tables.
pub struct FacetService<H, P> {
    hub: H,
    state: Arc<EngineState>,
    dispatch: Arc<DispatchRegistry>,
    dispatcher: Arc<UpdateDispatcher<P>>,
    unit: TemperatureUnit,
}

impl<H, P> FacetService<H, P>
where
    H: HubClient,
    P: EventPublisher + Send + Sync,
{
    pub fn new(
        hub: H,
        state: Arc<EngineState>,
        dispatch: Arc<DispatchRegistry>,
        dispatcher: Arc<UpdateDispatcher<P>>,
        unit: TemperatureUnit,
    ) -> Self {
        Self {
            hub,
            state,
            dispatch,
            dispatcher,
            unit,
        }
    }

    /// Read the current value of a facet and cache it.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] for an unknown target,
    /// [`BridgeError::NoResolver`] when the read table has no entry for the
    /// facet kind, and hub or resolver errors unchanged.
    #[tracing::instrument(skip(self), fields(key = %target.key, facet = %target.facet))]
    pub async fn handle_read(&self, target: &FacetTarget) -> Result<FacetValue, BridgeError> {
        let (capability, facet) = self.locate(target).await?;
        let value = self
            .read(&capability, &facet)
            .await
            .inspect_err(|err| tracing::warn!(%err, "facet read failed"))?;
        facet.update(value.clone());
        Ok(value)
    }

    /// Resolve the value of `facet` without touching its cache.
    ///
    /// # Errors
    ///
    /// See [`FacetService::handle_read`].
    pub async fn read(
        &self,
        capability: &Capability,
        facet: &Facet,
    ) -> Result<FacetValue, BridgeError> {
        let subtype = capability.subtype();
        if subtype.is_virtual() && !subtype.is_global_variable_switch() {
            return Ok(FacetValue::Bool(false));
        }
        if subtype.is_security_system() {
            let variable = self.hub.get_global_variable(SECURITY_VARIABLE).await?;
            return out_of_band::read_security(facet.kind(), &variable, facet.value());
        }
        if let Some(name) = subtype.global_variable_name() {
            let variable = self.hub.get_global_variable(name).await?;
            return Ok(out_of_band::read_variable_switch(&variable));
        }

        let entry = self
            .dispatch
            .read(facet.kind())
            .ok_or_else(|| BridgeError::NoResolver(facet.kind()))?
            .clone();
        let Some(device) = subtype.device_id() else {
            return Err(NotFoundError {
                entity: "Device",
                id: subtype.to_string(),
            }
            .into());
        };
        if !entry.debounce.is_zero() {
            tokio::time::sleep(entry.debounce).await;
        }
        let mut properties = self.hub.get_device_properties(device).await?;
        if facet.kind().is_current_temperature() {
            let unit = self.unit;
            properties.map_number(snapshot::VALUE, |v| unit.to_celsius(v));
        }
        entry.resolver.resolve(&ReadRequest {
            capability,
            facet,
            snapshot: &properties,
        })
    }

    /// Apply a write to a facet.
    ///
    /// Writes from [`WriteContext::HubPush`] and [`WriteContext::Internal`]
    /// are ignored so pushed values never echo back to the hub.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] for an unknown target or scene,
    /// validation errors from the resolver, and the first failing hub
    /// command's error.
    #[tracing::instrument(skip(self, value), fields(key = %target.key, facet = %target.facet))]
    pub async fn handle_write(
        &self,
        target: &FacetTarget,
        value: FacetValue,
        context: WriteContext,
    ) -> Result<WriteOutcome, BridgeError> {
        if context != WriteContext::Host {
            tracing::trace!(?context, "ignoring internal write");
            return Ok(WriteOutcome::Ignored);
        }
        let (capability, facet) = self.locate(target).await?;
        let subtype = capability.subtype();

        let commands = if let Some(name) = subtype.global_variable_name() {
            out_of_band::write_variable_switch(name, &value)?
        } else if subtype.is_security_system()
            && facet.kind() == FacetKind::SecuritySystemTargetState
        {
            out_of_band::write_security_target(&value)?
        } else if let Some(resolver) = self.dispatch.write(facet.kind()) {
            resolver.resolve(&WriteRequest {
                capability: &capability,
                facet: &facet,
                value: &value,
            })?
        } else {
            tracing::debug!("no write resolver");
            return Ok(WriteOutcome::Unhandled);
        };

        self.execute(&commands).await?;
        self.dispatcher
            .push_value(&target.key, &capability, &facet, value, ChangeOrigin::Host)
            .await;
        Ok(WriteOutcome::Applied)
    }

    async fn execute(&self, commands: &[HubCommand]) -> Result<(), BridgeError> {
        for command in commands {
            tracing::debug!(?command, "sending hub command");
            match command {
                HubCommand::Action {
                    device,
                    action,
                    args,
                } => self.hub.call_action(*device, action, args).await?,
                HubCommand::SetVariable { name, value } => {
                    self.hub.set_global_variable(name, value).await?;
                }
                HubCommand::StartScene { name } => {
                    let scene = self.state.scenes.read().await.get(name);
                    let scene = scene.ok_or_else(|| NotFoundError {
                        entity: "Scene",
                        id: name.clone(),
                    })?;
                    self.hub.start_scene(scene).await?;
                }
            }
        }
        Ok(())
    }

    async fn locate(
        &self,
        target: &FacetTarget,
    ) -> Result<(Arc<Capability>, Arc<Facet>), BridgeError> {
        self.state
            .directory
            .read()
            .await
            .locate(&target.key, target.kind, &target.subtype, target.facet)
    }
}
