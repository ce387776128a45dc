use hcbridge_app::ports::{HubCommand, ReadRequest, WriteRequest};
use hcbridge_domain::error::BridgeError;
use hcbridge_domain::facet::FacetValue;
use hcbridge_domain::snapshot;

use super::switch::device;
use super::{boolean, int, written_bool};

/// `1` is secured, `0` unsecured, for both current and target state.
pub(super) fn read_lock(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    Ok(int(boolean(request, snapshot::VALUE)?))
}

pub(super) fn write_lock(request: &WriteRequest<'_>) -> Result<Vec<HubCommand>, BridgeError> {
    let action = if written_bool(request)? { "secure" } else { "unsecure" };
    Ok(vec![HubCommand::action(device(request)?, action, vec![])])
}
