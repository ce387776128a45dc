//! The delta model returned by the hub's `refreshStates` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::HubId;
use crate::snapshot::{self, PropertySnapshot};
use crate::subscription::WatchedProperty;

/// Cursor value meaning "from the beginning".
pub const INITIAL_CURSOR: u64 = 0;

/// Hub event property announcing an operating-mode change.
pub const MODE_PROPERTY: &str = "mode";

/// One `refreshStates` answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// The new cursor, when the hub sent one.
    #[serde(default)]
    pub last: Option<u64>,
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<HubEvent>,
}

/// A changed device reported in a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub id: HubId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<Value>,
    /// Activity switch alias, remapped onto the primary value.
    #[serde(
        rename = "ui.startStopActivitySwitch.value",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub activity: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Change {
    /// A primary-value change for `id`.
    #[must_use]
    pub fn value(id: HubId, value: impl Into<Value>) -> Self {
        Self {
            id,
            value: Some(value.into()),
            value2: None,
            activity: None,
            color: None,
        }
    }

    /// Fold the activity-switch alias into the primary value when no
    /// value channel is present.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.value.is_none() && self.value2.is_none() {
            if let Some(activity) = self.activity.take() {
                self.value = Some(activity);
            }
        }
        self
    }

    /// Watched properties this change fires, in dispatch order.
    ///
    /// Value channels take precedence; a color is only dispatched when the
    /// change carries no value at all.
    #[must_use]
    pub fn channels(&self) -> Vec<WatchedProperty> {
        let mut channels = Vec::with_capacity(2);
        if self.value.is_some() {
            channels.push(WatchedProperty::Value);
        }
        if self.value2.is_some() {
            channels.push(WatchedProperty::Secondary);
        }
        if channels.is_empty() && self.color.is_some() {
            channels.push(WatchedProperty::Color);
        }
        channels
    }

    /// The synthetic snapshot handed to resolvers instead of a network fetch.
    #[must_use]
    pub fn snapshot(&self) -> PropertySnapshot {
        let mut snapshot = PropertySnapshot::empty();
        if let Some(value) = &self.value {
            snapshot.insert(snapshot::VALUE, value.clone());
        }
        if let Some(value2) = &self.value2 {
            snapshot.insert(snapshot::VALUE2, value2.clone());
        }
        if let Some(color) = &self.color {
            snapshot.insert(snapshot::COLOR, color.clone());
        }
        snapshot
    }
}

/// A hub event reported in a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubEvent {
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub data: HubEventData,
}

/// Payload of a [`HubEvent`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HubEventData {
    #[serde(default)]
    pub id: Option<HubId>,
    #[serde(default)]
    pub property: Option<String>,
    #[serde(rename = "newValue", default)]
    pub new_value: Option<Value>,
}

impl HubEvent {
    /// The operating-mode device id, if this event is a mode change.
    #[must_use]
    pub fn mode_change(&self) -> Option<HubId> {
        if self.data.property.as_deref() == Some(MODE_PROPERTY) {
            self.data.id
        } else {
            None
        }
    }

    /// The reported mode code, accepting numbers and numeric strings.
    #[must_use]
    pub fn new_mode(&self) -> Option<i64> {
        match self.data.new_value.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn change(json: Value) -> Change {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn should_deserialize_full_refresh_response() {
        let response: RefreshResponse = serde_json::from_value(json!({
            "last": 1234,
            "changes": [{"id": 1, "value": true}],
            "events": [{"type": "DevicePropertyUpdatedEvent", "data": {"id": 9, "property": "mode", "newValue": 1}}]
        }))
        .unwrap();
        assert_eq!(response.last, Some(1234));
        assert_eq!(response.changes.len(), 1);
        assert_eq!(response.events[0].mode_change(), Some(HubId::new(9)));
    }

    #[test]
    fn should_default_missing_fields_of_refresh_response() {
        let response: RefreshResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response, RefreshResponse::default());
    }

    #[test]
    fn should_fire_value_channel_for_primary_value_change() {
        let change = change(json!({"id": 1, "value": true})).normalized();
        assert_eq!(change.channels(), vec![WatchedProperty::Value]);
    }

    #[test]
    fn should_fire_both_channels_when_value_and_value2_present() {
        let change = change(json!({"id": 1, "value": 50, "value2": 20})).normalized();
        assert_eq!(
            change.channels(),
            vec![WatchedProperty::Value, WatchedProperty::Secondary]
        );
    }

    #[test]
    fn should_remap_activity_alias_onto_value() {
        let change =
            change(json!({"id": 1, "ui.startStopActivitySwitch.value": true})).normalized();
        assert_eq!(change.value, Some(json!(true)));
        assert_eq!(change.channels(), vec![WatchedProperty::Value]);
    }

    #[test]
    fn should_fire_color_channel_only_for_color_only_change() {
        let color_only = change(json!({"id": 1, "color": "255,0,0,0"})).normalized();
        assert_eq!(color_only.channels(), vec![WatchedProperty::Color]);

        let with_value = change(json!({"id": 1, "value": 99, "color": "255,0,0,0"})).normalized();
        assert_eq!(with_value.channels(), vec![WatchedProperty::Value]);
    }

    #[test]
    fn should_fire_nothing_for_unrelated_change() {
        let change = change(json!({"id": 1, "dead": true})).normalized();
        assert!(change.channels().is_empty());
    }

    #[test]
    fn should_build_snapshot_from_present_fields() {
        let change = change(json!({"id": 1, "value": 21.5, "color": "1,2,3,4"}));
        let snapshot = change.snapshot();
        assert_eq!(snapshot.number("value"), Some(21.5));
        assert_eq!(snapshot.text("color"), Some("1,2,3,4"));
        assert!(snapshot.get("value2").is_none());
    }

    #[test]
    fn should_ignore_events_that_are_not_mode_changes() {
        let event: HubEvent = serde_json::from_value(json!({
            "type": "DevicePropertyUpdatedEvent",
            "data": {"id": 9, "property": "value", "newValue": 1}
        }))
        .unwrap();
        assert_eq!(event.mode_change(), None);
    }

    #[test]
    fn should_read_new_mode_from_number_or_string() {
        let numeric: HubEvent = serde_json::from_value(json!({
            "data": {"id": 31, "property": "mode", "newValue": 2}
        }))
        .unwrap();
        let textual: HubEvent = serde_json::from_value(json!({
            "data": {"id": 31, "property": "mode", "newValue": "10"}
        }))
        .unwrap();
        let missing: HubEvent = serde_json::from_value(json!({
            "data": {"id": 31, "property": "mode"}
        }))
        .unwrap();

        assert_eq!(numeric.mode_change(), Some(HubId::new(31)));
        assert_eq!(numeric.new_mode(), Some(2));
        assert_eq!(textual.new_mode(), Some(10));
        assert_eq!(missing.new_mode(), None);
    }
}
