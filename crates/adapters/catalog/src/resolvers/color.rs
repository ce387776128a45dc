//! Color-marked lightbulbs: the hub reports `"r,g,b,w"`, the host speaks HSV.
//!
//! Every read refreshes the capability's cached HSV so a later hue-only or
//! saturation-only write can rebuild the full color.

use hcbridge_app::ports::{HubCommand, ReadRequest, WriteRequest};
use hcbridge_domain::capability::{Capability, Hsv};
use hcbridge_domain::error::BridgeError;
use hcbridge_domain::facet::FacetValue;
use hcbridge_domain::snapshot;
use serde_json::json;

use super::{missing, written_number};

/// Parse the hub's `"r,g,b,w"` string. The white channel is ignored.
pub(super) fn parse_rgb(raw: &str) -> Option<[u8; 3]> {
    let mut channels = raw.split(',').map(|c| c.trim().parse::<u8>());
    let r = channels.next()?.ok()?;
    let g = channels.next()?.ok()?;
    let b = channels.next()?.ok()?;
    Some([r, g, b])
}

pub(super) fn rgb_to_hsv([r, g, b]: [u8; 3]) -> Hsv {
    let (r, g, b) = (f64::from(r) / 255.0, f64::from(g) / 255.0, f64::from(b) / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta < f64::EPSILON {
        0.0
    } else if (max - r).abs() < f64::EPSILON {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if (max - g).abs() < f64::EPSILON {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let saturation = if max < f64::EPSILON { 0.0 } else { delta / max };

    Hsv {
        hue: hue.round(),
        saturation: (saturation * 100.0).round(),
        value: (max * 100.0).round(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(super) fn hsv_to_rgb(hsv: Hsv) -> [u8; 3] {
    let value = hsv.value.clamp(0.0, 100.0) / 100.0;
    let chroma = value * hsv.saturation.clamp(0.0, 100.0) / 100.0;
    let sector = hsv.hue.rem_euclid(360.0) / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u8 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = value - chroma;
    let channel = |c: f64| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [channel(r), channel(g), channel(b)]
}

/// Decode the snapshot's color and cache it on the capability. Falls back to
/// the cached color when the snapshot carries none.
pub(super) fn current_color(request: &ReadRequest<'_>) -> Result<Hsv, BridgeError> {
    match request.snapshot.text(snapshot::COLOR).and_then(parse_rgb) {
        Some(rgb) => {
            let hsv = rgb_to_hsv(rgb);
            request.capability.set_color(hsv);
            Ok(hsv)
        }
        None => request.capability.color().ok_or_else(|| missing(snapshot::COLOR)),
    }
}

/// Store `hsv` and emit the `setColor` command that applies it.
pub(super) fn apply_color(capability: &Capability, hsv: Hsv) -> Result<Vec<HubCommand>, BridgeError> {
    let device = capability
        .subtype()
        .device_id()
        .ok_or_else(|| missing("device"))?;
    capability.set_color(hsv);
    let [r, g, b] = hsv_to_rgb(hsv);
    Ok(vec![HubCommand::action(
        device,
        "setColor",
        vec![json!(r), json!(g), json!(b), json!(0)],
    )])
}

pub(super) fn read_hue(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    Ok(FacetValue::Float(current_color(request)?.hue))
}

pub(super) fn read_saturation(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    Ok(FacetValue::Float(current_color(request)?.saturation))
}

pub(super) fn write_hue(request: &WriteRequest<'_>) -> Result<Vec<HubCommand>, BridgeError> {
    let hue = written_number(request)?;
    let mut hsv = request.capability.color().unwrap_or_default();
    hsv.hue = hue.rem_euclid(360.0);
    apply_color(request.capability, hsv)
}

pub(super) fn write_saturation(request: &WriteRequest<'_>) -> Result<Vec<HubCommand>, BridgeError> {
    let saturation = written_number(request)?;
    let mut hsv = request.capability.color().unwrap_or_default();
    hsv.saturation = saturation.clamp(0.0, 100.0).round();
    apply_color(request.capability, hsv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcbridge_domain::capability::{CapabilityBlueprint, CapabilityKind, CapabilitySubtype};
    use hcbridge_domain::facet::FacetKind;
    use hcbridge_domain::id::HubId;
    use hcbridge_domain::snapshot::PropertySnapshot;

    fn strip() -> Capability {
        CapabilityBlueprint::new(
            CapabilityKind::Lightbulb,
            CapabilitySubtype::device(HubId::new(8)).with_color_marker(),
            &[FacetKind::On, FacetKind::Brightness, FacetKind::Hue, FacetKind::Saturation],
        )
        .build()
    }

    #[test]
    fn should_convert_pure_red_to_hsv() {
        let hsv = rgb_to_hsv([255, 0, 0]);
        assert_eq!(
            hsv,
            Hsv {
                hue: 0.0,
                saturation: 100.0,
                value: 100.0
            }
        );
    }

    #[test]
    fn should_convert_hsv_back_to_rgb() {
        let rgb = hsv_to_rgb(Hsv {
            hue: 240.0,
            saturation: 100.0,
            value: 100.0,
        });
        assert_eq!(rgb, [0, 0, 255]);
    }

    #[test]
    fn should_ignore_white_channel_when_parsing_color() {
        assert_eq!(parse_rgb("10, 20, 30, 255"), Some([10, 20, 30]));
        assert_eq!(parse_rgb("10,20"), None);
        assert_eq!(parse_rgb("red"), None);
    }

    #[test]
    fn should_cache_hsv_when_hue_read_from_color() {
        let capability = strip();
        let facet = capability.facet(FacetKind::Hue).unwrap();
        let snapshot = PropertySnapshot::empty().with(snapshot::COLOR, "0,255,0,0");

        let value = read_hue(&ReadRequest {
            capability: &capability,
            facet,
            snapshot: &snapshot,
        })
        .unwrap();

        assert_eq!(value, FacetValue::Float(120.0));
        assert_eq!(capability.color().unwrap().value, 100.0);
    }

    #[test]
    fn should_fall_back_to_cached_color_when_snapshot_has_none() {
        let capability = strip();
        capability.set_color(Hsv {
            hue: 30.0,
            saturation: 50.0,
            value: 80.0,
        });
        let facet = capability.facet(FacetKind::Saturation).unwrap();

        let value = read_saturation(&ReadRequest {
            capability: &capability,
            facet,
            snapshot: &PropertySnapshot::empty(),
        })
        .unwrap();

        assert_eq!(value, FacetValue::Float(50.0));
    }

    #[test]
    fn should_keep_cached_brightness_when_hue_written() {
        let capability = strip();
        capability.set_color(Hsv {
            hue: 0.0,
            saturation: 100.0,
            value: 100.0,
        });
        let facet = capability.facet(FacetKind::Hue).unwrap();

        let commands = write_hue(&WriteRequest {
            capability: &capability,
            facet,
            value: &FacetValue::Int(120),
        })
        .unwrap();

        assert_eq!(
            commands,
            vec![HubCommand::action(
                HubId::new(8),
                "setColor",
                vec![json!(0), json!(255), json!(0), json!(0)]
            )]
        );
        assert_eq!(capability.color().unwrap().hue, 120.0);
    }
}
