use std::collections::HashMap;

use tracing::warn;

use crate::fence::{find_containing_cell, generalized_centroid, FenceSet};
use crate::signal::{SignalData, SignalValue, StatusV2Data};
use crate::status::StatusData;

pub const LATITUDE_SIGNAL: &str = "latitude";
pub const LONGITUDE_SIGNAL: &str = "longitude";
pub const REDACTED_SIGNAL: &str = "isRedacted";

/// Applies the privacy fence to a simple status payload in place.
///
/// A payload missing either coordinate is left untouched, flag included. A
/// matched reading is replaced by the centroid of the fence cell's parent,
/// one resolution coarser than the fence itself.
pub fn redact_status(data: &mut StatusData, fence: &FenceSet) {
    let (Some(latitude), Some(longitude)) = (data.latitude, data.longitude) else {
        return;
    };

    let Some(matched) = find_containing_cell(latitude, longitude, fence) else {
        data.is_redacted = Some(false);
        return;
    };

    match generalized_centroid(matched) {
        Some((lat, lng)) => {
            data.latitude = Some(lat);
            data.longitude = Some(lng);
            data.is_redacted = Some(true);
        }
        None => {
            // A coarsest-resolution fence has no parent to generalize to;
            // leave the reading as-is rather than widen past the hierarchy.
            warn!(cell = %matched, "matched fence cell has no parent, skipping redaction");
            data.is_redacted = Some(false);
        }
    }
}

struct LocationGroup {
    timestamp: i64,
    latitude: Option<usize>,
    longitude: Option<usize>,
}

/// Indexes of latitude/longitude signals grouped by timestamp, in first
/// occurrence order. A repeated name within one timestamp keeps the last
/// index seen.
fn location_groups(signals: &[SignalData]) -> Vec<LocationGroup> {
    let mut groups: Vec<LocationGroup> = Vec::new();
    let mut slot_by_timestamp: HashMap<i64, usize> = HashMap::new();

    for (index, signal) in signals.iter().enumerate() {
        if signal.name != LATITUDE_SIGNAL && signal.name != LONGITUDE_SIGNAL {
            continue;
        }
        let slot = *slot_by_timestamp.entry(signal.timestamp).or_insert_with(|| {
            groups.push(LocationGroup {
                timestamp: signal.timestamp,
                latitude: None,
                longitude: None,
            });
            groups.len() - 1
        });
        if signal.name == LATITUDE_SIGNAL {
            groups[slot].latitude = Some(index);
        } else {
            groups[slot].longitude = Some(index);
        }
    }

    groups
}

/// Applies the privacy fence to a multi-signal payload in place.
///
/// Timestamp groups are examined in first occurrence order. The first group
/// whose reading falls inside the fence is generalized and marked with an
/// appended `isRedacted = true` signal, and no further groups are touched.
/// When every examined group misses, a single `isRedacted = false` signal is
/// appended with the last examined group's timestamp. Groups without a
/// numeric coordinate pair are skipped without a flag.
pub fn redact_vehicle_status(data: &mut StatusV2Data, fence: &FenceSet) {
    let groups = location_groups(&data.vehicle.signals);
    if groups.is_empty() {
        return;
    }

    let mut last_examined: Option<i64> = None;

    for group in &groups {
        let (Some(lat_index), Some(lng_index)) = (group.latitude, group.longitude) else {
            continue;
        };
        let (Some(latitude), Some(longitude)) = (
            data.vehicle.signals[lat_index].value.as_number(),
            data.vehicle.signals[lng_index].value.as_number(),
        ) else {
            continue;
        };

        last_examined = Some(group.timestamp);

        let Some(matched) = find_containing_cell(latitude, longitude, fence) else {
            continue;
        };

        match generalized_centroid(matched) {
            Some((lat, lng)) => {
                data.vehicle.signals[lat_index].value = SignalValue::Number(lat);
                data.vehicle.signals[lng_index].value = SignalValue::Number(lng);
                data.vehicle.signals.push(SignalData {
                    timestamp: group.timestamp,
                    name: REDACTED_SIGNAL.to_owned(),
                    value: SignalValue::Bool(true),
                });
                return;
            }
            None => {
                warn!(cell = %matched, "matched fence cell has no parent, skipping redaction");
            }
        }
    }

    if let Some(timestamp) = last_examined {
        data.vehicle.signals.push(SignalData {
            timestamp,
            name: REDACTED_SIGNAL.to_owned(),
            value: SignalValue::Bool(false),
        });
    }
}
