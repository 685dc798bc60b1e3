// Body POSTed to SERVER_URL. Times are milliseconds since boot.

use core::fmt::{self, Write};

use heapless::String;

use crate::constants::{
    DEVICE_NAME_MAX_LEN, MAX_DETECTIONS_PER_REPORT, REPORT_BUFFER_SIZE, TX_POWER_AT_1M,
};
use crate::device::DeviceConfig;
use crate::mac::MacAddress;

/// A report body formatted for sending.
pub type ReportBody = String<REPORT_BUFFER_SIZE>;

/// 10^(1/20): distance factor per dB of path loss with a free-space exponent of 2.
const DISTANCE_FACTOR_PER_DB: f32 = 1.122_018_5;

/// A single advertisement seen during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sighting<'a> {
    pub mac: MacAddress,
    pub name: Option<&'a str>,
    pub rssi: i8,
}

/// Everything known about one device over an upload window.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub mac: MacAddress,
    pub device_name: Option<String<DEVICE_NAME_MAX_LEN>>,
    /// RSSI of the most recent sighting
    pub rssi: i8,
    /// Strongest RSSI seen
    pub peak_rssi: i8,
    pub first_seen_ms: u64,
    pub last_seen_ms: u64,
    pub detection_count: u32,
}

impl Detection {
    pub fn new(sighting: &Sighting<'_>, now_ms: u64) -> Self {
        Self {
            mac: sighting.mac,
            device_name: sighting.name.and_then(truncated_name),
            rssi: sighting.rssi,
            peak_rssi: sighting.rssi,
            first_seen_ms: now_ms,
            last_seen_ms: now_ms,
            detection_count: 1,
        }
    }

    /// Folds a later sighting of the same device into this record.
    pub fn update(&mut self, sighting: &Sighting<'_>, now_ms: u64) {
        self.rssi = sighting.rssi;
        self.peak_rssi = self.peak_rssi.max(sighting.rssi);
        self.last_seen_ms = self.last_seen_ms.max(now_ms);
        self.detection_count = self.detection_count.saturating_add(1);

        // names usually arrive in a scan response after the first advertisement
        if self.device_name.is_none() {
            self.device_name = sighting.name.and_then(truncated_name);
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.last_seen_ms - self.first_seen_ms
    }

    pub fn distance_m(&self) -> f32 {
        estimate_distance(self.rssi, TX_POWER_AT_1M)
    }

    fn write_json<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "{{\"macAddress\":\"{}\",\"deviceName\":", self.mac)?;
        match &self.device_name {
            Some(name) => write_json_str(out, name)?,
            None => out.write_str("null")?,
        }
        write!(
            out,
            ",\"rssi\":{},\"distance\":{:.2},\"firstSeen\":{},\"lastSeen\":{},\"duration\":{},\"detectionCount\":{}}}",
            self.rssi,
            self.distance_m(),
            self.first_seen_ms,
            self.last_seen_ms,
            self.duration_ms(),
            self.detection_count
        )
    }
}

// control characters are dropped so an escaped name never exceeds two bytes per byte kept
fn truncated_name(name: &str) -> Option<String<DEVICE_NAME_MAX_LEN>> {
    let mut out = String::new();
    for c in name.trim().chars().filter(|c| !c.is_control()) {
        if out.push(c).is_err() {
            break;
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Log-distance path-loss estimate in metres.
///
/// `d = 10 ^ ((tx_power - rssi) / 20)`, evaluated one dB at a time since
/// `core` has no `powf`.
pub fn estimate_distance(rssi: i8, tx_power_at_1m: i8) -> f32 {
    let loss = i16::from(tx_power_at_1m) - i16::from(rssi);
    let factor = if loss >= 0 {
        DISTANCE_FACTOR_PER_DB
    } else {
        1.0 / DISTANCE_FACTOR_PER_DB
    };
    let mut distance = 1.0f32;
    for _ in 0..loss.unsigned_abs() {
        distance *= factor;
    }
    distance
}

/// Body of one `POST` to the server.
#[derive(Debug, Clone, Copy)]
pub struct DetectionReport<'a> {
    pub sensor_id: &'a str,
    pub location_name: &'a str,
    pub timestamp_ms: u64,
    pub detections: &'a [Detection],
}

impl<'a> DetectionReport<'a> {
    pub fn new(config: &DeviceConfig<'a>, timestamp_ms: u64, detections: &'a [Detection]) -> Self {
        Self {
            sensor_id: config.sensor_id,
            location_name: config.location_name,
            timestamp_ms,
            detections,
        }
    }

    /// Splits `detections` into reports of at most `MAX_DETECTIONS_PER_REPORT` entries.
    /// Yields nothing when there is nothing to report.
    pub fn batches(
        config: &DeviceConfig<'a>,
        timestamp_ms: u64,
        detections: &'a [Detection],
    ) -> impl Iterator<Item = DetectionReport<'a>> + 'a {
        let sensor_id = config.sensor_id;
        let location_name = config.location_name;
        detections
            .chunks(MAX_DETECTIONS_PER_REPORT)
            .map(move |chunk| DetectionReport {
                sensor_id,
                location_name,
                timestamp_ms,
                detections: chunk,
            })
    }

    pub fn write_json<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_str("{\"sensorId\":")?;
        write_json_str(out, self.sensor_id)?;
        out.write_str(",\"locationName\":")?;
        write_json_str(out, self.location_name)?;
        write!(out, ",\"timestamp\":{},\"detections\":[", self.timestamp_ms)?;
        for (i, detection) in self.detections.iter().enumerate() {
            if i > 0 {
                out.write_char(',')?;
            }
            detection.write_json(out)?;
        }
        out.write_str("]}")
    }

    /// Formats the body into a fixed buffer, failing if it does not fit.
    pub fn to_json<const N: usize>(&self) -> Result<String<N>, fmt::Error> {
        let mut payload: String<N> = String::new();
        self.write_json(&mut payload)?;
        Ok(payload)
    }

    pub fn to_body(&self) -> Result<ReportBody, fmt::Error> {
        self.to_json()
    }
}

fn write_json_str<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}
