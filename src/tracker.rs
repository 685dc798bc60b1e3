use heapless::Vec;

use crate::constants::{MAX_TRACKED_DEVICES, RSSI_FLOOR, RSSI_UNAVAILABLE};
use crate::detection::{Detection, Sighting};

/// Outcome of feeding one sighting to a [`DetectionTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    New,
    Updated,
    /// RSSI missing or below the noise floor
    Ignored,
    /// Table full, sighting discarded
    Dropped,
}

/// The table the firmware keeps between two uploads.
pub type Tracker = DetectionTable<MAX_TRACKED_DEVICES>;

/// Per-device aggregation of sightings between two uploads.
///
/// Capacity is fixed at `N` devices; further new devices are dropped and
/// counted until the table is cleared.
#[derive(Debug, Default)]
pub struct DetectionTable<const N: usize> {
    detections: Vec<Detection, N>,
    dropped: u32,
}

impl<const N: usize> DetectionTable<N> {
    pub const fn new() -> Self {
        Self {
            detections: Vec::new(),
            dropped: 0,
        }
    }

    pub fn observe(&mut self, sighting: &Sighting<'_>, now_ms: u64) -> Observed {
        if sighting.rssi == RSSI_UNAVAILABLE || sighting.rssi < RSSI_FLOOR {
            return Observed::Ignored;
        }

        if let Some(detection) = self
            .detections
            .iter_mut()
            .find(|detection| detection.mac == sighting.mac)
        {
            detection.update(sighting, now_ms);
            return Observed::Updated;
        }

        match self.detections.push(Detection::new(sighting, now_ms)) {
            Ok(()) => Observed::New,
            Err(_) => {
                if self.dropped == 0 {
                    log::warn!("Detection table full ({} devices), dropping new devices", N);
                }
                self.dropped = self.dropped.saturating_add(1);
                Observed::Dropped
            }
        }
    }

    /// Removes devices not seen within `timeout_ms` of `now_ms`. Returns how many were removed.
    pub fn expire(&mut self, now_ms: u64, timeout_ms: u64) -> usize {
        let before = self.detections.len();
        self.detections
            .retain(|detection| now_ms.saturating_sub(detection.last_seen_ms) <= timeout_ms);
        let expired = before - self.detections.len();
        if expired > 0 {
            log::debug!("Expired {} stale detections", expired);
        }
        expired
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Sightings of new devices discarded since the last [`clear`](Self::clear).
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.detections.clear();
        self.dropped = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mac::MacAddress;

    fn sighting(last_octet: u8, rssi: i8) -> Sighting<'static> {
        Sighting {
            mac: MacAddress([0x10, 0x20, 0x30, 0x40, 0x50, last_octet]),
            name: None,
            rssi,
        }
    }

    #[test]
    fn aggregates_by_mac() {
        let mut table = DetectionTable::<4>::new();
        assert_eq!(table.observe(&sighting(1, -60), 0), Observed::New);
        assert_eq!(table.observe(&sighting(2, -70), 10), Observed::New);
        assert_eq!(table.observe(&sighting(1, -55), 20), Observed::Updated);

        assert_eq!(table.len(), 2);
        let first = &table.detections()[0];
        assert_eq!(first.detection_count, 2);
        assert_eq!(first.peak_rssi, -55);
        assert_eq!(first.duration_ms(), 20);
    }

    #[test]
    fn ignores_missing_and_weak_rssi() {
        let mut table = DetectionTable::<4>::new();
        assert_eq!(
            table.observe(&sighting(1, RSSI_UNAVAILABLE), 0),
            Observed::Ignored
        );
        assert_eq!(table.observe(&sighting(1, -101), 0), Observed::Ignored);
        assert_eq!(table.observe(&sighting(1, RSSI_FLOOR), 0), Observed::New);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn full_table_drops_new_devices_but_updates_known_ones() {
        let mut table = DetectionTable::<2>::new();
        table.observe(&sighting(1, -60), 0);
        table.observe(&sighting(2, -60), 0);
        assert_eq!(table.observe(&sighting(3, -60), 0), Observed::Dropped);
        assert_eq!(table.observe(&sighting(4, -60), 0), Observed::Dropped);
        assert_eq!(table.observe(&sighting(1, -60), 5), Observed::Updated);
        assert_eq!(table.dropped(), 2);

        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.dropped(), 0);
        assert_eq!(table.observe(&sighting(3, -60), 10), Observed::New);
    }

    #[test]
    fn tracker_holds_max_tracked_devices() {
        let mut tracker = Tracker::new();
        for i in 0..MAX_TRACKED_DEVICES as u8 {
            assert_eq!(tracker.observe(&sighting(i, -60), 0), Observed::New);
        }
        assert_eq!(tracker.len(), MAX_TRACKED_DEVICES);
        assert_eq!(tracker.observe(&sighting(0xFF, -60), 0), Observed::Dropped);
    }

    #[test]
    fn expire_removes_stale_devices() {
        let mut table = DetectionTable::<4>::new();
        table.observe(&sighting(1, -60), 0);
        table.observe(&sighting(2, -60), 50_000);
        assert_eq!(table.expire(70_000, 60_000), 1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.detections()[0].mac.octets()[5], 2);
        assert_eq!(table.expire(70_000, 60_000), 0);
    }
}
