/// Number of distinct devices tracked between two uploads
pub const MAX_TRACKED_DEVICES: usize = 64;
/// Maximum number of detections in a single report body
pub const MAX_DETECTIONS_PER_REPORT: usize = 16;
/// Size of the buffer a report body is formatted into, fits a full batch with
/// every string at its longest and fully escaped
pub const REPORT_BUFFER_SIZE: usize = 5 * 1024;

/// Longest advertised name kept (legacy advertising payload minus the AD header)
pub const DEVICE_NAME_MAX_LEN: usize = 29;

/// RSSI value meaning "not available" in HCI advertising reports
pub const RSSI_UNAVAILABLE: i8 = 127;
/// Sightings weaker than this are treated as noise
pub const RSSI_FLOOR: i8 = -100;
/// Expected RSSI at 1 m, used as the path-loss reference
pub const TX_POWER_AT_1M: i8 = -59;

/// A device unseen for this long is considered gone (matches the server's session timeout)
pub const SESSION_TIMEOUT_MS: u64 = 60_000;
