use embassy_time::Duration;

pub use crate::device::DeviceConfig;
pub use crate::url::{Scheme, ServerUrl};

pub use self::generated_config::*;
mod generated_config {
    use crate::device::DeviceConfig;
    use crate::url::{Scheme, ServerUrl};

    // config values are generated at compile time from cfg.toml
    include!(concat!(env!("OUT_DIR"), "/config.rs"));
}

// intervals must stay positive and ordered
const _: () = assert!(SCAN_DURATION > 0);
const _: () = assert!(UPLOAD_INTERVAL > 0);
const _: () = assert!(SCAN_DURATION <= UPLOAD_INTERVAL);

impl DeviceConfig<'_> {
    pub fn scan_duration(&self) -> Duration {
        Duration::from_secs(self.scan_duration_seconds.into())
    }

    pub fn upload_interval(&self) -> Duration {
        Duration::from_secs(self.upload_interval_seconds.into())
    }
}
