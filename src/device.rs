use crate::url::ServerUrl;
use crate::validate::{self, Error};

/// Everything one physical sensor needs to know about its deployment.
///
/// The firmware uses `config::CONFIG`; `build.rs` builds one of these from
/// `cfg.toml` to validate it before rendering the constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig<'a> {
    // Wi-Fi SSID to connect to
    pub wifi_ssid: &'a str,

    // Wi-Fi pre-shared key (password), empty for an open network
    pub wifi_password: &'a str,

    // Endpoint detection reports are POSTed to
    pub server_url: &'a str,

    // Unique id of this unit (also used as DHCP hostname)
    pub sensor_id: &'a str,

    // Human readable deployment site, sent with every report
    pub location_name: &'a str,

    // Length of each BLE discovery scan in seconds
    pub scan_duration_seconds: u16,

    // Upload cadence in seconds
    pub upload_interval_seconds: u16,
}

impl<'a> DeviceConfig<'a> {
    /// Checks every field and returns the parsed server endpoint.
    pub fn validate(&self) -> Result<ServerUrl<'a>, Error> {
        validate::wifi_ssid(self.wifi_ssid)?;
        validate::wifi_password(self.wifi_password)?;
        let server = ServerUrl::parse(self.server_url)?;
        validate::sensor_id(self.sensor_id)?;
        validate::location_name(self.location_name)?;
        validate::intervals(self.scan_duration_seconds, self.upload_interval_seconds)?;
        Ok(server)
    }

    /// Number of whole scans that fit in one upload interval, at least one.
    pub const fn scans_per_upload(&self) -> u16 {
        if self.scan_duration_seconds == 0 {
            return 1;
        }
        let scans = self.upload_interval_seconds / self.scan_duration_seconds;
        if scans == 0 {
            1
        } else {
            scans
        }
    }

    pub fn is_open_network(&self) -> bool {
        self.wifi_password.is_empty()
    }
}
