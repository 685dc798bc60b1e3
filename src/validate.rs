// Per-field rules for cfg.toml, also compiled into build.rs

use core::fmt;

use crate::url;

/// Longest SSID allowed by 802.11.
pub const SSID_MAX_LEN: usize = 32;
/// WPA2 passphrase bounds. An empty password selects an open network.
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 63;
/// The sensor id doubles as DHCP hostname, which the network stack caps at 32 bytes.
pub const SENSOR_ID_MAX_LEN: usize = 32;
pub const LOCATION_NAME_MAX_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    EmptySsid,
    SsidTooLong(usize),
    PasswordLength(usize),
    ServerUrl(url::Error),
    EmptySensorId,
    SensorIdTooLong(usize),
    SensorIdCharacter(char),
    EmptyLocationName,
    LocationNameTooLong(usize),
    LocationNameControl,
    ZeroScanDuration,
    ZeroUploadInterval,
    ScanExceedsUpload { scan: u16, upload: u16 },
}

impl Error {
    /// Name of the configuration key the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Error::EmptySsid | Error::SsidTooLong(_) => "wifi_ssid",
            Error::PasswordLength(_) => "wifi_password",
            Error::ServerUrl(_) => "server_url",
            Error::EmptySensorId | Error::SensorIdTooLong(_) | Error::SensorIdCharacter(_) => {
                "sensor_id"
            }
            Error::EmptyLocationName
            | Error::LocationNameTooLong(_)
            | Error::LocationNameControl => "location_name",
            Error::ZeroScanDuration => "scan_duration_seconds",
            Error::ZeroUploadInterval | Error::ScanExceedsUpload { .. } => {
                "upload_interval_seconds"
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.field())?;
        match self {
            Error::EmptySsid => f.write_str("must not be empty"),
            Error::SsidTooLong(len) => {
                write!(f, "{len} bytes exceeds the {SSID_MAX_LEN} byte limit")
            }
            Error::PasswordLength(len) => write!(
                f,
                "{len} bytes, expected empty (open network) or {PASSWORD_MIN_LEN}..={PASSWORD_MAX_LEN} bytes"
            ),
            Error::ServerUrl(e) => write!(f, "malformed URL ({e:?})"),
            Error::EmptySensorId => f.write_str("must not be empty"),
            Error::SensorIdTooLong(len) => {
                write!(f, "{len} bytes exceeds the {SENSOR_ID_MAX_LEN} byte limit")
            }
            Error::SensorIdCharacter(c) => {
                write!(f, "{c:?} not allowed, use letters, digits, '_' or '-'")
            }
            Error::EmptyLocationName => f.write_str("must not be empty"),
            Error::LocationNameTooLong(len) => {
                write!(f, "{len} bytes exceeds the {LOCATION_NAME_MAX_LEN} byte limit")
            }
            Error::LocationNameControl => f.write_str("must not contain control characters"),
            Error::ZeroScanDuration => f.write_str("must be at least 1 second"),
            Error::ZeroUploadInterval => f.write_str("must be at least 1 second"),
            Error::ScanExceedsUpload { scan, upload } => write!(
                f,
                "{upload}s is shorter than the {scan}s scan duration"
            ),
        }
    }
}

impl core::error::Error for Error {}

impl From<url::Error> for Error {
    fn from(e: url::Error) -> Self {
        Error::ServerUrl(e)
    }
}

pub fn wifi_ssid(ssid: &str) -> Result<(), Error> {
    match ssid.len() {
        0 => Err(Error::EmptySsid),
        len if len > SSID_MAX_LEN => Err(Error::SsidTooLong(len)),
        _ => Ok(()),
    }
}

pub fn wifi_password(password: &str) -> Result<(), Error> {
    match password.len() {
        0 | PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN => Ok(()),
        len => Err(Error::PasswordLength(len)),
    }
}

pub fn sensor_id(id: &str) -> Result<(), Error> {
    if id.is_empty() {
        return Err(Error::EmptySensorId);
    }
    if let Some(c) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(Error::SensorIdCharacter(c));
    }
    if id.len() > SENSOR_ID_MAX_LEN {
        return Err(Error::SensorIdTooLong(id.len()));
    }
    Ok(())
}

pub fn location_name(name: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::EmptyLocationName);
    }
    if name.chars().any(char::is_control) {
        return Err(Error::LocationNameControl);
    }
    if name.len() > LOCATION_NAME_MAX_LEN {
        return Err(Error::LocationNameTooLong(name.len()));
    }
    Ok(())
}

pub fn intervals(scan_seconds: u16, upload_seconds: u16) -> Result<(), Error> {
    if scan_seconds == 0 {
        return Err(Error::ZeroScanDuration);
    }
    if upload_seconds == 0 {
        return Err(Error::ZeroUploadInterval);
    }
    if scan_seconds > upload_seconds {
        return Err(Error::ScanExceedsUpload {
            scan: scan_seconds,
            upload: upload_seconds,
        });
    }
    Ok(())
}
