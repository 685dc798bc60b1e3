// cfg.toml loader, compiled into build.rs and tests/settings.rs only

use std::fmt;

use serde::Deserialize;

use crate::device::DeviceConfig;
use crate::url::ServerUrl;
use crate::validate;

/// Environment variable selecting an alternate config file.
pub const CONFIG_PATH_VAR: &str = "PRESENCE_CFG";
pub const DEFAULT_CONFIG_PATH: &str = "cfg.toml";

const ENV_PREFIX: &str = "PRESENCE_";
const PLACEHOLDER_PREFIX: &str = "YOUR_";

/// Stores an override value, given the variable it came from.
pub type Setter = fn(&mut RawConfig, String, String) -> Result<(), Error>;

/// Keys that can be overridden from the environment, by constant name.
pub const OVERRIDABLE: [(&str, Setter); 7] = [
    ("WIFI_SSID", |raw, _, value| {
        raw.wifi_ssid = value;
        Ok(())
    }),
    ("WIFI_PASSWORD", |raw, _, value| {
        raw.wifi_password = value;
        Ok(())
    }),
    ("SERVER_URL", |raw, _, value| {
        raw.server_url = value;
        Ok(())
    }),
    ("SENSOR_ID", |raw, _, value| {
        raw.sensor_id = value;
        Ok(())
    }),
    ("LOCATION_NAME", |raw, _, value| {
        raw.location_name = value;
        Ok(())
    }),
    ("SCAN_DURATION", |raw, var, value| {
        raw.scan_duration_seconds = parse_seconds(var, value)?;
        Ok(())
    }),
    ("UPLOAD_INTERVAL", |raw, var, value| {
        raw.upload_interval_seconds = parse_seconds(var, value)?;
        Ok(())
    }),
];

#[derive(Debug)]
pub enum Error {
    Toml(toml::de::Error),
    Override { var: String, value: String },
    Invalid(validate::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Toml(e) => write!(f, "invalid config file: {e}"),
            Error::Override { var, value } => {
                write!(f, "{var}={value:?} is not a number between 0 and 65535")
            }
            Error::Invalid(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Toml(e)
    }
}

impl From<validate::Error> for Error {
    fn from(e: validate::Error) -> Self {
        Error::Invalid(e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub wifi_ssid: String,
    pub wifi_password: String,
    pub server_url: String,
    pub sensor_id: String,
    pub location_name: String,
    pub scan_duration_seconds: u16,
    pub upload_interval_seconds: u16,
}

impl RawConfig {
    pub fn parse(toml_str: &str) -> Result<Self, Error> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Environment variable name for an overridable key.
    pub fn env_var(key: &str) -> String {
        format!("{ENV_PREFIX}{key}")
    }

    /// Replaces fields with values found by `lookup` (keyed by full variable name).
    /// Returns the keys that were overridden.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<Vec<&'static str>, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = Vec::new();
        for (key, set) in OVERRIDABLE {
            let var = Self::env_var(key);
            let Some(value) = lookup(&var) else {
                continue;
            };
            set(self, var, value)?;
            applied.push(key);
        }
        Ok(applied)
    }

    pub fn as_device(&self) -> DeviceConfig<'_> {
        DeviceConfig {
            wifi_ssid: &self.wifi_ssid,
            wifi_password: &self.wifi_password,
            server_url: &self.server_url,
            sensor_id: &self.sensor_id,
            location_name: &self.location_name,
            scan_duration_seconds: self.scan_duration_seconds,
            upload_interval_seconds: self.upload_interval_seconds,
        }
    }

    /// Keys whose value still looks like the unedited template.
    pub fn placeholders(&self) -> Vec<&'static str> {
        [
            ("wifi_ssid", &self.wifi_ssid),
            ("wifi_password", &self.wifi_password),
            ("server_url", &self.server_url),
        ]
        .into_iter()
        .filter(|(_, value)| value.starts_with(PLACEHOLDER_PREFIX) || value.contains("your-server"))
        .map(|(key, _)| key)
        .collect()
    }
}

fn parse_seconds(var: String, value: String) -> Result<u16, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Override { var, value })
}

/// Loads, overrides and validates in one go.
pub fn load<F>(toml_str: &str, lookup: F) -> Result<(RawConfig, Vec<&'static str>), Error>
where
    F: Fn(&str) -> Option<String>,
{
    let mut raw = RawConfig::parse(toml_str)?;
    let applied = raw.apply_overrides(lookup)?;
    raw.as_device().validate()?;
    Ok((raw, applied))
}

/// Renders the constants included by `src/config.rs`.
pub fn render(config: &DeviceConfig<'_>, server: &ServerUrl<'_>) -> String {
    format!(
        r#"
        pub const WIFI_SSID: &str = {ssid:?};
        pub const WIFI_PASSWORD: &str = {psk:?};
        pub const SERVER_URL: &str = {url:?};
        pub const SENSOR_ID: &str = {id:?};
        pub const LOCATION_NAME: &str = {loc:?};
        pub const SCAN_DURATION: u16 = {scan};
        pub const UPLOAD_INTERVAL: u16 = {upload};

        pub const SERVER: ServerUrl<'static> = ServerUrl {{
            scheme: Scheme::{scheme:?},
            host: {host:?},
            port: {port},
            path: {path:?},
        }};

        pub const CONFIG: DeviceConfig<'static> = DeviceConfig {{
            wifi_ssid: WIFI_SSID,
            wifi_password: WIFI_PASSWORD,
            server_url: SERVER_URL,
            sensor_id: SENSOR_ID,
            location_name: LOCATION_NAME,
            scan_duration_seconds: SCAN_DURATION,
            upload_interval_seconds: UPLOAD_INTERVAL,
        }};
    "#,
        ssid = config.wifi_ssid,
        psk = config.wifi_password,
        url = config.server_url,
        id = config.sensor_id,
        loc = config.location_name,
        scan = config.scan_duration_seconds,
        upload = config.upload_interval_seconds,
        scheme = server.scheme,
        host = server.host,
        port = server.port,
        path = server.path,
    )
}
