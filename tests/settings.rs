#[allow(dead_code)]
#[path = "../src/device.rs"]
mod device;
#[allow(dead_code)]
#[path = "../build/settings.rs"]
mod settings;
#[allow(dead_code)]
#[path = "../src/url.rs"]
mod url;
#[allow(dead_code)]
#[path = "../src/validate.rs"]
mod validate;

use std::collections::HashMap;

use settings::{Error, RawConfig};

const TEMPLATE: &str = include_str!("../cfg.toml");

const VALID: &str = r#"
wifi_ssid = "Shop WiFi"
wifi_password = "hunter2hunter2"
server_url = "https://ingest.example.com/api/detections"
sensor_id = "SENSOR_042"
location_name = "Front entrance"
scan_duration_seconds = 10
upload_interval_seconds = 60
"#;

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn shipped_template_loads() {
    let (raw, overridden) = settings::load(TEMPLATE, no_env).unwrap();
    assert!(overridden.is_empty());
    assert_eq!(raw.sensor_id, "SENSOR_001");
    assert_eq!(raw.location_name, "Location A");
    assert_eq!(raw.scan_duration_seconds, 5);
    assert_eq!(raw.upload_interval_seconds, 30);
    assert_eq!(
        raw.placeholders(),
        ["wifi_ssid", "wifi_password", "server_url"]
    );
}

#[test]
fn edited_config_has_no_placeholders() {
    let (raw, _) = settings::load(VALID, no_env).unwrap();
    assert!(raw.placeholders().is_empty());
    let server = raw.as_device().validate().unwrap();
    assert!(server.is_tls());
    assert_eq!(server.port, 443);
}

#[test]
fn duplicate_key_is_rejected() {
    let doubled = format!("{VALID}sensor_id = \"SENSOR_043\"\n");
    assert!(matches!(RawConfig::parse(&doubled), Err(Error::Toml(_))));
}

#[test]
fn missing_and_unknown_keys_are_rejected() {
    let missing = VALID.replace("location_name = \"Front entrance\"\n", "");
    assert!(matches!(RawConfig::parse(&missing), Err(Error::Toml(_))));

    let unknown = format!("{VALID}mqtt_topic = \"sensors\"\n");
    assert!(matches!(RawConfig::parse(&unknown), Err(Error::Toml(_))));
}

#[test]
fn negative_interval_is_a_parse_error() {
    let negative = VALID.replace("scan_duration_seconds = 10", "scan_duration_seconds = -1");
    assert!(matches!(RawConfig::parse(&negative), Err(Error::Toml(_))));
}

#[test]
fn zero_interval_fails_validation() {
    let zero = VALID.replace("upload_interval_seconds = 60", "upload_interval_seconds = 0");
    assert!(matches!(
        settings::load(&zero, no_env),
        Err(Error::Invalid(validate::Error::ZeroUploadInterval))
    ));
}

#[test]
fn malformed_url_fails_validation() {
    let bad = VALID.replace("https://ingest.example.com", "ingest.example.com");
    assert!(matches!(
        settings::load(&bad, no_env),
        Err(Error::Invalid(validate::Error::ServerUrl(
            url::Error::MissingScheme
        )))
    ));
}

#[test]
fn environment_overrides_file_values() {
    let env: HashMap<&str, &str> = [
        ("PRESENCE_SENSOR_ID", "SENSOR_099"),
        ("PRESENCE_UPLOAD_INTERVAL", " 120 "),
    ]
    .into_iter()
    .collect();

    let (raw, overridden) =
        settings::load(VALID, |var| env.get(var).map(|v| v.to_string())).unwrap();
    assert_eq!(overridden, ["SENSOR_ID", "UPLOAD_INTERVAL"]);
    assert_eq!(raw.sensor_id, "SENSOR_099");
    assert_eq!(raw.upload_interval_seconds, 120);
    assert_eq!(raw.wifi_ssid, "Shop WiFi");
}

#[test]
fn every_key_can_be_overridden() {
    let env: HashMap<&str, &str> = [
        ("PRESENCE_WIFI_SSID", "Lab"),
        ("PRESENCE_WIFI_PASSWORD", "labpassword"),
        ("PRESENCE_SERVER_URL", "https://presence.example.com/api/detections"),
        ("PRESENCE_SENSOR_ID", "LAB_1"),
        ("PRESENCE_LOCATION_NAME", "Lab"),
        ("PRESENCE_SCAN_DURATION", "10"),
        ("PRESENCE_UPLOAD_INTERVAL", "60"),
    ]
    .into_iter()
    .collect();

    let (raw, overridden) =
        settings::load(VALID, |var| env.get(var).map(|v| v.to_string())).unwrap();
    let keys: Vec<&str> = settings::OVERRIDABLE.iter().map(|(key, _)| *key).collect();
    assert_eq!(overridden, keys);
    assert_eq!(
        raw,
        RawConfig {
            wifi_ssid: "Lab".into(),
            wifi_password: "labpassword".into(),
            server_url: "https://presence.example.com/api/detections".into(),
            sensor_id: "LAB_1".into(),
            location_name: "Lab".into(),
            scan_duration_seconds: 10,
            upload_interval_seconds: 60,
        }
    );
}

#[test]
fn bad_numeric_override_names_the_variable() {
    let err = settings::load(VALID, |var| {
        (var == "PRESENCE_SCAN_DURATION").then(|| "five".to_string())
    })
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "PRESENCE_SCAN_DURATION=\"five\" is not a number between 0 and 65535"
    );
}

#[test]
fn overrides_are_validated_too() {
    let result = settings::load(VALID, |var| {
        (var == "PRESENCE_SENSOR_ID").then(|| "front door".to_string())
    });
    assert!(matches!(
        result,
        Err(Error::Invalid(validate::Error::SensorIdCharacter(' ')))
    ));
}

#[test]
fn render_defines_each_constant_once() {
    let (raw, _) = settings::load(VALID, no_env).unwrap();
    let device = raw.as_device();
    let server = device.validate().unwrap();
    let code = settings::render(&device, &server);

    for name in [
        "WIFI_SSID",
        "WIFI_PASSWORD",
        "SERVER_URL",
        "SENSOR_ID",
        "LOCATION_NAME",
        "SCAN_DURATION",
        "UPLOAD_INTERVAL",
        "SERVER",
        "CONFIG",
    ] {
        let decl = format!("pub const {name}:");
        assert_eq!(code.matches(&decl).count(), 1, "{name}");
    }
    assert!(code.contains("pub const SENSOR_ID: &str = \"SENSOR_042\";"));
    assert!(code.contains("scheme: Scheme::Https,"));
    assert!(code.contains("host: \"ingest.example.com\","));
    assert!(code.contains("path: \"/api/detections\","));
}

#[test]
fn render_escapes_string_values() {
    let config = VALID.replace("Front entrance", "Aisle \\\"7\\\"");
    let (raw, _) = settings::load(&config, no_env).unwrap();
    assert_eq!(raw.location_name, "Aisle \"7\"");
    let device = raw.as_device();
    let server = device.validate().unwrap();
    let code = settings::render(&device, &server);
    assert!(code.contains(r#"pub const LOCATION_NAME: &str = "Aisle \"7\"";"#));
}
