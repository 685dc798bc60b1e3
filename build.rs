use std::{env, error::Error, fs, path::Path};

// Modules shared with the library crate
#[allow(dead_code)]
#[path = "src/device.rs"]
mod device;
#[path = "build/settings.rs"]
mod settings;
#[allow(dead_code)]
#[path = "src/url.rs"]
mod url;
#[allow(dead_code)]
#[path = "src/validate.rs"]
mod validate;

use settings::{RawConfig, CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH, OVERRIDABLE};

fn main() -> Result<(), Box<dyn Error>> {
    let config_path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

    // Tell Cargo to rerun if the toml or any override changes
    println!("cargo:rerun-if-changed={config_path}");
    println!("cargo:rerun-if-env-changed={CONFIG_PATH_VAR}");
    for (key, _) in OVERRIDABLE {
        println!("cargo:rerun-if-env-changed={}", RawConfig::env_var(key));
    }

    // Read, override and validate
    let toml_str = fs::read_to_string(&config_path)
        .map_err(|e| format!("failed to read {config_path}: {e}"))?;
    let (raw, overridden) = settings::load(&toml_str, |var| env::var(var).ok())?;

    for key in overridden {
        println!("cargo:warning={key} overridden from {}", RawConfig::env_var(key));
    }
    for key in raw.placeholders() {
        println!("cargo:warning={key} in {config_path} still holds the template value");
    }

    let device = raw.as_device();
    let server = device.validate()?;

    // Generate Rust code
    let out_dir = env::var("OUT_DIR")?;
    let dest_path = Path::new(&out_dir).join("config.rs");
    fs::write(dest_path, settings::render(&device, &server))?;

    Ok(())
}
