#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod constants;
pub mod detection;
pub mod device;
pub mod mac;
pub mod tracker;
pub mod url;
pub mod validate;
