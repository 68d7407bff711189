//! chromadesk-infra: OS adapters (Bing metadata, HTTP downloads, desktop backends, config file).

pub mod bing;
pub mod clock;
pub mod config;
pub mod env_detect;
pub mod http;
pub mod logging;
pub mod notify;
pub mod paths;
pub mod wallpaper;

mod atomic;

#[cfg(test)]
mod test_support;
