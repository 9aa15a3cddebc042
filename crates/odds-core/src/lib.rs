#![deny(warnings)]
pub mod enumerate;
pub mod model;
pub mod odds;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "house-odds"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
