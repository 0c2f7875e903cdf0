//! Shared UI crate for Trailmark. The progress pipeline and every view live here;
//! the desktop and web crates only add routing and launch configuration.

pub mod core;
pub mod i18n;
pub mod progress;
pub mod views;

pub mod components {
    pub mod app_navbar;
    pub use app_navbar::register_nav;
    pub use app_navbar::AppNavbar;
    pub use app_navbar::NavBuilder;

    pub mod login;
    pub use login::LoginPrompt;
}
