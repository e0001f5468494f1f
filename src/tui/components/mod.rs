// Components module - reusable UI building blocks
//
// Shell components are rendered around every screen:
// - Title bar: app name, current screen, loading indicator
// - Logs panel: tail of the captured log entries
// - Status bar: backend URL, screen, in-flight requests, key hints

pub mod logs_panel;
pub mod status_bar;
pub mod title_bar;
pub mod toast;

pub use toast::Toast;
