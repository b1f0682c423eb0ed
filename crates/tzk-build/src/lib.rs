//! Tizen web app build steps: the `tizen` CLI adapter, the web bundler step,
//! platform build layout and the Configure stage.

pub mod certificate;
pub mod configure;
pub mod layout;
pub mod tool;
pub mod web;

pub use certificate::{ensure_author_certificate, AUTHOR_CERT_FILE, DEFAULT_CERT_PASSWORD};
pub use configure::{configure_project, copy_dir_contents, ConfigureError, TemplateValues};
pub use layout::{package_file_name, PlatformLayout};
pub use tool::{is_device_missing, is_not_installed, PlatformTool, TizenCli};
pub use web::{CommandBundler, WebBundler};
