use std::{fs, path::Path};

use tracing::{debug, info, warn};

use crate::tool::PlatformTool;

pub const AUTHOR_CERT_FILE: &str = "tizen_author.p12";
pub const DEFAULT_CERT_PASSWORD: &str = "1234";

const AUTHOR_CERT_STEM: &str = "tizen_author";
const AUTHOR_ALIAS: &str = "tzk";

/// Creates the developer author certificate in `config_dir` and registers it as
/// `profile`, unless the certificate already exists.
///
/// Best effort: failures are logged and the run carries on. Returns whether a
/// certificate was created.
pub async fn ensure_author_certificate<T: PlatformTool>(
    tool: &T,
    config_dir: &Path,
    profile: &str,
    password: &str,
) -> bool {
    let p12 = config_dir.join(AUTHOR_CERT_FILE);
    if p12.is_file() {
        debug!("author certificate present at {}", p12.display());
        return false;
    }

    info!("createAuthorCertificate - starting");
    if let Err(err) = fs::create_dir_all(config_dir) {
        warn!("can't create {}: {err}", config_dir.display());
        return false;
    }
    if let Err(err) = tool
        .create_certificate(config_dir, AUTHOR_ALIAS, AUTHOR_CERT_STEM, password)
        .await
    {
        warn!("author certificate not created: {err}");
        return false;
    }

    info!("addSecurityProfile:{profile} - starting");
    if let Err(err) = tool.add_security_profile(profile, &p12, password).await {
        warn!("security profile {profile} not added: {err}");
    }
    true
}
