//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Environment variable pointing at the root of the software checkout.
///
/// Parameter files are found under `$FW_GUID_SW_ROOT/params` and sessions are
/// created under `$FW_GUID_SW_ROOT/sessions`.
pub const SW_ROOT_ENV_VAR: &str = "FW_GUID_SW_ROOT";

/// Get the root directory of the software from the environment.
pub fn get_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
