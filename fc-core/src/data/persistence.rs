//! Atomic file replacement for the two persisted stores
//!
//! Both files are shared with other processes (the fancontrol daemon and the
//! data logger) and nobody locks them, so a write goes to a sibling temp file
//! that is synced and then renamed over the target.

use std::ffi::CString;
use std::fs;
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use tracing::debug;

use fc_error::{FanConfigError, Result};

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `contents` to `path` through a temp file and an atomic rename.
/// The permissions of an existing target are carried over.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path);
    let previous_perms = fs::metadata(path).ok().map(|m| m.permissions());

    let result = (|| {
        let mut file = fs::File::create(&temp_path)
            .map_err(|e| FanConfigError::write(&temp_path, e))?;
        file.write_all(contents)
            .map_err(|e| FanConfigError::write(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| FanConfigError::write(&temp_path, e))?;
        drop(file);

        if let Some(perms) = previous_perms {
            fs::set_permissions(&temp_path, perms)
                .map_err(|e| FanConfigError::write(&temp_path, e))?;
        }

        fs::rename(&temp_path, path).map_err(|e| FanConfigError::write(path, e))
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    } else {
        debug!(path = %path.display(), bytes = contents.len(), "Wrote file");
    }
    result
}

/// Whether the current process may write into `dir`.
pub fn dir_writable(dir: &Path) -> bool {
    let Ok(c_path) = CString::new(dir.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: access only reads the NUL-terminated path we own for the
    // duration of the call.
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}
