// src/hal/library.rs
//! Vendor library discovery
//!
//! The amplifier SDK ships as a shared library named after the target's
//! pointer width and platform. It is expected next to the host binary; when
//! that directory cannot be determined the bare name is handed to the
//! factory so the platform loader search path applies.
//!
//! The SDK only exists for Linux and Windows. On other targets the names
//! below are still computed, but sessions backed by a vendor factory refuse to
//! prepare with [`BoardError::UnsupportedOperation`].

use crate::error::{BoardError, BoardResult};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Whether the vendor SDK is available for the current target
pub fn platform_supported() -> bool {
    cfg!(any(target_os = "linux", windows))
}

/// Fail with `UnsupportedOperation` on targets without the vendor SDK
pub fn ensure_platform_supported() -> BoardResult<()> {
    check_platform(platform_supported())
}

fn check_platform(supported: bool) -> BoardResult<()> {
    if supported {
        return Ok(());
    }
    error!(os = std::env::consts::OS, "eego SDK is only available on Linux and Windows");
    Err(BoardError::UnsupportedOperation("this platform"))
}

/// File name of the vendor SDK for the current target
pub fn vendor_library_name() -> &'static str {
    library_name_for(cfg!(windows), cfg!(target_pointer_width = "32"))
}

fn library_name_for(windows: bool, pointer_32: bool) -> &'static str {
    match (windows, pointer_32) {
        (true, true) => "eego-SDK32.dll",
        (true, false) => "eego-SDK.dll",
        (false, true) => "libeego-SDK32.so",
        (false, false) => "libeego-SDK.so",
    }
}

/// Directory containing the running executable
fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Path of the vendor library adjacent to the host binary
pub fn resolve_library_path() -> PathBuf {
    let path = library_path_in(executable_dir().as_deref());
    debug!(path = %path.display(), "use dyn lib");
    path
}

fn library_path_in(dir: Option<&Path>) -> PathBuf {
    match dir {
        Some(dir) => dir.join(vendor_library_name()),
        None => PathBuf::from(vendor_library_name()),
    }
}
