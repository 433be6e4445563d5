//! Key files on disk.
//!
//! A key file holds one line: the 32-byte Ed25519 seed as lowercase hex.
//! `keygen` also writes the public key next to it with a `.pub` suffix.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use deedkit_core::{CoreError, Identity};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Read an identity from a key file.
pub fn load_identity(path: impl AsRef<Path>) -> Result<Identity> {
    let path = path.as_ref();
    let material = fs::read(path).map_err(key_io(path))?;
    let text = String::from_utf8(material)
        .map_err(|_| CoreError::KeyFormat("key file is not hex".into()))?;
    let identity = Identity::from_hex(&text)?;
    debug!(path = %path.display(), public_key = %identity.public_key_hex(), "loaded signing key");
    Ok(identity)
}

/// Write `identity` to `path` (and its public key to `path.pub`), creating
/// parent directories. Existing files are never overwritten.
pub fn write_identity(path: impl AsRef<Path>, identity: &Identity) -> Result<PathBuf> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(key_io(parent))?;
    }
    let public_path = public_key_path(path);
    if public_path.exists() {
        return Err(ClientError::KeyIo {
            path: public_path,
            source: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "file exists"),
        });
    }

    create_new(path, 0o600, &identity.secret_hex())?;
    create_new(&public_path, 0o644, &identity.public_key_hex())?;
    Ok(public_path)
}

/// Write one line to a file that must not exist yet.
fn create_new(path: &Path, mode: u32, line: &str) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = options.open(path).map_err(key_io(path))?;
    writeln!(file, "{}", line).map_err(key_io(path))
}

/// `$HOME/.deedkit/keys/<user>.priv`, with `user` defaulting to `$USER`.
///
/// `None` when no home directory is known.
pub fn default_key_path(user: Option<&str>) -> Option<PathBuf> {
    let home = std::env::var_os("HOME").filter(|h| !h.is_empty())?;
    let user = match user {
        Some(u) => u.to_string(),
        None => std::env::var("USER").unwrap_or_else(|_| "default".into()),
    };
    Some(key_path_in(Path::new(&home), &user))
}

fn key_io(path: &Path) -> impl FnOnce(std::io::Error) -> ClientError {
    let path = path.to_path_buf();
    move |source| ClientError::KeyIo { path, source }
}

fn key_path_in(home: &Path, user: &str) -> PathBuf {
    home.join(".deedkit")
        .join("keys")
        .join(format!("{}.priv", user))
}

fn public_key_path(private: &Path) -> PathBuf {
    private.with_extension("pub")
}
