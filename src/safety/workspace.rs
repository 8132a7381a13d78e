/// Workspace management for request-scoped artifacts
///
/// Each request gets one directory under a fixed root. The directory name
/// carries a v4 UUID, so concurrent requests never collide. Removal is
/// best-effort and happens exactly once: either through `destroy` or, on any
/// other exit path (early return, panic unwind), through `Drop`.
use crate::config::types::{EngineError, Result};
use crate::observability::audit::events;
use std::fs;
use std::io::Write;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// Prefix of every workspace directory name
pub const WORKSPACE_PREFIX: &str = "run-";

/// Mode bits for workspace directories
const DIR_MODE: u32 = 0o700;

/// Mode bits for generated source files
pub const SOURCE_FILE_MODE: u32 = 0o644;

/// An exclusively owned, uniquely named directory for one request
#[derive(Debug)]
pub struct Workspace {
    /// Unique run ID
    run_id: String,
    /// Run-specific workspace directory
    run_dir: PathBuf,
    /// Set once removal has been attempted
    destroyed: bool,
}

impl Workspace {
    fn create_in(root: &Path) -> Result<Self> {
        let run_id = Uuid::new_v4().simple().to_string();
        let run_dir = root.join(format!("{}{}", WORKSPACE_PREFIX, run_id));

        fs::DirBuilder::new()
            .mode(DIR_MODE)
            .create(&run_dir)
            .map_err(|e| {
                EngineError::Resource(format!(
                    "Failed to create workspace directory {}: {}",
                    run_dir.display(),
                    e
                ))
            })?;

        log::debug!("Created workspace {}", run_dir.display());

        Ok(Self {
            run_id,
            run_dir,
            destroyed: false,
        })
    }

    /// Get run ID
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get run directory
    pub fn path(&self) -> &Path {
        &self.run_dir
    }

    /// Write a file with explicit mode bits. Names must be plain file names.
    pub fn write_file(&self, name: &str, contents: &[u8], mode: u32) -> Result<PathBuf> {
        check_file_name(name)?;
        let path = self.run_dir.join(name);

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(mode)
            .open(&path)
            .map_err(|e| {
                EngineError::Resource(format!("Failed to create file {}: {}", path.display(), e))
            })?;
        file.write_all(contents).map_err(|e| {
            EngineError::Resource(format!("Failed to write file {}: {}", path.display(), e))
        })?;
        // The creation mode is filtered by the umask.
        file.set_permissions(fs::Permissions::from_mode(mode))
            .map_err(|e| {
                EngineError::Resource(format!("Failed to set mode on {}: {}", path.display(), e))
            })?;

        Ok(path)
    }

    /// Rename a file inside the workspace
    pub fn rename(&self, from: &str, to: &str) -> Result<PathBuf> {
        check_file_name(from)?;
        check_file_name(to)?;
        let target = self.run_dir.join(to);

        fs::rename(self.run_dir.join(from), &target).map_err(|e| {
            EngineError::Resource(format!("Failed to rename {} to {}: {}", from, to, e))
        })?;

        Ok(target)
    }

    /// Recursively remove the workspace. Never fails; errors are logged.
    pub fn destroy(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        match fs::remove_dir_all(&self.run_dir) {
            Ok(()) => {
                log::debug!("Removed workspace {}", self.run_dir.display());
                events::cleanup_success(&self.run_id);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                log::warn!(
                    "Failed to remove workspace {}: {}",
                    self.run_dir.display(),
                    e
                );
                events::cleanup_failure(&self.run_id, &e.to_string());
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.remove();
    }
}

fn check_file_name(name: &str) -> Result<()> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0');
    if plain {
        Ok(())
    } else {
        Err(EngineError::Validation(format!(
            "invalid workspace file name: {:?}",
            name
        )))
    }
}

/// Allocates workspaces under a fixed root
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    /// Create the manager, creating the root directory if needed
    pub fn new(root: PathBuf) -> Result<Self> {
        fs::DirBuilder::new()
            .recursive(true)
            .mode(DIR_MODE)
            .create(&root)
            .map_err(|e| {
                EngineError::Resource(format!(
                    "Failed to create workspace root {}: {}",
                    root.display(),
                    e
                ))
            })?;

        // An existing root keeps whatever mode it had; tighten it.
        if let Err(e) = fs::set_permissions(&root, fs::Permissions::from_mode(DIR_MODE)) {
            log::warn!(
                "Could not restrict permissions on {}: {}",
                root.display(),
                e
            );
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create new workspace for a request
    pub fn create(&self) -> Result<Workspace> {
        Workspace::create_in(&self.root)
    }

    /// Remove workspaces older than `max_age` left behind by a crashed process.
    /// Only directories carrying the workspace prefix are touched.
    pub fn sweep_stale(&self, max_age: Duration) -> Result<usize> {
        let now = SystemTime::now();
        let mut cleaned = 0;

        let entries = fs::read_dir(&self.root).map_err(|e| {
            EngineError::Resource(format!(
                "Failed to read workspace root {}: {}",
                self.root.display(),
                e
            ))
        })?;

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            if !entry.file_name().to_string_lossy().starts_with(WORKSPACE_PREFIX) {
                continue;
            }

            let path = entry.path();
            let metadata = match fs::symlink_metadata(&path) {
                Ok(m) if m.is_dir() => m,
                Ok(_) => continue,
                Err(e) => {
                    log::warn!("Failed to get metadata for {}: {}", path.display(), e);
                    continue;
                }
            };

            let age = match metadata.modified().map(|m| now.duration_since(m)) {
                Ok(Ok(age)) => age,
                // Future timestamp or no mtime support
                _ => continue,
            };

            if age >= max_age {
                log::info!("Sweeping stale workspace: {}", path.display());
                match fs::remove_dir_all(&path) {
                    Ok(()) => cleaned += 1,
                    Err(e) => {
                        log::warn!("Failed to remove stale workspace {}: {}", path.display(), e)
                    }
                }
            }
        }

        Ok(cleaned)
    }
}
