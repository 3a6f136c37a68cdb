use super::super::types::{Session, User};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{from_slice, to_string_pretty};
use std::path::{Path, PathBuf};

const TOKEN_PATH: &str = "auth_token.json";
const USER_PATH: &str = "auth_user.json";

/// Durable mirror of the session. Read once at startup, written only by the
/// auth orchestrator. Every failure is logged and treated as "no session".
#[derive(Clone, Debug)]
pub struct Repository {
    directory: Option<PathBuf>,
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository {
    pub fn new() -> Self {
        Self {
            directory: data_directory(),
        }
    }

    pub fn with_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
        }
    }

    /// The token is written first, so a reader never finds a user without one
    pub fn save(&self, token: &str, user: &User) -> Result<(), String> {
        let directory = self.directory()?;
        write(directory, TOKEN_PATH, &token)?;
        write(directory, USER_PATH, user)?;
        Ok(())
    }

    /// Replace only the cached profile, keeping the stored token
    pub fn update_user(&self, user: &User) -> Result<(), String> {
        let directory = self.directory()?;
        if !directory.join(TOKEN_PATH).exists() {
            return Err("No stored session to update".to_string());
        }
        write(directory, USER_PATH, user)
    }

    pub fn load(&self) -> Option<Session> {
        let directory = match self.directory() {
            Ok(directory) => directory,
            Err(e) => {
                log::error!("Could not load session: {e}");
                return None;
            }
        };
        let token: String = read(directory, TOKEN_PATH)
            .map_err(|e| log::error!("Could not load token: {e}"))
            .ok()
            .flatten()?;
        let user: User = read(directory, USER_PATH)
            .map_err(|e| log::error!("Could not load user: {e}"))
            .ok()
            .flatten()?;
        if token.is_empty() || user.id.is_empty() {
            return None;
        }
        Some(Session::authenticated(token, user.id.clone()).with_user(user))
    }

    /// The user goes first, so a reader never finds a user without a token
    pub fn clear(&self) -> Result<(), String> {
        let directory = self.directory()?;
        remove(directory, USER_PATH)?;
        remove(directory, TOKEN_PATH)?;
        Ok(())
    }

    fn directory(&self) -> Result<&Path, String> {
        self.directory
            .as_deref()
            .ok_or_else(|| "No folder to save data".to_string())
    }
}

fn read<T: DeserializeOwned>(directory: &Path, name: &str) -> Result<Option<T>, String> {
    let data_path = directory.join(name);
    if !data_path.exists() {
        return Ok(None);
    };
    let data = std::fs::read(&data_path)
        .map_err(|e| format!("Could not read {}: {e:?}", data_path.display()))?;
    let obj: T =
        from_slice(&data).map_err(|e| format!("Could not parse {}: {e:?}", data_path.display()))?;
    Ok(Some(obj))
}

fn write<T: Serialize + ?Sized>(directory: &Path, name: &str, value: &T) -> Result<(), String> {
    let data_path = directory.join(name);
    let data = to_string_pretty(value).map_err(|e| format!("Could not serialize value: {e:?}"))?;
    std::fs::write(&data_path, data)
        .map_err(|e| format!("Could not write to {}: {e:?}", data_path.display()))?;
    Ok(())
}

fn remove(directory: &Path, name: &str) -> Result<(), String> {
    let data_path = directory.join(name);
    match std::fs::remove_file(&data_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("Could not remove {}: {e:?}", data_path.display())),
    }
}

fn data_directory() -> Option<PathBuf> {
    use directories_next::ProjectDirs;
    let Some(proj_dirs) = ProjectDirs::from("com", "plantkeeper", "plantkeeper") else {
        log::error!("Couldn't find a folder to save data");
        return None;
    };
    let dirs = proj_dirs.config_dir().to_path_buf();
    if !dirs.exists() {
        if let Err(e) = std::fs::create_dir_all(&dirs) {
            log::error!("Could not create directory {}: {e:?}", dirs.display());
            return None;
        }
    }
    Some(dirs)
}
