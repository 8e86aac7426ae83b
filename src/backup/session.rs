use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use std::path::PathBuf;

/// Supplies the live session directory owned by the host application.
///
/// `None` or an empty path means the host is not running.
pub trait SessionDirProvider {
    fn session_dir(&self) -> Option<PathBuf>;
}

/// Session directory handed over up front, e.g. from the command line.
#[derive(Clone, Debug, Default)]
pub struct FixedSessionDir(pub Option<PathBuf>);

impl SessionDirProvider for FixedSessionDir {
    fn session_dir(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

pub fn resolve_session_dir<P: SessionDirProvider + ?Sized>(provider: &P) -> Result<PathBuf> {
    match provider.session_dir() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            if dir.is_dir() {
                Ok(dir)
            } else {
                Err(Error::NotADirectory(dir))
            }
        }
        _ => Err(Error::NoSessionDir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_session_dir() {
        let res = resolve_session_dir(&FixedSessionDir(None));
        assert!(matches!(res, Err(Error::NoSessionDir)));
    }

    #[test]
    fn test_empty_session_dir() {
        let res = resolve_session_dir(&FixedSessionDir(Some(PathBuf::new())));
        assert!(matches!(res, Err(Error::NoSessionDir)));
    }

    #[test]
    fn test_session_dir_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("session");
        std::fs::write(&file, "").unwrap();

        let res = resolve_session_dir(&FixedSessionDir(Some(file.clone())));
        assert!(matches!(res, Err(Error::NotADirectory(p)) if p == file));
    }

    #[test]
    fn test_valid_session_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dir = resolve_session_dir(&FixedSessionDir(Some(temp_dir.path().into()))).unwrap();
        assert_eq!(dir, temp_dir.path());
    }

    #[test]
    fn test_dyn_provider() {
        struct HostNotRunning;
        impl SessionDirProvider for HostNotRunning {
            fn session_dir(&self) -> Option<PathBuf> {
                None
            }
        }

        let provider: Box<dyn SessionDirProvider> = Box::new(HostNotRunning);
        assert!(resolve_session_dir(provider.as_ref()).is_err());
    }
}
