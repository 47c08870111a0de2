//! This module provides the `SystemLoader` struct, responsible for loading L-system
//! documents from files and strings.

use crate::parser::parse;
use crate::types::{LsysError, System};
use std::fs;
use std::path::Path;

/// `SystemLoader` loads `.lsys` documents from individual files and from string content.
pub struct SystemLoader;

impl SystemLoader {
    /// Loads a single system from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(System)` if the file is successfully read and parsed.
    /// * `Err(LsysError::FileError)` if the file cannot be read.
    /// * `Err(LsysError::ParseError)` if the file content is not a valid system.
    pub fn load_system(path: &Path) -> Result<System, LsysError> {
        let content = fs::read_to_string(path).map_err(|e| {
            LsysError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        parse(&content)
    }

    /// Loads a single system from the provided string content.
    pub fn load_system_from_string(content: &str) -> Result<System, LsysError> {
        parse(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const VALID: &str = "name: Test System\nrules:\n  f → f+f";

    fn write(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_valid_system() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.lsys");
        write(&file_path, VALID);

        let system = SystemLoader::load_system(&file_path).unwrap();
        assert_eq!(system.name, "Test System");
        assert_eq!(system.rules.len(), 1);
    }

    #[test]
    fn test_load_invalid_system() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.lsys");
        write(&file_path, "This is not a valid system");

        assert!(SystemLoader::load_system(&file_path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = SystemLoader::load_system(Path::new("/nonexistent/none.lsys"));
        assert!(matches!(result, Err(LsysError::FileError(_))));
    }

    #[test]
    fn test_load_from_string() {
        let system = SystemLoader::load_system_from_string(VALID).unwrap();
        assert_eq!(system.name, "Test System");
    }
}
