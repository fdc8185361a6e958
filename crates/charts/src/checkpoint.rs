use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::warn;

use crate::{
    chart::write_file_atomic,
    errors::{ChartsError, Severity},
};

/// resume pointer of one (network, resolution) pair
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Checkpoint {
    /// height of the block that closed the last committed cycle
    pub height: u64,
    pub blockchain_size: u64,
}

#[derive(Clone, Debug)]
pub struct CheckpointFiles {
    pub height: PathBuf,
    pub blockchain_size: PathBuf,
}

impl CheckpointFiles {
    pub fn new(dir: &Path, suffix: &str) -> Self {
        CheckpointFiles {
            height: dir.join(format!("height_{suffix}")),
            blockchain_size: dir.join(format!("blockchain_size_{suffix}")),
        }
    }

    pub fn load(&self) -> Result<Checkpoint, ChartsError> {
        Ok(Checkpoint {
            height: load_value(&self.height)?,
            blockchain_size: load_value(&self.blockchain_size)?,
        })
    }

    /// writes the size before the height
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<(), ChartsError> {
        save_value(&self.blockchain_size, checkpoint.blockchain_size)?;
        save_value(&self.height, checkpoint.height)
    }
}

/// reads a checkpoint scalar, absent or unparseable values read as 0
pub fn load_value(path: &Path) -> Result<u64, ChartsError> {
    match read_value(path) {
        Err(err) if err.severity() == Severity::Default => {
            warn!(path = %path.display(), error = %err, "checkpoint reset to 0");
            Ok(0)
        }
        other => other,
    }
}

pub fn save_value(path: &Path, value: u64) -> Result<(), ChartsError> {
    write_file_atomic(path, value.to_string().as_bytes())
}

fn read_value(path: &Path) -> Result<u64, ChartsError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
        Err(err) if err.kind() == ErrorKind::InvalidData => {
            return Err(ChartsError::Checkpoint {
                path: path.to_path_buf(),
                value: "<non utf-8>".into(),
            });
        }
        Err(err) => return Err(ChartsError::io(path, err)),
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| ChartsError::Checkpoint {
            path: path.to_path_buf(),
            value: trimmed.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_empty_and_garbage_read_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("height_1d");
        assert_eq!(load_value(&path).unwrap(), 0);
        fs::write(&path, "").unwrap();
        assert_eq!(load_value(&path).unwrap(), 0);
        fs::write(&path, "12ab").unwrap();
        assert_eq!(load_value(&path).unwrap(), 0);
        fs::write(&path, "-5").unwrap();
        assert_eq!(load_value(&path).unwrap(), 0);
        assert!(matches!(
            read_value(&path),
            Err(ChartsError::Checkpoint { .. })
        ));
    }

    #[test]
    fn save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net").join("blockchain_size_1h");
        save_value(&path, 123_456).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "123456");
        save_value(&path, 7).unwrap();
        assert_eq!(load_value(&path).unwrap(), 7);
        fs::write(&path, "42\n").unwrap();
        assert_eq!(load_value(&path).unwrap(), 42);
    }

    #[test]
    fn checkpoint_files_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let files = CheckpointFiles::new(dir.path(), "1d");
        assert_eq!(files.load().unwrap(), Checkpoint::default());
        let checkpoint = Checkpoint {
            height: 1_441,
            blockchain_size: 9_000_000,
        };
        files.save(&checkpoint).unwrap();
        assert_eq!(files.load().unwrap(), checkpoint);
        assert!(dir.path().join("height_1d").exists());
        assert!(dir.path().join("blockchain_size_1d").exists());
    }
}
