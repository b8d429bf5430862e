use std::{
    fs::{self, File, OpenOptions},
    io::{self, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use log::debug;

use super::DiskError;

/// The filesystem collaborator: a flat directory of files the firmware can address by name
#[derive(Debug, Clone)]
pub struct Volume {
    root: PathBuf,
}

impl Volume {
    /// Opens the directory at `root`, failing if it isn't one
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DiskError> {
        let root = root.into();
        let metadata = fs::metadata(&root).map_err(|source| DiskError::Unavailable {
            root: root.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(DiskError::NotADirectory(root));
        }
        debug!("Opened volume at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a firmware-supplied name onto a path directly inside the root
    pub fn resolve(&self, name: &str) -> Result<PathBuf, DiskError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(|c| matches!(c, '/' | '\\' | '\0'));
        if !valid {
            return Err(DiskError::InvalidName(name.to_owned()));
        }
        Ok(self.root.join(name))
    }

    pub fn open_read(&self, name: &str) -> Result<File, DiskError> {
        Ok(File::open(self.resolve(name)?)?)
    }

    /// Replaces any existing file of that name with an empty one
    pub fn create(&self, name: &str) -> Result<File, DiskError> {
        let path = self.resolve(name)?;
        match fs::remove_file(&path) {
            Ok(()) => debug!("Deleted existing {}", path.display()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => return Err(error.into()),
        }
        Ok(OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?)
    }

    /// Opens an existing file for writing, positioned at its end
    pub fn open_append(&self, name: &str) -> Result<File, DiskError> {
        let mut file = OpenOptions::new().write(true).open(self.resolve(name)?)?;
        file.seek(SeekFrom::End(0))?;
        Ok(file)
    }

    pub fn open_read_write(&self, name: &str) -> Result<File, DiskError> {
        Ok(OpenOptions::new()
            .read(true)
            .write(true)
            .open(self.resolve(name)?)?)
    }

    /// Names of the entries in the root, sorted
    pub fn list(&self) -> Result<Vec<String>, DiskError> {
        let mut names = fs::read_dir(&self.root)?
            .map(|entry| -> io::Result<String> {
                Ok(entry?.file_name().to_string_lossy().into_owned())
            })
            .collect::<io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }

    /// Reads a whole file, used for the firmware image
    pub fn read(&self, name: &str) -> Result<Vec<u8>, DiskError> {
        Ok(fs::read(self.resolve(name)?)?)
    }
}
