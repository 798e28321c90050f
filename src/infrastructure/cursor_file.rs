use crate::domain::event::Cursor;
use crate::domain::ports::CursorStore;
use crate::error::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Cursor persistence as a single text file.
///
/// Saves go through a temp file + rename so a crash mid-write can never
/// leave a truncated cursor behind.
pub struct FileCursorStore {
    path: PathBuf,
}

impl FileCursorStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CursorStore for FileCursorStore {
    fn load(&self) -> Result<Cursor> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Cursor::parse(&contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Cursor::Now),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, cursor: &Cursor) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, cursor.as_str())?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
