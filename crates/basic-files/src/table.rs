//! Small-integer-keyed file handle table (spec.md §4.G).

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use crate::error::FilesError;
use crate::handle::{FieldSpec, FileHandle, OpenMode};

#[derive(Debug, Default)]
pub struct FileTable {
    handles: HashMap<u32, FileHandle>,
}

fn classify_open_error(e: io::Error, path: &str) -> FilesError {
    match e.kind() {
        io::ErrorKind::NotFound => FilesError::FileNotFound(path.to_string()),
        _ => FilesError::Io(e),
    }
}

impl FileTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self, num: u32) -> bool {
        self.handles.contains_key(&num)
    }

    /// Every currently-open file number, for `LSET`/`RSET` to scan when
    /// looking for the handle that owns a given `FIELD` variable.
    pub fn open_numbers(&self) -> Vec<u32> {
        let mut nums: Vec<u32> = self.handles.keys().copied().collect();
        nums.sort_unstable();
        nums
    }

    /// `OPEN path FOR mode AS #num [LEN = record_len]` (spec.md §4.G, §7
    /// code 55 on a number collision).
    pub fn open(
        &mut self,
        num: u32,
        path: &str,
        mode: OpenMode,
        record_len: Option<usize>,
    ) -> Result<(), FilesError> {
        if self.handles.contains_key(&num) {
            return Err(FilesError::FileAlreadyOpen(num));
        }
        let handle = match mode {
            OpenMode::Input => {
                let f = File::open(path).map_err(|e| classify_open_error(e, path))?;
                FileHandle::SequentialRead(io::BufReader::new(f))
            }
            OpenMode::Output => {
                let f = File::create(path)?;
                FileHandle::SequentialWrite(io::BufWriter::new(f))
            }
            OpenMode::Append => {
                let f = OpenOptions::new().create(true).append(true).open(path)?;
                FileHandle::SequentialAppend(io::BufWriter::new(f))
            }
            OpenMode::Random => {
                let f = OpenOptions::new()
                    .create(true)
                    .read(true)
                    .write(true)
                    .open(path)?;
                FileHandle::Random {
                    file: f,
                    record_len: record_len.unwrap_or(128),
                    fields: Vec::new(),
                    buffer: vec![0u8; record_len.unwrap_or(128)],
                }
            }
        };
        self.handles.insert(num, handle);
        Ok(())
    }

    pub fn get(&self, num: u32) -> Result<&FileHandle, FilesError> {
        self.handles.get(&num).ok_or(FilesError::NotOpen(num))
    }

    pub fn get_mut(&mut self, num: u32) -> Result<&mut FileHandle, FilesError> {
        self.handles.get_mut(&num).ok_or(FilesError::NotOpen(num))
    }

    pub fn close(&mut self, num: u32) -> Result<(), FilesError> {
        if let Some(mut h) = self.handles.remove(&num) {
            h.close()?;
        }
        Ok(())
    }

    /// `CLOSE` with no arguments: every open handle (spec.md §5 "any open
    /// files are closed on Reset").
    pub fn close_all(&mut self) {
        for (_, mut h) in self.handles.drain() {
            let _ = h.close();
        }
    }

    pub fn write_text(&mut self, num: u32, text: &str) -> Result<(), FilesError> {
        self.get_mut(num)?.write_text(text)
    }

    pub fn read_line(&mut self, num: u32) -> Result<Option<String>, FilesError> {
        self.get_mut(num)?.read_line()
    }

    /// `Input past end` (code 62) convenience: reads a line, failing with
    /// the typed error at end of file instead of returning `None`.
    pub fn read_line_required(&mut self, num: u32) -> Result<String, FilesError> {
        self.read_line(num)?.ok_or(FilesError::InputPastEnd(num))
    }

    pub fn eof(&mut self, num: u32) -> Result<bool, FilesError> {
        self.get_mut(num)?.at_eof()
    }

    pub fn lof(&self, num: u32) -> Result<u64, FilesError> {
        self.get(num)?.lof()
    }

    pub fn loc(&mut self, num: u32) -> Result<u64, FilesError> {
        self.get_mut(num)?.loc()
    }

    /// `FIELD #num, w1 AS v1, w2 AS v2, ...` — lays out byte offsets in
    /// declaration order.
    pub fn set_field(&mut self, num: u32, decls: &[(usize, String)]) -> Result<(), FilesError> {
        let mut offset = 0usize;
        let mut specs = Vec::with_capacity(decls.len());
        for (width, var) in decls {
            specs.push(FieldSpec {
                offset,
                width: *width,
                var: var.clone(),
            });
            offset += *width;
        }
        self.get_mut(num)?.set_fields(specs);
        Ok(())
    }

    pub fn get_record(&mut self, num: u32, record: Option<u32>) -> Result<(), FilesError> {
        self.get_mut(num)?.get_record(record)
    }

    pub fn put_record(&mut self, num: u32, record: Option<u32>) -> Result<(), FilesError> {
        self.get_mut(num)?.put_record(record)
    }

    pub fn field_text(&self, num: u32, var: &str) -> Result<String, FilesError> {
        Ok(self.get(num)?.field_text(var).unwrap_or_default())
    }

    pub fn lset(&mut self, num: u32, var: &str, value: &str) -> Result<(), FilesError> {
        self.get_mut(num)?.set_field_justified(var, value, true);
        Ok(())
    }

    pub fn rset(&mut self, num: u32, var: &str, value: &str) -> Result<(), FilesError> {
        self.get_mut(num)?.set_field_justified(var, value, false);
        Ok(())
    }

    /// `KILL path` (spec.md §4, code 53 if absent).
    pub fn kill(&self, path: &str) -> Result<(), FilesError> {
        std::fs::remove_file(path).map_err(|e| classify_open_error(e, path))
    }

    /// `NAME old AS new` (code 76 if the destination directory is absent).
    pub fn name(&self, old: &str, new: &str) -> Result<(), FilesError> {
        std::fs::rename(old, new).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                if Path::new(new).parent().is_some_and(|p| !p.as_os_str().is_empty() && !p.exists())
                {
                    FilesError::PathNotFound(new.to_string())
                } else {
                    FilesError::FileNotFound(old.to_string())
                }
            }
            _ => FilesError::Io(e),
        })
    }

    /// `FILES [path]` — directory listing (spec.md §4). Returns file/
    /// directory names only, not full paths.
    pub fn files(&self, path: Option<&str>) -> Result<Vec<String>, FilesError> {
        let dir = path.unwrap_or(".");
        let mut out = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|e| classify_open_error(e, dir))? {
            let entry = entry?;
            out.push(entry.file_name().to_string_lossy().into_owned());
        }
        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn sequential_write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        let mut table = FileTable::new();
        table
            .open(1, path.to_str().unwrap(), OpenMode::Output, None)
            .unwrap();
        table.write_text(1, "HELLO\r\n").unwrap();
        table.close(1).unwrap();

        table
            .open(2, path.to_str().unwrap(), OpenMode::Input, None)
            .unwrap();
        assert_eq!(table.read_line(2).unwrap(), Some("HELLO".to_string()));
        assert_eq!(table.read_line(2).unwrap(), None);
        assert!(table.eof(2).unwrap());
    }

    #[test]
    fn opening_an_already_open_number_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.txt");
        let mut table = FileTable::new();
        table
            .open(1, path.to_str().unwrap(), OpenMode::Output, None)
            .unwrap();
        let err = table
            .open(1, path.to_str().unwrap(), OpenMode::Output, None)
            .unwrap_err();
        assert!(matches!(err, FilesError::FileAlreadyOpen(1)));
    }

    #[test]
    fn random_access_field_get_put_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.dat");
        let mut table = FileTable::new();
        table
            .open(1, path.to_str().unwrap(), OpenMode::Random, Some(20))
            .unwrap();
        table
            .set_field(1, &[(10, "NAME$".into()), (10, "CITY$".into())])
            .unwrap();
        table.lset(1, "NAME$", "ADA").unwrap();
        table.lset(1, "CITY$", "LONDON").unwrap();
        table.put_record(1, Some(1)).unwrap();

        table.get_record(1, Some(1)).unwrap();
        assert_eq!(table.field_text(1, "NAME$").unwrap().trim_end(), "ADA");
        assert_eq!(table.field_text(1, "CITY$").unwrap().trim_end(), "LONDON");
    }

    #[test]
    fn kill_removes_a_file_and_reports_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("k.txt");
        std::fs::File::create(&path).unwrap().write_all(b"x").unwrap();
        let table = FileTable::new();
        table.kill(path.to_str().unwrap()).unwrap();
        assert!(!path.exists());
        assert!(table.kill(path.to_str().unwrap()).is_err());
    }
}
