//! Per-handle state: sequential text I/O or a fixed-record random file
//! (SPEC_FULL.md §4.G.1).

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};

use crate::error::FilesError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Input,
    Output,
    Append,
    Random,
}

/// One `FIELD`-declared projection: a fixed-width byte range of the record
/// buffer mirrored into a named variable (spec.md §4.G).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub offset: usize,
    pub width: usize,
    pub var: String,
}

#[derive(Debug)]
pub enum FileHandle {
    SequentialRead(BufReader<File>),
    SequentialWrite(BufWriter<File>),
    SequentialAppend(BufWriter<File>),
    Random {
        file: File,
        record_len: usize,
        fields: Vec<FieldSpec>,
        buffer: Vec<u8>,
    },
}

impl FileHandle {
    pub fn mode(&self) -> OpenMode {
        match self {
            FileHandle::SequentialRead(_) => OpenMode::Input,
            FileHandle::SequentialWrite(_) => OpenMode::Output,
            FileHandle::SequentialAppend(_) => OpenMode::Append,
            FileHandle::Random { .. } => OpenMode::Random,
        }
    }

    /// `Write #n` / `Print #n`: appends raw text and flushes immediately so
    /// a concurrent reader (or a later `OPEN ... FOR INPUT` in the same
    /// run) sees it without requiring an explicit `CLOSE`.
    pub fn write_text(&mut self, text: &str) -> Result<(), FilesError> {
        match self {
            FileHandle::SequentialWrite(w) | FileHandle::SequentialAppend(w) => {
                w.write_all(text.as_bytes())?;
                w.flush()?;
                Ok(())
            }
            _ => Err(FilesError::Io(std::io::Error::other(
                "file not open for output",
            ))),
        }
    }

    /// `Line Input #n` / `Input #n`: one CRLF- or LF-delimited record, or
    /// `None` at end of file.
    pub fn read_line(&mut self) -> Result<Option<String>, FilesError> {
        match self {
            FileHandle::SequentialRead(r) => {
                let mut line = String::new();
                let n = r.read_line(&mut line)?;
                if n == 0 {
                    return Ok(None);
                }
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Ok(Some(line))
            }
            _ => Err(FilesError::Io(std::io::Error::other(
                "file not open for input",
            ))),
        }
    }

    pub fn at_eof(&mut self) -> Result<bool, FilesError> {
        match self {
            FileHandle::SequentialRead(r) => Ok(r.fill_buf()?.is_empty()),
            FileHandle::Random { file, record_len, .. } => {
                let pos = file.stream_position()?;
                let len = file.metadata()?.len();
                Ok(*record_len == 0 || pos >= len)
            }
            _ => Ok(true),
        }
    }

    /// `Loc(n)`: current record/byte position.
    pub fn loc(&mut self) -> Result<u64, FilesError> {
        match self {
            FileHandle::Random { file, record_len, .. } => {
                let pos = file.stream_position()?;
                Ok(if *record_len == 0 {
                    0
                } else {
                    pos / *record_len as u64
                })
            }
            FileHandle::SequentialRead(r) => Ok(r.stream_position().unwrap_or(0)),
            _ => Ok(0),
        }
    }

    /// `Lof(n)`: total file length in bytes.
    pub fn lof(&self) -> Result<u64, FilesError> {
        match self {
            FileHandle::Random { file, .. } => Ok(file.metadata()?.len()),
            FileHandle::SequentialRead(r) => Ok(r.get_ref().metadata()?.len()),
            FileHandle::SequentialWrite(w) | FileHandle::SequentialAppend(w) => {
                Ok(w.get_ref().metadata()?.len())
            }
        }
    }

    /// `GET #n[, record]` — positions and reads one fixed-length record
    /// into the buffer (spec.md §4.G).
    pub fn get_record(&mut self, record: Option<u32>) -> Result<(), FilesError> {
        match self {
            FileHandle::Random {
                file,
                record_len,
                buffer,
                ..
            } => {
                if let Some(rec) = record {
                    file.seek(SeekFrom::Start((rec as u64 - 1) * *record_len as u64))?;
                }
                buffer.resize(*record_len, 0);
                let n = file.read(buffer)?;
                if n < *record_len {
                    buffer[n..].fill(0);
                }
                Ok(())
            }
            _ => Err(FilesError::Io(std::io::Error::other(
                "GET requires a random-access file",
            ))),
        }
    }

    /// `PUT #n[, record]` — writes the buffer back at `(record-1)*len`.
    pub fn put_record(&mut self, record: Option<u32>) -> Result<(), FilesError> {
        match self {
            FileHandle::Random {
                file,
                record_len,
                buffer,
                ..
            } => {
                if let Some(rec) = record {
                    file.seek(SeekFrom::Start((rec as u64 - 1) * *record_len as u64))?;
                }
                buffer.resize(*record_len, 0);
                file.write_all(buffer)?;
                file.flush()?;
                Ok(())
            }
            _ => Err(FilesError::Io(std::io::Error::other(
                "PUT requires a random-access file",
            ))),
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        match self {
            FileHandle::Random { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn set_fields(&mut self, specs: Vec<FieldSpec>) {
        if let FileHandle::Random { fields, .. } = self {
            *fields = specs;
        }
    }

    /// The text mirrored from the record buffer for a named `FIELD` var.
    pub fn field_text(&self, var: &str) -> Option<String> {
        if let FileHandle::Random { fields, buffer, .. } = self {
            let spec = fields.iter().find(|f| f.var.eq_ignore_ascii_case(var))?;
            let end = (spec.offset + spec.width).min(buffer.len());
            if spec.offset >= end {
                return Some(String::new());
            }
            Some(String::from_utf8_lossy(&buffer[spec.offset..end]).into_owned())
        } else {
            None
        }
    }

    /// `LSET`/`RSET` write directly into the named field's byte range,
    /// left- or right-justified and space-padded/truncated to its width.
    pub fn set_field_justified(&mut self, var: &str, value: &str, left: bool) {
        if let FileHandle::Random { fields, buffer, .. } = self {
            if let Some(spec) = fields.iter().find(|f| f.var.eq_ignore_ascii_case(var)) {
                let (offset, width) = (spec.offset, spec.width);
                if buffer.len() < offset + width {
                    buffer.resize(offset + width, b' ');
                }
                let bytes = value.as_bytes();
                let mut cell = vec![b' '; width];
                if left {
                    let n = bytes.len().min(width);
                    cell[..n].copy_from_slice(&bytes[..n]);
                } else {
                    let n = bytes.len().min(width);
                    cell[width - n..].copy_from_slice(&bytes[bytes.len() - n..]);
                }
                buffer[offset..offset + width].copy_from_slice(&cell);
            }
        }
    }

    pub fn close(&mut self) -> Result<(), FilesError> {
        match self {
            FileHandle::SequentialWrite(w) | FileHandle::SequentialAppend(w) => {
                w.flush()?;
                Ok(())
            }
            FileHandle::Random { file, .. } => {
                file.flush()?;
                Ok(())
            }
            FileHandle::SequentialRead(_) => Ok(()),
        }
    }
}
