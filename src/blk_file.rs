//!
//! Module to access bitcoin-core style blk files
//! that store the integral blockchain
//!
//! A `BlkFileStream` presents an ordered set of blk files as one stream.
//! Only the file at the head of the set is open; it is closed as soon as
//! all of its bytes have been read or skipped.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// The file currently being read
struct OpenFile {
    path:      PathBuf,
    reader:    BufReader<File>,
    remaining: u64,
}

pub struct BlkFileStream {
    files:    VecDeque<PathBuf>,
    current:  Option<OpenFile>,
    position: u64,
}

impl BlkFileStream {

    /// Creates a stream over the given files; no file is opened yet
    pub fn new<I, P>(files: I) -> BlkFileStream
        where I: IntoIterator<Item = P>,
              P: Into<PathBuf>
    {
        BlkFileStream {
            files:    files.into_iter().map(Into::into).collect(),
            current:  None,
            position: 0,
        }
    }

    /// Number of bytes read or skipped since the stream was created
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Path of the open file, if any
    pub fn current_file(&self) -> Option<&Path> {
        self.current.as_ref().map(|f| f.path.as_path())
    }

    /// Files that have not been opened yet
    pub fn pending_files(&self) -> usize {
        self.files.len()
    }

    /// Advances the stream by exactly `count` bytes
    ///
    /// Seeks within the current file when it holds enough bytes, and
    /// closes every file it passes completely. Fails with `EndOfStream`
    /// when the files run out, with the position at the end of the last file.
    pub fn skip(&mut self, count: u64) -> Result<u64> {
        let mut todo = count;

        while todo > 0 {
            let file = match self.current()? {
                Some(file) => file,
                None       => return Err(Error::EndOfStream),
            };

            if file.remaining > todo {
                file.reader.seek_relative(todo as i64)?;
                file.remaining -= todo;
                self.position += todo;
                todo = 0;
            }
            else {
                let skipped = file.remaining;
                self.retire();
                self.position += skipped;
                todo -= skipped;
            }
        }

        Ok(count)
    }

    /// Returns the open file, opening the next one if needed
    fn current(&mut self) -> io::Result<Option<&mut OpenFile>> {
        if self.current.is_none() {
            self.open_next()?;
        }
        Ok(self.current.as_mut())
    }

    /// Opens the next pending file; the path is only dropped from the set
    /// once the file is open
    fn open_next(&mut self) -> io::Result<()> {
        let path = match self.files.front() {
            Some(path) => path.clone(),
            None       => return Ok(()),
        };

        let f = File::open(&path)?;
        let remaining = f.metadata()?.len();
        self.files.pop_front();

        debug!("Opened {} ({} bytes) at stream position {}", path.display(), remaining, self.position);
        self.current = Some(OpenFile {
            path,
            reader: BufReader::new(f),
            remaining,
        });
        Ok(())
    }

    /// Closes the current file
    fn retire(&mut self) {
        if let Some(file) = self.current.take() {
            debug!("Closed {} at stream position {}", file.path.display(), self.position);
        }
    }
}

/// Reads continue into the next file without returning a short read,
/// until all files are exhausted
impl io::Read for BlkFileStream {

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut total = 0;

        while total < buf.len() {
            let step = match self.current() {
                Ok(None)       => break,
                Ok(Some(file)) => {
                    let want = (buf.len() - total).min(file.remaining as usize);
                    match file.reader.read(&mut buf[total..total + want]) {
                        Ok(n) => {
                            file.remaining -= n as u64;
                            Ok((n, file.remaining == 0))
                        },
                        Err(e) => Err(e),
                    }
                },
                Err(e) => Err(e),
            };

            match step {
                // the file shrank since it was opened; treat as done
                Ok((0, _)) => self.retire(),
                Ok((n, done)) => {
                    total += n;
                    self.position += n as u64;
                    if done {
                        self.retire();
                    }
                },
                // bytes already delivered must be reported
                Err(_) if total > 0 => break,
                Err(e) => return Err(e),
            }
        }

        Ok(total)
    }
}

/// Lists the blk*.dat files of a directory, sorted by name
pub fn find_blk_files<P: AsRef<Path>>(dir: P) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();

    for entry in dir.as_ref().read_dir()? {
        let path = entry?.path();
        let is_blk = path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with("blk") && name.ends_with(".dat"))
            .unwrap_or(false);

        if is_blk && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
