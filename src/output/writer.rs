use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{Error, ErrorKind, Result};

pub trait Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<()>;
}

/// Terminates every write with the delimiter.
pub struct LineWriter<W> {
    inner: W,
    delim: u8,
}

impl<W: Write> LineWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            delim: b'\n',
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Writer for LineWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.write_all(buf)?;
        self.inner.write_all(&[self.delim])?;
        self.inner.flush()
    }
}

/// Creates the file on first write, so a run that fails before producing
/// output leaves an existing file untouched.
pub struct FileWriter {
    path: PathBuf,
    inner: Option<LineWriter<BufWriter<File>>>,
}

impl FileWriter {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            inner: None,
        }
    }
}

impl Writer for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.inner.is_none() {
            let file = File::create(&self.path)?;
            self.inner = Some(LineWriter::new(BufWriter::new(file)));
        }
        match self.inner.as_mut() {
            Some(inner) => inner.write(buf),
            None => Ok(()),
        }
    }
}

/// Standard output unless a path is given.
pub fn open(path: Option<&Path>) -> Result<Box<dyn Writer>> {
    match path {
        Some(path) if path != Path::new("-") => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                if !dir.is_dir() {
                    return Err(Error::new(
                        ErrorKind::Io,
                        format!("couldn't write {}: no such directory", path.display()),
                    ));
                }
            }
            info!("writing output to {}", path.display());
            Ok(Box::new(FileWriter::new(path)))
        }
        _ => {
            info!("writing output to stdout");
            Ok(Box::new(LineWriter::new(io::stdout())))
        }
    }
}
