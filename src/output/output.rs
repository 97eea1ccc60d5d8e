use super::encoder::{Encoder, Report};
use super::writer::Writer;
use crate::error::{ErrorKind, Result};

pub struct Output {
    writer: Box<dyn Writer>,
    encoder: Box<dyn Encoder>,
}

impl Output {
    pub fn new(writer: Box<dyn Writer>, encoder: Box<dyn Encoder>) -> Self {
        Self { writer, encoder }
    }

    /// Encodes the whole report before touching the writer.
    pub fn write(&mut self, report: &Report) -> Result<()> {
        let buf = self.encoder.encode(report)?;
        self.write_raw(&buf)
    }

    pub fn write_raw(&mut self, buf: &[u8]) -> Result<()> {
        self.writer
            .write(buf)
            .map_err(|e| (ErrorKind::Io, "writer failed", e))?;
        Ok(())
    }
}
