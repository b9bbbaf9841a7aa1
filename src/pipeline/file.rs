use std::io::{Read, Write};
use fehler::{throw, throws};

use super::Stage;
use crate::Error;

/// The chunk size used by [`FileSource::new`].
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Pumps the contents of a reader into a pipeline, chunk by chunk.
pub struct FileSource<R> {
    reader: R,
    chunk_size: usize,
    close: bool,
}

impl<R: Read> FileSource<R> {
    pub fn new(reader: R) -> Self {
        FileSource { reader, chunk_size: DEFAULT_CHUNK_SIZE, close: true }
    }

    /// How many bytes to read (and push) at once. Zero is treated as one.
    pub fn chunk_size(mut self, v: usize) -> Self {
        self.chunk_size = v.max(1);
        self
    }

    /// Whether to close the pipeline once the reader is exhausted. Enabled by default.
    pub fn close(mut self, v: bool) -> Self {
        self.close = v;
        self
    }

    /// Push every chunk of the reader into `next` and return the number of bytes pushed.
    ///
    /// Only non-empty chunks are pushed. All chunks except the last are exactly `chunk_size`
    /// bytes long, no matter how the reader splits up its data.
    #[throws]
    pub fn run<S: Stage<Vec<u8>>>(&mut self, mut next: S) -> u64 {
        let mut total = 0u64;
        let mut chunks = 0u64;
        loop {
            // read_exact semantics, except at the end
            let mut chunk = Vec::with_capacity(self.chunk_size);
            self.reader.by_ref().take(self.chunk_size as u64).read_to_end(&mut chunk)?;
            if chunk.is_empty() {
                break;
            }

            total += chunk.len() as u64;
            chunks += 1;
            next.receive(chunk)?;
        }

        tracing::debug!(bytes = total, chunks, "eof reached");
        if self.close {
            next.close()?;
        }
        total
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Writes every item it receives to a writer, verbatim.
pub struct FileSink<W: Write> {
    writer: Option<W>,
    close_writer: bool,
    closed: bool,
    written: u64,
}

impl<W: Write> FileSink<W> {
    pub fn new(writer: W) -> Self {
        FileSink { writer: Some(writer), close_writer: false, closed: false, written: 0 }
    }

    /// Drop (and thereby close) the writer when the sink is closed.
    /// Disabled by default, so the writer can be recovered with [`into_inner`](Self::into_inner).
    pub fn close_writer(mut self, v: bool) -> Self {
        self.close_writer = v;
        self
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// The underlying writer, unless it has been dropped on close.
    pub fn get_ref(&self) -> Option<&W> {
        self.writer.as_ref()
    }

    pub fn into_inner(self) -> Option<W> {
        self.writer
    }

    /// Flushes the writer (and drops it if configured to).
    #[throws]
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        if self.close_writer {
            self.writer = None;
        }
        tracing::debug!(bytes = self.written, "sink done");
    }
}

impl<T: AsRef<[u8]>, W: Write> Stage<T> for FileSink<W> {
    #[throws]
    fn receive(&mut self, item: T) {
        let writer = match self.writer.as_mut() {
            Some(writer) if !self.closed => writer,
            _ => throw!(Error::Closed),
        };
        let item = item.as_ref();
        writer.write_all(item)?;
        self.written += item.len() as u64;
    }

    fn close(&mut self) -> Result<(), Error> {
        FileSink::close(self)
    }
}
