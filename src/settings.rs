use std::io::{Read, Write};
use fehler::throws;

use crate::lz::{Decoder, Encoder};
use crate::pipeline::{FileSink, FileSource, Splitter, DEFAULT_CHUNK_SIZE};
use crate::Error;

/// What a finished compression or decompression run did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Bytes read from the input.
    pub bytes_in: u64,
    /// Bytes written to the output.
    pub bytes_out: u64,
    /// Complete blocks produced (compression) or consumed (decompression).
    pub blocks: u64,
    /// Whether the stream ended with a pointer-only block.
    pub trailing: bool,
}

/// A builder-style struct that configures a codec run.
/// This is how you (de)compress one already opened stream into another.
///
/// Create it using `Default::default()`.
///
/// ```
/// use plz::CodecSettings;
///
/// let mut compressed = Vec::new();
/// CodecSettings::default().compress(&b"to be or not to be"[..], &mut compressed).unwrap();
///
/// let mut restored = Vec::new();
/// let summary = CodecSettings::default().decompress(&compressed[..], &mut restored).unwrap();
/// assert_eq!(restored, b"to be or not to be");
/// assert_eq!(summary.bytes_in, compressed.len() as u64);
/// ```
#[derive(Clone, Debug)]
pub struct CodecSettings {
    chunk_size: usize,
    close_output: bool,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            close_output: false,
        }
    }
}

impl CodecSettings {
    /// How many bytes are read from the input at once.
    /// This has no influence on the output whatsoever, only on how often the reader is called.
    ///
    /// The default chunk size is 512 bytes. Zero is treated as one.
    pub fn chunk_size(&mut self, v: usize) -> &mut Self {
        self.chunk_size = v.max(1);
        self
    }

    /// Drop the writer once everything has been written and flushed.
    /// Only matters for writers that do something on drop, e.g. files.
    ///
    /// Disabled by default.
    pub fn close_output(&mut self, v: bool) -> &mut Self {
        self.close_output = v;
        self
    }

    /// Reads all of `reader`, compresses it and writes the blocks to `writer`.
    ///
    /// The writer is flushed at the end, and dropped too if `close_output` is set. Fails only if
    /// reading or writing does.
    #[throws]
    pub fn compress<R: Read, W: Write>(&self, reader: R, writer: W) -> Summary {
        let _span = tracing::debug_span!("compress", chunk_size = self.chunk_size).entered();
        let mut sink = FileSink::new(writer).close_writer(self.close_output);
        let mut encoder = Encoder::new(&mut sink);
        let bytes_in = {
            let mut head = Splitter::new(&mut encoder);
            FileSource::new(reader).chunk_size(self.chunk_size).run(&mut head)?
        };
        let (blocks, trailing) = (encoder.blocks(), encoder.trailing());

        Summary {
            bytes_in,
            bytes_out: sink.bytes_written(),
            blocks,
            trailing,
        }
    }

    /// Reads a compressed stream from `reader` and writes the original data to `writer`.
    ///
    /// Everything decoded before an error has already been written out when it is returned. A
    /// stream that refers to a dictionary entry that does not exist yet fails with
    /// [`Error::UnknownReference`]; a stream cut short at a block boundary simply decodes to less.
    #[throws]
    pub fn decompress<R: Read, W: Write>(&self, reader: R, writer: W) -> Summary {
        let _span = tracing::debug_span!("decompress", chunk_size = self.chunk_size).entered();
        let mut sink = FileSink::new(writer).close_writer(self.close_output);
        let mut decoder = Decoder::new(&mut sink);
        let bytes_in = {
            let mut head = Splitter::new(&mut decoder);
            FileSource::new(reader).chunk_size(self.chunk_size).run(&mut head)?
        };
        let (blocks, trailing) = (decoder.blocks(), decoder.trailing());

        Summary {
            bytes_in,
            bytes_out: sink.bytes_written(),
            blocks,
            trailing,
        }
    }
}

/// Convenience wrapper around [`CodecSettings::compress`] for data that is already in memory.
#[throws]
pub fn compress_bytes(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    CodecSettings::default().compress(input, &mut output)?;
    output
}

/// Convenience wrapper around [`CodecSettings::decompress`] that returns the plaintext as a vector.
#[throws]
pub fn decompress_bytes(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    CodecSettings::default().decompress(input, &mut output)?;
    output
}
