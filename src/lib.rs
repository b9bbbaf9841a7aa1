//! A byte-granular Lempel-Ziv codec built from push-based pipeline stages.
//!
//! Every block on the wire is a back-reference to a previously seen chunk followed by exactly one
//! new byte. Chunks are numbered in the order they are discovered, and the pointer field of block
//! `n` is exactly [`minimal_width(n)`](ints::minimal_width) bytes wide. Neither the width nor any
//! length is ever transmitted, so the encoder and decoder have to stay in lock-step on their own.
//!
//! ```
//! let original = b"abracadabra abracadabra";
//! let compressed = plz::compress_bytes(original).unwrap();
//! assert_eq!(plz::decompress_bytes(&compressed).unwrap(), &original[..]);
//! ```
//!
//! The stages in [`pipeline`], [`lz`] and [`progress`] can also be wired up by hand; see
//! [`CodecSettings`] for the usual file-to-file arrangement.

#![forbid(unsafe_code)]

pub mod ints;
pub mod lz;
pub mod pipeline;
pub mod progress;
mod settings;

use std::io::{self, ErrorKind};
use thiserror::Error;

pub use ints::WidthError;
pub use lz::{Decoder, Encoder};
pub use pipeline::{FileSink, FileSource, Splitter, Stage};
pub use settings::*;

/// Everything that can go wrong while pushing data through a pipeline.
///
/// None of these are recoverable for the stream at hand. Output already handed to a sink stays
/// where it is.
#[derive(Error, Debug)]
pub enum Error {
    #[error("pointer field too narrow (this is a bug)")]
    Width(#[from] WidthError),
    #[error("block {block} refers to dictionary entry {pointer}, which does not exist (data corruption?)")]
    UnknownReference { pointer: u64, block: u64 },
    #[error("the pipeline was closed while {} bytes were still waiting to be forwarded", .0.len())]
    UnsentData(Vec<u8>),
    #[error("this stage has already been closed")]
    Closed,
    #[error("this stage gave up after an earlier error and takes no more input")]
    Failed,
    #[error("error reading or writing the streams you gave me")]
    Io(#[from] io::Error),
}

impl From<Error> for io::Error {
    fn from(e: Error) -> io::Error {
        match e {
            Error::Io(e) => e,
            e => io::Error::new(ErrorKind::Other, e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
