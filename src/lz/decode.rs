use fehler::{throw, throws};

use super::DecodeTable;
use crate::ints::{from_bytes, minimal_width};
use crate::pipeline::Stage;
use crate::Error;

/// The decompressing half of the codec.
///
/// Consumes single bytes of compressed data. Block `n` is exactly `minimal_width(n) + 1` bytes
/// long; once that many bytes have arrived the block is expanded and the resulting chunk is pushed
/// downstream.
///
/// If the input ends in the middle of a block, the partial block is a trailing pointer without a
/// new byte and the chunk it points to is pushed once more.
///
/// Once a block fails to expand the stream is out of step and the decoder refuses further input
/// with [`Error::Failed`]. Closing it still closes downstream.
pub struct Decoder<S> {
    next: S,
    table: DecodeTable,
    block: Vec<u8>,
    trailing: bool,
    failed: bool,
    closed: bool,
}

impl<S: Stage<Vec<u8>>> Decoder<S> {
    pub fn new(next: S) -> Self {
        Decoder {
            next,
            table: DecodeTable::default(),
            block: Vec::with_capacity(9),
            trailing: false,
            failed: false,
            closed: false,
        }
    }

    /// Number of complete blocks decoded so far, which is also the id of the block in progress.
    pub fn blocks(&self) -> u64 {
        self.table.len() as u64
    }

    /// Whether the input ended with a pointer-only block.
    pub fn trailing(&self) -> bool {
        self.trailing
    }

    pub fn table(&self) -> &DecodeTable {
        &self.table
    }

    pub fn get_ref(&self) -> &S {
        &self.next
    }

    pub fn into_inner(self) -> S {
        self.next
    }

    /// Looks up `pointer` on behalf of block `block`.
    #[throws]
    fn resolve(&self, pointer: u64, block: u64) -> &[u8] {
        match self.table.get(pointer) {
            Some(chunk) => chunk,
            None => {
                tracing::warn!(pointer, block, "reference to unknown dictionary entry");
                throw!(Error::UnknownReference { pointer, block });
            }
        }
    }

    #[throws]
    fn expand(&mut self) {
        let n = self.blocks();
        let (pointer, new) = self.block.split_at(self.block.len() - 1);
        let (pointer, new) = (from_bytes(pointer)?, new[0]);
        self.block.clear();

        let mut chunk = if pointer == n {
            Vec::with_capacity(1)
        } else {
            self.resolve(pointer, n)?.to_vec()
        };
        chunk.push(new);

        tracing::trace!(id = n, pointer, len = chunk.len(), "block");
        let out = chunk.clone();
        self.table.push(chunk);
        self.next.receive(out)?;
    }

    /// Expands the partial block left over at the end of the input, if there is one.
    #[throws]
    fn finish(&mut self) {
        if self.block.is_empty() {
            return;
        }
        let n = self.blocks();
        let pointer = from_bytes(&self.block)?;
        self.block.clear();
        let chunk = self.resolve(pointer, n)?.to_vec();
        self.trailing = true;
        tracing::trace!(pointer, len = chunk.len(), "trailing block");
        self.next.receive(chunk)?;
    }

    /// Expands a partial block left over at the end of the input, then closes downstream.
    ///
    /// Downstream is closed even if the partial block cannot be expanded; the first error wins.
    /// Closing a decoder that has failed keeps returning [`Error::Failed`].
    #[throws]
    pub fn close(&mut self) {
        if self.closed {
            if self.failed {
                throw!(Error::Failed);
            }
            return;
        }
        self.closed = true;

        let finished = if self.failed { Err(Error::Failed) } else { self.finish() };
        self.failed |= finished.is_err();
        tracing::debug!(blocks = self.blocks(), trailing = self.trailing, failed = self.failed, "decoder done");

        let closed = self.next.close();
        if let Err(e) = finished {
            if let Err(e) = closed {
                tracing::warn!(error = %e, "closing downstream of a failed decoder failed");
            }
            throw!(e);
        }
        closed?;
    }
}

impl<S: Stage<Vec<u8>>> Stage<u8> for Decoder<S> {
    #[throws]
    fn receive(&mut self, byte: u8) {
        if self.closed {
            throw!(Error::Closed);
        }
        if self.failed {
            throw!(Error::Failed);
        }

        self.block.push(byte);
        if self.block.len() == minimal_width(self.blocks()) + 1 {
            if let Err(e) = self.expand() {
                self.failed = true;
                throw!(e);
            }
        }
    }

    fn close(&mut self) -> Result<(), Error> {
        Decoder::close(self)
    }
}
