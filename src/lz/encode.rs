use fehler::{throw, throws};

use super::EncodeTable;
use crate::ints::{minimal_width, put_bytes};
use crate::pipeline::Stage;
use crate::Error;

/// The compressing half of the codec.
///
/// Consumes single bytes and grows the current chunk until it is one the dictionary has not seen
/// yet. That chunk gets the next block id and is pushed downstream as one block: a pointer to the
/// id of its prefix (or to its own id if the prefix is empty), `minimal_width(id)` bytes wide,
/// followed by its last byte.
///
/// When closed with a known chunk still pending, that chunk goes out as a lone pointer without a
/// new byte.
pub struct Encoder<S> {
    next: S,
    table: EncodeTable,
    /// Id of the (known) chunk accumulated so far, `None` while nothing is pending.
    current: Option<u64>,
    pending_len: usize,
    blocks: u64,
    trailing: bool,
    failed: bool,
    closed: bool,
}

impl<S: Stage<Vec<u8>>> Encoder<S> {
    pub fn new(next: S) -> Self {
        Encoder {
            next,
            table: EncodeTable::default(),
            current: None,
            pending_len: 0,
            blocks: 0,
            trailing: false,
            failed: false,
            closed: false,
        }
    }

    /// Number of complete blocks emitted so far, which is also the next block id.
    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    /// Whether a pointer-only block was emitted on close.
    pub fn trailing(&self) -> bool {
        self.trailing
    }

    pub fn table(&self) -> &EncodeTable {
        &self.table
    }

    pub fn get_ref(&self) -> &S {
        &self.next
    }

    pub fn into_inner(self) -> S {
        self.next
    }

    /// Emits the pending chunk as a pointer-only block, if there is one.
    #[throws]
    fn finish(&mut self) {
        if let Some(id) = self.current.take() {
            let mut block = Vec::new();
            put_bytes(&mut block, id, minimal_width(self.blocks))?;
            tracing::trace!(pointer = id, len = self.pending_len, "trailing block");
            self.trailing = true;
            self.next.receive(block)?;
        }
    }

    /// Emits the pending chunk (if any) as a pointer-only block, then closes downstream.
    ///
    /// Downstream is closed even if the trailing block could not be delivered; the first error
    /// wins, and closing again afterwards returns [`Error::Failed`].
    #[throws]
    pub fn close(&mut self) {
        if self.closed {
            if self.failed {
                throw!(Error::Failed);
            }
            return;
        }
        self.closed = true;

        let finished = self.finish();
        self.failed = finished.is_err();
        tracing::debug!(
            blocks = self.blocks,
            trailing = self.trailing,
            entries = self.table.len(),
            "encoder done"
        );

        let closed = self.next.close();
        if let Err(e) = finished {
            if let Err(e) = closed {
                tracing::warn!(error = %e, "closing downstream of a failed encoder failed");
            }
            throw!(e);
        }
        closed?;
    }
}

impl<S: Stage<Vec<u8>>> Stage<u8> for Encoder<S> {
    #[throws]
    fn receive(&mut self, byte: u8) {
        if self.closed {
            throw!(Error::Closed);
        }

        if let Some(id) = self.table.child(self.current, byte) {
            self.current = Some(id);
            self.pending_len += 1;
            return;
        }

        let id = self.blocks;
        self.table.insert(self.current, byte, id);
        let pointer = self.current.take().unwrap_or(id);
        self.pending_len = 0;
        self.blocks += 1;

        let width = minimal_width(id);
        let mut block = Vec::with_capacity(width + 1);
        put_bytes(&mut block, pointer, width)?;
        block.push(byte);
        tracing::trace!(id, pointer, "block");
        self.next.receive(block)?;
    }

    fn close(&mut self) -> Result<(), Error> {
        Encoder::close(self)
    }
}
