use fehler::{throw, throws};

use super::Stage;
use crate::Error;

enum State {
    Open,
    /// The downstream failed mid-chunk; this is what never got forwarded.
    Stalled(Vec<u8>),
    Closed,
}

/// Accepts byte chunks and forwards them one byte at a time, in order.
///
/// If the downstream stage fails while a chunk is being forwarded, the byte it failed on counts
/// as delivered and the rest of the chunk is kept. From then on every push and the final close
/// report that remainder as [`Error::UnsentData`]: upstream stopped getting its data through
/// in the middle of a unit.
pub struct Splitter<S> {
    next: S,
    state: State,
}

impl<S: Stage<u8>> Splitter<S> {
    pub fn new(next: S) -> Self {
        Splitter { next, state: State::Open }
    }

    /// Bytes of the last chunk that could not be forwarded, if any.
    pub fn unsent(&self) -> Option<&[u8]> {
        match &self.state {
            State::Stalled(rest) => Some(rest.as_slice()),
            _ => None,
        }
    }

    /// Closes the downstream, then reports any unsent remainder.
    #[throws]
    pub fn close(&mut self) {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Closed => {}
            State::Open => self.next.close()?,
            State::Stalled(rest) => {
                if let Err(e) = self.next.close() {
                    tracing::warn!(error = %e, "closing downstream of a stalled splitter failed");
                }
                throw!(Error::UnsentData(rest));
            }
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.next
    }

    pub fn into_inner(self) -> S {
        self.next
    }
}

impl<T: AsRef<[u8]>, S: Stage<u8>> Stage<T> for Splitter<S> {
    #[throws]
    fn receive(&mut self, chunk: T) {
        match &self.state {
            State::Open => {}
            State::Stalled(rest) => throw!(Error::UnsentData(rest.clone())),
            State::Closed => throw!(Error::Closed),
        }

        let chunk = chunk.as_ref();
        for (i, &byte) in chunk.iter().enumerate() {
            if let Err(e) = self.next.receive(byte) {
                let rest = &chunk[i + 1..];
                if !rest.is_empty() {
                    self.state = State::Stalled(rest.to_vec());
                }
                throw!(e);
            }
        }
    }

    fn close(&mut self) -> Result<(), Error> {
        Splitter::close(self)
    }
}
