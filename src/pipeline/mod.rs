//! A single-threaded, push-based pipeline.
//!
//! A pipeline is a chain of [`Stage`]s where each stage owns the next one. Pushing an item is a
//! plain method call that only returns once every stage downstream is done with it, so there is
//! no buffering between stages and no need for any flow control.
//!
//! Data typically enters through a [`FileSource`], gets cut into single bytes by a [`Splitter`],
//! runs through a codec stage and ends up in a [`FileSink`]:
//!
//! ```
//! use plz::{Encoder, FileSink, FileSource, Splitter, Stage};
//!
//! let mut sink = FileSink::new(Vec::new());
//! let mut head = Splitter::new(Encoder::new(&mut sink));
//! FileSource::new(&b"aaaa"[..]).run(&mut head).unwrap();
//! assert_eq!(sink.get_ref().unwrap().as_slice(), b"a\x00a\x00");
//! ```

mod file;
mod split;

pub use file::*;
pub use split::*;

use crate::Error;

/// One step of a pipeline.
///
/// A stage accepts items one at a time, may keep state between them and may push any number of
/// items of its own downstream before returning. Closing a stage runs its finalization (flushing
/// partial state, emitting trailing output) and then closes its downstream neighbour.
///
/// Closing twice is harmless; pushing into a closed stage fails with [`Error::Closed`].
pub trait Stage<T> {
    fn receive(&mut self, item: T) -> Result<(), Error>;
    fn close(&mut self) -> Result<(), Error>;
}

impl<T, S: Stage<T> + ?Sized> Stage<T> for &mut S {
    fn receive(&mut self, item: T) -> Result<(), Error> {
        (**self).receive(item)
    }

    fn close(&mut self) -> Result<(), Error> {
        (**self).close()
    }
}

impl<T, S: Stage<T> + ?Sized> Stage<T> for Box<S> {
    fn receive(&mut self, item: T) -> Result<(), Error> {
        (**self).receive(item)
    }

    fn close(&mut self) -> Result<(), Error> {
        (**self).close()
    }
}
