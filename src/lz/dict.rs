use std::collections::HashMap;
use std::convert::TryFrom;
use std::hash::BuildHasherDefault;
use twox_hash::XxHash64;

/// Chunk -> block id, as seen by the encoder.
///
/// Every chunk is its prefix plus one byte, and the prefix is itself a known chunk (or empty).
/// So instead of storing chunks, the table is a trie keyed by `(id of prefix, new byte)`.
#[derive(Clone, Default)]
pub struct EncodeTable {
    children: HashMap<(Option<u64>, u8), u64, BuildHasherDefault<XxHash64>>,
}

impl EncodeTable {
    /// The id of the chunk `prefix ++ [byte]`, if it is known.
    pub fn child(&self, prefix: Option<u64>, byte: u8) -> Option<u64> {
        self.children.get(&(prefix, byte)).copied()
    }

    pub(crate) fn insert(&mut self, prefix: Option<u64>, byte: u8, id: u64) {
        let old = self.children.insert((prefix, byte), id);
        debug_assert!(old.is_none(), "chunk registered twice");
    }

    /// The id of a whole chunk, if it is known. The empty chunk never has an id.
    pub fn lookup(&self, chunk: &[u8]) -> Option<u64> {
        let (first, rest) = chunk.split_first()?;
        rest.iter().try_fold(self.child(None, *first)?, |id, &b| self.child(Some(id), b))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Block id -> chunk, as seen by the decoder.
#[derive(Clone, Default)]
pub struct DecodeTable {
    chunks: Vec<Vec<u8>>,
}

impl DecodeTable {
    pub fn get(&self, id: u64) -> Option<&[u8]> {
        let index = usize::try_from(id).ok()?;
        self.chunks.get(index).map(Vec::as_slice)
    }

    /// Appends the chunk with the next id.
    pub(crate) fn push(&mut self, chunk: Vec<u8>) {
        self.chunks.push(chunk);
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// All chunks in id order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.chunks.iter().map(Vec::as_slice)
    }
}
