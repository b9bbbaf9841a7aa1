use plz::ints::{from_bytes, minimal_width};
use plz::{compress_bytes, decompress_bytes, CodecSettings, Decoder, Encoder, Error, FileSink, Splitter, Stage};
use rand::prelude::*;
use std::io::Cursor;

fn roundtrip(data: &[u8]) -> Vec<u8> {
    let compressed = compress_bytes(data).unwrap();
    let restored = decompress_bytes(&compressed).unwrap();
    assert!(restored == data, "round trip of {} bytes failed", data.len());
    compressed
}

fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut data = vec![0u8; len];
    StdRng::seed_from_u64(seed).fill(&mut data[..]);
    data
}

/// Splits a compressed stream back into its blocks, the same way the decoder would.
fn blocks(compressed: &[u8]) -> Vec<&[u8]> {
    let mut out = Vec::new();
    let mut rest = compressed;
    let mut n = 0u64;
    while !rest.is_empty() {
        let len = (minimal_width(n) + 1).min(rest.len());
        let (block, tail) = rest.split_at(len);
        out.push(block);
        rest = tail;
        n += 1;
    }
    out
}

#[test]
fn empty() {
    assert!(roundtrip(b"").is_empty());
}

#[test]
fn aaaa() {
    assert_eq!(roundtrip(b"aaaa"), b"a\x00a\x00");
}

#[test]
fn single_byte_runs() {
    for len in 1..300 {
        roundtrip(&vec![b'x'; len]);
    }
}

#[test]
fn text() {
    let text = b"It was the best of times, it was the worst of times, it was the age of wisdom, \
                 it was the age of foolishness, it was the epoch of belief, it was the epoch of incredulity";
    let compressed = roundtrip(text);
    assert!(compressed.len() < text.len() * 2);
}

#[test]
fn random_data() {
    for (i, &len) in [1usize, 2, 255, 256, 257, 4096, 100_000].iter().enumerate() {
        roundtrip(&random_bytes(len, i as u64));
    }
}

#[test]
fn every_chunk_novel() {
    // 256 single bytes, then all 65536 pairs: ids roll over from two to three pointer bytes
    let mut data: Vec<u8> = (0..=255).collect();
    for a in 0..=255u8 {
        for b in 0..=255u8 {
            data.push(a);
            data.push(b);
        }
    }
    let compressed = roundtrip(&data);

    let blocks = blocks(&compressed);
    assert!(blocks.len() > 65536);
    for (n, block) in blocks.iter().enumerate() {
        assert_eq!(block.len(), minimal_width(n as u64) + 1, "block {}", n);
    }
}

#[test]
fn encoder_and_decoder_build_the_same_dictionary() {
    let mut data = b"abracadabra ".repeat(50);
    data.extend(random_bytes(20_000, 7));
    data.extend(b"abracadabra ".repeat(50));

    let mut encoder = Encoder::new(Splitter::new(Decoder::new(FileSink::new(Vec::new()))));
    for &b in &data {
        encoder.receive(b).unwrap();
    }
    encoder.close().unwrap();

    let decoder = encoder.get_ref().get_ref();
    assert_eq!(decoder.get_ref().get_ref().unwrap(), &data);
    assert!(decoder.blocks() > 256);
    assert_eq!(encoder.blocks(), decoder.blocks());

    let (packed, unpacked) = (encoder.table(), decoder.table());
    assert_eq!(packed.len(), unpacked.len());
    for k in 0..unpacked.len() as u64 {
        let chunk = unpacked.get(k).unwrap();
        assert_eq!(packed.lookup(chunk), Some(k), "entry {} is {:?}", k, chunk);
    }
}

#[test]
fn pointers_only_point_backwards() {
    let data = random_bytes(20_000, 99);
    let mut skewed: Vec<u8> = data.iter().map(|b| b % 4).collect();
    skewed.extend_from_slice(&data[..3]);

    for input in &[data, skewed] {
        let compressed = compress_bytes(input).unwrap();
        let blocks = blocks(&compressed);
        let last = blocks.len() - 1;
        for (n, block) in blocks.iter().enumerate() {
            let n = n as u64;
            let full = block.len() == minimal_width(n) + 1;
            let pointer_bytes = if full { &block[..block.len() - 1] } else { &block[..] };
            let pointer = from_bytes(pointer_bytes).unwrap();
            if full {
                assert!(pointer <= n);
                if pointer == n {
                    continue;
                }
            } else {
                assert_eq!(n as usize, last, "only the last block may be partial");
            }
            assert!(pointer < n);
        }
    }
}

#[test]
fn chunk_size_does_not_matter() {
    let data = random_bytes(5000, 3).iter().map(|b| b & 7).collect::<Vec<u8>>();
    let reference = compress_bytes(&data).unwrap();

    for &chunk_size in &[0, 1, 2, 3, 7, 512, 100_000] {
        let mut compressed = Vec::new();
        let summary = CodecSettings::default()
            .chunk_size(chunk_size)
            .compress(Cursor::new(&data), &mut compressed)
            .unwrap();
        assert_eq!(compressed, reference);
        assert_eq!(summary.bytes_in, data.len() as u64);
        assert_eq!(summary.bytes_out, compressed.len() as u64);

        let mut restored = Vec::new();
        CodecSettings::default()
            .chunk_size(chunk_size)
            .decompress(Cursor::new(&compressed), &mut restored)
            .unwrap();
        assert_eq!(restored, data);
    }
}

#[test]
fn summaries_agree() {
    let data = b"abcabcabcabcabcabcabcabcabcab";
    let mut compressed = Vec::new();
    let enc = CodecSettings::default().compress(&data[..], &mut compressed).unwrap();
    let mut restored = Vec::new();
    let dec = CodecSettings::default().decompress(&compressed[..], &mut restored).unwrap();

    assert_eq!(enc.blocks, dec.blocks);
    assert_eq!(enc.trailing, dec.trailing);
    assert_eq!(enc.bytes_out, dec.bytes_in);
    assert_eq!(dec.bytes_out, data.len() as u64);
}

#[test]
fn corrupt_pointer() {
    let mut compressed = compress_bytes(b"abcdefgh").unwrap();
    // block 1 is "\x01b"; make it point past itself
    assert_eq!(&compressed[1..3], b"\x01b");
    compressed[1] = 5;
    match decompress_bytes(&compressed) {
        Err(Error::UnknownReference { pointer: 5, block: 1 }) => {}
        other => panic!("expected unknown reference, got {:?}", other),
    }
}

#[test]
fn truncation_is_not_detected_but_never_invents_references() {
    // cutting a stream mid-block turns the remainder into a trailing pointer
    let compressed = compress_bytes(b"abababab").unwrap();
    for cut in 0..compressed.len() {
        match decompress_bytes(&compressed[..cut]) {
            Ok(_) | Err(Error::UnknownReference { .. }) => {}
            Err(e) => panic!("unexpected error at cut {}: {}", cut, e),
        }
    }
}
