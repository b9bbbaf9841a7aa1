#![no_main]
use libfuzzer_sys::fuzz_target;
use plz::CodecSettings;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let mut compressed = Vec::new();
    CodecSettings::default()
        .chunk_size(data.len() % 97 + 1)
        .compress(Cursor::new(data), &mut compressed)
        .expect("Could not compress input data");

    let mut roundtripped = Vec::new();
    CodecSettings::default()
        .decompress(Cursor::new(compressed), &mut roundtripped)
        .expect("Could not decompress our own output");
    assert!(roundtripped.iter().eq(data));
});
