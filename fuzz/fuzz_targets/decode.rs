#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // we deliberately ignore errors here because random bytes from fuzzer
    // often point at dictionary entries that do not exist yet
    let _ = plz::decompress_bytes(data);
});
