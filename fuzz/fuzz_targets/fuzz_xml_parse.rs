#![no_main]
use craftxml::{Document, ParseFlags};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The first byte picks the flags; every combination must be panic-free.
    let Some((&bits, rest)) = data.split_first() else {
        return;
    };
    let flags = ParseFlags::from_bits(u32::from(bits));
    let _ = Document::load_bytes(rest, flags);
    if let Ok(s) = std::str::from_utf8(rest) {
        let _ = Document::load_str(s, flags);
    }
});
