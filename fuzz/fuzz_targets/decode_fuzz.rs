#![no_main]
use libfuzzer_sys::fuzz_target;
use oxilzo::lzo1x::decoder::Lzo1xDecoder;

/// Decode with a hard output cap: arbitrary input can encode large-but-valid
/// match runs, and the fuzzer only cares that nothing panics.
fn decode_capped(data: &[u8], cap: usize) -> Result<Vec<u8>, ()> {
    let mut decoder = Lzo1xDecoder::new(data);
    let mut out = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match decoder.read(&mut buf) {
            Ok(0) => return Ok(out),
            Ok(n) => {
                out.extend_from_slice(&buf[..n]);
                if out.len() > cap {
                    return Err(());
                }
            }
            Err(_) => return Err(()),
        }
    }
}

fuzz_target!(|data: &[u8]| {
    // The decoder must never panic — only return errors.
    let whole = decode_capped(data, 16 << 20);

    // Byte-at-a-time pulls must agree with the whole-buffer decode.
    let mut decoder = Lzo1xDecoder::new(data);
    let mut trickled = Vec::new();
    let mut byte = [0u8; 1];
    let capped = loop {
        match decoder.read(&mut byte) {
            Ok(0) => break false,
            Ok(_) => {
                trickled.push(byte[0]);
                if trickled.len() > 16 << 20 {
                    break true;
                }
            }
            Err(_) => break true,
        }
    };

    if let (Ok(expected), false) = (&whole, capped) {
        assert_eq!(&trickled, expected);
    }
});
