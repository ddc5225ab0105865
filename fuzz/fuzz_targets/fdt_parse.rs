#![no_main]
// Device-tree parser fuzzer.
//
// The DTB is the kernel's only untrusted input surface: firmware hands
// over an arbitrary blob before anything is initialized. The parser
// must never panic or read out of bounds, whatever the bytes.

use libfuzzer_sys::fuzz_target;
use noxiom_testing::fdt_parse;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1 << 20 {
        return;
    }
    let _ = fdt_parse::parse(data);
});
