#![no_main]

use blorb_rs::{ContainerReader, Usage};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Smaller inputs cannot hold the container header
    if data.len() < 12 {
        return;
    }

    // Parsing and index validation should never panic
    let mut reader = match ContainerReader::new(Cursor::new(data)) {
        Ok(r) => r,
        Err(_) => return,
    };

    let _ = reader.total_size();

    // Every chunk the scan found should be readable
    for info in reader.chunks().to_vec() {
        let _ = reader.read_chunk(&info);
    }

    for entry in reader.index().to_vec() {
        let _ = reader.chunk_for(&entry);
        if let Some(usage) = Usage::from_index_tag(entry.usage) {
            let _ = reader.read_resource(usage, entry.resource);
        }
    }

    let _ = reader.frontispiece();
});
