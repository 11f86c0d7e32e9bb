//! Generate seed corpus for fuzzing

use blorb_rs::{Chunk, ChunkId, ChunkUsage, ContainerWriter, IndexBuilder, Usage};
use std::fs;

fn write_seed(path: &str, chunks: &[Chunk]) -> Result<(), Box<dyn std::error::Error>> {
    let (index, patches) = IndexBuilder::build(chunks)?;
    let mut writer = ContainerWriter::create(path)?;
    writer.write(&index, chunks, &patches)?;
    writer.into_inner()?;
    println!("Generated: {}", path);
    Ok(())
}

fn picture(resource: u32, data: &[u8]) -> Chunk {
    Chunk::new(
        ChunkUsage::Indexed(Usage::Picture),
        ChunkId::padded("PNG"),
        resource,
        data.to_vec(),
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let corpus_dir = "fuzz/corpus/fuzz_container_parse";
    fs::create_dir_all(corpus_dir)?;

    println!("Generating seed corpus...");

    // Seed 1: index only
    write_seed(&format!("{}/seed_empty.blb", corpus_dir), &[])?;

    // Seed 2: one odd-length picture (padded)
    write_seed(
        &format!("{}/seed_single_picture.blb", corpus_dir),
        &[picture(3, b"Hello, World!")],
    )?;

    // Seed 3: story, sound and pictures
    write_seed(
        &format!("{}/seed_mixed.zblorb", corpus_dir),
        &[
            picture(3, b"first"),
            picture(4, b"second"),
            Chunk::new(
                ChunkUsage::Indexed(Usage::Sound),
                ChunkId::padded("OGGV"),
                3,
                (0..255).collect(),
            ),
            Chunk::new(
                ChunkUsage::Indexed(Usage::Executable),
                ChunkId::padded("ZCOD"),
                0,
                vec![5; 64],
            ),
        ],
    )?;

    // Seed 4: metadata and frontispiece (both unindexed)
    write_seed(
        &format!("{}/seed_cover.gblorb", corpus_dir),
        &[
            Chunk::new(
                ChunkUsage::Indexed(Usage::Executable),
                ChunkId::padded("GLUL"),
                0,
                b"Glul".to_vec(),
            ),
            Chunk::new(ChunkUsage::Unindexed, ChunkId::IFMD, 0, b"<ifindex/>".to_vec()),
            picture(3, b"cover"),
            Chunk::frontispiece(1, 3),
        ],
    )?;

    // Seed 5: zero-length picture
    write_seed(&format!("{}/seed_zero_length.blb", corpus_dir), &[picture(3, b"")])?;

    println!("\nGenerated 5 seed files in {}", corpus_dir);
    Ok(())
}
