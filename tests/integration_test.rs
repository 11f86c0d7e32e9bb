//! Integration tests for blorb-rs: control list in, container and declarations out

use blorb_rs::{
    BlorbBuild, BlorbError, BuildOptions, ChunkId, ContainerReader, OutputPaths, Usage,
    MAX_CHUNKS,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper: project directory with a control list and resource files
fn project(control: &str, files: &[(&str, &[u8])]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("game.res"), control).unwrap();
    for (name, data) in files {
        fs::write(dir.path().join(name), data).unwrap();
    }
    dir
}

/// Helper: build `game.res` in `dir` with a fixed timestamp
fn build(dir: &Path, options: BuildOptions) -> blorb_rs::Result<blorb_rs::BuildReport> {
    BlorbBuild::new(OutputPaths::new(dir.join("game"), None), options)
        .timestamp("18/12/2009 10:00:00")
        .run()
}

fn be32(bytes: &[u8], pos: usize) -> u32 {
    u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
}

const EXAMPLE: &str = "\
! Example resources
pict myPic cover.png
snd mySound theme.ogg
exec story.z8
";

fn example_project() -> TempDir {
    project(
        EXAMPLE,
        &[
            ("cover.png", b"PNG!!"),
            ("theme.ogg", b"OGGS"),
            ("story.z8", b"zcode!"),
        ],
    )
}

#[test]
fn test_example_container_layout() {
    let dir = example_project();
    let report = build(dir.path(), BuildOptions::default()).unwrap();

    let path = dir.path().join("game.zblorb");
    assert_eq!(report.container, Some(path.clone()));
    let bytes = fs::read(&path).unwrap();

    // 12 header + 48 index + 14 picture (padded) + 12 sound + 14 story
    assert_eq!(bytes.len(), 100);
    assert_eq!(&bytes[0..4], b"FORM");
    assert_eq!(be32(&bytes, 4), 92);
    assert_eq!(&bytes[8..12], b"IFRS");
    assert_eq!(&bytes[12..16], b"RIdx");
    assert_eq!(be32(&bytes, 16), 40);
    assert_eq!(be32(&bytes, 20), 3);

    // Index records: usage, resource, offset
    assert_eq!(&bytes[24..28], b"Pict");
    assert_eq!(be32(&bytes, 28), 3);
    assert_eq!(be32(&bytes, 32), 60);
    assert_eq!(&bytes[36..40], b"Snd ");
    assert_eq!(be32(&bytes, 40), 3);
    assert_eq!(be32(&bytes, 44), 74);
    assert_eq!(&bytes[48..52], b"Exec");
    assert_eq!(be32(&bytes, 52), 0);
    assert_eq!(be32(&bytes, 56), 86);

    // Odd-length picture data is followed by one zero byte
    assert_eq!(&bytes[60..64], b"PNG ");
    assert_eq!(be32(&bytes, 64), 5);
    assert_eq!(&bytes[68..73], b"PNG!!");
    assert_eq!(bytes[73], 0);

    // Even-length sound data is not padded
    assert_eq!(&bytes[74..78], b"OGGV");
    assert_eq!(&bytes[82..86], b"OGGS");
    assert_eq!(&bytes[86..90], b"ZCOD");

    assert_eq!(report.total_size, Some(92));
    assert_eq!(report.chunks.len(), 4);
}

#[test]
fn test_index_roundtrip_through_reader() {
    let dir = example_project();
    build(dir.path(), BuildOptions::default()).unwrap();

    let mut reader = ContainerReader::open(dir.path().join("game.zblorb")).unwrap();
    let index: Vec<_> = reader
        .index()
        .iter()
        .map(|e| (e.usage, e.resource, e.offset))
        .collect();
    assert_eq!(
        index,
        vec![
            (Usage::Picture.tag(), 3, 60),
            (Usage::Sound.tag(), 3, 74),
            (Usage::Executable.tag(), 0, 86),
        ]
    );

    // Every offset is the position of the chunk's type tag
    for entry in reader.index().to_vec() {
        let chunk = *reader.chunk_for(&entry).unwrap();
        assert_eq!(chunk.offset, u64::from(entry.offset));
    }

    assert_eq!(reader.read_resource(Usage::Picture, 3).unwrap(), b"PNG!!");
    assert_eq!(reader.read_resource(Usage::Sound, 3).unwrap(), b"OGGS");
    assert_eq!(reader.read_resource(Usage::Executable, 0).unwrap(), b"zcode!");
    assert!(reader.read_resource(Usage::Picture, 4).is_err());
    assert_eq!(reader.frontispiece().unwrap(), None);
}

#[test]
fn test_declarations_file() {
    let dir = example_project();
    let report = build(dir.path(), BuildOptions::default()).unwrap();

    let path = dir.path().join("game.bli");
    assert_eq!(report.declarations, Some(path.clone()));
    let text = fs::read_to_string(path).unwrap();

    assert!(text.starts_with("! Resources include file for Inform\n"));
    assert!(text.contains("! Generated by bresc (bresc) v0.32 Serial 20091218 on 18/12/2009 10:00:00"));
    assert!(text.contains("message \"Including resources file by bresc, on 18/12/2009 10:00:00\";"));
    assert!(text.contains("Constant myPic 3;\t! Pict: 'cover.png'\n"));
    assert!(text.contains("Constant mySound 3;\t! Snd: 'theme.ogg'\n"));
    // Executables are not declared
    assert!(!text.contains("story.z8"));
}

#[test]
fn test_builds_are_byte_identical() {
    let dir = example_project();

    build(dir.path(), BuildOptions::default()).unwrap();
    let first = fs::read(dir.path().join("game.zblorb")).unwrap();
    let first_bli = fs::read(dir.path().join("game.bli")).unwrap();

    build(dir.path(), BuildOptions::default()).unwrap();
    assert_eq!(fs::read(dir.path().join("game.zblorb")).unwrap(), first);
    assert_eq!(fs::read(dir.path().join("game.bli")).unwrap(), first_bli);
}

#[test]
fn test_metadata_cover_and_glulx_story() {
    let dir = project(
        "exec game.ulx\nmeta game.iFiction\ncover front.png\npict inside.jpg\n",
        &[
            ("game.ulx", b"Glul"),
            ("game.iFiction", b"<ifindex/>"),
            ("front.png", b"front"),
            ("inside.jpg", b"jpeg"),
        ],
    );
    let report = build(dir.path(), BuildOptions::default()).unwrap();

    let path = dir.path().join("game.gblorb");
    assert_eq!(report.container, Some(path.clone()));

    let mut reader = ContainerReader::open(&path).unwrap();
    let kinds: Vec<ChunkId> = reader.chunks().iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ChunkId::RIDX,
            ChunkId::padded("GLUL"),
            ChunkId::IFMD,
            ChunkId::padded("PNG"),
            ChunkId::padded("JPEG"),
            ChunkId::FSPC,
        ]
    );

    // Metadata and frontispiece are not indexed
    assert_eq!(reader.index().len(), 3);
    assert_eq!(reader.frontispiece().unwrap(), Some(3));
    assert_eq!(reader.read_resource(Usage::Picture, 3).unwrap(), b"front");
    assert_eq!(reader.read_resource(Usage::Picture, 4).unwrap(), b"jpeg");

    // The cover is not declared
    let text = fs::read_to_string(dir.path().join("game.bli")).unwrap();
    assert!(!text.contains("front.png"));
    assert!(text.contains("Constant picInside 4;\t! Pict: 'inside.jpg'"));
}

#[test]
fn test_glulx_without_metadata_uses_generic_extension() {
    let dir = project("exec game.ulx\n", &[("game.ulx", b"Glul")]);
    let report = build(dir.path(), BuildOptions::default()).unwrap();
    assert_eq!(report.container, Some(dir.path().join("game.blb")));
}

#[test]
fn test_short_extension() {
    let dir = example_project();
    let options = BuildOptions {
        short_extension: true,
        ..Default::default()
    };
    let report = build(dir.path(), options).unwrap();
    assert_eq!(report.container, Some(dir.path().join("game.blb")));
}

#[test]
fn test_duplicate_entries_fail() {
    let dir = project(
        "meta a.iFiction\nmeta a.iFiction\n",
        &[("a.iFiction", b"<ifindex/>")],
    );
    let err = build(dir.path(), BuildOptions::default()).unwrap_err();
    assert!(matches!(err, BlorbError::DuplicateMetadata { line: 2 }));

    let dir = project(
        "cover a.png\n\n; second cover\nposter a.png\n",
        &[("a.png", b"png")],
    );
    let err = build(dir.path(), BuildOptions::default()).unwrap_err();
    assert!(matches!(err, BlorbError::DuplicateCover { line: 4 }));
}

#[test]
fn test_unknown_extension_names_file_and_line() {
    let dir = project(
        "! pictures\n# and more\npict photo.xyz\n",
        &[("photo.xyz", b"???")],
    );
    let err = build(dir.path(), BuildOptions::default()).unwrap_err();

    match &err {
        BlorbError::UnrecognizedExtension { line, path, .. } => {
            assert_eq!(*line, 3);
            assert!(path.ends_with("photo.xyz"));
        }
        other => panic!("Expected UnrecognizedExtension, got: {:?}", other),
    }
    assert!(err.to_string().contains("photo.xyz"));
    assert!(err.to_string().starts_with("3:"));
}

#[test]
fn test_missing_resource_is_fatal_outside_index_only() {
    let dir = project("pict missing.png\n", &[]);
    let err = build(dir.path(), BuildOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        BlorbError::UnreadableResourceFile { line: 1, .. }
    ));
}

#[test]
fn test_chunk_limit_counts_the_index() {
    let fits = "pict a.png\n".repeat(MAX_CHUNKS - 1);
    let dir = project(&fits, &[("a.png", b"a")]);
    let report = build(dir.path(), BuildOptions::default()).unwrap();
    assert_eq!(report.chunks.len(), MAX_CHUNKS);

    let too_many = "pict a.png\n".repeat(MAX_CHUNKS);
    let dir = project(&too_many, &[("a.png", b"a")]);
    let err = build(dir.path(), BuildOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        BlorbError::ChunkCapacityExceeded { limit: MAX_CHUNKS }
    ));
}

#[test]
fn test_frontispiece_counts_toward_chunk_limit() {
    // cover + 1021 pictures + frontispiece + index = 1024
    let fits = format!("cover a.png\n{}", "pict a.png\n".repeat(MAX_CHUNKS - 3));
    let dir = project(&fits, &[("a.png", b"a")]);
    let report = build(dir.path(), BuildOptions::default()).unwrap();
    assert_eq!(report.chunks.len(), MAX_CHUNKS);
    assert_eq!(report.chunks[MAX_CHUNKS - 1].kind, "Fspc");

    // One more picture leaves no room for the frontispiece
    let too_many = format!("cover a.png\n{}", "pict a.png\n".repeat(MAX_CHUNKS - 2));
    let dir = project(&too_many, &[("a.png", b"a")]);
    let err = build(dir.path(), BuildOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        BlorbError::ChunkCapacityExceeded { limit: MAX_CHUNKS }
    ));
}

#[test]
fn test_non_utf8_control_list_errors_carry_line() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("game.res"), b"! recursos\npict fondo_a\xF1o.png\n").unwrap();

    let err = build(dir.path(), BuildOptions::default()).unwrap_err();
    assert!(matches!(err, BlorbError::UnreadableResourceFile { line: 2, .. }));
    assert_eq!(err.line(), Some(2));
}

#[cfg(unix)]
#[test]
fn test_latin1_resource_names() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("game.res"), b"! recursos\npict fondo_a\xF1o.png\n").unwrap();
    fs::write(dir.path().join(OsStr::from_bytes(b"fondo_a\xF1o.png")), b"PNG!").unwrap();

    build(dir.path(), BuildOptions::default()).unwrap();

    let mut reader = ContainerReader::open(dir.path().join("game.zblorb")).unwrap();
    assert_eq!(reader.read_resource(Usage::Picture, 3).unwrap(), b"PNG!");
    assert!(dir.path().join("game.bli").exists());
}

#[test]
fn test_report_json() {
    let dir = example_project();
    let options = BuildOptions {
        verbose: true,
        ..Default::default()
    };
    let report = build(dir.path(), options).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&report.to_json().unwrap()).unwrap();

    assert_eq!(json["total_size"], 92);
    assert_eq!(json["chunks"][0]["kind"], "RIdx");
    assert_eq!(json["chunks"][1]["usage"], "Pict");
    assert_eq!(json["chunks"][1]["offset"], 60);
    assert_eq!(json["chunks"][3]["kind"], "ZCOD");
}
