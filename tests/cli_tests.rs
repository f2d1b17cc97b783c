//! draco-decoder command line runs against files in a temp directory.

mod common;

use std::path::Path;
use std::process::Command;

use common::*;

fn draco_decoder() -> Command {
    Command::new(env!("CARGO_BIN_EXE_draco-decoder"))
}

fn triangle_mesh() -> Vec<u8> {
    let mut w = StreamWriter::header(2, 2, MESH, METADATA_FLAG);
    w.attribute_names(&[(0, "position"), (1, "color")])
        .varint(1)
        .varint(3)
        .u8(1)
        .bytes(&[0, 1, 2])
        .u8(2)
        .bytes(&[0, 0])
        .single_attribute(POSITION, FLOAT32, 3, 0, CODEC_GENERIC)
        .single_attribute(COLOR, UINT8, 3, 1, CODEC_GENERIC);
    w.finish()
}

fn position_values() -> Vec<u8> {
    StreamWriter::new()
        .float_payload(3, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
        .finish()
}

fn color_values() -> Vec<u8> {
    StreamWriter::new().varint(3).bytes(&[255, 0, 0, 0, 255, 0, 0, 0, 255]).finish()
}

fn ply_header(path: &Path) -> String {
    let bytes = std::fs::read(path).unwrap();
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let end = text.find("end_header").unwrap();
    text[..end].to_string()
}

#[test]
fn test_decode_mesh_to_ply() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tri.drc");
    let mut data = triangle_mesh();
    data.extend_from_slice(&position_values());
    data.extend_from_slice(&color_values());
    std::fs::write(&input, data).unwrap();

    let status = draco_decoder().arg("-i").arg(&input).output().unwrap();
    assert!(status.status.success(), "{}", String::from_utf8_lossy(&status.stderr));
    let header = ply_header(&dir.path().join("tri.drc.ply"));
    assert!(header.contains("element vertex 3"));
    assert!(header.contains("property uchar red"));
    assert!(header.contains("element face 1"));
}

#[test]
fn test_split_files_with_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tri.drc");
    let output = dir.path().join("out.ply");
    std::fs::write(&input, triangle_mesh()).unwrap();
    std::fs::write(dir.path().join("tri_position.drc"), position_values()).unwrap();
    std::fs::write(dir.path().join("tri_color.drc"), color_values()).unwrap();

    let run = draco_decoder()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--split-attr", "color", "--format-output"])
        .output()
        .unwrap();
    assert!(run.status.success(), "{}", String::from_utf8_lossy(&run.stderr));
    let report: serde_json::Value = serde_json::from_slice(&run.stdout).unwrap();
    assert_eq!(report["file"], output.display().to_string());
    assert!(report.get("err").is_none());
    assert!(ply_header(&output).contains("property uchar blue"));
}

#[test]
fn test_failure_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.drc");
    std::fs::write(&input, b"DRAC0\x02\x02\x01\x00\x00").unwrap();

    let run = draco_decoder()
        .arg("-i")
        .arg(&input)
        .arg("--format-output")
        .output()
        .unwrap();
    assert!(!run.status.success());
    let report: serde_json::Value = serde_json::from_slice(&run.stdout).unwrap();
    assert_eq!(report["err"], "decode");
}

#[test]
fn test_decode_mesh_to_obj() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tri.drc");
    let output = dir.path().join("tri.obj");
    let mut data = triangle_mesh();
    data.extend_from_slice(&position_values());
    data.extend_from_slice(&color_values());
    std::fs::write(&input, data).unwrap();

    let run = draco_decoder().arg("-i").arg(&input).arg("-o").arg(&output).output().unwrap();
    assert!(run.status.success(), "{}", String::from_utf8_lossy(&run.stderr));
    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(text, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
}

#[test]
fn test_unknown_output_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tri.drc");
    std::fs::write(&input, triangle_mesh()).unwrap();

    let run = draco_decoder()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("tri.stl"))
        .output()
        .unwrap();
    assert!(!run.status.success());
    assert!(String::from_utf8_lossy(&run.stderr).contains("Use either .ply or .obj"));
}
