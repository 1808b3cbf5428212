//! Integration tests for echoprobe-cli.
//!
//! Tests invoke the built binary on temporary WAV and scene files.

use std::path::Path;
use std::process::Command;

/// Helper to get the path to the `echoprobe` binary built by cargo.
fn echoprobe_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_echoprobe"))
}

fn write_mono_impulse(path: &Path, frames: usize, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        writer.write_sample(if i == 0 { 1.0f32 } else { 0.0 }).unwrap();
    }
    writer.finalize().unwrap();
}

fn read_interleaved(path: &Path) -> (hound::WavSpec, Vec<f32>) {
    let reader = hound::WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader
        .into_samples::<f32>()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    (spec, samples)
}

// ---------------------------------------------------------------------------
// `echoprobe fields`
// ---------------------------------------------------------------------------

#[test]
fn cli_fields_lists_every_field() {
    let output = echoprobe_bin()
        .args(["fields", "--legend"])
        .output()
        .expect("failed to run echoprobe fields");

    assert!(output.status.success(), "echoprobe fields failed");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("spatial_reverb"));
    assert!(stdout.contains("Dynamic reverb based on spatial probing."));
    for name in [
        "buffer",
        "distance_delay",
        "max_distance_cutoff",
        "bulk_parameters",
        "probe",
        "bypass",
    ] {
        assert!(stdout.contains(name), "fields listing should contain '{name}'");
    }
    assert!(stdout.contains("Access flags"));
    assert!(!stdout.contains("(in-place)"));
    assert!(stdout.contains("A buffer may be bound to one slot only."));
}

// ---------------------------------------------------------------------------
// `echoprobe process`
// ---------------------------------------------------------------------------

#[test]
fn cli_process_with_scene_adds_delayed_echo() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    let scene = dir.path().join("scene.toml");

    write_mono_impulse(&input, 400, 8000);
    std::fs::write(
        &scene,
        r#"
distance_delay_factor = 0.01

[bulk]
distances = [2.0, 2.0, 2.0, 2.0]
hit_ratios = [0.9, 0.9, 0.9, 0.9]
absorptions = [0.5, 0.5, 0.5, 0.5]
"#,
    )
    .unwrap();

    let status = echoprobe_bin()
        .arg("process")
        .arg(&input)
        .arg(&output)
        .arg("--scene")
        .arg(&scene)
        .args(["--block-size", "64"])
        .status()
        .expect("failed to run echoprobe process");
    assert!(status.success());

    let (spec, samples) = read_interleaved(&output);
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 8000);
    assert_eq!(samples.len(), 400 * 2);

    // Delay is 0.01 * 2 * 8000 = 160 frames.
    let left: Vec<f32> = samples.iter().step_by(2).copied().collect();
    assert!(left[..160].iter().all(|&s| s == 0.0));
    assert!(left[160].abs() > 0.1, "expected echo at frame 160");
}

#[test]
fn cli_process_bypass_with_tail() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    write_mono_impulse(&input, 100, 1000);

    let status = echoprobe_bin()
        .arg("process")
        .arg(&input)
        .arg(&output)
        .args(["--bypass", "--tail", "0.05"])
        .status()
        .expect("failed to run echoprobe process");
    assert!(status.success());

    let (_, samples) = read_interleaved(&output);
    assert_eq!(samples.len(), (100 + 50) * 2);
    assert_eq!(&samples[..2], &[1.0, 1.0]);
    assert!(samples[2..].iter().all(|&s| s == 0.0));
}

#[test]
fn cli_process_rejects_invalid_scene() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let scene = dir.path().join("bad.toml");
    write_mono_impulse(&input, 10, 8000);
    std::fs::write(
        &scene,
        "[[probes]]\nangle = 0.0\ndistance = 1.0\nabsorption = 4.0\n",
    )
    .unwrap();

    let output = echoprobe_bin()
        .arg("process")
        .arg(&input)
        .arg(dir.path().join("out.wav"))
        .arg("--scene")
        .arg(&scene)
        .output()
        .expect("failed to run echoprobe process");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bad.toml"), "stderr: {stderr}");
}

#[test]
fn cli_process_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = echoprobe_bin()
        .arg("process")
        .arg(dir.path().join("missing.wav"))
        .arg(dir.path().join("out.wav"))
        .output()
        .expect("failed to run echoprobe process");
    assert!(!output.status.success());
}
