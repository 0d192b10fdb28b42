//! Analysis Integration Tests
//!
//! Decode real WAV files from disk and check the written feature JSON.

use std::path::Path;

use approx::assert_relative_eq;
use serde_json::Value;
use tempfile::TempDir;

use trackscan::analysis::{analyze_file, classify_energy, AudioFeatures, EnergyLevel};
use trackscan::audio::{click_track, sine, MonoBuffer};
use trackscan::config::AnalysisConfig;

/// Write a buffer as a 16-bit WAV with `channels` identical channels
fn write_wav(path: &Path, buffer: &MonoBuffer, channels: u16) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for s in &buffer.samples {
        for _ in 0..channels {
            writer.write_sample((s * 32767.0) as i16).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn leaf_paths(value: &Value, prefix: String, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                leaf_paths(child, path, out);
            }
        }
        _ => out.push(prefix),
    }
}

#[test]
fn test_click_track_to_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("clicks.wav");
    let output = dir.path().join("features.json");

    write_wav(&input, &click_track(40 * 512, 2048, 15.0, 44100), 2);

    let features = analyze_file(&input, &AnalysisConfig::default()).unwrap();
    features.write_json(&output).unwrap();

    let json: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let mut leaves = Vec::new();
    leaf_paths(&json, String::new(), &mut leaves);
    leaves.sort();
    assert_eq!(
        leaves,
        vec![
            "highlevel.danceability.all.danceable",
            "lowlevel.average_loudness",
            "rhythm.beats_loudness.mean",
            "rhythm.bpm",
        ]
    );

    let bpm = json["rhythm"]["bpm"].as_f64().unwrap();
    assert!((bpm - 129.2).abs() < 2.0, "bpm was {}", bpm);

    let loudness = json["lowlevel"]["average_loudness"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&loudness));

    let read_back = AudioFeatures::read_json(&output).unwrap();
    assert_eq!(read_back, features);
}

#[test]
fn test_overwrites_existing_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("tone.wav");
    let output = dir.path().join("features.json");

    std::fs::write(&output, "stale contents that are not json").unwrap();
    write_wav(&input, &sine(440.0, 0.5, 2.0, 44100), 1);

    analyze_file(&input, &AnalysisConfig::default())
        .unwrap()
        .write_json(&output)
        .unwrap();

    let features = AudioFeatures::read_json(&output).unwrap();
    assert_relative_eq!(features.lowlevel.average_loudness, 0.8495, epsilon = 0.005);

    // Only the output file remains; the temporary file was renamed away
    let entries = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 2);
}

#[test]
fn test_resampled_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("low_rate.wav");
    write_wav(&input, &sine(440.0, 0.5, 2.0, 22050), 1);

    let features = analyze_file(&input, &AnalysisConfig::default()).unwrap();
    assert_relative_eq!(features.lowlevel.average_loudness, 0.8495, epsilon = 0.01);
}

#[test]
fn test_silent_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("silence.wav");
    write_wav(&input, &MonoBuffer::silent(44100 * 3, 44100), 1);

    let features = analyze_file(&input, &AnalysisConfig::default()).unwrap();
    assert_eq!(features, AudioFeatures::new(0.0, 0.0, 0.0, 0.0));
    assert_eq!(
        classify_energy(&features.metrics()).suggested_energy,
        EnergyLevel::Low
    );
}

#[test]
fn test_missing_and_garbage_inputs() {
    let dir = TempDir::new().unwrap();
    let config = AnalysisConfig::default();

    let err = analyze_file(&dir.path().join("nope.wav"), &config).unwrap_err();
    assert_eq!(err.error_code(), "FILE_NOT_FOUND");

    let garbage = dir.path().join("garbage.mp3");
    std::fs::write(&garbage, b"definitely not audio data").unwrap();
    let err = analyze_file(&garbage, &config).unwrap_err();
    assert!(err.report_line().starts_with("Error: "));
}
