//! End-to-end tests of the two binaries

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use snipkit::adapters::exec_libav::LibavClip;
use snipkit::adapters::LibavMediaAdapter;
use snipkit::ports::MediaClip;

fn ffmpeg_available() -> bool {
    which::which("ffmpeg").is_ok()
}

/// Render a short test pattern with audio; returns None when ffmpeg is missing
fn render_sample(dir: &TempDir, seconds: u32) -> Option<std::path::PathBuf> {
    if !ffmpeg_available() {
        eprintln!("ffmpeg not installed, skipping");
        return None;
    }
    let path = dir.path().join("sample.mp4");
    let status = std::process::Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-f",
            "lavfi",
            "-i",
            &format!("testsrc=duration={}:size=320x240:rate=25", seconds),
            "-f",
            "lavfi",
            "-i",
            &format!("sine=frequency=440:duration={}", seconds),
            "-c:v",
            "libx264",
            "-c:a",
            "aac",
            "-y",
        ])
        .arg(&path)
        .status()
        .ok()?;
    status.success().then_some(path)
}

#[test]
fn test_extract_clip_missing_input() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.mp4");

    Command::cargo_bin("extract-clip")
        .unwrap()
        .current_dir(dir.path())
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_mp4_to_gif_requires_output() {
    Command::cargo_bin("mp4-to-gif")
        .unwrap()
        .arg("in.mp4")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn test_mp4_to_gif_forced_fallback_missing_input_exits_1() {
    let dir = TempDir::new().unwrap();

    Command::cargo_bin("mp4-to-gif")
        .unwrap()
        .current_dir(dir.path())
        .args(["missing.mp4", "-o", "out.gif", "--force-fallback"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GIF conversion failed"));
}

#[test]
fn test_bad_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("snipkit.toml");
    std::fs::write(&config, "[snipkit]\nthreads = 0\n").unwrap();

    Command::cargo_bin("extract-clip")
        .unwrap()
        .current_dir(dir.path())
        .arg("whatever.mp4")
        .assert()
        .failure()
        .stderr(predicate::str::contains("threads"));
}

/// Container duration of a media file as read back through libav
fn media_duration(path: &Path) -> f64 {
    LibavMediaAdapter::new().unwrap();
    LibavClip::open(path).unwrap().duration().seconds
}

#[test]
fn test_extract_clip_in_range_keeps_requested_duration() {
    let dir = TempDir::new().unwrap();
    let Some(sample) = render_sample(&dir, 4) else {
        return;
    };

    Command::cargo_bin("extract-clip")
        .unwrap()
        .current_dir(dir.path())
        .arg(&sample)
        .args(["-s", "0.5", "-d", "2"])
        .assert()
        .success();

    let written = media_duration(&dir.path().join("sample_clip_0_2.mp4"));
    assert!((written - 2.0).abs() < 0.1, "clip lasts {}s", written);
}

#[test]
fn test_extract_clip_past_end_is_shortened() {
    let dir = TempDir::new().unwrap();
    let Some(sample) = render_sample(&dir, 4) else {
        return;
    };
    let remaining = media_duration(&sample) - 1.0;

    Command::cargo_bin("extract-clip")
        .unwrap()
        .current_dir(dir.path())
        .arg(&sample)
        .args(["-s", "1", "-d", "10", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"truncated\": true"));

    let written = media_duration(&dir.path().join("sample_clip_1_3.mp4"));
    assert!(
        (written - remaining).abs() < 0.1,
        "clip lasts {}s, expected {}s",
        written,
        remaining
    );
    assert!(written < remaining + 0.1);
}

#[test]
fn test_mp4_to_gif_both_backends_end_to_end() {
    let dir = TempDir::new().unwrap();
    let Some(sample) = render_sample(&dir, 2) else {
        return;
    };

    for (name, force_fallback) in [("tool.gif", false), ("library.gif", true)] {
        let output = dir.path().join(name);
        let mut command = Command::cargo_bin("mp4-to-gif").unwrap();
        command
            .arg(&sample)
            .arg("-o")
            .arg(&output)
            .args(["--width", "160", "--height", "120", "-s", "0.5", "-d", "1", "-f", "10"])
            .arg("--json");
        if force_fallback {
            command.arg("--force-fallback");
        }
        let stdout = command.assert().success().get_output().stdout.clone();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"GIF89a"), "{} is not a GIF", name);

        let report: serde_json::Value = serde_json::from_slice(&stdout).unwrap();
        if force_fallback {
            assert_eq!(report["backend"], "library");
            // One second at 10 fps
            assert_eq!(report["frames_written"], 10);
        } else {
            assert_eq!(report["backend"], "external_tool");
        }
    }
}

#[test]
fn test_extract_clip_zero_duration_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let Some(sample) = render_sample(&dir, 2) else {
        return;
    };

    Command::cargo_bin("extract-clip")
        .unwrap()
        .current_dir(dir.path())
        .arg(&sample)
        .args(["-s", "1", "-d", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time range"));

    assert!(!dir.path().join("sample_clip_1_0.mp4").exists());
}
