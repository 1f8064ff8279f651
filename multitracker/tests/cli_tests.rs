use image::{Rgb, RgbImage};
use std::path::Path;
use std::process::{Command, Output};

fn multitracker(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_multitracker"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch multitracker")
}

fn write_frames(dir: &Path, count: usize) {
    let frame = RgbImage::from_fn(64, 48, |x, y| {
        if (20..40).contains(&x) && (12..32).contains(&y) {
            let v = ((x * 31 + y * 17) % 97) as u8 + 120;
            Rgb([v, v / 2, 255 - v])
        } else {
            Rgb([8, 8, 8])
        }
    });
    for i in 0..count {
        frame.save(dir.join(format!("{:03}.png", i))).unwrap();
    }
}

#[test]
fn test_invalid_video_exits_255() {
    let out = multitracker(&["--video", "/nonexistent/person.mp4", "--headless"]);
    assert_eq!(out.status.code(), Some(255));

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Error opening video file"), "{}", stderr);
}

#[test]
fn test_unknown_tracker_exits_with_list() {
    let out = multitracker(&["--tracker", "FOO", "--headless"]);
    assert_eq!(out.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("BOOSTING, MIL, KCF, TLD, MEDIANFLOW, GOTURN, MOSSE, CSRT"),
        "{}",
        stderr
    );
}

#[test]
fn test_bad_roi_is_configuration_error() {
    let out = multitracker(&["--roi", "1,2,3", "--headless"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn test_no_regions_exits_zero_without_output() {
    let frames = tempfile::tempdir().unwrap();
    write_frames(frames.path(), 3);
    let output = tempfile::tempdir().unwrap();
    let output_dir = output.path().join("annotated");

    let out = multitracker(&[
        "--video",
        frames.path().to_str().unwrap(),
        "--headless",
        "--output-dir",
        output_dir.to_str().unwrap(),
    ]);

    assert_eq!(out.status.code(), Some(0));
    let written = std::fs::read_dir(&output_dir)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(written, 0);
}

#[test]
fn test_headless_run_writes_annotated_frames() {
    let frames = tempfile::tempdir().unwrap();
    write_frames(frames.path(), 5);
    let output = tempfile::tempdir().unwrap();

    let out = multitracker(&[
        "--video",
        frames.path().to_str().unwrap(),
        "--tracker",
        "MOSSE",
        "--roi",
        "20,12,20,20",
        "--headless",
        "--output-dir",
        output.path().to_str().unwrap(),
    ]);

    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Default tracking algorithm is CSRT"), "{}", stdout);
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 4);
}
