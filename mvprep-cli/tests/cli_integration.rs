use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn mvprep_cmd() -> Command {
    let mut cmd = Command::cargo_bin("mvprep").expect("Failed to find mvprep binary");
    cmd.env_remove("MVPREP_CONFIG");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    mvprep_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("harmonize"))
        .stdout(contains("split"))
        .stdout(contains("prepare"));
}

#[test]
fn test_split_help_shows_log_overrides() {
    mvprep_cmd()
        .args(["split", "--help"])
        .assert()
        .success()
        .stdout(contains("--length-log"))
        .stdout(contains("--count-log"));
}

#[test]
fn test_harmonize_non_existent_input() {
    mvprep_cmd()
        .args(["harmonize", "surely/this/does/not/exist/song.mp4"])
        .assert()
        .failure()
        .stderr(contains("Invalid input path"));
}

#[test]
fn test_split_empty_directory_succeeds() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    mvprep_cmd()
        .arg("split")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(contains("No video files found"));

    assert!(!dir.path().join("scene_length.csv").exists());
    Ok(())
}

#[test]
fn test_non_video_file_is_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, "not a video")?;

    mvprep_cmd()
        .arg("prepare")
        .arg(&notes)
        .assert()
        .failure()
        .stderr(contains("not a supported video file"));
    Ok(())
}

#[test]
fn test_invalid_config_file_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("mvprep.toml");
    fs::write(&config, "[scene_detection]\nthreshold = 2.0\n")?;

    mvprep_cmd()
        .arg("--config")
        .arg(&config)
        .arg("harmonize")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(contains("Configuration error"));
    Ok(())
}

#[test]
fn test_log_dir_receives_run_log() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let logs = dir.path().join("logs");

    mvprep_cmd()
        .arg("--log-dir")
        .arg(&logs)
        .arg("harmonize")
        .arg(dir.path())
        .assert()
        .success();

    let entries: Vec<_> = fs::read_dir(&logs)?.collect::<Result<_, _>>()?;
    assert_eq!(entries.len(), 1);
    let name = entries[0].file_name().to_string_lossy().into_owned();
    assert!(name.starts_with("mvprep_") && name.ends_with(".log"));
    Ok(())
}

#[test]
fn test_split_without_ffmpeg_skips_videos() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let empty_bin = tempdir()?;
    fs::write(dir.path().join("song1.mp4"), "not really a video")?;

    mvprep_cmd()
        .current_dir(dir.path())
        .env("PATH", empty_bin.path())
        .arg("split")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(contains("song1.mp4: ffmpeg unavailable, not split"))
        .stdout(contains("1 skipped, 0 failed"));

    assert!(!dir.path().join("song1").exists());
    assert!(!dir.path().join("scene_length.csv").exists());
    assert!(!dir.path().join("scene_number.csv").exists());
    Ok(())
}
