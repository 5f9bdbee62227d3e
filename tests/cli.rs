use assert_cmd::Command;
use predicates::prelude::*;

fn tubescript() -> Command {
    Command::cargo_bin("tubescript").unwrap()
}

#[test]
fn help_lists_subcommands() {
    tubescript()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("preview"));
}

#[test]
fn fetch_rejects_empty_url_without_network() {
    tubescript()
        .args(["--quiet", "fetch", ""])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Please enter a valid YouTube URL"));
}

#[test]
fn fetch_rejects_url_without_video_id() {
    tubescript()
        .args(["--quiet", "fetch", "https://example.com/about", "--format", "docx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn preview_prints_id_and_short_link() {
    tubescript()
        .args(["preview", "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Video ID: dQw4w9WgXcQ"))
        .stdout(predicate::str::contains("https://youtu.be/dQw4w9WgXcQ"));
}

#[test]
fn preview_rejects_invalid_url() {
    tubescript()
        .args(["preview", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("valid YouTube URL"));
}

#[test]
fn config_show_prints_settings() {
    tubescript()
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Preferred Languages"));
}
