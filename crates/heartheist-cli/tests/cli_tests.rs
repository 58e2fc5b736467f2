//! Integration tests for the `heartheist` CLI binary.
//!
//! These tests run the CLI as a subprocess against temporary directories and
//! check exit codes, stdout and the files it writes.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::process::Command;

/// Helper: locate the `heartheist` binary built by `cargo test`.
fn heartheist_bin() -> String {
    let path = env!("CARGO_BIN_EXE_heartheist");
    assert!(
        Path::new(path).exists(),
        "heartheist binary not found at {path}"
    );
    path.to_owned()
}

/// Helper: run heartheist with args and return (`exit_code`, stdout, stderr).
fn run(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(heartheist_bin())
        .args(args)
        .env_remove("HEARTHEIST_STAGES_DIR")
        .output()
        .expect("failed to execute heartheist");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ── Version & help ───────────────────────────────────────────────────

#[test]
fn test_version_flag() {
    let (code, stdout, _) = run(&["--version"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("heartheist"), "version output: {stdout}");
}

#[test]
fn test_help_lists_commands() {
    let (code, stdout, _) = run(&["--help"]);
    assert_eq!(code, 0);
    for sub in ["generate", "invite", "stages", "render", "score"] {
        assert!(stdout.contains(sub), "help should list '{sub}'");
    }
}

// ── Score ────────────────────────────────────────────────────────────

#[test]
fn test_score_is_symmetric_and_in_range() {
    let (code, forward, _) = run(&["score", "Parth", "Sneha"]);
    assert_eq!(code, 0);
    let (_, backward, _) = run(&["score", "  sneha ", "PARTH"]);
    assert_eq!(forward, backward);

    let score: u8 = forward.trim().parse().unwrap();
    assert!((80..=100).contains(&score));
    assert_eq!(
        score,
        heartheist_core::compat::compatibility_score("Parth", "Sneha")
    );
}

// ── Invite ───────────────────────────────────────────────────────────

#[test]
fn test_invite_prints_calendar() {
    let (code, stdout, _) = run(&[
        "invite",
        "--sender",
        "Parth",
        "--recipient",
        "Sneha",
        "--date",
        "2027-02-14",
        "--duration",
        "90",
        "--location",
        "Cafe; Rooftop",
    ]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(stdout.contains("SUMMARY:Valentine Date Night with Sneha\r\n"));
    assert!(stdout.contains("DTSTART:20270214T190000\r\n"));
    assert!(stdout.contains("DTEND:20270214T203000\r\n"));
    assert!(stdout.contains("LOCATION:Cafe\\; Rooftop\r\n"));
    assert!(stdout.ends_with("END:VCALENDAR\r\n"));
}

#[test]
fn test_invite_rejects_bad_date() {
    let (code, _, stderr) = run(&["invite", "--date", "Feb 14"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("YYYY-MM-DD"), "stderr: {stderr}");
}

#[test]
fn test_invite_rejects_out_of_range_year() {
    let (code, stdout, stderr) = run(&[
        "invite",
        "--date",
        "+262142-12-31",
        "--duration",
        "1440",
    ]);
    assert_eq!(code, 1, "stderr: {stderr}");
    assert!(stdout.is_empty());
    assert!(stderr.contains("YYYY-MM-DD"), "stderr: {stderr}");
}

// ── Stages ───────────────────────────────────────────────────────────

#[test]
fn test_stages_init_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let stages = dir.path().join("stages");

    let (code, stdout, _) = run(&["stages", "init", "--dir", path_str(&stages)]);
    assert_eq!(code, 0);
    for file in ["vault.html", "puzzle.html", "rain.html", "finale.html"] {
        assert!(stages.join(file).exists(), "{file} not created");
        assert!(stdout.contains(file));
    }

    fs::write(stages.join("rain.html"), "custom").unwrap();
    let (code, stdout, _) = run(&["stages", "init", "--dir", path_str(&stages)]);
    assert_eq!(code, 0);
    assert!(stdout.contains("already present"));
    assert_eq!(fs::read_to_string(stages.join("rain.html")).unwrap(), "custom");
}

#[test]
fn test_stages_list_marks_missing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("vault.html"), "<p>{{RECIPIENT}}</p>").unwrap();

    let (code, stdout, _) = run(&["stages", "list", "--dir", path_str(dir.path())]);
    assert_eq!(code, 0);
    assert!(stdout.contains("vault.html"));
    assert!(stdout.contains("finale.html"));
    assert!(stdout.contains("(missing)"));
}

// ── Generate ─────────────────────────────────────────────────────────

#[test]
fn test_generate_writes_page_and_invite() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let stages = dir.path().join("stages");

    let (code, stdout, stderr) = run(&[
        "generate",
        "--sender",
        "Parth",
        "--recipient",
        "Sne\"ha",
        "--date",
        "2027-02-14",
        "--stage",
        "finale",
        "--out-dir",
        path_str(&out),
        "--stages-dir",
        path_str(&stages),
    ]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("Sne\"ha"));

    let page = fs::read_to_string(out.join("heart_heist_Sne_ha.html")).unwrap();
    assert!(page.contains("<title>Finale"));
    assert!(page.contains(r#"download="valentine_Sne&quot;ha.ics""#));
    assert!(!page.contains("{{"));

    let ics = fs::read_to_string(out.join("valentine_Sne_ha.ics")).unwrap();
    assert!(ics.contains("DTSTART:20270214T190000"));

    assert!(stages.join("finale.html").exists());
}

#[test]
fn test_generate_bundle_with_photo() {
    let dir = tempfile::tempdir().unwrap();
    let photo = dir.path().join("us.png");
    fs::write(&photo, [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();

    let (code, _, stderr) = run(&[
        "generate",
        "--recipient",
        "Sneha",
        "--photo-b",
        path_str(&photo),
        "--bundle",
        "--out-dir",
        path_str(dir.path()),
        "--stages-dir",
        path_str(&dir.path().join("stages")),
    ]);
    assert_eq!(code, 0, "stderr: {stderr}");

    let bundle = fs::read_to_string(dir.path().join("valentine_for_Sneha.html")).unwrap();
    assert_eq!(bundle.matches("<iframe class=\"scene\"").count(), 4);
    assert!(bundle.contains("data:image/png;base64,iVBORw0KGgo="));
    assert!(dir.path().join("valentine_Sneha.ics").exists());
}

#[test]
fn test_generate_rejects_unsupported_photo() {
    let dir = tempfile::tempdir().unwrap();
    let photo = dir.path().join("cat.gif");
    fs::write(&photo, b"GIF89a").unwrap();

    let (code, _, stderr) = run(&[
        "generate",
        "--photo-a",
        path_str(&photo),
        "--out-dir",
        path_str(dir.path()),
        "--stages-dir",
        path_str(&dir.path().join("stages")),
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unsupported photo"));
}

#[test]
fn test_generate_rejects_unknown_stage() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run(&[
        "generate",
        "--stage",
        "epilogue",
        "--out-dir",
        path_str(dir.path()),
        "--stages-dir",
        path_str(&dir.path().join("stages")),
    ]);
    assert_ne!(code, 0);
}

// ── Render ───────────────────────────────────────────────────────────

#[test]
fn test_render_injects_raw_values() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("t.html");
    fs::write(&template, "<h1>{{NAME}}</h1><p>{{NAME}} & {{OTHER}}</p>").unwrap();

    let (code, stdout, _) = run(&[
        "render",
        "--template",
        path_str(&template),
        "--set",
        "NAME=<b>Sneha</b>",
    ]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "<h1><b>Sneha</b></h1><p><b>Sneha</b> & {{OTHER}}</p>");
}

#[test]
fn test_render_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("t.html");
    let out = dir.path().join("out.html");
    fs::write(&template, "hi {{A}}").unwrap();

    let (code, _, _) = run(&[
        "render",
        "--template",
        path_str(&template),
        "--set",
        "{{A}}=there",
        "--out",
        path_str(&out),
    ]);
    assert_eq!(code, 0);
    assert_eq!(fs::read_to_string(out).unwrap(), "hi there");
}
