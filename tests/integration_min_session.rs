// Minimal integration test that drives the compiled binary through a PTY.
// This exercises the real event loop and crossterm input handling across
// the main boundaries without relying on internal modules.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Marked Unix-only and ignored by default to avoid CI/platform issues.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn dashboard_opens_and_quits_cleanly() -> Result<(), Box<dyn std::error::Error>> {
    // Resolve path to compiled binary (debug build during tests)
    let bin = assert_cmd::cargo::cargo_bin("steelcore");

    // Isolated HOME so the session cannot touch a real database
    let home = tempfile::tempdir()?;
    let cmd = format!("env HOME={} {}", home.path().display(), bin.display());

    // Spawn the TUI inside a pseudo terminal
    let mut p = spawn(cmd)?;

    // Give the app a moment to initialize the terminal/alternate screen
    std::thread::sleep(Duration::from_millis(300));

    // Visit the timer screen and come back
    p.send("t")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("\x1b")?; // ESC back to the dashboard

    // Quit from the dashboard
    std::thread::sleep(Duration::from_millis(100));
    p.send("q")?;

    // Wait for the program to terminate cleanly
    p.expect(Eof)?;
    Ok(())
}
