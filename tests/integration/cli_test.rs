//! Integration tests for the CLI

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

use crate::helpers::Workspace;

fn readalong(ws: &Workspace) -> Command {
    Command::from_std(ws.command())
}

// ============================================================================
// Help Output Tests
// ============================================================================

#[test]
fn help_lists_subcommands() {
    let ws = Workspace::new();
    readalong(&ws)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("boundaries"))
        .stdout(predicate::str::contains("simulate"))
        .stdout(predicate::str::contains("listen"))
        .stdout(predicate::str::contains("position"));
}

#[test]
fn cli_help_snapshot() {
    let ws = Workspace::new();
    let (stdout, _stderr, exit_code) = ws.run(&["--help"]);

    assert_eq!(exit_code, 0);
    insta::assert_snapshot!(stdout, @r"
    Keep audio playback in sync with the paragraphs of an article.

    Paragraph timings are estimated from character counts: each paragraph gets a
    share of the audio duration proportional to its length. Listening positions
    are remembered per article and the playback speed is remembered globally.

    Set RUST_LOG (e.g. RUST_LOG=readalong=debug) for diagnostic output.

    Usage: readalong [OPTIONS] <COMMAND>

    Commands:
      boundaries   Print the estimated time span of every paragraph
      resolve      Show which paragraph is read at the given timestamps
      simulate     Play the article against a virtual clock and print highlight changes
      listen       Interactive read-along in the terminal
      position     Show or clear the saved position for an article
      config       Configuration management
      completions  Generate shell completions
      help         Print this message or the help of the given subcommand(s)

    Options:
          --store <PATH>
              State file for positions and rate (overrides storage.path)

      -h, --help
              Print help (see a summary with '-h')

      -V, --version
              Print version
    ");
}

#[test]
fn missing_duration_is_a_usage_error() {
    let ws = Workspace::new();
    let (_stdout, stderr, exit_code) = ws.run(&["boundaries", &ws.article_arg()]);

    assert_eq!(exit_code, 2);
    assert!(stderr.contains("--duration"));
}

// ============================================================================
// Boundaries / Resolve Tests
// ============================================================================

/// Short article whose 16, 16 and 32 character paragraphs split 64 seconds
/// on whole seconds.
fn write_story(ws: &Workspace) -> String {
    let path = ws.dir.path().join("story.txt");
    fs::write(
        &path,
        "The rivers rose.\n\nThe bridge fell.\n\nNobody had seen a flood like it.\n",
    )
    .expect("Failed to write story");
    path.to_string_lossy().to_string()
}

#[test]
fn boundaries_table_snapshot() {
    let ws = Workspace::new();
    let story = write_story(&ws);
    let (stdout, _stderr, exit_code) = ws.run(&["boundaries", &story, "--duration", "64"]);

    assert_eq!(exit_code, 0);
    insta::assert_snapshot!(stdout, @r"
       #  START    END   CHARS  TEXT
       1  00:00  00:16      16  The rivers rose.
       2  00:16  00:32      16  The bridge fell.
       3  00:32  01:04      32  Nobody had seen a flood like it.
    3 paragraphs over 01:04
    ");
}

#[test]
fn boundaries_prints_proportional_spans() {
    let ws = Workspace::new();
    let (stdout, _stderr, exit_code) =
        ws.run(&["boundaries", &ws.article_arg(), "--duration", "30"]);

    assert_eq!(exit_code, 0);
    let rows: Vec<&str> = stdout.lines().skip(1).take(3).collect();
    assert!(rows[0].contains("00:00") && rows[0].contains("00:10") && rows[0].contains("100"));
    assert!(rows[1].contains("00:10") && rows[1].contains("00:15") && rows[1].contains("50"));
    assert!(rows[2].contains("00:15") && rows[2].contains("00:30") && rows[2].contains("150"));
    assert!(stdout.contains("3 paragraphs over 00:30"));
}

#[test]
fn resolve_reports_paragraph_per_timestamp() {
    let ws = Workspace::new();
    let (stdout, _stderr, exit_code) = ws.run(&[
        "resolve",
        &ws.article_arg(),
        "--duration",
        "30",
        "--at",
        "0",
        "10",
        "12",
        "29.99",
        "45",
    ]);

    assert_eq!(exit_code, 0);
    let paragraphs: Vec<&str> = stdout
        .lines()
        .map(|l| l.split("-> paragraph ").nth(1).unwrap_or("?"))
        .map(|rest| rest.split(':').next().unwrap_or("?"))
        .collect();
    assert_eq!(paragraphs, vec!["1", "1", "2", "3", "3"]);
}

#[test]
fn zero_duration_is_rejected() {
    let ws = Workspace::new();
    readalong(&ws)
        .args(["boundaries", ws.article_arg().as_str(), "--duration", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duration must be a positive number"));
}

#[test]
fn missing_article_is_reported() {
    let ws = Workspace::new();
    readalong(&ws)
        .args(["boundaries", "no-such-article.txt", "--duration", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read article"))
        .stderr(predicate::str::contains("no-such-article.txt"));
}

#[test]
fn empty_article_is_reported() {
    let ws = Workspace::new();
    let empty = ws.dir.path().join("empty.txt");
    std::fs::write(&empty, "\n\n   \n").unwrap();
    readalong(&ws)
        .args(["boundaries", empty.to_str().unwrap(), "--duration", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("contains no paragraphs"));
}

// ============================================================================
// Simulate Tests
// ============================================================================

#[test]
fn simulate_walks_through_every_paragraph() {
    let ws = Workspace::new();
    let (stdout, _stderr, exit_code) = ws.run(&[
        "simulate",
        &ws.article_arg(),
        "--duration",
        "30",
        "--ephemeral",
    ]);

    assert_eq!(exit_code, 0);
    let highlights: Vec<&str> = stdout.lines().filter(|l| l.contains("paragraph")).collect();
    assert_eq!(highlights.len(), 3, "{}", stdout);
    assert!(highlights[0].contains("paragraph 1/3"));
    assert!(highlights[1].starts_with("[00:10]") && highlights[1].contains("paragraph 2/3"));
    assert!(highlights[2].starts_with("[00:15]") && highlights[2].contains("paragraph 3/3"));
    assert!(stdout.contains("Finished at 00:30"));
}

#[test]
fn simulate_output_snapshot() {
    let ws = Workspace::new();
    let story = write_story(&ws);
    let (stdout, _stderr, exit_code) =
        ws.run(&["simulate", &story, "--duration", "64", "--ephemeral"]);

    assert_eq!(exit_code, 0);
    insta::assert_snapshot!(stdout, @r"
    Rate: 1x
    [00:00] paragraph 1/3: The rivers rose.
    [00:16] paragraph 2/3: The bridge fell.
    [00:32] paragraph 3/3: Nobody had seen a flood like it.
    Finished at 01:04
    ");
}

#[test]
fn ephemeral_simulation_leaves_no_state_file() {
    let ws = Workspace::new();
    let (_stdout, _stderr, exit_code) = ws.run(&[
        "simulate",
        &ws.article_arg(),
        "--duration",
        "30",
        "--ephemeral",
        "--key",
        "item-1",
    ]);

    assert_eq!(exit_code, 0);
    assert!(!ws.store_path().exists());
}

#[test]
fn stopped_simulation_resumes_where_it_left_off() {
    let ws = Workspace::new();
    let article = ws.article_arg();

    let (stdout, _stderr, exit_code) = ws.run(&[
        "simulate", &article, "--duration", "30", "--key", "42", "--stop-at", "12",
    ]);
    assert_eq!(exit_code, 0);
    assert!(stdout.contains("Paused at 00:12"), "{}", stdout);

    let (stdout, _stderr, _) = ws.run(&["position", "42"]);
    assert!(stdout.contains("42: 00:12 (12.00s)"), "{}", stdout);

    let (stdout, _stderr, exit_code) =
        ws.run(&["simulate", &article, "--duration", "30", "--key", "42"]);
    assert_eq!(exit_code, 0);
    assert!(stdout.contains("Resuming 42 at 00:12"), "{}", stdout);
    let first = stdout.lines().find(|l| l.contains("paragraph")).unwrap();
    assert!(first.contains("paragraph 2/3"), "{}", first);
    assert!(!stdout.contains("paragraph 1/3"));
}

#[test]
fn positions_are_kept_per_key() {
    let ws = Workspace::new();
    let article = ws.article_arg();

    ws.run(&["simulate", &article, "--duration", "30", "--key", "a", "--stop-at", "5"]);
    ws.run(&["simulate", &article, "--duration", "30", "--key", "b", "--stop-at", "20"]);

    let (stdout, _, _) = ws.run(&["position", "a"]);
    assert!(stdout.contains("00:05"));
    let (stdout, _, _) = ws.run(&["position", "b"]);
    assert!(stdout.contains("00:20"));
}

#[test]
fn allowed_rate_is_remembered_between_runs() {
    let ws = Workspace::new();
    let article = ws.article_arg();

    let (stdout, _stderr, _) = ws.run(&[
        "simulate", &article, "--duration", "30", "--rate", "1.5", "--stop-at", "3",
    ]);
    assert!(stdout.contains("Rate: 1.5x"), "{}", stdout);

    let (stdout, _stderr, _) = ws.run(&[
        "simulate", &article, "--duration", "30", "--key", "other", "--stop-at", "3",
    ]);
    assert!(stdout.contains("Rate: 1.5x"), "{}", stdout);
}

#[test]
fn disallowed_rate_is_refused() {
    let ws = Workspace::new();
    let (stdout, stderr, exit_code) = ws.run(&[
        "simulate",
        &ws.article_arg(),
        "--duration",
        "30",
        "--rate",
        "3",
        "--ephemeral",
    ]);

    assert_eq!(exit_code, 0);
    assert!(stderr.contains("Rate 3x is not allowed"), "{}", stderr);
    assert!(stdout.contains("Rate: 1x"));
}

// ============================================================================
// Position Tests
// ============================================================================

#[test]
fn unknown_key_has_no_position() {
    let ws = Workspace::new();
    readalong(&ws)
        .args(["position", "never-played"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved position for never-played"));
}

#[test]
fn clearing_a_position_forgets_it() {
    let ws = Workspace::new();
    ws.run(&[
        "simulate",
        &ws.article_arg(),
        "--duration",
        "30",
        "--key",
        "gone",
        "--stop-at",
        "8",
    ]);

    readalong(&ws)
        .args(["position", "gone", "--clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared saved position for gone"));

    readalong(&ws)
        .args(["position", "gone"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved position"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn config_show_prints_defaults() {
    let ws = Workspace::new();
    readalong(&ws)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[playback]"))
        .stdout(predicate::str::contains("allowed_rates"))
        .stdout(predicate::str::contains("scroll = \"while-playing\""));
}

#[test]
fn config_path_honours_environment() {
    let ws = Workspace::new();
    readalong(&ws)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains("(not created)"));
}

#[test]
fn config_file_changes_skip_distances() {
    let ws = Workspace::new();
    ws.write_config("[playback]\nskip_forward_secs = 10.0\n\n[sync]\nscroll = \"never\"\n");

    readalong(&ws)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skip_forward_secs = 10.0"))
        .stdout(predicate::str::contains("scroll = \"never\""));
}

#[test]
fn config_init_writes_loadable_defaults() {
    let ws = Workspace::new();
    readalong(&ws)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));

    let written = std::fs::read_to_string(ws.config_path()).unwrap();
    assert!(written.contains("[playback]"));
    assert!(written.contains("restore_epsilon_secs = 0.1"));

    readalong(&ws)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    readalong(&ws).args(["config", "show"]).assert().success();
}

#[test]
fn zero_restore_epsilon_config_is_rejected() {
    let ws = Workspace::new();
    ws.write_config("[playback]\nrestore_epsilon_secs = 0.0\n");

    readalong(&ws)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("restore_epsilon_secs must be a positive number"));
}

#[test]
fn invalid_config_is_rejected() {
    let ws = Workspace::new();
    ws.write_config("[playback]\ndefault_rate = 4.0\n");

    readalong(&ws)
        .args(["simulate", ws.article_arg().as_str(), "--duration", "30", "--ephemeral"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));
}

#[test]
fn completions_are_generated() {
    let ws = Workspace::new();
    readalong(&ws)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("readalong"));
}
