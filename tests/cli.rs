//! Smoke tests of the compiled binary over its stdin/stdout protocol.

use assert_cmd::Command;
use predicates::prelude::*;

fn engine() -> Command {
    Command::cargo_bin("cobalt").expect("binary builds")
}

#[test]
fn test_uci_handshake() {
    engine()
        .write_stdin("uci\nisready\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("id name cobalt"))
        .stdout(predicate::str::contains("uciok"))
        .stdout(predicate::str::contains("readyok"))
        .stdout(predicate::str::contains("goodbye"));
}

#[test]
fn test_go_emits_exactly_one_bestmove() {
    let assert = engine()
        .write_stdin("position fen 4k3/8/8/8/8/8/4P3/4K3 w - - 0 1\ngo\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("info depth"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let bestmoves: Vec<&str> = stdout
        .lines()
        .filter(|l| l.starts_with("bestmove "))
        .collect();
    assert_eq!(bestmoves.len(), 1, "stdout was:\n{}", stdout);
}

#[test]
fn test_book_move_from_startpos() {
    // the bundled book opens with e2e4, d2d4 or c2c4
    let assert = engine()
        .write_stdin("ucinewgame\nposition startpos\ngo\nquit\n")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let best = stdout
        .lines()
        .find(|l| l.starts_with("bestmove "))
        .expect("bestmove line");
    assert!(
        ["bestmove e2e4", "bestmove d2d4", "bestmove c2c4"].contains(&best),
        "unexpected opening: {}",
        best
    );
}

#[test]
fn test_mated_position_reports_instead_of_moving() {
    engine()
        .write_stdin(
            "position fen rnb1kbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3\ngo\nquit\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("CHECK MATED SON"))
        .stdout(predicate::str::contains("bestmove").not());
}

#[test]
fn test_unknown_command_is_ignored() {
    engine()
        .write_stdin("flibbertigibbet\nisready\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown command"))
        .stdout(predicate::str::contains("readyok"));
}
