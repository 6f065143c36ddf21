use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use engine::{Board, BoardListener, Color, DrawType, GameState, HistoryListener, Move};

const LONG_GAMES: &str = include_str!("long_games.txt");

struct Step {
    mv: Move,
    description: String,
    fen: String,
}

fn parse_games(text: &str) -> Vec<Vec<Step>> {
    let mut games = Vec::new();
    let mut current = Vec::new();
    let mut lines = text.lines().map(str::trim);
    while let Some(line) = lines.next() {
        if line.starts_with('#') {
            continue;
        }
        if line.is_empty() {
            if !current.is_empty() {
                games.push(std::mem::take(&mut current));
            }
            continue;
        }
        let (move_text, description) = line.split_once(' ').expect("move line has a description");
        let fen = lines.next().expect("move line is followed by a FEN");
        current.push(Step {
            mv: move_text.parse().expect("valid move text"),
            description: description.to_string(),
            fen: fen.to_string(),
        });
    }
    if !current.is_empty() {
        games.push(current);
    }
    games
}

#[derive(Default)]
struct Results {
    mates: AtomicUsize,
    draws: AtomicUsize,
}

impl HistoryListener for Results {}

impl BoardListener for Results {
    fn checkmate(&self, _board: &Board, _loser: Color) {
        self.mates.fetch_add(1, Ordering::SeqCst);
    }

    fn drawn(&self, _board: &Board, _draw: DrawType) {
        self.draws.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn long_games_replay_matches_fen() {
    let games = parse_games(LONG_GAMES);
    assert_eq!(games.len(), 2, "long_games.txt must contain games");

    for (game_idx, game) in games.iter().enumerate() {
        let mut board = Board::new();
        for (ply, step) in game.iter().enumerate() {
            board.play(step.mv).unwrap_or_else(|err| {
                panic!("game {} ply {} ({}): {}", game_idx + 1, ply + 1, step.mv, err)
            });
            assert_eq!(
                board.state().to_fen(),
                step.fen,
                "game {} ply {} ({})",
                game_idx + 1,
                ply + 1,
                step.mv
            );
            assert_eq!(
                board.last_move_description(),
                Some(step.description.as_str()),
                "game {} ply {}",
                game_idx + 1,
                ply + 1
            );
        }
        assert_eq!(board.history().main_line().len(), game.len());
    }
}

#[test]
fn every_recorded_state_survives_fen_round_trip() {
    for game in parse_games(LONG_GAMES) {
        let mut board = Board::new();
        for step in &game {
            board.play(step.mv).expect("legal move");
            let state = *board.state();
            let decoded = GameState::from_fen(&state.to_fen()).expect("encoded FEN parses");
            assert_eq!(decoded, state);
        }
    }
}

#[test]
fn opera_game_ends_in_mate() {
    let games = parse_games(LONG_GAMES);
    let mut board = Board::new();
    let results = Arc::new(Results::default());
    board.add_listener(results.clone());
    for step in &games[0] {
        board.play(step.mv).expect("legal move");
    }
    assert!(board.is_checkmate());
    assert_eq!(board.turn(), Color::Black);
    assert_eq!(results.mates.load(Ordering::SeqCst), 1);
    assert_eq!(results.draws.load(Ordering::SeqCst), 0);
}

#[test]
fn replaying_a_game_walks_the_existing_line() {
    let games = parse_games(LONG_GAMES);
    let mut board = Board::new();
    for step in &games[1] {
        board.play(step.mv).expect("legal move");
    }
    let nodes = board.history().tree().node_count();
    board.reset();
    for step in &games[1] {
        board.play(step.mv).expect("legal move");
    }
    assert_eq!(board.history().tree().node_count(), nodes);
    assert_eq!(board.history().current(), board.history().end_of_main_line());
}
