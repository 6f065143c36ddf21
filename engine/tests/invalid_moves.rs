use engine::{Board, IllegalMove, Move, Promotion, Square};

fn play_all(board: &mut Board, moves: &[&str]) {
    for text in moves {
        let mv: Move = text.parse().expect("valid move text");
        board.play(mv).unwrap_or_else(|err| panic!("{text} should be legal: {err}"));
    }
}

fn expect_illegal(board: &mut Board, text: &str) -> IllegalMove {
    let mv: Move = text.parse().expect("valid move text");
    let before = *board.state();
    let nodes = board.history().tree().node_count();
    match board.play(mv) {
        Err(err) => {
            assert_eq!(err.mv, mv);
            assert_eq!(*board.state(), before, "rejected move changed the board");
            assert_eq!(board.history().tree().node_count(), nodes);
            err
        }
        Ok(_) => panic!("expected {text} to be rejected"),
    }
}

#[test]
fn rejects_illegal_knight_move() {
    let mut board = Board::new();
    expect_illegal(&mut board, "g1g3");
}

#[test]
fn rejects_fake_en_passant() {
    let mut board = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 1").expect("valid fen");
    expect_illegal(&mut board, "e5d6");
}

#[test]
fn rejects_move_exposing_king() {
    let mut board = Board::from_fen("k3r3/8/8/8/8/8/4R3/4K3 w - - 0 1").expect("valid fen");
    let err = expect_illegal(&mut board, "e2d2");
    assert_eq!(err.reason, "the king would be in check on d2");
}

#[test]
fn names_the_empty_square_and_the_side_to_move() {
    let mut board = Board::new();
    let err = expect_illegal(&mut board, "e3e4");
    assert_eq!(err.to_string(), "e3-e4: there is no piece on e3");
    let err = expect_illegal(&mut board, "e7e5");
    assert_eq!(err.reason, "it is white's turn to move");
}

#[test]
fn rejects_capturing_own_piece_and_null_moves() {
    let mut board = Board::new();
    expect_illegal(&mut board, "a1a2");
    expect_illegal(&mut board, "e2e2");
}

#[test]
fn sliders_cannot_jump() {
    let mut board = Board::new();
    assert_eq!(expect_illegal(&mut board, "a1a3").reason, "rooks cannot jump over pieces");
    assert_eq!(expect_illegal(&mut board, "c1e3").reason, "bishops cannot jump over pieces");
    assert_eq!(expect_illegal(&mut board, "d1d3").reason, "queens cannot jump over pieces");
    expect_illegal(&mut board, "d1f2");
}

#[test]
fn pawn_movement_rules() {
    let mut board = Board::new();
    expect_illegal(&mut board, "e2e5");
    expect_illegal(&mut board, "e2d3");
    play_all(&mut board, &["e2e4", "e7e5"]);
    assert_eq!(
        expect_illegal(&mut board, "e4e5").reason,
        "pawns can only capture diagonally"
    );
    expect_illegal(&mut board, "e4e3");
    play_all(&mut board, &["d2d3", "d7d6"]);
    expect_illegal(&mut board, "d3d5");
}

#[test]
fn double_step_needs_a_clear_path() {
    let mut board = Board::from_fen("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1").expect("valid fen");
    expect_illegal(&mut board, "e2e4");
    expect_illegal(&mut board, "e2e3");
}

#[test]
fn promotion_must_be_named_and_only_when_promoting() {
    let mut board = Board::from_fen("7k/P7/8/8/8/8/8/7K w - - 0 25").expect("valid fen");
    assert_eq!(
        expect_illegal(&mut board, "a7a8").reason,
        "no promotion piece was specified for this move"
    );
    let mut board = Board::new();
    let mv = Move::with_promotion(Square::E2, Square::E4, Promotion::Queen);
    match board.play(mv) {
        Err(IllegalMove { reason, .. }) => {
            assert_eq!(reason, "only a pawn reaching the back rank can promote")
        }
        other => panic!("expected promotion rejection, got {:?}", other.map(|b| b.to_string())),
    }
}

#[test]
fn castling_restrictions() {
    // out of check
    let mut board = Board::from_fen("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1").expect("valid fen");
    assert_eq!(
        expect_illegal(&mut board, "e1g1").reason,
        "castling out of check is illegal"
    );

    // through check
    let mut board = Board::from_fen("4k3/8/8/8/8/8/5r2/R3K2R w KQ - 0 1").expect("valid fen");
    assert_eq!(
        expect_illegal(&mut board, "e1g1").reason,
        "castling through check is illegal"
    );
    board.play_squares(Square::E1, Square::C1).expect("queen side is safe");

    // into check
    let mut board = Board::from_fen("4k3/8/8/8/8/8/6r1/R3K2R w KQ - 0 1").expect("valid fen");
    assert_eq!(
        expect_illegal(&mut board, "e1g1").reason,
        "the king would be in check on g1"
    );

    // b1 is not crossed by the king but still has to be empty
    let mut board = Board::from_fen("4k3/8/8/8/8/8/8/RN2K2R w KQ - 0 1").expect("valid fen");
    assert_eq!(
        expect_illegal(&mut board, "e1c1").reason,
        "castling is illegal with a piece between the king and rook"
    );

    // no right
    let mut board = Board::from_fen("4k3/8/8/8/8/8/8/R3K2R w Q - 0 1").expect("valid fen");
    assert_eq!(
        expect_illegal(&mut board, "e1g1").reason,
        "castling is illegal in this position"
    );
}

#[test]
fn castling_right_lost_after_rook_moves() {
    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("valid fen");
    play_all(&mut board, &["h1h2", "a8a7", "h2h1", "a7a8"]);
    expect_illegal(&mut board, "e1g1");
    play_all(&mut board, &["e1c1"]);
    expect_illegal(&mut board, "e8c8");
    play_all(&mut board, &["e8g8"]);
}
