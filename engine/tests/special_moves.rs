use engine::{
    Board, CastleSide, Color, GameState, Move, Piece, PieceKind, Promotion, Square,
};

fn play_all(board: &mut Board, moves: &[&str]) {
    for text in moves {
        let mv: Move = text.parse().expect("valid move text");
        board.play(mv).unwrap_or_else(|err| panic!("{text} should be legal: {err}"));
    }
}

#[test]
fn both_sides_castle_king_side() {
    let mut board = Board::new();
    play_all(&mut board, &["e2e4", "e7e5", "g1f3", "g8f6", "f1c4", "f8c5", "e1g1"]);
    assert_eq!(board.last_move_description(), Some("4.O-O"));
    assert_eq!(board.piece_at(Square::G1), Some(Piece::new(Color::White, PieceKind::King)));
    assert_eq!(board.piece_at(Square::F1), Some(Piece::new(Color::White, PieceKind::Rook)));
    assert_eq!(board.piece_at(Square::H1), None);
    assert!(!board.state().can_castle(Color::White, CastleSide::KingSide));
    assert!(!board.state().can_castle(Color::White, CastleSide::QueenSide));
    assert!(board.can_castle(CastleSide::KingSide));

    play_all(&mut board, &["e8g8"]);
    assert_eq!(board.last_move_description(), Some("O-O"));
    assert_eq!(board.piece_at(Square::G8), Some(Piece::new(Color::Black, PieceKind::King)));
    assert_eq!(board.piece_at(Square::F8), Some(Piece::new(Color::Black, PieceKind::Rook)));
    assert_eq!(
        board.state().to_fen(),
        "rnbq1rk1/pppp1ppp/5n2/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1 w - - 6 5"
    );
}

#[test]
fn queen_side_castle_moves_the_rook_to_d_file() {
    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("valid fen");
    play_all(&mut board, &["e1c1"]);
    assert_eq!(board.last_move_description(), Some("1.O-O-O"));
    // the rook on d1 now covers d8
    assert!(!board.is_legal(&Move::new(Square::E8, Square::C8)));
    play_all(&mut board, &["e8g8"]);
    assert_eq!(board.state().to_fen(), "r4rk1/8/8/8/8/8/8/2KR3R w - - 2 2");
}

#[test]
fn king_move_drops_both_rights() {
    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("valid fen");
    play_all(&mut board, &["e1f1", "e8d8", "f1e1", "d8e8"]);
    assert_eq!(board.state().to_fen(), "r3k2r/8/8/8/8/8/8/R3K2R w - - 4 3");
    assert!(!board.is_legal(&Move::new(Square::E1, Square::G1)));
}

#[test]
fn capturing_a_rook_at_home_drops_its_right() {
    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("valid fen");
    play_all(&mut board, &["a1a8"]);
    assert_eq!(board.last_move_description(), Some("1.Rxa8+"));
    assert_eq!(board.state().to_fen(), "R3k2r/8/8/8/8/8/8/4K2R b Kk - 0 1");
}

#[test]
fn en_passant_capture_removes_the_pawn() {
    let mut board = Board::new();
    play_all(&mut board, &["e2e4", "d7d5", "e4e5", "f7f5"]);
    assert_eq!(board.en_passant_target(), Some(Square::F6));
    assert!(board.legal_moves_starting_on(Square::E5).contains(&Move::new(Square::E5, Square::F6)));

    play_all(&mut board, &["e5f6"]);
    assert_eq!(board.last_move_description(), Some("3.exf6 ep."));
    assert_eq!(board.piece_at(Square::F5), None);
    assert_eq!(board.piece_at(Square::F6), Some(Piece::new(Color::White, PieceKind::Pawn)));
    assert_eq!(board.half_moves_since_pawn_move_or_capture(), 0);
    assert_eq!(board.en_passant_target(), None);
}

#[test]
fn en_passant_expires_after_one_move() {
    let mut board = Board::new();
    play_all(&mut board, &["e2e4", "d7d5", "e4e5", "f7f5", "g1f3", "b8c6"]);
    assert_eq!(board.en_passant_target(), None);
    match board.play(Move::new(Square::E5, Square::F6)) {
        Err(err) => assert_eq!(err.reason, "not a legal move"),
        Ok(_) => panic!("stale en passant was accepted"),
    }
}

#[test]
fn every_double_step_sets_the_target() {
    let mut board = Board::new();
    play_all(&mut board, &["a2a4"]);
    assert_eq!(board.en_passant_target(), Some(Square::A3));
    play_all(&mut board, &["h7h5"]);
    assert_eq!(board.en_passant_target(), Some(Square::H6));
    play_all(&mut board, &["a4a5"]);
    assert_eq!(board.en_passant_target(), None);
}

#[test]
fn promotion_to_each_piece() {
    let fen = "7k/P7/8/8/8/8/8/7K w - - 0 25";
    let expected = [
        (Promotion::Queen, "25.a8=Q+", "Q6k/8/8/8/8/8/8/7K b - - 0 25"),
        (Promotion::Rook, "25.a8=R+", "R6k/8/8/8/8/8/8/7K b - - 0 25"),
        (Promotion::Bishop, "25.a8=B", "B6k/8/8/8/8/8/8/7K b - - 0 25"),
        (Promotion::Knight, "25.a8=N", "N6k/8/8/8/8/8/8/7K b - - 0 25"),
    ];
    for (promotion, description, after) in expected {
        let mut board = Board::from_fen(fen).expect("valid fen");
        board
            .play_promotion(Square::A7, Square::A8, promotion)
            .unwrap_or_else(|err| panic!("{promotion}: {err}"));
        assert_eq!(board.last_move_description(), Some(description));
        assert_eq!(board.state().to_fen(), after);
    }
}

#[test]
fn promotion_moves_are_all_enumerated() {
    let board = Board::from_fen("7k/P7/8/8/8/8/8/7K w - - 0 25").expect("valid fen");
    let moves = board.legal_moves_starting_on(Square::A7);
    assert_eq!(moves.len(), 4);
    for promotion in Promotion::ALL {
        assert!(moves.contains(&Move::with_promotion(Square::A7, Square::A8, promotion)));
    }
    assert_eq!(
        Move::build(Square::A7, Square::A8, board.position()),
        Move::with_promotion(Square::A7, Square::A8, Promotion::Queen)
    );
}

#[test]
fn black_promotes_on_the_first_rank() {
    let mut board = Board::from_fen("7k/8/8/8/8/8/p7/4K3 b - - 0 40").expect("valid fen");
    play_all(&mut board, &["a2a1q"]);
    assert_eq!(board.last_move_description(), Some("a1=Q+"));
    assert_eq!(board.state().to_fen(), "7k/8/8/8/8/8/8/q3K3 w - - 0 41");
}

#[test]
fn ambiguous_moves_name_the_file_or_rank() {
    let mut board = Board::from_fen("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1").expect("valid fen");
    play_all(&mut board, &["b1d2"]);
    assert_eq!(board.last_move_description(), Some("1.Nbd2"));

    let mut board = Board::from_fen("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1").expect("valid fen");
    play_all(&mut board, &["a1a3"]);
    assert_eq!(board.last_move_description(), Some("1.R1a3"));
}

#[test]
fn three_rivals_need_file_and_rank() {
    // queens on a3 and c1 both cover b2, sharing a file and a rank with a1
    let mut board = Board::from_fen("4k3/8/8/8/8/Q7/8/Q1Q4K w - - 0 1").expect("valid fen");
    play_all(&mut board, &["a1b2"]);
    assert_eq!(board.last_move_description(), Some("1.Qa1b2"));

    let mut board = Board::from_fen("4k3/8/8/8/8/Q7/8/Q1Q4K w - - 0 1").expect("valid fen");
    play_all(&mut board, &["c1b2"]);
    assert_eq!(board.last_move_description(), Some("1.Qcb2"));
}

#[test]
fn legal_move_queries_from_the_start() {
    let board = Board::new();
    let total: usize = Square::all()
        .map(|sq| board.legal_moves_starting_on(sq).len())
        .sum();
    assert_eq!(total, 20);
    assert_eq!(
        board.legal_moves_starting_on(Square::B1),
        vec![
            Move::new(Square::B1, Square::A3),
            Move::new(Square::B1, Square::C3)
        ]
    );
    assert_eq!(
        board.legal_moves_ending_on(Square::E4),
        vec![Move::new(Square::E2, Square::E4)]
    );
    assert!(board.can_any_legal_move_start_on(Square::G1));
    assert!(!board.can_any_legal_move_start_on(Square::E1));
    assert!(!board.can_any_legal_move_start_on(Square::E7));
    assert!(board.can_any_legal_move_end_on(Square::F3));
    assert!(!board.can_any_legal_move_end_on(Square::E5));
}

#[test]
fn snapshots_keep_counters() {
    let mut board = Board::new();
    play_all(&mut board, &["g1f3", "g8f6", "b1c3"]);
    let state: &GameState = board.state();
    assert_eq!(state.halfmove_clock(), 3);
    assert_eq!(state.fullmove_number(), 2);
    assert_eq!(state.turn(), Color::Black);
}
