//! Property tests over every reachable board.

use agent_tictactoe::{
    Board, BoardInvariants, InvariantSet, Mark, Outcome, legal_moves, lowest_legal, turn_owner,
    winner,
};
use std::collections::HashSet;

/// Collects every board reachable from the empty board by legal play.
fn reachable_boards() -> Vec<Board> {
    let mut seen = HashSet::new();
    let mut stack = vec![Board::new()];
    let mut boards = Vec::new();

    while let Some(board) = stack.pop() {
        if !seen.insert(board.clone()) {
            continue;
        }
        boards.push(board.clone());
        if winner(&board) != Outcome::InProgress {
            continue;
        }
        let mark = turn_owner(&board);
        for pos in legal_moves(&board) {
            let mut next = board.clone();
            next.place(pos, mark).unwrap();
            stack.push(next);
        }
    }
    boards
}

#[test]
fn test_reachable_board_count() {
    // 5478 distinct positions are reachable in legal play.
    assert_eq!(reachable_boards().len(), 5478);
}

#[test]
fn test_reachable_boards_satisfy_invariants() {
    for board in reachable_boards() {
        assert!(BoardInvariants::check_all(&board).is_ok(), "{board:?}");
        let x = board.count_of(Mark::X);
        let o = board.count_of(Mark::O);
        let expected = if x == o { Mark::X } else { Mark::O };
        assert_eq!(turn_owner(&board), expected);
    }
}

#[test]
fn test_legal_moves_shrink_by_applied_index() {
    for board in reachable_boards() {
        if winner(&board).is_terminal() {
            continue;
        }
        let before = legal_moves(&board);
        let mark = turn_owner(&board);
        for &pos in &before {
            let mut next = board.clone();
            next.place(pos, mark).unwrap();
            let expected: Vec<usize> = before.iter().copied().filter(|&p| p != pos).collect();
            assert_eq!(legal_moves(&next), expected);
            assert_eq!(turn_owner(&next), mark.opponent());
        }
    }
}

#[test]
fn test_default_move_is_lowest_legal() {
    for board in reachable_boards() {
        assert_eq!(lowest_legal(&board), legal_moves(&board).first().copied());
    }
}

#[test]
fn test_top_row_wins_for_x() {
    let board = Board::from_symbols(["X", "X", "X", "O", "O", "", "", "", ""]).unwrap();
    assert_eq!(winner(&board), Outcome::Winner(Mark::X));
}

#[test]
fn test_full_board_without_line_is_draw() {
    let board = Board::from_symbols(["X", "O", "X", "X", "O", "O", "O", "X", "X"]).unwrap();
    assert_eq!(winner(&board), Outcome::Draw);
    assert!(legal_moves(&board).is_empty());
    assert_eq!(lowest_legal(&board), None);
}

#[test]
fn test_untrusted_boards_rejected() {
    assert!(Board::from_symbols(["X", "X", "", "", "", "", "", "", ""]).is_err());
    assert!(Board::from_symbols(["O", "", "", "", "", "", "", "", ""]).is_err());
    assert!(Board::from_symbols(["X", "X", "X", "O", "O", "O", "", "", ""]).is_err());
    assert!(Board::from_symbols(["Z", "", "", "", "", "", "", "", ""]).is_err());
}
