//! Pure rules engine for a single 3x3 tic-tac-toe match.
//!
//! This crate holds only state transitions: seating the second player,
//! applying moves, and detecting a winner or draw. There is no I/O and no
//! concurrency here; the server layers own all of that.

use thiserror::Error;

/// Number of cells on the board.
pub const BOARD_CELLS: usize = 9;

/// Byte used for an empty cell in the wire representation of a board.
pub const EMPTY_CELL: u8 = b' ';

/// The eight winning lines (rows, columns, diagonals) as board indices.
const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// A player's mark on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Wire byte for this mark (`'X'` or `'O'`).
    pub fn as_byte(self) -> u8 {
        match self {
            Mark::X => b'X',
            Mark::O => b'O',
        }
    }
}

/// A seat within a match. The creator always sits in slot 0 and plays X;
/// the joiner, once seated, plays O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Creator,
    Joiner,
}

impl Seat {
    pub fn mark(self) -> Mark {
        match self {
            Seat::Creator => Mark::X,
            Seat::Joiner => Mark::O,
        }
    }

    pub fn other(self) -> Seat {
        match self {
            Seat::Creator => Seat::Joiner,
            Seat::Joiner => Seat::Creator,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Seat::Creator => 0,
            Seat::Joiner => 1,
        }
    }
}

/// Lifecycle status of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// Created, second seat still empty.
    Waiting,
    /// Both seats filled, moves being exchanged.
    InProgress,
    /// A winner was found or the board filled up.
    Finished,
}

impl MatchStatus {
    /// Stable wire value, shared with the list-games response.
    pub fn as_byte(self) -> u8 {
        match self {
            MatchStatus::Waiting => 1,
            MatchStatus::InProgress => 2,
            MatchStatus::Finished => 3,
        }
    }
}

/// Terminal result of a finished match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(Seat),
    Draw,
}

/// Why a move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("match is not in progress")]
    NotInProgress,
    #[error("not this player's turn")]
    NotYourTurn,
    #[error("position must be between 1 and 9")]
    OutOfRange,
    #[error("cell is already occupied")]
    CellOccupied,
}

/// State of one match: board, turn, and lifecycle status.
///
/// Invariants maintained by every transition:
/// * the number of occupied cells equals `move_count`,
/// * turns alternate strictly starting with the creator (X),
/// * `status` is `Waiting` exactly until [`Match::seat_joiner`] is called.
#[derive(Debug, Clone)]
pub struct Match {
    board: [u8; BOARD_CELLS],
    status: MatchStatus,
    current_turn: Seat,
    move_count: u8,
    outcome: Option<Outcome>,
}

impl Match {
    /// Creates a fresh match in `Waiting` status with an empty board.
    /// The creator moves first once the match begins.
    pub fn new() -> Self {
        Self {
            board: [EMPTY_CELL; BOARD_CELLS],
            status: MatchStatus::Waiting,
            current_turn: Seat::Creator,
            move_count: 0,
            outcome: None,
        }
    }

    /// Seats the second player, moving the match from `Waiting` to
    /// `InProgress`. Returns `false` without mutation if the match was not
    /// waiting for a player.
    pub fn seat_joiner(&mut self) -> bool {
        if self.status != MatchStatus::Waiting {
            return false;
        }
        self.status = MatchStatus::InProgress;
        true
    }

    /// Applies a move at `position` (1-9) for `seat`.
    ///
    /// On success the board is mutated, the win/draw check runs, and either
    /// the turn passes to the other seat or the match finishes. On failure
    /// nothing changes.
    pub fn apply_move(&mut self, seat: Seat, position: u8) -> Result<Option<Outcome>, MoveError> {
        if self.status != MatchStatus::InProgress {
            return Err(MoveError::NotInProgress);
        }
        if seat != self.current_turn {
            return Err(MoveError::NotYourTurn);
        }
        if !(1..=9).contains(&position) {
            return Err(MoveError::OutOfRange);
        }
        let idx = usize::from(position) - 1;
        if self.board[idx] != EMPTY_CELL {
            return Err(MoveError::CellOccupied);
        }

        self.board[idx] = seat.mark().as_byte();
        self.move_count += 1;

        if let Some(winner) = self.find_winner() {
            self.outcome = Some(Outcome::Winner(winner));
            self.status = MatchStatus::Finished;
        } else if usize::from(self.move_count) == BOARD_CELLS {
            self.outcome = Some(Outcome::Draw);
            self.status = MatchStatus::Finished;
        } else {
            self.current_turn = self.current_turn.other();
        }

        Ok(self.outcome)
    }

    /// Scans the eight winning lines for three equal, non-empty marks.
    fn find_winner(&self) -> Option<Seat> {
        for line in WIN_LINES {
            let [a, b, c] = line;
            if self.board[a] != EMPTY_CELL
                && self.board[a] == self.board[b]
                && self.board[b] == self.board[c]
            {
                return if self.board[a] == Mark::X.as_byte() {
                    Some(Seat::Creator)
                } else {
                    Some(Seat::Joiner)
                };
            }
        }
        None
    }

    /// Wire representation of the board: nine bytes of `'X'`, `'O'`, or `' '`.
    pub fn board(&self) -> [u8; BOARD_CELLS] {
        self.board
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn current_turn(&self) -> Seat {
        self.current_turn
    }

    pub fn move_count(&self) -> u8 {
        self.move_count
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> Match {
        let mut m = Match::new();
        assert!(m.seat_joiner());
        m
    }

    #[test]
    fn new_match_waits_for_second_player() {
        let m = Match::new();
        assert_eq!(m.status(), MatchStatus::Waiting);
        assert_eq!(m.current_turn(), Seat::Creator);
        assert_eq!(m.move_count(), 0);
        assert!(m.board().iter().all(|&c| c == EMPTY_CELL));
    }

    #[test]
    fn seating_twice_is_rejected() {
        let mut m = started();
        assert!(!m.seat_joiner());
        assert_eq!(m.status(), MatchStatus::InProgress);
    }

    #[test]
    fn moves_require_in_progress_match() {
        let mut m = Match::new();
        assert_eq!(
            m.apply_move(Seat::Creator, 1),
            Err(MoveError::NotInProgress)
        );
    }

    #[test]
    fn turns_alternate_starting_with_creator() {
        let mut m = started();
        assert_eq!(m.apply_move(Seat::Joiner, 1), Err(MoveError::NotYourTurn));
        assert_eq!(m.apply_move(Seat::Creator, 1), Ok(None));
        assert_eq!(m.current_turn(), Seat::Joiner);
        assert_eq!(m.apply_move(Seat::Creator, 2), Err(MoveError::NotYourTurn));
        assert_eq!(m.apply_move(Seat::Joiner, 5), Ok(None));
        assert_eq!(m.current_turn(), Seat::Creator);
    }

    #[test]
    fn occupied_cell_never_succeeds_twice() {
        let mut m = started();
        assert_eq!(m.apply_move(Seat::Creator, 5), Ok(None));
        assert_eq!(m.apply_move(Seat::Joiner, 5), Err(MoveError::CellOccupied));
        // Board and turn are untouched by the rejection.
        assert_eq!(m.move_count(), 1);
        assert_eq!(m.current_turn(), Seat::Joiner);
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        let mut m = started();
        assert_eq!(m.apply_move(Seat::Creator, 0), Err(MoveError::OutOfRange));
        assert_eq!(m.apply_move(Seat::Creator, 10), Err(MoveError::OutOfRange));
        assert_eq!(m.move_count(), 0);
    }

    #[test]
    fn every_winning_line_is_detected_for_both_marks() {
        let lines: [[u8; 3]; 8] = [
            [1, 2, 3],
            [4, 5, 6],
            [7, 8, 9],
            [1, 4, 7],
            [2, 5, 8],
            [3, 6, 9],
            [1, 5, 9],
            [3, 5, 7],
        ];
        for line in lines {
            // Creator takes the line, joiner plays filler cells elsewhere.
            let mut m = started();
            let filler: Vec<u8> = (1..=9).filter(|p| !line.contains(p)).collect();
            m.apply_move(Seat::Creator, line[0]).unwrap();
            m.apply_move(Seat::Joiner, filler[0]).unwrap();
            m.apply_move(Seat::Creator, line[1]).unwrap();
            m.apply_move(Seat::Joiner, filler[1]).unwrap();
            let outcome = m.apply_move(Seat::Creator, line[2]).unwrap();
            assert_eq!(outcome, Some(Outcome::Winner(Seat::Creator)), "line {line:?}");
            assert_eq!(m.status(), MatchStatus::Finished);
        }
    }

    #[test]
    fn joiner_win_is_attributed_to_joiner() {
        let mut m = started();
        m.apply_move(Seat::Creator, 1).unwrap();
        m.apply_move(Seat::Joiner, 4).unwrap();
        m.apply_move(Seat::Creator, 2).unwrap();
        m.apply_move(Seat::Joiner, 5).unwrap();
        m.apply_move(Seat::Creator, 9).unwrap();
        let outcome = m.apply_move(Seat::Joiner, 6).unwrap();
        assert_eq!(outcome, Some(Outcome::Winner(Seat::Joiner)));
    }

    #[test]
    fn full_board_without_a_line_is_a_draw() {
        // X O X / X O O / O X X - no line of three.
        let mut m = started();
        for (seat, pos) in [
            (Seat::Creator, 1),
            (Seat::Joiner, 2),
            (Seat::Creator, 3),
            (Seat::Joiner, 5),
            (Seat::Creator, 4),
            (Seat::Joiner, 6),
            (Seat::Creator, 8),
            (Seat::Joiner, 7),
        ] {
            assert_eq!(m.apply_move(seat, pos), Ok(None));
        }
        assert_eq!(m.apply_move(Seat::Creator, 9), Ok(Some(Outcome::Draw)));
        assert_eq!(m.status(), MatchStatus::Finished);
        assert_eq!(m.move_count(), 9);
    }

    #[test]
    fn no_moves_after_finish() {
        let mut m = started();
        m.apply_move(Seat::Creator, 1).unwrap();
        m.apply_move(Seat::Joiner, 4).unwrap();
        m.apply_move(Seat::Creator, 2).unwrap();
        m.apply_move(Seat::Joiner, 5).unwrap();
        m.apply_move(Seat::Creator, 3).unwrap();
        assert_eq!(m.status(), MatchStatus::Finished);
        assert_eq!(
            m.apply_move(Seat::Joiner, 6),
            Err(MoveError::NotInProgress)
        );
    }

    #[test]
    fn occupied_cells_match_move_count() {
        let mut m = started();
        m.apply_move(Seat::Creator, 1).unwrap();
        m.apply_move(Seat::Joiner, 2).unwrap();
        m.apply_move(Seat::Creator, 3).unwrap();
        let occupied = m.board().iter().filter(|&&c| c != EMPTY_CELL).count();
        assert_eq!(occupied, usize::from(m.move_count()));
    }
}
