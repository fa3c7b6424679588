//! Game session: field, active piece, score, and the gravity clock.
//!
//! All mutation goes through `GameState`; each operation checks collision and
//! applies its change in the same call.

use crate::clock::{ClockState, GameClock, Tick};
use crate::collision::{Offset, collides};
use crate::field::Field;
use crate::piece::{PieceKind, PieceSource, RotationDir, Shape};
use crate::rotation::rotate_with_kick;
use std::time::Duration;

/// Points per cleared line. Flat: clearing four rows at once is worth 4x this.
pub const LINE_CLEAR_POINTS: u32 = 10;

/// Turns a line count into points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringPolicy {
    FlatPerLine(u32),
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::FlatPerLine(LINE_CLEAR_POINTS)
    }
}

impl ScoringPolicy {
    pub fn points_for(self, lines: u32) -> u32 {
        match self {
            Self::FlatPerLine(per_line) => per_line * lines,
        }
    }
}

/// Signals for the front end (sound cues, score display, game over screen).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    PieceMoved,
    LineCleared,
    ScoreChanged(u32),
    GameOver { final_score: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDir {
    Left,
    Right,
}

impl MoveDir {
    #[inline]
    pub fn dx(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Session stopped; nothing happened.
    Ignored,
    Moved,
    /// Piece merged into the field and the next one spawned (or the game ended).
    Locked { lines: u32 },
}

/// The falling piece. Replaced wholesale on every spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub offset: Offset,
}

pub struct GameState {
    field: Field,
    piece: Option<ActivePiece>,
    score: u32,
    clock: GameClock,
    scoring: ScoringPolicy,
    source: Box<dyn PieceSource>,
    events: Vec<GameEvent>,
}

impl std::fmt::Debug for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("piece", &self.piece)
            .field("score", &self.score)
            .field("clock", &self.clock)
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl GameState {
    /// New stopped session with an empty field. Call `start` to play.
    pub fn new(source: Box<dyn PieceSource>, drop_interval: Duration) -> Self {
        Self {
            field: Field::new(),
            piece: None,
            score: 0,
            clock: GameClock::new(drop_interval),
            scoring: ScoringPolicy::default(),
            source,
            events: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_scoring(mut self, scoring: ScoringPolicy) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    #[cfg(test)]
    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    pub fn piece(&self) -> Option<&ActivePiece> {
        self.piece.as_ref()
    }

    #[cfg(test)]
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.state()
    }

    /// Takes the events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Clears the field, zeroes the score, spawns the first piece and runs.
    /// Events still queued from the previous session are dropped.
    pub fn start(&mut self) {
        self.field.clear();
        self.score = 0;
        self.events.clear();
        self.events.push(GameEvent::ScoreChanged(0));
        self.clock.start();
        self.spawn();
    }

    /// Places a new piece at the top centre.
    ///
    /// If it already overlaps the field the game is over: the field is
    /// cleared, the clock stops and `GameEvent::GameOver` is queued.
    pub fn spawn(&mut self) {
        let kind = self.source.next_kind();
        let shape = kind.shape();
        let x = (self.field.width() / 2) as i32 - (shape.size() / 2) as i32;
        let offset = Offset::new(x, 0);

        if collides(&self.field, &shape, offset) {
            self.field.clear();
            self.piece = None;
            self.clock.stop();
            self.events.push(GameEvent::GameOver {
                final_score: self.score,
            });
            return;
        }
        self.piece = Some(ActivePiece {
            kind,
            shape,
            offset,
        });
    }

    /// Shifts the piece one column; stays put if blocked.
    pub fn move_lateral(&mut self, dir: MoveDir) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(piece) = self.piece.as_mut() else {
            return false;
        };
        piece.offset.x += dir.dx();
        if collides(&self.field, &piece.shape, piece.offset) {
            piece.offset.x -= dir.dx();
            return false;
        }
        self.events.push(GameEvent::PieceMoved);
        true
    }

    /// One row down. Used for both player input and gravity.
    ///
    /// When the row below is blocked the piece locks: it is merged into the
    /// field, full rows are swept and scored, and the next piece spawns.
    pub fn soft_drop(&mut self) -> DropOutcome {
        if !self.is_running() {
            return DropOutcome::Ignored;
        }
        let Some(piece) = self.piece.as_mut() else {
            return DropOutcome::Ignored;
        };
        self.clock.reset_accumulator();
        piece.offset.y += 1;
        if !collides(&self.field, &piece.shape, piece.offset) {
            self.events.push(GameEvent::PieceMoved);
            return DropOutcome::Moved;
        }
        piece.offset.y -= 1;

        let lines = match self.piece.take() {
            Some(piece) => self.lock(&piece),
            None => 0,
        };
        self.spawn();
        DropOutcome::Locked { lines }
    }

    fn lock(&mut self, piece: &ActivePiece) -> u32 {
        self.field.merge(&piece.shape, piece.offset);
        let lines = self.field.sweep();
        // One score update per cleared line.
        for cleared in 1..=lines {
            self.events.push(GameEvent::LineCleared);
            let points =
                self.scoring.points_for(cleared) - self.scoring.points_for(cleared - 1);
            self.score += points;
            self.events.push(GameEvent::ScoreChanged(self.score));
        }
        lines
    }

    /// Rotates with wall kicks; a rotation that cannot fit is undone.
    pub fn rotate(&mut self, dir: RotationDir) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(piece) = self.piece.as_mut() else {
            return false;
        };
        let rotated = rotate_with_kick(&self.field, &mut piece.shape, &mut piece.offset, dir);
        if rotated {
            self.events.push(GameEvent::PieceMoved);
        }
        rotated
    }

    /// One scheduling pass. Applies gravity when due and returns whether a
    /// render pass should follow (false while stopped).
    pub fn update(&mut self, elapsed: Duration) -> bool {
        match self.clock.advance(elapsed) {
            Some(Tick { gravity }) => {
                if gravity {
                    self.soft_drop();
                }
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DEFAULT_DROP_INTERVAL;
    use crate::field::{EMPTY, FIELD_HEIGHT, FIELD_WIDTH};
    use crate::piece::FixedSequence;

    fn game_with(pieces: &str) -> GameState {
        let source = FixedSequence::parse(pieces).unwrap();
        GameState::new(Box::new(source), DEFAULT_DROP_INTERVAL)
    }

    fn started(pieces: &str) -> GameState {
        let mut game = game_with(pieces);
        game.start();
        game.drain_events();
        game
    }

    fn drop_to_lock(game: &mut GameState) -> u32 {
        for _ in 0..=FIELD_HEIGHT {
            if let DropOutcome::Locked { lines } = game.soft_drop() {
                return lines;
            }
        }
        panic!("piece never locked");
    }

    fn shift(game: &mut GameState, dir: MoveDir, times: usize) {
        for _ in 0..times {
            assert!(game.move_lateral(dir));
        }
    }

    #[test]
    fn test_new_session_is_stopped_and_empty() {
        let game = game_with("O");
        assert!(!game.is_running());
        assert_eq!(game.clock_state(), ClockState::Stopped);
        assert!(game.piece().is_none());
        assert!(game.field().is_empty());
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_start_spawns_centered_piece() {
        let mut game = game_with("OI");
        game.start();
        assert!(game.is_running());
        assert_eq!(game.drain_events(), vec![GameEvent::ScoreChanged(0)]);
        let piece = game.piece().unwrap();
        assert_eq!(piece.kind, PieceKind::O);
        assert_eq!(piece.offset, Offset::new(4, 0));
        assert_eq!(piece.shape, PieceKind::O.shape());
    }

    #[test]
    fn test_spawn_centers_by_shape_width() {
        let mut game = started("IT");
        assert_eq!(game.piece().unwrap().offset, Offset::new(3, 0));
        drop_to_lock(&mut game);
        let piece = game.piece().unwrap();
        assert_eq!(piece.kind, PieceKind::T);
        assert_eq!(piece.offset, Offset::new(4, 0));
    }

    #[test]
    fn test_o_piece_walks_to_left_wall() {
        let mut game = started("O");
        shift(&mut game, MoveDir::Left, 4);
        assert_eq!(game.piece().unwrap().offset.x, 0);
        assert!(!game.move_lateral(MoveDir::Left));
        assert_eq!(game.piece().unwrap().offset.x, 0);
        let moves = game
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::PieceMoved)
            .count();
        assert_eq!(moves, 4);
    }

    #[test]
    fn test_lateral_move_blocked_by_locked_cells() {
        let mut game = started("O");
        game.field_mut().set(1, 6, 3);
        assert!(!game.move_lateral(MoveDir::Right));
        assert_eq!(game.piece().unwrap().offset.x, 4);
        assert!(game.move_lateral(MoveDir::Left));
    }

    #[test]
    fn test_lock_merges_piece_footprint() {
        let mut game = started("TO");
        game.field_mut().set(19, 0, 7);
        let before = game.field().clone();
        let lines = drop_to_lock(&mut game);
        assert_eq!(lines, 0);

        // T at x=4 lands with its padding row off the bottom: y = 18.
        let shape = PieceKind::T.shape();
        let offset = Offset::new(4, 18);
        for r in 0..FIELD_HEIGHT {
            for c in 0..FIELD_WIDTH {
                let (row, col) = (r as i32, c as i32);
                let local = (row - offset.y, col - offset.x);
                let covered = (0..3).contains(&local.0)
                    && (0..3).contains(&local.1)
                    && shape.get(local.0 as usize, local.1 as usize) != EMPTY;
                let expected = if covered {
                    shape.get(local.0 as usize, local.1 as usize)
                } else {
                    before.get(row, col).unwrap()
                };
                assert_eq!(game.field().get(row, col), Some(expected), "({r}, {c})");
            }
        }
        assert_eq!(game.piece().unwrap().kind, PieceKind::O);
    }

    #[test]
    fn test_bottom_row_clear_scores_ten() {
        let mut game = started("IIII");

        // Two horizontal bars cover columns 0..=7 of row 19.
        assert!(game.rotate(RotationDir::Clockwise));
        shift(&mut game, MoveDir::Left, 3);
        assert_eq!(drop_to_lock(&mut game), 0);

        assert!(game.rotate(RotationDir::Clockwise));
        shift(&mut game, MoveDir::Right, 1);
        assert_eq!(drop_to_lock(&mut game), 0);

        // Vertical bar down column 8.
        shift(&mut game, MoveDir::Right, 4);
        assert_eq!(drop_to_lock(&mut game), 0);
        for c in 0..9 {
            assert_ne!(game.field().get(19, c), Some(EMPTY));
        }
        assert_eq!(game.field().get(19, 9), Some(EMPTY));
        assert_eq!(game.score(), 0);

        // Vertical bar down column 9 completes row 19 only.
        shift(&mut game, MoveDir::Right, 5);
        game.drain_events();
        assert_eq!(drop_to_lock(&mut game), 1);
        assert_eq!(game.score(), 10);

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::LineCleared));
        assert!(events.contains(&GameEvent::ScoreChanged(10)));

        // Columns 8 and 9 of rows 16..=18 shifted down to 17..=19.
        for r in 17..20 {
            for c in 0..FIELD_WIDTH as i32 {
                let expected = if c >= 8 { PieceKind::I.cell() } else { EMPTY };
                assert_eq!(game.field().get(r, c), Some(expected), "({r}, {c})");
            }
        }
        assert!(game.field().rows().take(17).all(|row| row.iter().all(|&c| c == EMPTY)));
        assert_eq!(game.field().height(), FIELD_HEIGHT);
    }

    #[test]
    fn test_two_lines_score_flat_twenty() {
        let mut game = started("O");
        for r in [18, 19] {
            for c in 0..8 {
                game.field_mut().set(r, c, 2);
            }
        }
        shift(&mut game, MoveDir::Right, 4);
        game.drain_events();
        assert_eq!(drop_to_lock(&mut game), 2);
        assert_eq!(game.score(), 20);
        assert!(game.field().is_empty());

        let events: Vec<_> = game
            .drain_events()
            .into_iter()
            .filter(|e| *e != GameEvent::PieceMoved)
            .collect();
        assert_eq!(
            events,
            vec![
                GameEvent::LineCleared,
                GameEvent::ScoreChanged(10),
                GameEvent::LineCleared,
                GameEvent::ScoreChanged(20),
            ]
        );
    }

    #[test]
    fn test_custom_scoring_policy() {
        let source = FixedSequence::parse("O").unwrap();
        let mut game = GameState::new(Box::new(source), DEFAULT_DROP_INTERVAL)
            .with_scoring(ScoringPolicy::FlatPerLine(25));
        game.start();
        for c in 0..8 {
            game.field_mut().set(19, c, 2);
        }
        shift(&mut game, MoveDir::Right, 4);
        assert_eq!(drop_to_lock(&mut game), 1);
        assert_eq!(game.score(), 25);
    }

    #[test]
    fn test_spawn_into_filled_top_rows_ends_game() {
        let mut game = started("T");
        for r in 0..2 {
            for c in 0..FIELD_WIDTH as i32 {
                game.field_mut().set(r, c, 1);
            }
        }
        game.spawn();
        assert!(!game.is_running());
        assert!(game.field().is_empty());
        assert!(game.piece().is_none());
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::GameOver { final_score: 0 }]
        );
    }

    #[test]
    fn test_stacking_to_the_top_ends_game() {
        let mut game = started("O");
        let mut over = false;
        for _ in 0..FIELD_HEIGHT {
            drop_to_lock(&mut game);
            if !game.is_running() {
                over = true;
                break;
            }
        }
        assert!(over);
        assert!(game.field().is_empty());
        assert_eq!(game.soft_drop(), DropOutcome::Ignored);
    }

    #[test]
    fn test_inputs_ignored_while_stopped() {
        let mut game = game_with("O");
        assert!(!game.move_lateral(MoveDir::Left));
        assert!(!game.rotate(RotationDir::Clockwise));
        assert_eq!(game.soft_drop(), DropOutcome::Ignored);
        assert!(!game.update(Duration::from_secs(5)));
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_restart_resets_field_and_score() {
        let mut game = started("O");
        for c in 0..8 {
            game.field_mut().set(19, c, 2);
        }
        shift(&mut game, MoveDir::Right, 4);
        drop_to_lock(&mut game);
        assert_eq!(game.score(), 10);

        game.start();
        assert_eq!(game.score(), 0);
        assert!(game.field().is_empty());
        assert!(game.is_running());
        // Moves and the clear from the first session do not leak into the second.
        assert_eq!(game.drain_events(), vec![GameEvent::ScoreChanged(0)]);
    }

    #[test]
    fn test_update_applies_gravity_after_interval() {
        let mut game = started("O");
        assert!(game.update(Duration::from_millis(500)));
        assert_eq!(game.piece().unwrap().offset.y, 0);
        assert!(game.update(Duration::from_millis(501)));
        assert_eq!(game.piece().unwrap().offset.y, 1);
    }

    #[test]
    fn test_manual_drop_resets_gravity_countdown() {
        let mut game = started("O");
        game.update(Duration::from_millis(900));
        game.soft_drop();
        assert_eq!(game.piece().unwrap().offset.y, 1);
        game.update(Duration::from_millis(900));
        assert_eq!(game.piece().unwrap().offset.y, 1);
        game.update(Duration::from_millis(200));
        assert_eq!(game.piece().unwrap().offset.y, 2);
    }

    #[test]
    fn test_rotation_never_overlaps_field() {
        let mut game = started("LJTSZI");
        for _ in 0..6 {
            for dir in [RotationDir::Clockwise, RotationDir::CounterClockwise] {
                for _ in 0..4 {
                    game.rotate(dir);
                    let piece = game.piece().unwrap();
                    assert!(!collides(game.field(), &piece.shape, piece.offset));
                }
            }
            drop_to_lock(&mut game);
        }
    }
}
