//! Piece catalog, shape matrices, in-place rotation and the piece-order source.

use crate::field::{Cell, EMPTY};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// The seven piece types. Discriminants are the cell values they paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I = 1,
    L = 2,
    J = 3,
    O = 4,
    T = 5,
    S = 6,
    Z = 7,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PieceError {
    #[error("unknown piece type: {0:?} (expected one of I, L, J, O, T, S, Z)")]
    UnknownPiece(char),
    #[error("piece sequence is empty")]
    EmptySequence,
}

impl PieceKind {
    pub const ALL: [Self; 7] = [Self::I, Self::L, Self::J, Self::O, Self::T, Self::S, Self::Z];

    #[inline]
    pub fn cell(self) -> Cell {
        self as Cell
    }

    pub fn letter(self) -> char {
        match self {
            Self::I => 'I',
            Self::L => 'L',
            Self::J => 'J',
            Self::O => 'O',
            Self::T => 'T',
            Self::S => 'S',
            Self::Z => 'Z',
        }
    }

    /// Canonical shape. Every call returns a fresh copy the caller may rotate.
    pub fn shape(self) -> Shape {
        let v = self.cell();
        let rows: Vec<Vec<Cell>> = match self {
            Self::I => vec![
                vec![0, v, 0, 0],
                vec![0, v, 0, 0],
                vec![0, v, 0, 0],
                vec![0, v, 0, 0],
            ],
            Self::L => vec![vec![0, v, 0], vec![0, v, 0], vec![0, v, v]],
            Self::J => vec![vec![0, v, 0], vec![0, v, 0], vec![v, v, 0]],
            Self::O => vec![vec![v, v], vec![v, v]],
            Self::T => vec![vec![0, v, 0], vec![v, v, v], vec![0, 0, 0]],
            Self::S => vec![vec![0, v, v], vec![v, v, 0], vec![0, 0, 0]],
            Self::Z => vec![vec![v, v, 0], vec![0, v, v], vec![0, 0, 0]],
        };
        Shape::from_rows(rows)
    }
}

impl TryFrom<char> for PieceKind {
    type Error = PieceError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.letter() == c.to_ascii_uppercase())
            .ok_or(PieceError::UnknownPiece(c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDir {
    Clockwise,
    CounterClockwise,
}

impl RotationDir {
    pub fn opposite(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }
}

/// Square, zero-padded cell matrix in the piece's local frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    rows: Vec<Vec<Cell>>,
}

impl Shape {
    /// Panics unless `rows` is a non-empty square matrix; rotation is only
    /// defined for square shapes.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let n = rows.len();
        assert!(
            n > 0 && rows.iter().all(|row| row.len() == n),
            "shape must be a non-empty square matrix"
        );
        Self { rows }
    }

    /// Side length (width == height).
    #[inline]
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.rows[row][col]
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Non-empty cells as (row, col, value).
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &v)| v != EMPTY)
                .map(move |(c, &v)| (r, c, v))
        })
    }

    /// Rotates 90° in place: transpose, then reverse each row (clockwise)
    /// or reverse the row order (counter-clockwise).
    pub fn rotate(&mut self, dir: RotationDir) {
        let n = self.size();
        for r in 0..n {
            for c in 0..r {
                let tmp = self.rows[r][c];
                self.rows[r][c] = self.rows[c][r];
                self.rows[c][r] = tmp;
            }
        }
        match dir {
            RotationDir::Clockwise => self.rows.iter_mut().for_each(|row| row.reverse()),
            RotationDir::CounterClockwise => self.rows.reverse(),
        }
    }
}

/// Supplies the type of each newly spawned piece.
pub trait PieceSource {
    fn next_kind(&mut self) -> PieceKind;
}

/// Uniform random choice over the seven types.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Seeded for a reproducible order, or from the OS when `seed` is `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }
}

impl PieceSource for RandomSource {
    fn next_kind(&mut self) -> PieceKind {
        PieceKind::ALL[self.rng.random_range(0..PieceKind::ALL.len())]
    }
}

/// Repeats a fixed list of piece types forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSequence {
    kinds: Vec<PieceKind>,
    pos: usize,
}

impl FixedSequence {
    pub fn new(kinds: Vec<PieceKind>) -> Result<Self, PieceError> {
        if kinds.is_empty() {
            return Err(PieceError::EmptySequence);
        }
        Ok(Self { kinds, pos: 0 })
    }

    /// Parses letters such as `"OIT"`; whitespace is ignored.
    pub fn parse(s: &str) -> Result<Self, PieceError> {
        let kinds = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(PieceKind::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(kinds)
    }
}

impl PieceSource for FixedSequence {
    fn next_kind(&mut self) -> PieceKind {
        let kind = self.kinds[self.pos];
        self.pos = (self.pos + 1) % self.kinds.len();
        kind
    }
}
