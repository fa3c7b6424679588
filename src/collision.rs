//! Collision predicate shared by gravity, lateral moves and rotation kicks.

use crate::field::{EMPTY, Field};
use crate::piece::Shape;

/// Field position of a shape's local (0, 0). `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// True if any occupied shape cell lands off the grid or on a non-empty cell.
///
/// Off-grid counts as occupied on every side, including above the top row.
pub fn collides(field: &Field, shape: &Shape, offset: Offset) -> bool {
    shape.occupied().any(|(r, c, _)| {
        let row = offset.y + r as i32;
        let col = offset.x + c as i32;
        field.get(row, col) != Some(EMPTY)
    })
}
