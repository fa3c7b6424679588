//! Rotation with horizontal wall kicks.

use crate::collision::{Offset, collides};
use crate::field::Field;
use crate::piece::{RotationDir, Shape};

/// Next kick step: +1, -2, +3, -4, ...
#[inline]
fn next_kick_step(step: i32) -> i32 {
    -(step + step.signum())
}

/// Rotates `shape` in place and nudges `offset.x` until it fits.
///
/// Steps accumulate, so the tried columns are x+1, x-1, x+2, x-2, ... The
/// search stops once the total displacement exceeds the shape width; the
/// rotation is then undone and `offset.x` restored. `offset.y` is never
/// touched. Returns whether the rotation was kept.
pub fn rotate_with_kick(
    field: &Field,
    shape: &mut Shape,
    offset: &mut Offset,
    dir: RotationDir,
) -> bool {
    let original_x = offset.x;
    let limit = shape.size() as i32;
    shape.rotate(dir);

    let mut step = 1;
    while collides(field, shape, *offset) {
        offset.x += step;
        step = next_kick_step(step);
        if (offset.x - original_x).abs() > limit {
            shape.rotate(dir.opposite());
            offset.x = original_x;
            return false;
        }
    }
    true
}
