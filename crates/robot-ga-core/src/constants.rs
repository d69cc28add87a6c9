/// Half the side length of the square arena (world units). The arena spans
/// `[-WORLD_SIZE, WORLD_SIZE]` on both axes.
pub const WORLD_SIZE: f32 = 5.0;

/// Full arena area, the denominator of every fitness value.
pub const ARENA_AREA: f32 = (2.0 * WORLD_SIZE) * (2.0 * WORLD_SIZE);

/// Number of range sensors carried by every robot.
pub const NUM_SENSORS: usize = 5;

/// Marks the end of one generation row in a persisted fitness table.
pub const FITNESS_ROW_END: f32 = -1.0;

/// Marks the end of a persisted fitness table.
pub const FITNESS_TABLE_END: f32 = -2.0;

/// Coordinate of the sentinel box closing a persisted bounds table.
/// Lies outside any legal arena coordinate.
pub const BOUNDS_TABLE_END: f32 = -100.0;
