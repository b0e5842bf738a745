//! Global configuration constants for the swept collision engine.

/// Multiplier applied to push-out offsets so separated actors do not
/// immediately re-collide on the next frame.
pub const PUSH_OUT_MARGIN: f32 = 1.05;

/// Quadratic coefficients below this are treated as degenerate.
pub const QUADRATIC_EPSILON: f32 = 1e-6;

/// World scale factors below this trigger a degenerate-transform warning.
pub const SCALE_EPSILON: f32 = 1e-6;

/// Fraction of the sweep radius kept as headroom when deciding whether a
/// neighboring mover sits low enough to count as touched (cushion pass).
pub const CUSHION_HEADROOM: f32 = 0.5;

/// Default collision radius assigned to newly created actors.
pub const DEFAULT_COLLISION_RADIUS: f32 = 0.5;

/// Soft budget for a full collision update, in milliseconds.
pub const FRAME_BUDGET_MS: f32 = 4.0;
