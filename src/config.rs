//! Application-level configuration constants.

// Storage
pub const STORAGE_KEY: &str = "cubeTimerData";

// Timer loop
pub const TICK_MS: u32 = 10;

// Min/Max limits for the hold-time setting
pub const MIN_HOLD_TIME_MS: u32 = 100;
pub const MAX_HOLD_TIME_MS: u32 = 1000;
