//! Voltages accepted from the application.
//!
//! Plain `core` code without crate paths or macros: build.rs includes this
//! file to validate `VREG_BOOT_VOLTAGE` with the same rule the encoder applies.

/// Supported levels in volts, ascending, VSEL codes 0b00110 ~ 0b01111.
pub const SUPPORTED_VOLTS: [f32; 10] = [0.85, 0.90, 0.95, 1.00, 1.05, 1.10, 1.15, 1.20, 1.25, 1.30];

/// Absorbs float representation error only. Levels are 0.05V apart.
pub const VOLTAGE_TOLERANCE: f32 = 0.004;
pub const MIN_SUPPORTED_VOLTAGE: f32 = 0.85;
pub const MAX_SUPPORTED_VOLTAGE: f32 = 1.30;
pub const VOLTAGE_STEP: f32 = 0.05;

pub fn is_close(a: f32, b: f32) -> bool {
    let diff = a - b;
    diff < VOLTAGE_TOLERANCE && diff > -VOLTAGE_TOLERANCE
}

/// Index into [`SUPPORTED_VOLTS`] of the level `volts` rounds to.
pub fn supported_level_index(volts: f32) -> Option<usize> {
    SUPPORTED_VOLTS
        .iter()
        .position(|level| is_close(volts, *level))
}
