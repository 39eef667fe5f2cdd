/// What the firmware does with the regulator at boot, and how long it is
/// willing to wait for the regulator to settle.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Voltage applied right after boot. `None` leaves the reset default (1.10V).
    pub boot_voltage: Option<f32>,
    /// Set `VREG_CTRL.UNLOCK` at boot. Required before any VSEL write has an effect.
    pub unlock_on_boot: bool,
    /// Number of `VREG` reads spent waiting for `UPDATE_IN_PROGRESS` to clear.
    pub update_poll_limit: u32,
}

pub const DEFAULT_UPDATE_POLL_LIMIT: u32 = 10_000;

impl Default for Config {
    fn default() -> Self {
        Self {
            boot_voltage: None,
            unlock_on_boot: true,
            update_poll_limit: DEFAULT_UPDATE_POLL_LIMIT,
        }
    }
}

impl Config {
    /// Defaults, overridden by `VREG_BOOT_VOLTAGE` and `VREG_UNLOCK_ON_BOOT`
    /// at build time. build.rs has already validated both.
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("VREG_BOOT_VOLTAGE"),
            option_env!("VREG_UNLOCK_ON_BOOT"),
        )
    }

    fn from_values(boot_voltage: Option<&str>, unlock_on_boot: Option<&str>) -> Self {
        let default = Self::default();
        Self {
            boot_voltage: boot_voltage.and_then(|volts| volts.trim().parse::<f32>().ok()),
            unlock_on_boot: unlock_on_boot
                .map(|unlock| unlock.trim() == "1")
                .unwrap_or(default.unlock_on_boot),
            ..default
        }
    }
}
