/* RP2350 core voltage control
 * Copyright (C) 2025 Sebastian Quilitz
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation; either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use crate::error::OverclockError;

/// Where to get the stability test when it is not linked in.
pub const OVERCLOCK_TEST_URL: &str =
    "https://github.com/nspsck/RP2350_Micropython_voltage_control";

/// Exclusive upper bound for frequencies, in MHz.
pub const MAX_FREQUENCY_MHZ: f32 = 1000.0;

/// An overclock stability test living outside this crate.
pub trait OverclockTest {
    /// Run the stability test once at `freq_mhz`.
    fn run(&mut self, freq_mhz: f32);
    /// Keep running the stability test at `freq_mhz` until stopped.
    fn run_non_stop(&mut self, freq_mhz: f32);
    /// Search for the highest stable system clock up to `limit_mhz`.
    fn find_clock_freq(&mut self, limit_mhz: f32);
}

/// What happened to a valid request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// Handed to the overclock test.
    Delegated,
    /// No overclock test in this build. Informational, not a failure.
    CollaboratorUnavailable,
}

#[derive(Copy, Clone)]
enum Trigger {
    Run,
    RunNonStop,
    FindClockFreq,
}

/// Checks `0 < freq_mhz < 1000`.
pub fn validate_frequency(freq_mhz: f32) -> Result<f32, OverclockError> {
    if freq_mhz >= MAX_FREQUENCY_MHZ {
        info!("{} is too high, the unit used is MHz, please try again", freq_mhz);
        return Err(OverclockError::InvalidFrequencyInput(freq_mhz));
    }
    // also catches NaN
    if !(freq_mhz > 0.0) {
        info!("{} is not valid, the input must be positive", freq_mhz);
        return Err(OverclockError::InvalidFrequencyInput(freq_mhz));
    }
    Ok(freq_mhz)
}

fn delegate(
    trigger: Trigger,
    freq_mhz: f32,
    collaborator: Option<&mut dyn OverclockTest>,
) -> Result<Dispatch, OverclockError> {
    let freq_mhz = validate_frequency(freq_mhz)?;

    let Some(test) = collaborator else {
        info!("overclock test not available, you can get the test on: {=str}", OVERCLOCK_TEST_URL);
        return Ok(Dispatch::CollaboratorUnavailable);
    };

    match trigger {
        Trigger::Run => test.run(freq_mhz),
        Trigger::RunNonStop => test.run_non_stop(freq_mhz),
        Trigger::FindClockFreq => test.find_clock_freq(freq_mhz),
    }
    Ok(Dispatch::Delegated)
}

pub fn run_overclock_stability_test(
    freq_mhz: f32,
    collaborator: Option<&mut dyn OverclockTest>,
) -> Result<Dispatch, OverclockError> {
    delegate(Trigger::Run, freq_mhz, collaborator)
}

pub fn run_overclock_stability_test_non_stop(
    freq_mhz: f32,
    collaborator: Option<&mut dyn OverclockTest>,
) -> Result<Dispatch, OverclockError> {
    delegate(Trigger::RunNonStop, freq_mhz, collaborator)
}

/// `limit_mhz` is the highest clock the search may try.
pub fn find_max_stable_clock_frequency(
    limit_mhz: f32,
    collaborator: Option<&mut dyn OverclockTest>,
) -> Result<Dispatch, OverclockError> {
    delegate(Trigger::FindClockFreq, limit_mhz, collaborator)
}
