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

use core::convert::Infallible;

use thiserror::Error;

/// Errors of the regulator protocol, generic over the fault type of the register bus.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VregError<E> {
    /// The requested voltage is not close to any of the supported levels.
    /// Nothing was written.
    #[error(
        "unsupported voltage {requested}V, valid inputs are {min:.2}V ~ {max:.2}V with a {step:.2}V increment each step"
    )]
    UnsupportedVoltage {
        requested: f32,
        min: f32,
        max: f32,
        step: f32,
    },
    /// The store to the register did not go through.
    #[error("platform write fault: {0:?}")]
    PlatformWriteFault(E),
    /// The regulator is still applying an earlier update. Nothing was written.
    #[error("regulator update still in progress")]
    UpdateInProgress,
}

/// Errors of the overclock test entry points. A missing overclock test is
/// not one of them, see [`crate::overclock::Dispatch`].
#[derive(Copy, Clone, Debug, PartialEq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverclockError {
    /// Frequency outside of 0 < f < 1000. The unit is MHz.
    #[error("invalid frequency {0}, the input must be positive and the unit used is MHz (0 < f < 1000)")]
    InvalidFrequencyInput(f32),
}

impl VregError<Infallible> {
    /// Lifts an error from the pure encoder into the error type of a register bus.
    pub fn widen<E>(self) -> VregError<E> {
        match self {
            VregError::UnsupportedVoltage {
                requested,
                min,
                max,
                step,
            } => VregError::UnsupportedVoltage {
                requested,
                min,
                max,
                step,
            },
            VregError::PlatformWriteFault(never) => match never {},
            VregError::UpdateInProgress => VregError::UpdateInProgress,
        }
    }
}

/// Why a console line could not be turned into a command.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    #[error("empty line")]
    Empty,
    #[error("unknown command, try `help`")]
    UnknownCommand,
    #[error("missing argument")]
    MissingArgument,
    #[error("argument is not a number")]
    InvalidNumber,
    #[error("too many arguments")]
    TrailingInput,
    #[error("line too long")]
    LineTooLong,
}

#[derive(Copy, Clone, Debug, PartialEq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleError<E> {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Vreg(VregError<E>),
    #[error(transparent)]
    Overclock(#[from] OverclockError),
}

impl<E> From<VregError<E>> for ConsoleError<E> {
    fn from(e: VregError<E>) -> Self {
        ConsoleError::Vreg(e)
    }
}
