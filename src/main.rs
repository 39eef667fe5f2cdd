//! Core voltage console for the RP2350.
//!
//! Applies the build-time regulator configuration at boot, then reads commands
//! from UART1 (GPIO5 RX). defmt output goes out on UART1 as well (GPIO4 TX).

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{self, Uart, UartTx};

use embedded_io::{ErrorType, Write};

use defmt::{error, info, warn, Display2Format};
use {defmt_serial as _, panic_probe as _};

use static_cell::StaticCell;

use rp2350_vreg_control::console::{self, LineBuffer, Reply, HELP};
use rp2350_vreg_control::overclock::OverclockTest;
use rp2350_vreg_control::{Config, CoreVoltageRegulator, Mmio};

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

// Program metadata for `picotool info`
#[link_section = ".bi_entries"]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"rp2350-vreg-control"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_description!(c"RP2350 core voltage console"),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

static SERIAL: StaticCell<SerialWrapper> = StaticCell::new();

struct SerialWrapper<'a> {
    uart: UartTx<'a, UART1, embassy_rp::uart::Blocking>,
}

impl<'a> ErrorType for SerialWrapper<'a> {
    type Error = uart::Error;
}

impl<'a> Write for SerialWrapper<'a> {
    fn write(&mut self, word: &[u8]) -> Result<usize, uart::Error> {
        self.uart.blocking_write(word)?;
        Ok(word.len())
    }

    fn flush(&mut self) -> Result<(), uart::Error> {
        self.uart.blocking_flush()
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    let uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, uart::Config::default());
    let (tx, mut rx) = uart.split();

    defmt_serial::defmt_serial(SERIAL.init(SerialWrapper { uart: tx }));

    info!(
        "rp2350-vreg-control {=str} ({=str})",
        built_info::PKG_VERSION,
        built_info::GIT_COMMIT_HASH_SHORT.unwrap_or("unknown")
    );

    let config = Config::from_build_env();
    info!("config: {}", config);

    // Safety: the regulator is the only user of VREG_CTRL and VREG, and it
    // lives on this task for the whole runtime.
    let mut regulator = CoreVoltageRegulator::with_config(unsafe { Mmio::new() }, &config);

    if let Err(e) = regulator.apply_config(&config) {
        error!("boot configuration not applied: {}", Display2Format(&e));
    }
    info!("core voltage is {}mV", regulator.voltage().millivolts());

    let mut line_buffer = LineBuffer::new();
    let mut byte = [0u8; 1];

    loop {
        if let Err(e) = rx.blocking_read(&mut byte) {
            warn!("uart rx error: {}", e);
            continue;
        }

        let line = match line_buffer.push(byte[0]) {
            None => continue,
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                warn!("{}", Display2Format(&e));
                continue;
            }
        };

        let command = match console::parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                warn!("{=str}: {}", line.as_str(), Display2Format(&e));
                continue;
            }
        };

        // The stability test itself is not part of this firmware.
        match console::execute(&mut regulator, command, None::<&mut dyn OverclockTest>) {
            Ok(Reply::Help) => info!("{=str}", HELP),
            Ok(reply) => info!("{}", reply),
            Err(e) => warn!("{}", Display2Format(&e)),
        }
    }
}
