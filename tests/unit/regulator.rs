//! Register protocol of `CoreVoltageRegulator` against the fake POWMAN.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use rp2350_vreg_control::register::{
    decode_field_bits, POWMAN_PASSWORD_BITS, VREG_CTRL_UNLOCK_BITS, VSEL_FIELD_MASK,
};
use rp2350_vreg_control::{
    Config, CoreVoltageRegulator, RegisterAddress, VregError, VregVoltage,
};

use crate::common::{FakeFault, FakePowman, VREG_RESET_VALUE};

const SUPPORTED: [(f32, u8); 10] = [
    (0.85, 0b00110),
    (0.90, 0b00111),
    (0.95, 0b01000),
    (1.00, 0b01001),
    (1.05, 0b01010),
    (1.10, 0b01011),
    (1.15, 0b01100),
    (1.20, 0b01101),
    (1.25, 0b01110),
    (1.30, 0b01111),
];

#[test]
fn set_voltage_replaces_only_vsel() {
    // HIZ and bits 12..14 set, VSEL at 0.85V
    let before = 0x0000_7062;
    let mut regulator = CoreVoltageRegulator::new(FakePowman::new(0, before));

    assert_eq!(regulator.set_voltage(1.10), Ok(VregVoltage::VregVoltage1_10));

    let powman = regulator.release();
    assert_eq!(decode_field_bits(powman.vreg), 0b01011);
    assert_eq!(powman.vreg & !VSEL_FIELD_MASK, before & !VSEL_FIELD_MASK);
    assert_eq!(powman.vreg, 0x0000_70b2);
    assert_eq!(
        powman.writes,
        vec![(RegisterAddress::VREG, POWMAN_PASSWORD_BITS | 0x0000_70b2)]
    );
}

#[test]
fn set_voltage_reads_back() {
    let mut regulator = CoreVoltageRegulator::new(FakePowman::after_reset());
    assert_eq!(regulator.voltage(), VregVoltage::VregVoltage1_10);

    regulator.set_voltage(1.25).unwrap();
    assert_eq!(regulator.voltage(), VregVoltage::VregVoltage1_25);

    regulator.set_voltage(0.90).unwrap();
    assert_eq!(regulator.voltage(), VregVoltage::VregVoltage0_90);
}

#[test]
fn unsupported_voltage_touches_nothing() {
    for volts in [0.5f32, 2.0, -1.0, 1.35, 1.075] {
        let mut regulator = CoreVoltageRegulator::new(FakePowman::after_reset());

        match regulator.set_voltage(volts) {
            Err(VregError::UnsupportedVoltage { requested, .. }) => assert_eq!(requested, volts),
            other => panic!("expected UnsupportedVoltage for {}, got {:?}", volts, other),
        }

        let powman = regulator.release();
        assert_eq!(powman.reads, 0);
        assert!(powman.writes.is_empty());
        assert_eq!(powman.vreg, VREG_RESET_VALUE);
    }
}

#[test]
fn write_fault_is_returned_not_retried() {
    let mut powman = FakePowman::after_reset();
    powman.fail_writes = true;
    let mut regulator = CoreVoltageRegulator::new(powman);

    assert_eq!(
        regulator.set_voltage(1.00),
        Err(VregError::PlatformWriteFault(FakeFault::Bus))
    );

    let powman = regulator.release();
    assert_eq!(powman.writes.len(), 1);
    assert_eq!(powman.vreg, VREG_RESET_VALUE);
}

#[test]
fn busy_regulator_is_waited_for() {
    let mut regulator = CoreVoltageRegulator::new(FakePowman::after_reset().busy_for(3));
    assert_eq!(regulator.set_voltage(1.20), Ok(VregVoltage::VregVoltage1_20));
    assert_eq!(regulator.release().writes_to(RegisterAddress::VREG).len(), 1);
}

#[test]
fn busy_regulator_beyond_budget_is_not_written() {
    let config = Config {
        update_poll_limit: 4,
        ..Config::default()
    };
    let mut regulator =
        CoreVoltageRegulator::with_config(FakePowman::after_reset().busy_for(100), &config);

    assert_eq!(regulator.set_voltage(1.20), Err(VregError::UpdateInProgress));

    let powman = regulator.release();
    assert!(powman.writes.is_empty());
    assert_eq!(powman.vreg, VREG_RESET_VALUE);
}

#[test]
fn enable_is_idempotent() {
    let mut regulator = CoreVoltageRegulator::new(FakePowman::new(0x0000_0010, VREG_RESET_VALUE));

    regulator.enable_regulator_control().unwrap();
    assert!(regulator.is_control_unlocked());
    regulator.enable_regulator_control().unwrap();
    assert!(regulator.is_control_unlocked());

    let powman = regulator.release();
    assert_eq!(powman.vreg_ctrl, 0x0000_2010);
    assert_eq!(
        powman.writes_to(RegisterAddress::VREG_CTRL),
        vec![0x5afe_2010, 0x5afe_2010]
    );
}

#[test]
fn disable_is_idempotent() {
    let mut regulator =
        CoreVoltageRegulator::new(FakePowman::new(0x0000_2010, VREG_RESET_VALUE));

    regulator.disable_regulator_control().unwrap();
    assert!(!regulator.is_control_unlocked());
    regulator.disable_regulator_control().unwrap();
    assert!(!regulator.is_control_unlocked());

    let powman = regulator.release();
    assert_eq!(powman.vreg_ctrl, 0x0000_0010);
    assert_eq!(
        powman.writes_to(RegisterAddress::VREG_CTRL),
        vec![0x5afe_0010, 0x5afe_0010]
    );
}

#[test]
fn disable_on_sticky_hardware_still_succeeds() {
    let mut powman = FakePowman::after_reset();
    powman.sticky_unlock = true;
    let mut regulator = CoreVoltageRegulator::new(powman);

    regulator.enable_regulator_control().unwrap();
    assert_eq!(regulator.disable_regulator_control(), Ok(()));
    assert!(regulator.is_control_unlocked());
}

#[test]
fn control_write_fault_is_reported() {
    let mut powman = FakePowman::after_reset();
    powman.fail_writes = true;
    let mut regulator = CoreVoltageRegulator::new(powman);

    assert_eq!(
        regulator.enable_regulator_control(),
        Err(VregError::PlatformWriteFault(FakeFault::Bus))
    );
    assert_eq!(
        regulator.disable_regulator_control(),
        Err(VregError::PlatformWriteFault(FakeFault::Bus))
    );
}

#[test]
fn every_write_carries_the_password() {
    let mut regulator = CoreVoltageRegulator::new(FakePowman::after_reset());
    regulator.enable_regulator_control().unwrap();
    regulator.set_voltage(1.15).unwrap();
    regulator.disable_regulator_control().unwrap();

    for (_, value) in regulator.release().writes {
        assert_eq!(value & 0xffff_0000, POWMAN_PASSWORD_BITS);
    }
}

#[test]
fn apply_config_unlocks_then_sets() {
    let config = Config {
        boot_voltage: Some(1.20),
        unlock_on_boot: true,
        ..Config::default()
    };
    let mut regulator = CoreVoltageRegulator::new(FakePowman::after_reset());
    regulator.apply_config(&config).unwrap();

    let powman = regulator.release();
    let order: Vec<RegisterAddress> = powman.writes.iter().map(|(a, _)| *a).collect();
    assert_eq!(order, vec![RegisterAddress::VREG_CTRL, RegisterAddress::VREG]);
    assert_eq!(powman.vreg_ctrl & VREG_CTRL_UNLOCK_BITS, VREG_CTRL_UNLOCK_BITS);
    assert_eq!(decode_field_bits(powman.vreg), 0b01101);
}

#[test]
fn apply_default_config_only_unlocks() {
    let mut regulator = CoreVoltageRegulator::new(FakePowman::after_reset());
    regulator.apply_config(&Config::default()).unwrap();

    let powman = regulator.release();
    assert_eq!(powman.writes.len(), 1);
    assert_eq!(powman.vreg, VREG_RESET_VALUE);
}

#[test]
fn apply_config_with_bad_voltage_fails() {
    let config = Config {
        boot_voltage: Some(1.40),
        unlock_on_boot: false,
        ..Config::default()
    };
    let mut regulator = CoreVoltageRegulator::new(FakePowman::after_reset());

    assert!(matches!(
        regulator.apply_config(&config),
        Err(VregError::UnsupportedVoltage { .. })
    ));
    assert!(regulator.release().writes.is_empty());
}

proptest! {
    #[test]
    fn set_voltage_preserves_foreign_bits(
        // 16 bit registers, UPDATE_IN_PROGRESS clear
        before in 0u32..0x8000,
        level in 0usize..SUPPORTED.len(),
    ) {
        let (volts, code) = SUPPORTED[level];
        let mut regulator = CoreVoltageRegulator::new(FakePowman::new(0, before));

        prop_assert_eq!(regulator.set_voltage(volts).map(VregVoltage::bits), Ok(code));

        let powman = regulator.release();
        prop_assert_eq!(powman.writes.len(), 1);
        prop_assert_eq!(decode_field_bits(powman.vreg), code);
        prop_assert_eq!(powman.vreg & !VSEL_FIELD_MASK, before & !VSEL_FIELD_MASK);
    }

    #[test]
    fn tolerance_window_selects_same_level(
        level in 0usize..SUPPORTED.len(),
        offset in -0.003f32..0.003f32,
    ) {
        let (volts, code) = SUPPORTED[level];
        let mut regulator = CoreVoltageRegulator::new(FakePowman::after_reset());
        prop_assert_eq!(regulator.set_voltage(volts + offset).map(VregVoltage::bits), Ok(code));
    }
}
