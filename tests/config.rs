mod common;

use crate::common::Operation::{Read, Write};
use crate::common::{CONFIG_SIZE, Eeprom};
use pretty_assertions::assert_eq;
use voltage_recorder::{Config, SampleLog};

#[test]
fn blank_device_gets_defaults() {
    let mut log = SampleLog::new(Eeprom::new(64)).unwrap();
    assert_eq!(log.load_config().unwrap(), None);

    let config = log.load_or_initialize().unwrap();
    assert_eq!(config, Config::DEFAULT);
    assert_eq!(config.millivolts_per_unit, 49);
    assert_eq!(config.sleep_cycles, 450);

    let eeprom = log.release();
    assert_eq!(eeprom.buf[..CONFIG_SIZE], [49, 0, 0, 0, 0xC2, 0x01, 0, 0]);

    // the defaults are found on the next boot and not written again
    let mut log = SampleLog::new(eeprom).unwrap();
    assert_eq!(log.load_config().unwrap(), Some(Config::DEFAULT));
    assert_eq!(log.load_or_initialize().unwrap(), Config::DEFAULT);
    assert_eq!(log.release().writes(), 0);
}

#[test]
fn stored_configuration_is_returned_unchanged() {
    let mut log = SampleLog::new(Eeprom::new(64)).unwrap();
    let custom = Config {
        millivolts_per_unit: 5,
        sleep_cycles: 0,
    };
    log.persist(&custom).unwrap();

    let mut log = SampleLog::new(log.release()).unwrap();
    assert_eq!(log.load_or_initialize().unwrap(), custom);
}

#[test]
fn zero_calibration_means_unconfigured() {
    let mut eeprom = Eeprom::new(64);
    // a sleep count without calibration is still "never configured"
    eeprom.buf[4] = 10;

    let mut log = SampleLog::new(eeprom).unwrap();
    assert_eq!(log.load_or_initialize().unwrap(), Config::DEFAULT);
}

#[test]
fn persist_is_a_single_write() {
    let log = SampleLog::new(Eeprom::new(64)).unwrap();
    let mut eeprom = log.release();
    eeprom.operations.clear();

    let mut log = SampleLog::new(eeprom).unwrap();
    log.persist(&Config {
        millivolts_per_unit: 1,
        sleep_cycles: 2,
    })
    .unwrap();

    let eeprom = log.release();
    assert_eq!(
        eeprom.operations,
        vec![
            Read { offset: 8, len: 5 },
            Write {
                offset: 0,
                len: CONFIG_SIZE
            },
        ]
    );
    assert_eq!(eeprom.buf[..CONFIG_SIZE], [1, 0, 0, 0, 2, 0, 0, 0]);
}

#[test]
fn configuration_and_log_are_independent() {
    let mut log = SampleLog::new(Eeprom::new(64)).unwrap();
    log.load_or_initialize().unwrap();
    log.append(1, 2).unwrap();
    log.persist(&Config {
        millivolts_per_unit: 100,
        sleep_cycles: 1,
    })
    .unwrap();

    let mut log = SampleLog::new(log.release()).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log.load_config().unwrap().map(|c| c.millivolts_per_unit), Some(100));
}
