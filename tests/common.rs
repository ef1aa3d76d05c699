#![allow(dead_code)]

// filename according to https://doc.rust-lang.org/book/ch11-03-test-organization.html
use embedded_io::ErrorKind;
use embedded_storage::{ReadStorage, Storage};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use voltage_recorder::platform::{Sampler, Sleep};

pub const CONFIG_SIZE: usize = 8;
pub const RECORD_SIZE: usize = 5;

#[derive(Default)]
pub struct Eeprom {
    pub buf: Vec<u8>,
    pub fail_after_operation: usize,
    pub operations: Vec<Operation>,
    pub faults: Rc<Faults>,
}

/// Transient faults, switchable while the device is owned by the code under test.
#[derive(Default)]
pub struct Faults {
    /// Every read fails while set.
    pub reads: Cell<bool>,
    /// Number of upcoming writes that fail.
    pub writes: Cell<usize>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Operation {
    Read { offset: u32, len: usize },
    Write { offset: u32, len: usize },
}

impl Eeprom {
    /// A factory fresh device reading all zeroes.
    pub fn new(capacity: usize) -> Self {
        Self::filled(capacity, 0x00)
    }

    pub fn filled(capacity: usize, value: u8) -> Self {
        Self {
            buf: vec![value; capacity],
            fail_after_operation: usize::MAX,
            ..Default::default()
        }
    }

    pub fn new_with_fault(capacity: usize, fail_after_operation: usize) -> Self {
        Self {
            fail_after_operation,
            ..Self::new(capacity)
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn disable_faults(&mut self) {
        self.fail_after_operation = usize::MAX;
    }

    pub fn writes(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, Operation::Write { .. }))
            .count()
    }

    pub fn dump_operations(&self) {
        println!("Operations:");
        for op in &self.operations {
            println!("  {:?}", op);
        }
    }
}

#[derive(Debug)]
pub struct EepromError;

impl ReadStorage for Eeprom {
    type Error = EepromError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        println!(
            "    eeprom: read:  0x{offset:04X}[0x{:04X}] #{:>2}",
            bytes.len(),
            self.operations.len()
        );
        if self.operations.len() >= self.fail_after_operation || self.faults.reads.get() {
            println!("    eeprom: FAULT");
            return Err(EepromError);
        }
        self.operations.push(Operation::Read {
            offset,
            len: bytes.len(),
        });

        let offset = offset as usize;
        bytes.copy_from_slice(&self.buf[offset..offset + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.buf.len()
    }
}

impl Storage for Eeprom {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        println!(
            "    eeprom: write: 0x{offset:04X}[0x{:04X}] #{:>2}",
            bytes.len(),
            self.operations.len()
        );
        if self.operations.len() >= self.fail_after_operation {
            println!("    eeprom: FAULT");
            return Err(EepromError);
        }
        if self.faults.writes.get() > 0 {
            println!("    eeprom: FAULT (transient)");
            self.faults.writes.set(self.faults.writes.get() - 1);
            return Err(EepromError);
        }
        assert!(!bytes.is_empty());

        self.operations.push(Operation::Write {
            offset,
            len: bytes.len(),
        });

        let offset = offset as usize;
        self.buf[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

/// Replays a fixed list of readings, repeating the last one.
pub struct FakeAdc {
    pub readings: VecDeque<(i16, i16)>,
    pub last: (i16, i16),
    pub samples: usize,
}

impl FakeAdc {
    pub fn new(readings: &[(i16, i16)]) -> Self {
        Self {
            readings: readings.iter().copied().collect(),
            last: (0, 0),
            samples: 0,
        }
    }

    pub fn constant(a: i16, b: i16) -> Self {
        Self {
            readings: VecDeque::new(),
            last: (a, b),
            samples: 0,
        }
    }
}

impl Sampler for FakeAdc {
    fn sample(&mut self) -> (i16, i16) {
        self.samples += 1;
        if let Some(reading) = self.readings.pop_front() {
            self.last = reading;
        }
        self.last
    }
}

#[derive(Default)]
pub struct CountingSleep {
    pub quanta: usize,
}

impl Sleep for CountingSleep {
    fn sleep_quantum(&mut self) {
        self.quanta += 1;
    }
}

/// Serial port double: `input` is what the user typed, `output` what the device printed.
/// A `broken` terminal fails every operation.
#[derive(Default)]
pub struct Terminal {
    pub input: VecDeque<u8>,
    pub output: Vec<u8>,
    pub broken: bool,
}

impl Terminal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_str(&mut self, s: &str) {
        self.input.extend(s.bytes());
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Returns and forgets everything printed so far.
    pub fn take_output(&mut self) -> String {
        let output = self.output();
        self.output.clear();
        output
    }
}

impl Terminal {
    fn check(&self) -> Result<(), ErrorKind> {
        match self.broken {
            true => Err(ErrorKind::BrokenPipe),
            false => Ok(()),
        }
    }
}

impl embedded_io::ErrorType for Terminal {
    type Error = ErrorKind;
}

impl embedded_io::ReadReady for Terminal {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        self.check()?;
        Ok(!self.input.is_empty())
    }
}

impl embedded_io::Read for Terminal {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.check()?;
        let mut n = 0;
        while n < buf.len() {
            match self.input.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

impl embedded_io::Write for Terminal {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.check()?;
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
