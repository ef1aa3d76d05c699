//! Single character command console.
//!
//! The console never blocks: [`Console::poll`] consumes whatever input is ready and returns.
//! Multi-byte interactions, like entering a new configuration, are kept as state between polls.

use crate::config::Config;
use crate::display::{Calibrated, scale};
use crate::error::Error;
use crate::platform::{Platform, Sampler};
use crate::SampleLog;
use embedded_io::{Read, ReadReady, Write};
use heapless::Vec;
use strum::{EnumMessage, IntoEnumIterator};

pub const BANNER: &str = "Voltage Recorder 0.2";

const SEPARATOR: &str = "-----";
const MAX_DIGITS: usize = 19;
const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

#[derive(strum::FromRepr, strum::EnumIter, strum::EnumMessage, Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    #[strum(message = "dump eeprom")]
    Dump = b'd',
    #[strum(message = "erase eeprom")]
    Erase = b'e',
    #[strum(message = "show current status")]
    Status = b'v',
    #[strum(message = "update configuration")]
    Configure = b'c',
}

/// Numeric input with echo and backspace support.
///
/// At most [`MAX_DIGITS`] digits are kept. Further digits are neither stored nor echoed, and
/// the entry keeps waiting for CR or LF.
#[derive(Default, Debug)]
struct Entry {
    digits: Vec<u8, MAX_DIGITS>,
}

impl Entry {
    /// Saturates instead of wrapping around, an empty entry is 0.
    fn value(&self) -> u32 {
        self.digits.iter().fold(0u32, |acc, &digit| {
            acc.saturating_mul(10).saturating_add(u32::from(digit - b'0'))
        })
    }
}

#[derive(Debug)]
enum State {
    Idle,
    Calibration(Entry),
    SleepCycles {
        millivolts_per_unit: u32,
        entry: Entry,
    },
}

pub struct Console<I> {
    io: I,
    state: State,
    after_cr: bool,
}

fn io_error<E>(_: E) -> Error {
    Error::InterfaceError
}

impl<I: Read + ReadReady + Write> Console<I> {
    pub fn new(io: I) -> Self {
        Self {
            io,
            state: State::Idle,
            after_cr: false,
        }
    }

    pub fn release(self) -> I {
        self.io
    }

    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.io
    }

    /// True while a multi-byte interaction waits for more input.
    pub fn is_busy(&self) -> bool {
        !matches!(self.state, State::Idle)
    }

    /// Reads the next byte if one is available, without blocking.
    pub fn read_byte(&mut self) -> Result<Option<u8>, Error> {
        if !self.io.read_ready().map_err(io_error)? {
            return Ok(None);
        }
        let mut buf = [0u8; 1];
        match self.io.read(&mut buf).map_err(io_error)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }

    /// Handles all input that is currently available.
    pub fn poll<T, S>(
        &mut self,
        log: &mut SampleLog<T>,
        config: &mut Config,
        sampler: &mut S,
    ) -> Result<(), Error>
    where
        T: Platform,
        S: Sampler,
    {
        while let Some(byte) = self.read_byte()? {
            self.handle_byte(byte, log, config, sampler)?;
        }
        self.io.flush().map_err(io_error)
    }

    pub fn handle_byte<T, S>(
        &mut self,
        byte: u8,
        log: &mut SampleLog<T>,
        config: &mut Config,
        sampler: &mut S,
    ) -> Result<(), Error>
    where
        T: Platform,
        S: Sampler,
    {
        // terminals sending CRLF would otherwise finish two entries at once
        let swallow = self.after_cr && byte == b'\n';
        self.after_cr = byte == b'\r';
        if swallow {
            return Ok(());
        }

        match core::mem::replace(&mut self.state, State::Idle) {
            State::Idle => self.dispatch(byte, log, config, sampler),
            State::Calibration(mut entry) => {
                if self.edit(&mut entry, byte)? {
                    self.write_str("new 8s delays per reading: ")?;
                    self.state = State::SleepCycles {
                        millivolts_per_unit: entry.value(),
                        entry: Entry::default(),
                    };
                } else {
                    self.state = State::Calibration(entry);
                }
                Ok(())
            }
            State::SleepCycles {
                millivolts_per_unit,
                mut entry,
            } => {
                if self.edit(&mut entry, byte)? {
                    self.finish_configuration(millivolts_per_unit, entry.value(), log, config)
                } else {
                    self.state = State::SleepCycles {
                        millivolts_per_unit,
                        entry,
                    };
                    Ok(())
                }
            }
        }
    }

    fn dispatch<T, S>(
        &mut self,
        byte: u8,
        log: &mut SampleLog<T>,
        config: &mut Config,
        sampler: &mut S,
    ) -> Result<(), Error>
    where
        T: Platform,
        S: Sampler,
    {
        match Command::from_repr(byte) {
            Some(Command::Dump) => self.dump(log, config),
            Some(Command::Erase) => self.erase(log),
            Some(Command::Status) => self.status(log, config, sampler),
            Some(Command::Configure) => {
                self.write_config(config)?;
                self.write_str("new millivolts per unit: ")?;
                self.state = State::Calibration(Entry::default());
                Ok(())
            }
            None => self.prompt(),
        }
    }

    /// Prints the command menu.
    pub fn prompt(&mut self) -> Result<(), Error> {
        self.write_str("\r\nCommands:\r\n")?;
        for command in Command::iter() {
            write!(
                self.io,
                "{} - {}\r\n",
                command as u8 as char,
                command.get_message().unwrap_or_default()
            )
            .map_err(io_error)?;
        }
        self.write_str("> ")
    }

    /// Prints the firmware banner and the active configuration.
    pub fn banner(&mut self, config: &Config) -> Result<(), Error> {
        write!(self.io, "{BANNER}\r\n").map_err(io_error)?;
        self.write_config(config)
    }

    pub fn gesture_hint(&mut self) -> Result<(), Error> {
        self.write_str("Press <SPACE> 3 times in the next 10 seconds for interactive mode.\r\n")
    }

    /// Echoes the append cursor after a stored sample.
    pub fn write_cursor(&mut self, cursor: usize) -> Result<(), Error> {
        write!(self.io, "{cursor}\r\n").map_err(io_error)
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), Error> {
        self.io.write_all(s.as_bytes()).map_err(io_error)
    }

    fn write_config(&mut self, config: &Config) -> Result<(), Error> {
        write!(
            self.io,
            "\r\nConfiguration:\r\nMillivolts per unit: {}\r\n8s delays: {}\r\n",
            config.millivolts_per_unit, config.sleep_cycles
        )
        .map_err(io_error)
    }

    fn dump<T: Platform>(&mut self, log: &mut SampleLog<T>, config: &Config) -> Result<(), Error> {
        write!(self.io, "{SEPARATOR}\r\n").map_err(io_error)?;
        for record in log.records() {
            let calibrated = Calibrated::project(record?, config.millivolts_per_unit);
            write!(self.io, "{calibrated}\r\n").map_err(io_error)?;
        }
        write!(self.io, "{SEPARATOR}\r\n").map_err(io_error)
    }

    fn erase<T: Platform>(&mut self, log: &mut SampleLog<T>) -> Result<(), Error> {
        self.write_str("\r\nClearing EEPROM")?;
        let io = &mut self.io;
        log.clear_with_progress(|_| io.write_all(b".").map_err(io_error))?;
        self.write_str("\r\nDone.\r\n")
    }

    fn status<T, S>(
        &mut self,
        log: &mut SampleLog<T>,
        config: &Config,
        sampler: &mut S,
    ) -> Result<(), Error>
    where
        T: Platform,
        S: Sampler,
    {
        write!(self.io, "EEPROM: {}/{}\r\n", log.cursor(), log.capacity()).map_err(io_error)?;
        self.write_config(config)?;
        let (a, b) = sampler.sample();
        write!(
            self.io,
            "A0: {}\r\nA1: {}\r\n",
            scale(a, config.millivolts_per_unit),
            scale(b, config.millivolts_per_unit)
        )
        .map_err(io_error)
    }

    /// Applies one byte of numeric input, returns true once the entry is finished.
    fn edit(&mut self, entry: &mut Entry, byte: u8) -> Result<bool, Error> {
        match byte {
            b'0'..=b'9' => {
                if entry.digits.push(byte).is_ok() {
                    self.io.write_all(&[byte]).map_err(io_error)?;
                }
                Ok(false)
            }
            BACKSPACE | DELETE => {
                if entry.digits.pop().is_some() {
                    self.write_str("\x08 \x08")?;
                }
                Ok(false)
            }
            b'\r' | b'\n' => {
                self.write_str("\r\n")?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn finish_configuration<T: Platform>(
        &mut self,
        millivolts_per_unit: u32,
        sleep_cycles: u32,
        log: &mut SampleLog<T>,
        config: &mut Config,
    ) -> Result<(), Error> {
        let millivolts_per_unit = if millivolts_per_unit == 0 {
            write!(
                self.io,
                "Millivolts per unit must not be 0, keeping {}\r\n",
                config.millivolts_per_unit
            )
            .map_err(io_error)?;
            config.millivolts_per_unit
        } else {
            millivolts_per_unit
        };

        let updated = Config {
            millivolts_per_unit,
            sleep_cycles,
        };
        log.persist(&updated)?;
        *config = updated;

        self.prompt()
    }
}
