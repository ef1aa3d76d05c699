use crate::config::Config;
use crate::console::Console;
use crate::error::Error;
use crate::gesture::GestureDetector;
use crate::platform::{Platform, Sampler, Sleep};
use crate::SampleLog;
#[cfg(feature = "defmt")]
use defmt::{trace, warn};
use embedded_io::{Read, ReadReady, Write};

/// Outcome of a single [`Recorder::cycle`].
#[derive(Debug, PartialEq)]
pub struct CycleReport {
    /// Result of servicing the console and echoing the cursor. Always `Ok` outside of
    /// interactive mode if the interface works.
    pub console: Result<(), Error>,
    /// The cursor after the append, or why nothing was appended. A full log is expected to
    /// happen eventually and can be ignored, sampling continues regardless.
    pub appended: Result<usize, Error>,
    /// Number of sleep quanta spent after the sample.
    pub slept: u32,
}

/// Owns the log, the active configuration and all collaborators, and runs the
/// sample, append, sleep cycle.
pub struct Recorder<T: Platform, S, Z, I> {
    log: SampleLog<T>,
    config: Config,
    sampler: S,
    sleep: Z,
    console: Console<I>,
    interactive: bool,
}

impl<T, S, Z, I> Recorder<T, S, Z, I>
where
    T: Platform,
    S: Sampler,
    Z: Sleep,
    I: Read + ReadReady + Write,
{
    /// Recovers the append cursor, loads the configuration (writing defaults to a blank
    /// device) and prints the banner followed by the gesture hint.
    pub fn boot(hal: T, sampler: S, sleep: Z, interface: I) -> Result<Self, Error> {
        let mut log = SampleLog::new(hal)?;
        let config = log.load_or_initialize()?;

        #[cfg(feature = "defmt")]
        trace!("boot: {} records, {}", log.len(), config);

        #[cfg(feature = "debug-logs")]
        println!("recorder: boot with {} records, {config:?}", log.len());

        let mut console = Console::new(interface);
        console.banner(&config)?;
        console.gesture_hint()?;

        Ok(Self {
            log,
            config,
            sampler,
            sleep,
            console,
            interactive: false,
        })
    }

    /// Feeds pending input to the boot gesture detector and switches to interactive mode once
    /// it is complete. Meant to be called repeatedly during the boot window.
    pub fn detect_gesture(&mut self, gesture: &mut GestureDetector) -> Result<bool, Error> {
        while !self.interactive {
            let Some(byte) = self.console.read_byte()? else {
                break;
            };
            if gesture.feed(byte) {
                self.enter_interactive()?;
            }
        }
        Ok(self.interactive)
    }

    /// Starts servicing the console on every cycle.
    pub fn enter_interactive(&mut self) -> Result<(), Error> {
        if self.interactive {
            return Ok(());
        }
        self.interactive = true;
        self.console.write_str("Interactive Mode Activated\r\n")?;
        self.console.prompt()
    }

    /// Services the console once, without sampling or sleeping.
    pub fn service_console(&mut self) -> Result<(), Error> {
        self.console
            .poll(&mut self.log, &mut self.config, &mut self.sampler)
    }

    /// One iteration of the main loop: console (if interactive), sample, append, sleep.
    ///
    /// Never stops short. Console and storage failures are reported in the [`CycleReport`]
    /// and sampling and sleeping happen regardless. A log faulted by an earlier storage
    /// error is rescanned before appending.
    pub fn cycle(&mut self) -> CycleReport {
        let polled = match self.interactive {
            true => self.service_console(),
            false => Ok(()),
        };

        if let Err(_e) = &polled {
            #[cfg(feature = "defmt")]
            warn!("cycle: console failed: {}", _e);

            #[cfg(feature = "debug-logs")]
            println!("recorder: console failed: {_e}");
        }

        let (reading_a, reading_b) = self.sampler.sample();
        let appended = self
            .recover_if_faulted()
            .and_then(|_| self.log.append(reading_a, reading_b));

        let echoed = match &appended {
            Ok(cursor) => {
                #[cfg(feature = "defmt")]
                trace!("cycle: appended, cursor @{:#06x}", cursor);

                self.console.write_cursor(*cursor)
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                warn!("cycle: sample dropped: {}", _e);

                #[cfg(feature = "debug-logs")]
                println!("recorder: sample dropped: {_e}");

                Ok(())
            }
        };

        let slept = self.config.sleep_cycles;
        for _ in 0..slept {
            self.sleep.sleep_quantum();
        }

        CycleReport {
            console: polled.and(echoed),
            appended,
            slept,
        }
    }

    fn recover_if_faulted(&mut self) -> Result<(), Error> {
        if self.log.is_faulted() {
            self.log.recover_cursor()?;
        }
        Ok(())
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn log(&self) -> &SampleLog<T> {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut SampleLog<T> {
        &mut self.log
    }

    pub fn console_mut(&mut self) -> &mut Console<I> {
        &mut self.console
    }

    /// Tears the recorder down into storage, sampler, sleep and console interface.
    pub fn release(self) -> (T, S, Z, I) {
        (
            self.log.release(),
            self.sampler,
            self.sleep,
            self.console.release(),
        )
    }
}
