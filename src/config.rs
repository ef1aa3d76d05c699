use crate::error::Error;
use crate::platform::Platform;
use crate::raw::{CONFIG_RECORD_SIZE, ConfigRecord};
use crate::SampleLog;
#[cfg(feature = "defmt")]
use defmt::trace;

/// Calibration and scheduling parameters, persisted at offset 0 of the storage.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Scale factor applied to raw readings for display. Never 0 for a stored configuration.
    pub millivolts_per_unit: u32,
    /// Number of sleep quanta between two samples.
    pub sleep_cycles: u32,
}

impl Config {
    pub const DEFAULT: Config = Config {
        millivolts_per_unit: 49,
        sleep_cycles: 450,
    };

    /// A calibration of 0 is what a blank device reads as. Such a record was never written
    /// by us and doesn't count as a configuration.
    pub(crate) fn decode(raw: &[u8; CONFIG_RECORD_SIZE]) -> Option<Self> {
        let record = ConfigRecord::from_bytes(raw);
        if record.millivolts_per_unit == 0 {
            return None;
        }
        Some(Self {
            millivolts_per_unit: record.millivolts_per_unit,
            sleep_cycles: record.sleep_cycles,
        })
    }

    pub(crate) fn encode(&self) -> [u8; CONFIG_RECORD_SIZE] {
        ConfigRecord {
            millivolts_per_unit: self.millivolts_per_unit,
            sleep_cycles: self.sleep_cycles,
        }
        .to_bytes()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl<T: Platform> SampleLog<T> {
    /// Reads the stored configuration. If the device was never configured, the built-in
    /// defaults are written and returned.
    pub fn load_or_initialize(&mut self) -> Result<Config, Error> {
        match self.load_config()? {
            Some(config) => Ok(config),
            None => {
                #[cfg(feature = "defmt")]
                trace!("load_or_initialize: writing defaults");

                #[cfg(feature = "debug-logs")]
                println!("  config: blank, writing defaults");

                let config = Config::DEFAULT;
                self.persist(&config)?;
                Ok(config)
            }
        }
    }

    /// Reads the configuration record, `None` if the device holds none.
    pub fn load_config(&mut self) -> Result<Option<Config>, Error> {
        let mut raw = [0u8; CONFIG_RECORD_SIZE];
        self.hal
            .read(0, &mut raw)
            .map_err(|_| Error::StorageError)?;
        Ok(Config::decode(&raw))
    }

    /// Writes both fields of the configuration with a single storage write.
    pub fn persist(&mut self, config: &Config) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        trace!("persist: {}", config);

        #[cfg(feature = "debug-logs")]
        println!("  config: persist {config:?}");

        self.hal
            .write(0, &config.encode())
            .map_err(|_| Error::StorageError)
    }
}
