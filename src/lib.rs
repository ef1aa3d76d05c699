#![doc = include_str ! ("../README.md")]
#![cfg_attr(not(target_arch = "x86_64"), no_std)]

pub mod config;
pub mod console;
pub mod display;
pub mod error;
pub mod gesture;
pub mod platform;
pub mod raw;
pub mod recorder;

pub use config::Config;
pub use display::Calibrated;
pub use raw::SampleRecord;
pub use recorder::Recorder;

use crate::error::Error;
use crate::platform::Platform;
use crate::raw::{ERASE_VALUE, RECORD_REGION_START, SAMPLE_RECORD_SIZE};
#[cfg(feature = "defmt")]
use defmt::{trace, warn};

/// Append-only log of [`SampleRecord`]s behind the configuration record.
///
/// The append cursor only lives in RAM. It is recovered by scanning the storage from the start
/// of the record region until the first slot that doesn't carry the record marker, which
/// makes the log self-healing after an unexpected reset.
pub struct SampleLog<T: Platform> {
    pub(crate) hal: T,
    pub(crate) capacity: usize,
    pub(crate) cursor: usize,
    pub(crate) faulted: bool,
}

impl<T: Platform> SampleLog<T> {
    /// Takes ownership of the storage and recovers the append cursor.
    pub fn new(hal: T) -> Result<SampleLog<T>, Error> {
        let capacity = hal.capacity();
        if capacity < RECORD_REGION_START {
            return Err(Error::InvalidCapacity);
        }

        let mut log = Self {
            hal,
            capacity,
            cursor: RECORD_REGION_START,
            faulted: false,
        };
        log.recover_cursor()?;

        Ok(log)
    }

    /// Offset the next record will be written to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Size of the underlying device in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records currently in the log.
    pub fn len(&self) -> usize {
        (self.cursor - RECORD_REGION_START) / SAMPLE_RECORD_SIZE
    }

    /// True if no record has been written since the last clear.
    pub fn is_empty(&self) -> bool {
        self.cursor == RECORD_REGION_START
    }

    /// True if there is no room for another record.
    pub fn is_full(&self) -> bool {
        !self.has_room(self.cursor)
    }

    /// True after a failed storage access. `append` is refused until the cursor was recovered.
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    /// Gives back the storage, e.g. to reopen it after a simulated power cycle.
    pub fn release(self) -> T {
        self.hal
    }

    /// Rescans the storage and places the cursor behind the last contiguous record.
    ///
    /// A successful scan also clears a previous storage fault, a failed one leaves the log
    /// faulted since the cursor in RAM can no longer be trusted.
    pub fn recover_cursor(&mut self) -> Result<usize, Error> {
        let mut cursor = RECORD_REGION_START;
        while self.has_room(cursor) {
            match self.read_record(cursor) {
                Ok(Some(_)) => cursor += SAMPLE_RECORD_SIZE,
                Ok(None) => break,
                Err(e) => {
                    #[cfg(feature = "defmt")]
                    warn!("recover_cursor: read failed @{:#06x}", cursor);

                    self.faulted = true;
                    return Err(e);
                }
            }
        }

        #[cfg(feature = "defmt")]
        trace!("recover_cursor: @{:#06x}", cursor);

        #[cfg(feature = "debug-logs")]
        println!("  log: recovered cursor {cursor:#06x}");

        self.cursor = cursor;
        self.faulted = false;
        Ok(cursor)
    }

    /// Writes a new record at the cursor and returns the advanced cursor.
    ///
    /// Fails with [`Error::StorageFull`] without touching the storage if the record doesn't fit.
    pub fn append(&mut self, reading_a: i16, reading_b: i16) -> Result<usize, Error> {
        if self.faulted {
            return Err(Error::StorageError);
        }

        if !self.has_room(self.cursor) {
            #[cfg(feature = "defmt")]
            warn!("append: full @{:#06x}", self.cursor);

            #[cfg(feature = "debug-logs")]
            println!("  log: full at {:#06x}", self.cursor);

            return Err(Error::StorageFull);
        }

        let record = SampleRecord::new(reading_a, reading_b);

        #[cfg(feature = "defmt")]
        trace!("append: @{:#06x} {}", self.cursor, record);

        #[cfg(feature = "debug-logs")]
        println!("  log: append {record:?} at {:#06x}", self.cursor);

        if self
            .hal
            .write(self.cursor as _, &record.to_bytes())
            .is_err()
        {
            self.faulted = true;
            return Err(Error::StorageError);
        }

        self.cursor += SAMPLE_RECORD_SIZE;
        Ok(self.cursor)
    }

    /// Iterates the stored records in the order they were appended.
    ///
    /// Stops at the same slot `recover_cursor` would, so records behind a hole are never
    /// visited. Each call starts over from the beginning of the region.
    pub fn records(&mut self) -> Records<'_, T> {
        Records {
            log: self,
            offset: RECORD_REGION_START,
            done: false,
        }
    }

    /// Calls `visit` for every stored record, see [`SampleLog::records`].
    pub fn for_each_record<F>(&mut self, mut visit: F) -> Result<(), Error>
    where
        F: FnMut(SampleRecord),
    {
        for record in self.records() {
            visit(record?);
        }
        Ok(())
    }

    /// Erases the whole record region and resets the cursor to its start.
    pub fn clear(&mut self) -> Result<(), Error> {
        self.clear_with_progress(|_| Ok(()))
    }

    /// Like [`SampleLog::clear`], but erases byte by byte and reports each erased offset to
    /// `progress`. An error returned by `progress` aborts the clear, leaving a partially erased
    /// region behind. The cursor is recovered in any case.
    ///
    /// Works on a faulted log as well, the rescan afterwards clears the fault.
    pub fn clear_with_progress<F>(&mut self, mut progress: F) -> Result<(), Error>
    where
        F: FnMut(usize) -> Result<(), Error>,
    {
        #[cfg(feature = "defmt")]
        trace!(
            "clear: {:#06x}..{:#06x}",
            RECORD_REGION_START,
            self.capacity
        );

        #[cfg(feature = "debug-logs")]
        println!("  log: clear {RECORD_REGION_START:#06x}..{:#06x}", self.capacity);

        let erased = (RECORD_REGION_START..self.capacity).try_for_each(|offset| {
            self.hal
                .write(offset as _, &[ERASE_VALUE])
                .map_err(|_| Error::StorageError)?;
            progress(offset)
        });

        match erased {
            Ok(()) => {
                self.recover_cursor()?;
                Ok(())
            }
            Err(Error::StorageError) => {
                self.faulted = true;
                Err(Error::StorageError)
            }
            Err(e) => {
                self.recover_cursor()?;
                Err(e)
            }
        }
    }

    fn has_room(&self, cursor: usize) -> bool {
        cursor + SAMPLE_RECORD_SIZE <= self.capacity
    }

    fn read_record(&mut self, offset: usize) -> Result<Option<SampleRecord>, Error> {
        let mut buf = [0u8; SAMPLE_RECORD_SIZE];
        self.hal
            .read(offset as _, &mut buf)
            .map_err(|_| Error::StorageError)?;
        Ok(SampleRecord::from_bytes(&buf))
    }
}

/// Iterator over the stored records, created by [`SampleLog::records`].
pub struct Records<'a, T: Platform> {
    log: &'a mut SampleLog<T>,
    offset: usize,
    done: bool,
}

impl<T: Platform> Iterator for Records<'_, T> {
    type Item = Result<SampleRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || !self.log.has_room(self.offset) {
            return None;
        }

        match self.log.read_record(self.offset) {
            Ok(Some(record)) => {
                self.offset += SAMPLE_RECORD_SIZE;
                Some(Ok(record))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
