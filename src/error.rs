use thiserror::Error;

/// Errors that can occur while operating the recorder. Marked as non-exhaustive to allow for
/// future additions without breaking the API. A caller would usually only need to handle
/// `StorageFull`, which is an expected terminal condition of the log.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// There is no room left for another complete sample record. Nothing was written.
    #[error("storage full")]
    StorageFull,

    /// The internal error value is returned from the provided `impl Storage`.
    /// Mutating operations are refused until the cursor was recovered again.
    #[error("internal storage error")]
    StorageError,

    /// The device has to be at least large enough to hold the configuration record.
    #[error("invalid storage capacity")]
    InvalidCapacity,

    /// Reading from or writing to the console interface failed.
    #[error("console interface error")]
    InterfaceError,
}
