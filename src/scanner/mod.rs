//! BLE advertisement sources.
//!
//! A backend observes advertisements and forwards them, undecoded, over a
//! channel. Nothing is filtered here: every advertisement that carries a local
//! name or manufacturer data is passed on and the decoder decides what it is.

#[cfg(feature = "bluer")]
pub mod bluer;

use crate::advertisement::Advertisement;
use thiserror::Error;
use tokio::sync::mpsc;

/// Error type for scanner operations.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Bluetooth/adapter related error
    #[error("Bluetooth error: {0}")]
    Bluetooth(String),
    /// Backend not available (not compiled in)
    #[error("Backend '{0}' not available (not compiled in)")]
    BackendNotAvailable(&'static str),
}

/// Channel buffer size for observed advertisements.
pub const ADVERTISEMENT_CHANNEL_BUFFER_SIZE: usize = 100;

/// Start observing advertisements on the default adapter.
///
/// The returned receiver yields one [`Advertisement`] per observed broadcast
/// until the backend stops. Repeated broadcasts are not deduplicated.
pub async fn start_scan() -> Result<mpsc::Receiver<Advertisement>, ScanError> {
    #[cfg(feature = "bluer")]
    return bluer::start_scan().await;
    #[cfg(not(feature = "bluer"))]
    return Err(ScanError::BackendNotAvailable("bluer"));
}
