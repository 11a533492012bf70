//! BlueZ D-Bus backend.
//!
//! Runs LE discovery with duplicate reporting enabled so every new
//! advertisement from a sensor surfaces as a property change, then reads the
//! device's name and manufacturer data from BlueZ. It requires the
//! `bluetoothd` daemon to be running.

use super::{ADVERTISEMENT_CHANNEL_BUFFER_SIZE, ScanError};
use crate::advertisement::Advertisement;
use crate::mac_address::MacAddress;
use bluer::{Adapter, AdapterEvent, Address, DiscoveryFilter, DiscoveryTransport, Session};
use futures::StreamExt;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

impl From<bluer::Error> for ScanError {
    fn from(err: bluer::Error) -> Self {
        ScanError::Bluetooth(err.to_string())
    }
}

/// Start observing advertisements through BlueZ.
///
/// Powers on the default adapter, configures an LE discovery filter and spawns
/// a task that forwards advertisements until the receiver is dropped.
pub async fn start_scan() -> Result<mpsc::Receiver<Advertisement>, ScanError> {
    let session = Session::new().await?;
    let adapter = session.default_adapter().await?;
    adapter.set_powered(true).await?;
    adapter
        .set_discovery_filter(DiscoveryFilter {
            transport: DiscoveryTransport::Le,
            duplicate_data: true,
            ..Default::default()
        })
        .await?;
    info!(adapter = adapter.name(), "scanning with BlueZ");

    let (tx, rx) = mpsc::channel(ADVERTISEMENT_CHANNEL_BUFFER_SIZE);

    // The task owns the session and adapter so discovery stays active.
    tokio::spawn(async move {
        let _session = session;

        let events = match adapter.discover_devices_with_changes().await {
            Ok(events) => events,
            Err(err) => {
                error!(error = %err, "failed to start BLE discovery");
                return;
            }
        };
        futures::pin_mut!(events);

        while let Some(event) = events.next().await {
            let AdapterEvent::DeviceAdded(address) = event else {
                continue;
            };
            match read_advertisement(&adapter, address).await {
                Ok(Some(advertisement)) => {
                    if tx.send(advertisement).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => debug!(%address, error = %err, "failed to read device properties"),
            }
        }
    });

    Ok(rx)
}

/// Read the current advertisement data BlueZ holds for `address`.
async fn read_advertisement(
    adapter: &Adapter,
    address: Address,
) -> Result<Option<Advertisement>, ScanError> {
    let device = adapter.device(address)?;
    let name = device.name().await?;
    let manufacturer_data = device.manufacturer_data().await?;

    Ok(to_advertisement(address.into(), name, manufacturer_data))
}

/// Combine BlueZ device properties into an [`Advertisement`].
///
/// BlueZ strips the company identifier from manufacturer data; it is put back
/// in front so layouts index the same bytes as on air. With several company
/// IDs, the lowest one is used.
fn to_advertisement(
    address: MacAddress,
    name: Option<String>,
    manufacturer_data: Option<HashMap<u16, Vec<u8>>>,
) -> Option<Advertisement> {
    let data = manufacturer_data.and_then(|entries| {
        entries
            .iter()
            .min_by_key(|(id, _)| **id)
            .map(|(id, data)| Advertisement::frame_manufacturer_data(*id, data))
    });

    if name.is_none() && data.is_none() {
        return None;
    }

    Some(Advertisement {
        address,
        local_name: name,
        manufacturer_data: data,
    })
}
