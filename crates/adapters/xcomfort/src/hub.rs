//! Hub: owns the bridge and the device/room inventory it reported.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::bridge::Bridge;
use crate::devices::XComfortDevice;
use crate::error::XComfortError;
use crate::room::Room;

/// Wrapper around one xComfort bridge.
pub struct XComfortHub<B> {
    bridge: Arc<B>,
    ip: String,
    identifier: String,
    devices: Vec<XComfortDevice>,
    rooms: Vec<Arc<Room>>,
    run_task: Option<JoinHandle<()>>,
}

impl<B: Bridge> XComfortHub<B> {
    /// `identifier` defaults to `ip`.
    pub fn new(bridge: Arc<B>, ip: impl Into<String>, identifier: Option<String>) -> Self {
        let ip = ip.into();
        let identifier = identifier.unwrap_or_else(|| ip.clone());
        Self {
            bridge,
            ip,
            identifier,
            devices: Vec::new(),
            rooms: Vec::new(),
            run_task: None,
        }
    }

    /// The bridge IP, which identifies the hub device.
    #[must_use]
    pub fn hub_id(&self) -> &str {
        &self.ip
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn devices(&self) -> &[XComfortDevice] {
        &self.devices
    }

    #[must_use]
    pub fn rooms(&self) -> &[Arc<Room>] {
        &self.rooms
    }

    #[must_use]
    pub fn get_component_name(&self, comp_id: u32) -> Option<String> {
        self.bridge.get_component_name(comp_id)
    }

    /// Start processing bridge traffic in the background.
    pub fn start(&mut self) {
        if self.run_task.is_some() {
            return;
        }
        let bridge = Arc::clone(&self.bridge);
        let ip = self.ip.clone();
        self.run_task = Some(tokio::spawn(async move {
            if let Err(err) = bridge.run().await {
                tracing::warn!(ip = %ip, error = %err, "xComfort bridge stopped with error");
            }
        }));
    }

    /// Close the bridge and wait for its run task to finish.
    ///
    /// # Errors
    ///
    /// Returns the bridge's error when closing fails.
    pub async fn stop(&mut self) -> Result<(), XComfortError> {
        self.bridge.close().await?;
        let Some(task) = self.run_task.take() else {
            return Ok(());
        };
        if let Err(err) = task.await {
            tracing::warn!(error = %err, "xComfort bridge task failed");
        }
        Ok(())
    }

    /// Fetch devices, then rooms, waiting at most `timeout` for each.
    ///
    /// # Errors
    ///
    /// Returns [`XComfortError::DiscoveryTimeout`] when the bridge does not
    /// report in time, or the bridge's own error.
    pub async fn load_devices(&mut self, timeout: Duration) -> Result<(), XComfortError> {
        self.devices = tokio::time::timeout(timeout, self.bridge.get_devices())
            .await
            .map_err(|_| XComfortError::DiscoveryTimeout)??;
        self.rooms = tokio::time::timeout(timeout, self.bridge.get_rooms())
            .await
            .map_err(|_| XComfortError::DiscoveryTimeout)??;
        tracing::debug!(
            devices = self.devices.len(),
            rooms = self.rooms.len(),
            "loaded xComfort inventory"
        );
        Ok(())
    }

    /// Connectivity check. Always succeeds after a short delay.
    pub async fn test_connection(&self) -> bool {
        tokio::time::sleep(Duration::from_secs(1)).await;
        true
    }
}
