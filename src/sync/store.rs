/// Latest device snapshot and status transition detection
use log::info;
use std::collections::HashMap;

use crate::models::{Device, DeviceStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionEvent {
    DeviceCameOnline(Device),
}

#[derive(Debug, Clone, Default)]
pub struct DeviceStateStore {
    snapshot: Vec<Device>,
}

impl DeviceStateStore {
    /// Diff `new_snapshot` against the held one, then replace it wholesale
    ///
    /// Only an `offline -> online` change of a device present in both
    /// snapshots produces an event. Devices missing from the new snapshot
    /// are dropped.
    pub fn reconcile(&mut self, new_snapshot: Vec<Device>) -> Vec<TransitionEvent> {
        let previous: HashMap<i64, DeviceStatus> = self
            .snapshot
            .iter()
            .map(|d| (d.device_id, d.status))
            .collect();

        let events: Vec<TransitionEvent> = new_snapshot
            .iter()
            .filter(|d| {
                d.status == DeviceStatus::Online
                    && previous.get(&d.device_id) == Some(&DeviceStatus::Offline)
            })
            .map(|d| {
                info!("{} (#{}) is now online", d.device_name, d.device_id);
                TransitionEvent::DeviceCameOnline(d.clone())
            })
            .collect();

        self.snapshot = new_snapshot;
        events
    }

    /// Devices of the last snapshot, in server order
    pub fn latest(&self) -> &[Device] {
        &self.snapshot
    }

    pub fn online_count(&self) -> usize {
        self.snapshot
            .iter()
            .filter(|d| d.status == DeviceStatus::Online)
            .count()
    }

    /// Forget the snapshot, e.g. when another company is selected
    pub fn clear(&mut self) {
        self.snapshot.clear();
    }
}
