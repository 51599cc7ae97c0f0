// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Deduplicating registry of position subscriptions.
//!
//! One [`SubscriptionEntry`] exists per distinct `(type, period)` pair. All
//! callers subscribing with the same parameters share its notification
//! channel. Entries are reference counted and removed when the last
//! subscriber releases them.

use crate::error::RegistryError;
use common::position::GnssPosition;
use common::position_type::PositionType;
use common::report::PositionReport;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, trace};

pub type SubscriptionId = u32;

/// Period used when a subscription doesn't specify one.
pub const DEFAULT_PERIOD_MS: u64 = 2000;
/// Maximum number of distinct entries alive at the same time.
pub const DEFAULT_CAPACITY: usize = 256;
/// Notifications buffered per entry for slow receivers.
pub const CHANNEL_CAPACITY: usize = 16;

/// Payload delivered to the subscribers of an entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionNotification {
    pub id: SubscriptionId,
    pub name: &'static str,
    pub report: PositionReport,
}

pub type NotificationPtr = Arc<PositionNotification>;

#[derive(Debug)]
pub struct SubscriptionEntry {
    id: SubscriptionId,
    position_type: PositionType,
    period: Duration,
    sender: broadcast::Sender<NotificationPtr>,
    subscribers: usize,
    last_fired: Option<Duration>,
}

impl SubscriptionEntry {
    fn new(id: SubscriptionId, position_type: PositionType, period: Duration) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        SubscriptionEntry {
            id,
            position_type,
            period,
            sender,
            subscribers: 0,
            last_fired: None,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn position_type(&self) -> PositionType {
        self.position_type
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Name callers use to build the full event name: the type name.
    pub fn name(&self) -> &'static str {
        self.position_type.name()
    }

    /// Number of subscribe calls not yet matched by a release.
    pub fn subscribers(&self) -> usize {
        self.subscribers
    }

    /// Creates a receiver for the notifications of this entry.
    pub fn receiver(&self) -> broadcast::Receiver<NotificationPtr> {
        self.sender.subscribe()
    }

    fn is_due(&self, now: Duration) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.period,
        }
    }
}

/// Result of releasing one reference to an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    /// The entry is still referenced by the given number of subscribers.
    Remaining(usize),
    /// The last reference was released and the entry is gone.
    Removed,
}

#[derive(Debug)]
pub struct SubscriptionRegistry {
    entries: Vec<SubscriptionEntry>,
    next_id: Option<SubscriptionId>,
    capacity: usize,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        SubscriptionRegistry {
            entries: Vec::new(),
            next_id: Some(1),
            capacity,
        }
    }

    /// Starts the id sequence at `next_id` instead of 1.
    pub fn with_next_id(mut self, next_id: SubscriptionId) -> Self {
        self.next_id = Some(next_id);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry for `(position_type, period)` and takes a reference on it.
    ///
    /// The entry is created with the next id when no entry for the pair
    /// exists. Ids are handed out in increasing order and never reused, even
    /// after the entry they were issued for is gone.
    pub fn get_or_create(
        &mut self,
        position_type: PositionType,
        period: Duration,
    ) -> Result<&SubscriptionEntry, RegistryError> {
        let index = match self
            .entries
            .iter()
            .position(|e| e.position_type == position_type && e.period == period)
        {
            Some(index) => index,
            None => {
                if self.entries.len() >= self.capacity {
                    return Err(RegistryError::Exhausted(self.capacity));
                }
                let id = self.next_id.ok_or(RegistryError::IdsExhausted)?;
                self.next_id = id.checked_add(1);
                debug!("Created subscription {id} for {position_type} every {period:?}");
                self.entries
                    .push(SubscriptionEntry::new(id, position_type, period));
                self.entries.len() - 1
            }
        };
        self.entries[index].subscribers += 1;
        Ok(&self.entries[index])
    }

    pub fn lookup_by_id(&self, id: SubscriptionId) -> Result<&SubscriptionEntry, RegistryError> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or(RegistryError::NotFound(id))
    }

    /// Drops one reference to the entry with `id`.
    ///
    /// Releasing an id that is unknown or already gone reports
    /// [`RegistryError::NotFound`] and leaves the registry untouched.
    /// Receivers of a removed entry observe a closed channel.
    pub fn release(&mut self, id: SubscriptionId) -> Result<Release, RegistryError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(RegistryError::NotFound(id))?;
        let entry = &mut self.entries[index];
        entry.subscribers = entry.subscribers.saturating_sub(1);
        if entry.subscribers > 0 {
            return Ok(Release::Remaining(entry.subscribers));
        }
        self.entries.remove(index);
        debug!("Removed subscription {id}");
        Ok(Release::Removed)
    }

    /// Notifies every entry whose period has elapsed at `now`.
    ///
    /// Returns the number of entries that fired.
    pub fn dispatch(&mut self, position: &GnssPosition, now: Duration) -> usize {
        let mut fired = 0;
        for entry in self.entries.iter_mut().filter(|e| e.is_due(now)) {
            entry.last_fired = Some(now);
            fired += 1;
            let notification = Arc::new(PositionNotification {
                id: entry.id,
                name: entry.name(),
                report: PositionReport::render(position, entry.position_type),
            });
            match entry.sender.send(notification) {
                Ok(receivers) => trace!("Subscription {} notified {receivers} receivers", entry.id),
                Err(_) => trace!("Subscription {} has no receivers", entry.id),
            }
        }
        fired
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
