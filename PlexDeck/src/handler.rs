//! Stream Deck lifecycle handler

use crate::registry::SurfaceRegistry;
use decksdk::{EventHandler, EventKind, ReceivedEvent};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Keeps the [`SurfaceRegistry`] in sync with the keys shown by the application
pub struct LifecycleHandler {
    registry: Arc<SurfaceRegistry>,
}

impl LifecycleHandler {
    pub fn new(registry: Arc<SurfaceRegistry>) -> Self {
        Self { registry }
    }
}

impl EventHandler for LifecycleHandler {
    fn handle_event(&self, event: &ReceivedEvent) {
        match event.event {
            EventKind::WillAppear => match event.surface() {
                Some(surface) => {
                    if self.registry.add(surface) {
                        info!(surface, surfaces = self.registry.len(), "Surface appeared");
                    }
                }
                None => warn!("willAppear without context"),
            },
            EventKind::WillDisappear => {
                if let Some(surface) = event.surface() {
                    if self.registry.remove(surface) {
                        info!(surface, surfaces = self.registry.len(), "Surface disappeared");
                    }
                }
            }
            EventKind::DeviceDidConnect
            | EventKind::DeviceDidDisconnect
            | EventKind::TitleParametersDidChange
            | EventKind::KeyDown
            | EventKind::KeyUp => {
                debug!(event = ?event.event, context = ?event.context, device = ?event.device, "Stream Deck event");
            }
            _ => {
                info!(
                    event = ?event.event,
                    context = ?event.context,
                    payload = ?event.payload,
                    "Unhandled Stream Deck event"
                );
            }
        }
    }
}
