use std::collections::HashMap;

use crate::{BarEvent, BarId, BarMessage};

/// Thins out `advance` traffic per bar.
///
/// The first advance of a bar and every `stride`-th after it pass through. A
/// held-back value is released right before the bar's `setTotal` or `done`, so
/// the last progress the UI sees is always the real one.
#[derive(Debug, Clone)]
pub struct AdvanceThrottle {
    stride: u32,
    seen: HashMap<BarId, u32>,
    held: HashMap<BarId, u64>,
}

impl AdvanceThrottle {
    pub fn new(stride: u32) -> Self {
        Self {
            stride: stride.max(1),
            seen: HashMap::new(),
            held: HashMap::new(),
        }
    }

    /// Returns the messages to forward, in order.
    pub fn filter(&mut self, message: BarMessage) -> Vec<BarMessage> {
        let id = message.id;
        match message.event {
            BarEvent::Advance { progress } => {
                let seen = self.seen.entry(id).or_insert(0);
                let forward = *seen % self.stride == 0;
                *seen = seen.wrapping_add(1);
                if forward {
                    self.held.remove(&id);
                    vec![message]
                } else {
                    self.held.insert(id, progress);
                    Vec::new()
                }
            }
            BarEvent::SetTotal { .. } => self.release_then(id, message),
            BarEvent::Done => {
                self.seen.remove(&id);
                self.release_then(id, message)
            }
            BarEvent::Begin { .. } => vec![message],
        }
    }

    fn release_then(&mut self, id: BarId, message: BarMessage) -> Vec<BarMessage> {
        let mut out = Vec::with_capacity(2);
        if let Some(progress) = self.held.remove(&id) {
            out.push(BarMessage {
                id,
                event: BarEvent::Advance { progress },
            });
        }
        out.push(message);
        out
    }
}
