//! Per-frame input batches.

use crate::event::{HandleStatus, InputEvent};

/// Events collected during one host frame, offered to handlers in order.
#[derive(Debug, Clone, Default)]
pub struct InputBatch {
    events: Vec<InputEvent>,
}

impl InputBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Offers every event to `handler`, dropping the consumed ones.
    pub fn dispatch<H>(&mut self, mut handler: H)
    where
        H: FnMut(&InputEvent) -> HandleStatus,
    {
        self.events.retain(|event| {
            let status = handler(event);
            !status.is_consumed()
        });
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl FromIterator<InputEvent> for InputBatch {
    fn from_iter<I: IntoIterator<Item = InputEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl Extend<InputEvent> for InputBatch {
    fn extend<I: IntoIterator<Item = InputEvent>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_drops_consumed() {
        let mut batch: InputBatch = [
            InputEvent::key_pressed("Escape"),
            InputEvent::key_pressed("KeyW"),
        ]
        .into_iter()
        .collect();

        batch.dispatch(|event| {
            HandleStatus::from_consumed(event == &InputEvent::key_pressed("Escape"))
        });

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.iter().next(), Some(&InputEvent::key_pressed("KeyW")));
    }
}
