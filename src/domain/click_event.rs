//! Click event model for asynchronous click counting.

/// A successful resolution waiting to be counted.
///
/// Sent from the resolve path to the background worker so that the counter
/// update never delays the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub short_id: String,
}

impl ClickEvent {
    pub fn new(short_id: impl Into<String>) -> Self {
        Self {
            short_id: short_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_event_creation() {
        let event = ClickEvent::new("abc123");
        assert_eq!(event.short_id, "abc123");
        assert_eq!(event.clone(), event);
    }
}
