//! Lifecycle events for recommendation requests.
//!
//! An optional hook for callers that want to watch attempts as they happen
//! (debug prompt dumps, metrics, tests that count retries). The engine
//! works the same with or without a handler.

use std::sync::Arc;

/// Events emitted while a request runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A pipeline run is starting (1-indexed).
    AttemptStart { attempt: u32 },
    /// The prompt for this attempt has been rendered.
    PromptBuilt { attempt: u32, prompt: String },
    /// The model's reply was malformed; a retry may follow.
    AttemptFailed { attempt: u32, reason: String },
    /// A valid set was produced.
    Completed { attempts: u32 },
    /// The attempt budget ran out.
    Exhausted { attempts: u32 },
}

/// Handler for request lifecycle events.
///
/// # Example
///
/// ```
/// use booklog_recs::events::{Event, EventHandler};
///
/// struct PromptDump;
///
/// impl EventHandler for PromptDump {
///     fn on_event(&self, event: Event) {
///         if let Event::PromptBuilt { prompt, .. } = event {
///             println!("{}", prompt);
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: Event);
}

/// Emit an event if a handler is present. No-op otherwise.
pub(crate) fn emit(handler: &Option<Arc<dyn EventHandler>>, event: Event) {
    if let Some(ref h) = handler {
        h.on_event(event);
    }
}

/// An [`EventHandler`] backed by a closure.
pub struct FnEventHandler<F: Fn(Event) + Send + Sync>(pub F);

impl<F: Fn(Event) + Send + Sync> EventHandler for FnEventHandler<F> {
    fn on_event(&self, event: Event) {
        (self.0)(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_emit_without_handler_is_noop() {
        emit(&None, Event::AttemptStart { attempt: 1 });
    }

    #[test]
    fn test_fn_handler_receives_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler: Option<Arc<dyn EventHandler>> = Some(Arc::new(FnEventHandler(
            move |e: Event| sink.lock().unwrap().push(e),
        )));
        emit(&handler, Event::AttemptStart { attempt: 1 });
        emit(&handler, Event::Completed { attempts: 1 });
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Event::AttemptStart { attempt: 1 },
                Event::Completed { attempts: 1 }
            ]
        );
    }
}
