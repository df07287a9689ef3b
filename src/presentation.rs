//! Presentation
//!
//! Observers that turn capture transitions and relay results into
//! user-visible feedback. Nothing here affects session state.

use crate::capture::{CaptureEvent, CaptureObserver, CaptureState, ExplanationRequest};
use crate::error::RelayError;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Shown after a word has been captured
pub const CONTEXT_INSTRUCTION: &str =
    "Now select a larger text area that includes the highlighted text";

/// Logs every transition, the way the page script reported to the console
#[derive(Debug, Default)]
pub struct TracingPresenter;

impl CaptureObserver for TracingPresenter {
    fn on_event(&mut self, _state: CaptureState, event: &CaptureEvent) {
        match event {
            CaptureEvent::WordCaptured { capture, replaced } => {
                if let Some(old) = replaced {
                    info!("🔁 '{}' replaces '{}'", capture.text, old);
                }
                info!("🖍️ Highlighting '{}'", capture.text);
                info!("💡 {}", CONTEXT_INSTRUCTION);
            }
            CaptureEvent::ContextValidated { context, request } => {
                info!("Context text: {}", context.text);
                info!("Original word/phrase: {}", request.word());
            }
            CaptureEvent::Rejected(err) => warn!("Error: {}", err),
            CaptureEvent::Cancelled { word } => info!("Selection of '{}' dropped", word),
            CaptureEvent::Reset => {}
        }
    }
}

/// Collects events in memory; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<(CaptureState, CaptureEvent)>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything seen so far
    pub fn events(&self) -> Vec<(CaptureState, CaptureEvent)> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl CaptureObserver for RecordingObserver {
    fn on_event(&mut self, state: CaptureState, event: &CaptureEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push((state, event.clone())),
            Err(poisoned) => poisoned.into_inner().push((state, event.clone())),
        }
    }
}

/// Text of the result panel for one explanation
pub fn render_result(request: &ExplanationRequest, result: &Result<String, RelayError>) -> String {
    match result {
        Ok(text) if text.trim().is_empty() => {
            format!("{}\n  (the model returned no explanation)", request.word())
        }
        Ok(text) => format!("{}\n  {}", request.word(), text.trim()),
        Err(err) => format!("{}\n  Failed to get explanation: {}", request.word(), err),
    }
}
