//! Selection Capture
//!
//! Two-step capture of a word and the passage that contains it.
//! A session moves `Idle -> WordCaptured -> ContextValidated -> Idle`; the
//! completed pair becomes an [`ExplanationRequest`] for the relay.

use crate::error::CaptureError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A word must be longer than this many characters
const MIN_WORD_CHARS: usize = 3;

/// Bounding box of a selection in page coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingRect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub width: f64,
    pub height: f64,
}

/// Where a selection was taken from. Opaque to the state machine, kept for
/// the presentation layer (highlighting, popup placement).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub start_offset: Option<usize>,
    pub end_offset: Option<usize>,
    pub rect: Option<BoundingRect>,
}

/// The pending word
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionCapture {
    pub text: String,
    pub anchor: Anchor,
    pub captured_at: DateTime<Utc>,
}

/// A validated context passage
#[derive(Debug, Clone, PartialEq)]
pub struct ContextCapture {
    pub text: String,
}

/// A completed (word, context) pair, ready to be relayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationRequest {
    word: String,
    context: String,
}

impl ExplanationRequest {
    pub fn new(word: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            context: context.into(),
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn context(&self) -> &str {
        &self.context
    }
}

/// State of a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Nothing pending
    Idle,
    /// A word is waiting for its context
    WordCaptured,
    /// Context accepted; only seen by observers during completion
    ContextValidated,
}

/// State transitions reported to observers
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    WordCaptured {
        capture: SelectionCapture,
        replaced: Option<String>,
    },
    ContextValidated {
        context: ContextCapture,
        request: ExplanationRequest,
    },
    Rejected(CaptureError),
    Cancelled {
        word: String,
    },
    Reset,
}

/// Receives capture transitions (highlighting, instructions, logging)
pub trait CaptureObserver: Send {
    fn on_event(&mut self, state: CaptureState, event: &CaptureEvent);
}

/// One capture session. Holds at most one pending word.
pub struct CaptureSession {
    pending: Option<SelectionCapture>,
    state: CaptureState,
    observers: Vec<Box<dyn CaptureObserver>>,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("pending", &self.pending)
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            pending: None,
            state: CaptureState::Idle,
            observers: Vec::new(),
        }
    }

    /// Register a presentation observer
    pub fn subscribe(&mut self, observer: Box<dyn CaptureObserver>) {
        self.observers.push(observer);
    }

    /// Get current state
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// The word waiting for its context, if any
    pub fn pending(&self) -> Option<&SelectionCapture> {
        self.pending.as_ref()
    }

    /// Capture the word. Replaces any pending word without complaint.
    pub fn capture_word(
        &mut self,
        raw: &str,
        anchor: Anchor,
    ) -> Result<&SelectionCapture, CaptureError> {
        let text = raw.trim();
        let len = text.chars().count();
        if len <= MIN_WORD_CHARS {
            return Err(self.reject(CaptureError::TooShort { len }));
        }

        let capture = SelectionCapture {
            text: text.to_string(),
            anchor,
            captured_at: Utc::now(),
        };
        let replaced = self.pending.take().map(|old| old.text);
        if let Some(old) = &replaced {
            debug!("Replacing pending word '{}'", old);
        }
        info!("📌 Initial selection: {}", capture.text);

        self.state = CaptureState::WordCaptured;
        self.emit(CaptureEvent::WordCaptured {
            capture: capture.clone(),
            replaced,
        });

        Ok(&*self.pending.insert(capture))
    }

    /// Capture the context and complete the session
    pub fn capture_context(&mut self, raw: &str) -> Result<ExplanationRequest, CaptureError> {
        let pending_word = self
            .pending
            .as_ref()
            .filter(|_| self.state == CaptureState::WordCaptured)
            .map(|pending| pending.text.clone());
        let Some(word) = pending_word else {
            return Err(self.reject(CaptureError::NoPendingWord));
        };

        let text = raw.trim();
        if text.is_empty() {
            return Err(self.reject(CaptureError::EmptySelection));
        }
        if !text.contains(word.as_str()) {
            return Err(self.reject(CaptureError::ContextDoesNotContainWord));
        }

        let context = ContextCapture {
            text: text.to_string(),
        };
        let request = ExplanationRequest::new(word, context.text.clone());
        info!(
            "📝 Context accepted for '{}' ({} chars)",
            request.word(),
            context.text.chars().count()
        );

        self.state = CaptureState::ContextValidated;
        self.emit(CaptureEvent::ContextValidated {
            context,
            request: request.clone(),
        });
        self.reset();

        Ok(request)
    }

    /// Drop the pending word, if any
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!("Capture cancelled for '{}'", pending.text);
            self.state = CaptureState::Idle;
            self.emit(CaptureEvent::Cancelled { word: pending.text });
        }
    }

    fn reset(&mut self) {
        self.pending = None;
        self.state = CaptureState::Idle;
        self.emit(CaptureEvent::Reset);
    }

    fn reject(&mut self, err: CaptureError) -> CaptureError {
        debug!("Capture rejected: {}", err);
        self.emit(CaptureEvent::Rejected(err.clone()));
        err
    }

    fn emit(&mut self, event: CaptureEvent) {
        let state = self.state;
        for observer in &mut self.observers {
            observer.on_event(state, &event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::RecordingObserver;

    #[test]
    fn test_capture_flow() {
        let mut session = CaptureSession::new();
        assert_eq!(session.state(), CaptureState::Idle);

        session
            .capture_word("Example", Anchor::default())
            .expect("word should be accepted");
        assert_eq!(session.state(), CaptureState::WordCaptured);

        let request = session
            .capture_context("An Example sentence.")
            .expect("context should be accepted");
        assert_eq!(request, ExplanationRequest::new("Example", "An Example sentence."));
        assert_eq!(session.state(), CaptureState::Idle);
        assert!(session.pending().is_none());
    }

    #[test]
    fn test_short_words_rejected() {
        let mut session = CaptureSession::new();
        for raw in ["", "   ", "a", "abc", "  abc  ", "\tab\n", "é€ß"] {
            let err = session.capture_word(raw, Anchor::default()).unwrap_err();
            assert!(matches!(err, CaptureError::TooShort { .. }), "{raw:?}");
            assert_eq!(session.state(), CaptureState::Idle);
        }

        // A rejected word does not disturb a pending one
        session.capture_word("pending", Anchor::default()).unwrap();
        assert!(session.capture_word("ab", Anchor::default()).is_err());
        assert_eq!(session.state(), CaptureState::WordCaptured);
        assert_eq!(session.pending().unwrap().text, "pending");
    }

    #[test]
    fn test_word_is_trimmed() {
        let mut session = CaptureSession::new();
        let capture = session.capture_word("  word \n", Anchor::default()).unwrap();
        assert_eq!(capture.text, "word");
    }

    #[test]
    fn test_context_without_word() {
        let mut session = CaptureSession::new();
        for raw in ["", "Example sentence", "anything at all"] {
            assert_eq!(
                session.capture_context(raw).unwrap_err(),
                CaptureError::NoPendingWord
            );
            assert_eq!(session.state(), CaptureState::Idle);
        }
    }

    #[test]
    fn test_context_must_contain_word() {
        let mut session = CaptureSession::new();
        session.capture_word("Example", Anchor::default()).unwrap();

        // Containment is case-sensitive
        let err = session.capture_context("an example sentence").unwrap_err();
        assert_eq!(err, CaptureError::ContextDoesNotContainWord);
        assert_eq!(session.state(), CaptureState::WordCaptured);

        let err = session.capture_context("   ").unwrap_err();
        assert_eq!(err, CaptureError::EmptySelection);
        assert_eq!(session.state(), CaptureState::WordCaptured);

        // Still usable after rejections
        assert!(session.capture_context("An Example.").is_ok());
    }

    #[test]
    fn test_recapture_overwrites() {
        let mut session = CaptureSession::new();
        session.capture_word("first", Anchor::default()).unwrap();
        session.capture_word("second", Anchor::default()).unwrap();
        session.capture_word("third", Anchor::default()).unwrap();

        let err = session.capture_context("first and second").unwrap_err();
        assert_eq!(err, CaptureError::ContextDoesNotContainWord);

        let request = session.capture_context("first, second, third").unwrap();
        assert_eq!(request.word(), "third");
    }

    #[test]
    fn test_single_request_per_session() {
        let mut session = CaptureSession::new();
        session.capture_word("Example", Anchor::default()).unwrap();
        session.capture_context("An Example sentence.").unwrap();

        assert_eq!(
            session.capture_context("An Example sentence.").unwrap_err(),
            CaptureError::NoPendingWord
        );
    }

    #[test]
    fn test_cancel() {
        let mut session = CaptureSession::new();
        session.capture_word("Example", Anchor::default()).unwrap();
        session.cancel();
        assert_eq!(session.state(), CaptureState::Idle);
        assert!(session.pending().is_none());
        assert_eq!(
            session.capture_context("An Example").unwrap_err(),
            CaptureError::NoPendingWord
        );
    }

    #[test]
    fn test_anchor_is_kept() {
        let mut session = CaptureSession::new();
        let anchor = Anchor {
            start_offset: Some(4),
            end_offset: Some(11),
            rect: Some(BoundingRect {
                top: 10.0,
                left: 20.0,
                bottom: 30.0,
                right: 80.0,
                width: 60.0,
                height: 20.0,
            }),
        };
        let capture = session.capture_word("Example", anchor.clone()).unwrap();
        assert_eq!(capture.anchor, anchor);
    }

    #[test]
    fn test_observer_sees_transitions() {
        let recorder = RecordingObserver::new();
        let mut session = CaptureSession::new();
        session.subscribe(Box::new(recorder.clone()));

        session.capture_word("abc", Anchor::default()).unwrap_err();
        session.capture_word("Example", Anchor::default()).unwrap();
        session.capture_word("Sample", Anchor::default()).unwrap();
        session.capture_context("A Sample text").unwrap();

        let events = recorder.events();
        assert_eq!(events.len(), 5);
        assert!(matches!(
            events[0],
            (CaptureState::Idle, CaptureEvent::Rejected(CaptureError::TooShort { len: 3 }))
        ));
        match &events[2] {
            (CaptureState::WordCaptured, CaptureEvent::WordCaptured { capture, replaced }) => {
                assert_eq!(capture.text, "Sample");
                assert_eq!(replaced.as_deref(), Some("Example"));
            }
            other => panic!("Expected WordCaptured, got {:?}", other),
        }
        assert!(matches!(
            events[3],
            (CaptureState::ContextValidated, CaptureEvent::ContextValidated { .. })
        ));
        assert_eq!(events[4], (CaptureState::Idle, CaptureEvent::Reset));
    }
}
