//! `MatchInvoker` — drives a [`Matches`](crate::engine::Matches) run into an
//! observer.
//!
//! The observer decides when to stop: returning [`Flow::Stop`] from any
//! callback drops the iterator, so no further template is evaluated.
//! [`MatchOutcome`] is the stock observer the host bridge uses.

use serde::Serialize;

use crate::engine::{EngineState, MatchError, MatchEvent, MatchRequest, TokenStream};
use crate::Template;

/// Whether a match run continues after a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    Continue,
    Stop,
}

/// Receives the events of one match run.
pub trait MatchObserver {
    /// Called once, before any match, with the selected operation's tokens.
    fn on_tokens(&mut self, _tokens: &TokenStream) -> Flow {
        Flow::Continue
    }

    /// Called for each matching template, in template order.
    fn on_match(&mut self, template: &Template) -> Flow;

    /// Called at most once, when the run ends with an error.
    fn on_error(&mut self, error: &MatchError);
}

/// Accumulated result of a match run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    /// Matched template ids, in arrival order.
    pub matched: Vec<String>,
    /// Terminal error message, if the run failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MatchObserver for MatchOutcome {
    fn on_match(&mut self, template: &Template) -> Flow {
        self.matched.push(template.id().to_string());
        Flow::Continue
    }

    fn on_error(&mut self, error: &MatchError) {
        self.error = Some(error.to_string());
    }
}

/// Deliver `events` to `observer` until they run out, the observer stops, or
/// an error arrives. An error is always the last event delivered.
pub fn feed<'s, O: MatchObserver + ?Sized>(
    events: impl IntoIterator<Item = Result<MatchEvent<'s>, MatchError>>,
    observer: &mut O,
) {
    for event in events {
        let flow = match event {
            Ok(MatchEvent::Tokens(tokens)) => observer.on_tokens(&tokens),
            Ok(MatchEvent::Matched(template)) => observer.on_match(template),
            Err(error) => {
                observer.on_error(&error);
                Flow::Stop
            }
        };
        if flow == Flow::Stop {
            break;
        }
    }
}

/// Runs match requests against an [`EngineState`].
#[derive(Debug, Clone, Copy)]
pub struct MatchInvoker<'e> {
    state: &'e EngineState,
}

impl<'e> MatchInvoker<'e> {
    #[must_use]
    pub fn new(state: &'e EngineState) -> Self {
        Self { state }
    }

    /// Drive `request` into `observer`.
    ///
    /// Returns `false` without calling the observer when no service is
    /// active.
    pub fn run<O: MatchObserver + ?Sized>(&self, request: MatchRequest<'_>, observer: &mut O) -> bool {
        let Some(service) = self.state.service() else {
            tracing::debug!("match requested before init, ignoring");
            return false;
        };

        feed(service.matches(request), observer);
        true
    }

    /// Run `request` and collect a [`MatchOutcome`].
    ///
    /// Returns `None` when no service is active.
    #[must_use]
    pub fn collect(&self, request: MatchRequest<'_>) -> Option<MatchOutcome> {
        let mut outcome = MatchOutcome::default();
        self.run(request, &mut outcome).then_some(outcome)
    }
}
