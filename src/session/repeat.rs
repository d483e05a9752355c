//! Repeated step/next that realigns with the engine between repetitions.

use std::io::Write;
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;

use super::SessionResult;
use crate::engine::{DebugEngine, EngineResult, ProtocolEvent};
use crate::{log_debug, log_debug_content};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Step into functions.
    Step,
    /// Step over calls in the same context.
    Next,
}

impl StepKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Step => "step",
            Self::Next => "next",
        }
    }

    fn issue<E: DebugEngine>(self, engine: &mut E) -> EngineResult<()> {
        match self {
            Self::Step => engine.step(),
            Self::Next => engine.next(),
        }
    }
}

/// What stopped a drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    Prompt,
    End,
}

/// Poll events, printing text, until the engine suspends or the session ends.
///
/// # Errors
///
/// Fails on a transport error while polling or when `out` cannot be written.
pub fn drain_to_prompt<E, W>(engine: &mut E, out: &mut W) -> SessionResult<DrainOutcome>
where
    E: DebugEngine,
    W: Write,
{
    loop {
        match engine.poll_event()? {
            ProtocolEvent::End => return Ok(DrainOutcome::End),
            ProtocolEvent::Text(text) => {
                log_debug_content(&format!("engine text: {text:?}"));
                out.write_all(text.as_bytes())?;
                out.flush()?;
            }
            ProtocolEvent::Prompt => return Ok(DrainOutcome::Prompt),
        }
    }
}

/// Issue `count` step requests, draining to a prompt after each one.
///
/// Stops early, without issuing further requests, if the engine ends the
/// session. `pacing` is slept between each request and its first poll.
///
/// # Errors
///
/// Fails on transport errors or when `out` cannot be written.
pub fn repeat_step<E, W>(
    engine: &mut E,
    out: &mut W,
    kind: StepKind,
    count: NonZeroU32,
    pacing: Duration,
) -> SessionResult<DrainOutcome>
where
    E: DebugEngine,
    W: Write,
{
    for round in 1..=count.get() {
        kind.issue(engine)?;
        if !pacing.is_zero() {
            thread::sleep(pacing);
        }
        if drain_to_prompt(engine, out)? == DrainOutcome::End {
            log_debug(&format!(
                "engine ended session during {} {round}/{count}",
                kind.name()
            ));
            return Ok(DrainOutcome::End);
        }
    }
    Ok(DrainOutcome::Prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TransportError;
    use crate::session::test_support::{output_text, EngineCall, FakeEngine};
    use crate::session::SessionError;
    use rstest::rstest;

    fn count(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).expect("non-zero count")
    }

    fn scripted_rounds(rounds: usize, texts_per_round: usize) -> FakeEngine {
        let mut engine = FakeEngine::default();
        for round in 0..rounds {
            for idx in 0..texts_per_round {
                engine.push_event(ProtocolEvent::Text(format!("r{round}t{idx};")));
            }
            engine.push_event(ProtocolEvent::Prompt);
        }
        engine
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(5)]
    fn three_rounds_issue_three_requests_with_one_drain_each(#[case] texts: usize) {
        let mut engine = scripted_rounds(3, texts);
        let mut out = Vec::new();

        let outcome = repeat_step(&mut engine, &mut out, StepKind::Step, count(3), Duration::ZERO)
            .expect("repeat");

        assert_eq!(outcome, DrainOutcome::Prompt);
        assert_eq!(engine.count(&EngineCall::Step), 3);
        let mut expected = Vec::new();
        for _ in 0..3 {
            expected.push(EngineCall::Step);
            expected.extend(std::iter::repeat_n(EngineCall::Poll, texts + 1));
        }
        assert_eq!(engine.calls, expected);
        assert_eq!(output_text(&out).matches(';').count(), 3 * texts);
    }

    #[test]
    fn end_in_second_round_stops_further_requests() {
        let mut engine = FakeEngine::with_events([
            ProtocolEvent::Text("a".to_string()),
            ProtocolEvent::Prompt,
            ProtocolEvent::Text("b".to_string()),
            ProtocolEvent::End,
            ProtocolEvent::Prompt,
        ]);
        let mut out = Vec::new();

        let outcome = repeat_step(&mut engine, &mut out, StepKind::Next, count(3), Duration::ZERO)
            .expect("repeat");

        assert_eq!(outcome, DrainOutcome::End);
        assert_eq!(engine.count(&EngineCall::Next), 2);
        assert_eq!(engine.calls.last(), Some(&EngineCall::Poll));
        assert_eq!(output_text(&out), "ab");
    }

    #[test]
    fn drain_prints_text_verbatim_without_extra_newlines() {
        let mut engine = FakeEngine::with_events([
            ProtocolEvent::Text("line one\n".to_string()),
            ProtocolEvent::Text("partial".to_string()),
            ProtocolEvent::Prompt,
        ]);
        let mut out = Vec::new();
        let outcome = drain_to_prompt(&mut engine, &mut out).expect("drain");
        assert_eq!(outcome, DrainOutcome::Prompt);
        assert_eq!(output_text(&out), "line one\npartial");
    }

    #[test]
    fn transport_error_during_drain_is_fatal() {
        let mut engine = FakeEngine::default();
        engine.push_event(ProtocolEvent::Text("x".to_string()));
        engine.push_transport_error(TransportError::Closed);
        let mut out = Vec::new();

        let err = repeat_step(&mut engine, &mut out, StepKind::Next, count(2), Duration::ZERO)
            .expect_err("transport failure");
        assert!(matches!(err, SessionError::Transport(TransportError::Closed)));
        assert_eq!(engine.count(&EngineCall::Next), 1);
    }
}
