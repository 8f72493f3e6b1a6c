use crate::clock::{Clock, MonotonicClock};
use crate::keymap::{map_key, Action};
use crate::runtime::{EventSource, Runner, SessionEvent, Ticker};
use crate::session::TypingSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Composition root: owns the session and routes front-end events into it
#[derive(Debug)]
pub struct App<C: Clock = MonotonicClock> {
    pub session: TypingSession<C>,
    /// last failure to start, shown until the next successful start or reset
    pub last_error: Option<String>,
}

impl<C: Clock> App<C> {
    pub fn new(session: TypingSession<C>) -> Self {
        Self {
            session,
            last_error: None,
        }
    }

    pub fn apply(&mut self, action: Action) -> Flow {
        match action {
            Action::Type(c) => self.session.submit_char(c),
            Action::Backspace => self.session.submit_backspace(),
            Action::Start => {
                if !self.session.is_running() {
                    self.start();
                }
            }
            Action::Restart => self.start(),
            Action::Reset => {
                self.session.reset();
                self.last_error = None;
            }
            Action::Quit => return Flow::Quit,
            Action::Ignore => {}
        }
        Flow::Continue
    }

    pub fn handle(&mut self, event: SessionEvent) -> Flow {
        match event {
            SessionEvent::Key(key) => self.apply(map_key(&key)),
            SessionEvent::Tick => {
                self.session.tick();
                Flow::Continue
            }
            SessionEvent::Resize => Flow::Continue,
        }
    }

    /// Handle one event from the runner, then re-sync its tick schedule so
    /// ticks only flow while the session is running.
    pub fn pump<E: EventSource, T: Ticker>(&mut self, runner: &mut Runner<E, T>) -> Flow {
        let Some(event) = runner.step() else {
            return Flow::Quit;
        };
        let flow = self.handle(event);
        self.sync_ticks(runner);
        flow
    }

    pub fn sync_ticks<E: EventSource, T: Ticker>(&self, runner: &mut Runner<E, T>) {
        if self.session.is_running() {
            runner.arm_ticks();
        } else {
            runner.cancel_ticks();
        }
    }

    fn start(&mut self) {
        match self.session.start() {
            Ok(()) => self.last_error = None,
            Err(err) => {
                tracing::error!(%err, "could not start session");
                self.last_error = Some(err.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::metrics::EndReason;
    use crate::passages::FixedText;
    use crate::session::SessionState;

    fn app(text: &str) -> (App<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let session = TypingSession::new(FixedText::new(text), clock.clone());
        (App::new(session), clock)
    }

    #[test]
    fn typing_before_start_is_ignored() {
        let (mut app, _) = app("hi");

        assert_eq!(app.apply(Action::Type('h')), Flow::Continue);
        assert_eq!(app.session.state(), SessionState::Idle);
    }

    #[test]
    fn start_then_type_to_completion() {
        let (mut app, _) = app("hi");

        app.apply(Action::Start);
        app.apply(Action::Type('h'));
        app.apply(Action::Type('i'));

        assert_eq!(app.session.end_reason(), Some(EndReason::Completed));
    }

    #[test]
    fn start_does_not_interrupt_a_running_test() {
        let (mut app, _) = app("hello");

        app.apply(Action::Start);
        app.apply(Action::Type('h'));
        app.apply(Action::Start);

        assert_eq!(app.session.cursor(), 1);
    }

    #[test]
    fn restart_discards_a_running_test() {
        let (mut app, _) = app("hello");

        app.apply(Action::Start);
        app.apply(Action::Type('h'));
        app.apply(Action::Restart);

        assert!(app.session.is_running());
        assert_eq!(app.session.cursor(), 0);
    }

    #[test]
    fn failed_start_is_reported() {
        let session = TypingSession::new(String::new, ManualClock::new());
        let mut app = App::new(session);

        app.apply(Action::Start);

        assert_eq!(app.session.state(), SessionState::Idle);
        assert!(app.last_error.is_some());

        app.apply(Action::Reset);
        assert!(app.last_error.is_none());
    }

    #[test]
    fn quit_stops_the_loop() {
        let (mut app, _) = app("hi");
        assert_eq!(app.apply(Action::Quit), Flow::Quit);
    }

    #[test]
    fn tick_events_reach_the_session() {
        let (mut app, clock) = app("hi");
        app.apply(Action::Start);

        clock.advance_secs(61);
        app.handle(SessionEvent::Tick);

        assert_eq!(app.session.end_reason(), Some(EndReason::TimeUp));
    }
}
