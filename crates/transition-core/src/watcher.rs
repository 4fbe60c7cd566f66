//! One-shot completion subscription with at most one live registration.

use crate::error::Result;
use crate::event::TransitionEnd;
use crate::host::Host;

struct Armed<S> {
    ticket: u64,
    event: &'static str,
    subscription: S,
}

/// Holds the single outstanding completion handler of a controller.
///
/// Arming always replaces the previous registration, so a completion signal
/// that belongs to a superseded transition can never reach its handler.
pub struct CompletionWatcher<H: Host> {
    armed: Option<Armed<H::Subscription>>,
    next_ticket: u64,
}

impl<H: Host> Default for CompletionWatcher<H> {
    fn default() -> Self {
        Self {
            armed: None,
            next_ticket: 1,
        }
    }
}

impl<H: Host> CompletionWatcher<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Ticket of the live registration, if any.
    pub fn ticket(&self) -> Option<u64> {
        self.armed.as_ref().map(|a| a.ticket)
    }

    /// Subscribe `handler` to the next completion signal, detaching whatever
    /// was armed before. The handler receives its own ticket so it can
    /// [`settle`](Self::settle) the watcher when it fires.
    pub fn arm(
        &mut self,
        host: &H,
        handler: impl FnOnce(u64, TransitionEnd) + 'static,
    ) -> Result<u64> {
        let event = host.transition_end_event()?;
        self.disarm(host);
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let subscription = host.subscribe_once(event, Box::new(move |ev| handler(ticket, ev)));
        self.armed = Some(Armed {
            ticket,
            event,
            subscription,
        });
        Ok(ticket)
    }

    /// Detach the live registration. Returns whether one was armed.
    pub fn disarm(&mut self, host: &H) -> bool {
        match self.armed.take() {
            Some(armed) => {
                host.unsubscribe(armed.event, armed.subscription);
                true
            }
            None => false,
        }
    }

    /// Forget the registration behind `ticket` after the host fired it.
    /// Returns `false` if `ticket` is not the live one.
    pub fn settle(&mut self, ticket: u64) -> bool {
        if self.ticket() != Some(ticket) {
            return false;
        }
        self.armed = None;
        true
    }
}
