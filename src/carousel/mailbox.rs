//! Continuations posted back to the frame loop
//!
//! Animation and provider callbacks never touch carousel state. They post a
//! message stamped with the mount epoch, and the next tick applies it if the
//! epoch still matches.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ProviderError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Message {
    FirstRunDone,
    Revealed { card: usize },
    Unrevealed { card: usize },
    ContentReady { card: usize, content: String },
    ContentFailed { card: usize, error: ProviderError },
}

#[derive(Clone, Default)]
pub(crate) struct Mailbox {
    queue: Rc<RefCell<Vec<(u64, Message)>>>,
}

impl Mailbox {
    pub(crate) fn poster(&self, epoch: u64) -> Poster {
        Poster {
            mailbox: self.clone(),
            epoch,
        }
    }

    pub(crate) fn drain(&self) -> Vec<(u64, Message)> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }

    pub(crate) fn clear(&self) {
        self.queue.borrow_mut().clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.queue.borrow().len()
    }
}

/// A mailbox handle bound to one mount epoch
#[derive(Clone)]
pub(crate) struct Poster {
    mailbox: Mailbox,
    epoch: u64,
}

impl Poster {
    pub(crate) fn post(&self, message: Message) {
        self.mailbox
            .queue
            .borrow_mut()
            .push((self.epoch, message));
    }
}
