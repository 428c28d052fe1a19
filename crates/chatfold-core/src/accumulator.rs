use tracing::debug;

use crate::boundary::{adopt_identity, detect_boundary, opening_message, seeded_message};
use crate::coalesce::Coalescer;
use crate::metadata::{fold_message_fields, fold_response_fields};
use crate::response::{Message, Response};
use crate::update::Update;

/// Mutable result-in-progress of a fold.
///
/// Holds the finalized messages, the active message with its open content
/// block, and the response-level fields. Each [`Accumulator::push`] runs to
/// completion, so the accumulator is never observed half-updated.
#[derive(Debug, Default)]
pub struct Accumulator {
    response: Response,
    current: Option<Message>,
    coalescer: Coalescer,
}

impl Accumulator {
    /// Starts an empty fold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues folding on top of an already-built response.
    ///
    /// The last message becomes the active one again, and its trailing block is
    /// reopened when it can still take merges, so resuming behaves exactly as if
    /// the earlier updates and the following ones were folded in one pass.
    pub fn resume(mut response: Response) -> Self {
        let mut current = response.messages.pop();
        let coalescer = current
            .as_mut()
            .map(|message| Coalescer::resume(&mut message.contents))
            .unwrap_or_default();
        Self {
            response,
            current,
            coalescer,
        }
    }

    /// Folds one update.
    pub fn push(&mut self, update: Update) {
        let Self {
            response,
            current,
            coalescer,
        } = self;

        if let Some(message) = current.as_mut() {
            match detect_boundary(message, &update) {
                None => adopt_identity(message, &update),
                Some(reason) => {
                    debug!(
                        message_index = response.messages.len() + 1,
                        reason = %reason,
                        "message boundary"
                    );
                    let mut finished = std::mem::replace(message, seeded_message(&update));
                    coalescer.flush(&mut finished.contents);
                    response.messages.push(finished);
                }
            }
        }
        let message = current.get_or_insert_with(|| opening_message(&update));

        fold_message_fields(message, &update);
        fold_response_fields(response, &update);

        for item in update.contents {
            coalescer.push(&mut message.contents, &mut response.usage, item);
        }
    }

    /// Number of messages started so far, including the active one.
    pub fn message_count(&self) -> usize {
        self.response.messages.len() + usize::from(self.current.is_some())
    }

    /// The response as it would look if the fold ended now.
    pub fn snapshot(&self) -> Response {
        let mut response = self.response.clone();
        if let Some(message) = &self.current {
            let mut message = message.clone();
            let mut coalescer = self.coalescer.clone();
            coalescer.flush(&mut message.contents);
            response.messages.push(message);
        }
        response
    }

    /// Flushes the open block and the active message and returns the response.
    pub fn finish(self) -> Response {
        let Self {
            mut response,
            current,
            mut coalescer,
        } = self;
        if let Some(mut message) = current {
            coalescer.flush(&mut message.contents);
            response.messages.push(message);
        }
        response
    }
}
