//! Input events and the queue between the input source and the editor.
//!
//! ## Learning: Channels Instead of Shared State
//!
//! The reader thread never touches the document. It only sends
//! [`InputEvent`] values into an unbounded `tokio::sync::mpsc` channel;
//! the editor loop is the single consumer and blocks on `blocking_recv`,
//! so events arrive in order and none are dropped.

use tokio::sync::mpsc;

use crate::command::Command;
use crate::document::Document;

/// Something the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Typed text
    Text(String),
    /// A named key
    Key(Key),
    /// A whole command line, for line-oriented front ends
    Line(String),
    /// The input source asked the editor to stop
    Quit,
}

/// Named keys a front end may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Backspace,
    Delete,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
}

/// Sending half of the input queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct InputSender {
    sender: mpsc::UnboundedSender<InputEvent>,
}

impl InputSender {
    /// Queues an event. Returns false once the editor has stopped reading.
    pub fn send(&self, event: InputEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// Receiving half of the input queue, owned by the editor loop.
#[derive(Debug)]
pub struct InputQueue {
    receiver: mpsc::UnboundedReceiver<InputEvent>,
}

impl InputQueue {
    /// Creates a connected sender/queue pair.
    pub fn channel() -> (InputSender, InputQueue) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (InputSender { sender }, InputQueue { receiver })
    }
}

impl Iterator for InputQueue {
    type Item = InputEvent;

    /// Blocks until the next event. Returns `None` when every sender is
    /// gone and the queue is drained.
    ///
    /// Must not be called from inside an async runtime.
    fn next(&mut self) -> Option<InputEvent> {
        self.receiver.blocking_recv()
    }
}

/// Turns input events into commands and shows the result.
///
/// The editor calls `dispatch` for each event, applies every returned
/// command, then calls `render`.
pub trait Dispatcher {
    fn dispatch(&mut self, event: InputEvent) -> Vec<Command>;

    /// Called after the commands of one event were applied.
    fn render(&mut self, _document: &Document) {}

    /// Called when a command fails. The loop keeps running.
    fn report(&mut self, command: &Command, error: &crate::CoreError) {
        tracing::warn!(command = command.display_name(), %error, "command failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_preserves_order() {
        let (sender, mut queue) = InputQueue::channel();
        let producer = std::thread::spawn(move || {
            for i in 0..100 {
                assert!(sender.send(InputEvent::Line(i.to_string())));
            }
        });
        producer.join().unwrap();

        for i in 0..100 {
            assert_eq!(queue.next(), Some(InputEvent::Line(i.to_string())));
        }
        assert_eq!(queue.next(), None);
    }

    #[test]
    fn test_send_after_queue_dropped() {
        let (sender, queue) = InputQueue::channel();
        drop(queue);
        assert!(!sender.send(InputEvent::Quit));
    }
}
