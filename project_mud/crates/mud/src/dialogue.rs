//! Text-menu state machine.
//!
//! A [`Dialogue`] renders a node into text plus an ordered option table.
//! Input lines are matched against the table top to bottom; the selected
//! entry either names the next node or calls a handler that decides the
//! [`Transition`]. Unmatched input falls through to the `Default` entry.

use std::fmt;
use std::time::Instant;

use observability::TransitionRecord;
use session::{PlayerSession, SessionOutput};

use crate::error::DialogueError;

const RENDER_FAILURE: &str = "`RSomething went wrong. Please try again later.`x";

/// The party a dialogue talks to: its session, the host collaborators and
/// the outgoing message queue.
pub struct Caller<'a, H: ?Sized> {
    pub session: &'a mut PlayerSession,
    pub host: &'a mut H,
    outbox: &'a mut Vec<SessionOutput>,
}

impl<'a, H: ?Sized> Caller<'a, H> {
    pub fn new(session: &'a mut PlayerSession, host: &'a mut H, outbox: &'a mut Vec<SessionOutput>) -> Self {
        Self {
            session,
            host,
            outbox,
        }
    }

    /// Queue a message for this session.
    pub fn msg(&mut self, text: impl Into<String>) {
        self.outbox
            .push(SessionOutput::new(self.session.session_id, text));
    }

    /// Tear the session down after `reason` is delivered.
    pub fn disconnect(&mut self, reason: &str) {
        let out = self.session.disconnect(reason);
        self.outbox.push(out);
    }

    pub fn address(&self) -> &str {
        &self.session.address
    }
}

/// What a node shows when entered.
pub enum NodeView<D: Dialogue> {
    Page { text: String, options: OptionTable<D> },
    /// Terminal node: show `text` and stop the dialogue.
    Exit { text: String, outcome: D::Outcome },
}

/// Result of handling one line of input.
pub enum Transition<D: Dialogue> {
    /// Stay on the current node, optionally telling the caller why first.
    Rerender(Option<String>),
    GoTo(D::Node, D::State),
    Exit(D::Outcome),
}

impl<D: Dialogue> Transition<D> {
    pub fn reject(message: impl Into<String>) -> Self {
        Transition::Rerender(Some(message.into()))
    }
}

impl<D: Dialogue> fmt::Debug for Transition<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Rerender(msg) => f.debug_tuple("Rerender").field(msg).finish(),
            Transition::GoTo(node, _) => f.debug_tuple("GoTo").field(node).finish(),
            Transition::Exit(_) => f.write_str("Exit"),
        }
    }
}

/// A line of input split the way the matching option saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Input<'i> {
    /// The line as typed, only the line terminator removed.
    pub line: &'i str,
    /// `line` with surrounding whitespace trimmed; what keys are matched on.
    pub raw: &'i str,
    /// The option key that matched; empty for the default entry.
    pub key: &'i str,
    /// Text after the key for command options, the whole line for the default.
    pub args: &'i str,
}

pub type Handler<D> = fn(
    &D,
    &mut Caller<'_, <D as Dialogue>::Host>,
    &<D as Dialogue>::State,
    &Input<'_>,
) -> Transition<D>;

pub enum Goto<D: Dialogue> {
    /// Go straight to a node carrying the current state unchanged.
    Node(D::Node),
    Call(Handler<D>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keys {
    /// Whole line equals one of the aliases. `""` matches blank input.
    Exact(&'static [&'static str]),
    /// First word equals one of the aliases; the rest is passed as args.
    Command(&'static [&'static str]),
    /// Anything not matched by an earlier entry.
    Default,
}

pub struct MenuOption<D: Dialogue> {
    pub keys: Keys,
    pub goto: Goto<D>,
}

/// Ordered option table. Entries are tried top to bottom.
pub struct OptionTable<D: Dialogue> {
    entries: Vec<MenuOption<D>>,
}

impl<D: Dialogue> Default for OptionTable<D> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<D: Dialogue> OptionTable<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exact(self, keys: &'static [&'static str], goto: Goto<D>) -> Self {
        self.push(Keys::Exact(keys), goto)
    }

    pub fn command(self, keys: &'static [&'static str], goto: Goto<D>) -> Self {
        self.push(Keys::Command(keys), goto)
    }

    /// Catch-all entry. Must be added last.
    pub fn default_to(self, goto: Goto<D>) -> Self {
        self.push(Keys::Default, goto)
    }

    fn push(mut self, keys: Keys, goto: Goto<D>) -> Self {
        debug_assert!(!self.has_default(), "option added after the default entry is unreachable");
        self.entries.push(MenuOption { keys, goto });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_default(&self) -> bool {
        self.entries.iter().any(|e| e.keys == Keys::Default)
    }

    /// Find the first entry accepting `raw`.
    pub fn select<'t, 'i>(&'t self, line: &'i str) -> Option<(&'t Goto<D>, Input<'i>)> {
        let raw = line.trim();
        let (head, rest) = match raw.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (raw, ""),
        };

        self.entries.iter().find_map(|entry| match entry.keys {
            Keys::Exact(keys) if keys.iter().any(|k| k.eq_ignore_ascii_case(raw)) => Some((
                &entry.goto,
                Input {
                    line,
                    raw,
                    key: raw,
                    args: "",
                },
            )),
            Keys::Command(keys) if !head.is_empty() && keys.iter().any(|k| k.eq_ignore_ascii_case(head)) => {
                Some((
                    &entry.goto,
                    Input {
                        line,
                        raw,
                        key: head,
                        args: rest,
                    },
                ))
            }
            Keys::Default => Some((
                &entry.goto,
                Input {
                    line,
                    raw,
                    key: "",
                    args: raw,
                },
            )),
            _ => None,
        })
    }
}

/// A static node table plus the types threaded through it.
pub trait Dialogue: Sized {
    type Node: Copy + Eq + fmt::Debug;
    type State: Clone;
    type Host: ?Sized;
    type Outcome;

    const NAME: &'static str;

    fn render(
        &self,
        node: Self::Node,
        caller: &mut Caller<'_, Self::Host>,
        state: &Self::State,
    ) -> Result<NodeView<Self>, DialogueError>;
}

#[derive(Debug)]
pub enum Step<O> {
    /// Waiting for the next line.
    Continue,
    Finished(O),
    /// A node failed to render; the dialogue cannot continue.
    Aborted(DialogueError),
}

/// A running dialogue: current node, carried state and the option table of
/// the last rendered page.
pub struct Menu<D: Dialogue> {
    dialogue: D,
    node: D::Node,
    state: D::State,
    options: Option<OptionTable<D>>,
}

impl<D: Dialogue> Menu<D> {
    pub fn new(dialogue: D, start: D::Node, state: D::State) -> Self {
        Self {
            dialogue,
            node: start,
            state,
            options: None,
        }
    }

    pub fn node(&self) -> D::Node {
        self.node
    }

    pub fn state(&self) -> &D::State {
        &self.state
    }

    pub fn dialogue(&self) -> &D {
        &self.dialogue
    }

    /// Render the current node.
    pub fn enter(&mut self, caller: &mut Caller<'_, D::Host>) -> Step<D::Outcome> {
        self.show(caller)
    }

    /// Feed one line of input, newline already stripped or not.
    pub fn input(&mut self, caller: &mut Caller<'_, D::Host>, line: &str) -> Step<D::Outcome> {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(options) = self.options.take() else {
            return self.show(caller);
        };

        let started = Instant::now();
        let from = self.node;
        let transition = match options.select(line) {
            Some((Goto::Node(node), _)) => Transition::GoTo(*node, self.state.clone()),
            Some((Goto::Call(handler), input)) => handler(&self.dialogue, caller, &self.state, &input),
            None => {
                tracing::warn!(dialogue = D::NAME, node = ?self.node, "option table has no default entry, input dropped");
                Transition::Rerender(None)
            }
        };
        let duration_us = started.elapsed().as_micros();

        let (to, step) = match transition {
            Transition::Rerender(message) => {
                if let Some(message) = message {
                    caller.msg(message);
                }
                (format!("{:?}", self.node), self.show(caller))
            }
            Transition::GoTo(node, state) => {
                self.node = node;
                self.state = state;
                (format!("{:?}", node), self.show(caller))
            }
            Transition::Exit(outcome) => ("<exit>".to_string(), Step::Finished(outcome)),
        };

        TransitionRecord {
            dialogue: D::NAME,
            session: caller.session.session_id.0,
            from: format!("{:?}", from),
            to,
            duration_us,
        }
        .log();

        step
    }

    fn show(&mut self, caller: &mut Caller<'_, D::Host>) -> Step<D::Outcome> {
        match self.dialogue.render(self.node, caller, &self.state) {
            Ok(NodeView::Page { text, options }) => {
                if !options.has_default() {
                    tracing::warn!(dialogue = D::NAME, node = ?self.node, "rendered node has no default option");
                }
                if !text.is_empty() {
                    caller.msg(text);
                }
                self.options = Some(options);
                Step::Continue
            }
            Ok(NodeView::Exit { text, outcome }) => {
                if !text.is_empty() {
                    caller.msg(text);
                }
                self.options = None;
                Step::Finished(outcome)
            }
            Err(e) => {
                tracing::error!(dialogue = D::NAME, node = ?self.node, error = %e, "node render failed");
                caller.msg(RENDER_FAILURE);
                self.options = None;
                Step::Aborted(e)
            }
        }
    }
}
