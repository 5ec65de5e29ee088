//! Overlay stack controller.
//!
//! The controller owns all per-token state: visibility, the current result
//! handler and the accumulated props. The state lives in an arena of slots
//! indexed by token; everything outside refers to a view by token only and
//! drives the controller through [`ControllerCommand`]s.
//!
//! # Failure Modes
//!
//! None. Every command on an unknown token is a silent no-op, except
//! `UpdateProps`, which seeds the token's props for a later show.

use std::collections::HashMap;

use tracing::trace;

use crate::handler::ResultHandler;
use crate::props::Props;
use crate::token::ViewToken;
use crate::view::{ChildView, ViewProps};

/// Commands accepted by the controller.
#[derive(Debug)]
pub enum ControllerCommand<T, E> {
    /// Mark visible, attach the handler and merge the initial props.
    Show {
        token: ViewToken,
        handler: ResultHandler<T, E>,
        props: Props,
    },
    /// Mark hidden. Props and handler stay until overwritten or released.
    Hide { token: ViewToken },
    /// Shallow-merge props, visible or not.
    UpdateProps { token: ViewToken, props: Props },
    /// Drop the stored handler once the token has left the stack.
    Release { token: ViewToken },
}

/// Anything that accepts controller commands.
pub trait CommandSink<T, E> {
    /// Apply one command.
    fn dispatch(&mut self, command: ControllerCommand<T, E>);
}

#[derive(Debug)]
struct Slot<T, E> {
    visible: bool,
    handler: Option<ResultHandler<T, E>>,
    props: Props,
}

impl<T, E> Default for Slot<T, E> {
    fn default() -> Self {
        Self {
            visible: false,
            handler: None,
            props: Props::new(),
        }
    }
}

/// Per-token visibility, handler and props bookkeeping.
#[derive(Debug)]
pub struct OverlayStackController<T, E> {
    slots: Vec<Slot<T, E>>,
    index: HashMap<ViewToken, usize>,
    revision: u64,
}

impl<T, E> OverlayStackController<T, E> {
    /// Create an empty controller.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
            revision: 0,
        }
    }

    /// Show `token` with `handler`, merging `props` into its stored props.
    pub fn show(&mut self, token: ViewToken, handler: ResultHandler<T, E>, props: Props) {
        let slot = self.slot_mut(token);
        slot.visible = true;
        slot.handler = Some(handler);
        slot.props.merge(&props);
        self.revision += 1;
    }

    /// Hide `token`. No-op for tokens never seen.
    pub fn hide(&mut self, token: &ViewToken) {
        let Some(&idx) = self.index.get(token) else {
            trace!(token = %token, "hide for unknown token");
            return;
        };
        self.slots[idx].visible = false;
        self.revision += 1;
    }

    /// Shallow-merge `props` into the stored props of `token`.
    pub fn update_state(&mut self, token: ViewToken, props: &Props) {
        if props.is_empty() && !self.index.contains_key(&token) {
            return;
        }
        self.slot_mut(token).props.merge(props);
        self.revision += 1;
    }

    /// Drop the stored result handler of `token`.
    pub fn release(&mut self, token: &ViewToken) {
        if let Some(&idx) = self.index.get(token) {
            self.slots[idx].handler = None;
        }
    }

    /// Current visibility; `None` for tokens never seen.
    pub fn visible(&self, token: &ViewToken) -> Option<bool> {
        self.slot(token).map(|slot| slot.visible)
    }

    /// Current result handler.
    pub fn handler(&self, token: &ViewToken) -> Option<&ResultHandler<T, E>> {
        self.slot(token).and_then(|slot| slot.handler.as_ref())
    }

    /// Accumulated props.
    pub fn props(&self, token: &ViewToken) -> Option<&Props> {
        self.slot(token).map(|slot| &slot.props)
    }

    /// Incremented on every state change that affects rendering.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of tokens the controller has state for.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the controller has no state.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Inject controller state into each child, in order.
    ///
    /// Explicit child values win: visibility and handler replace the injected
    /// ones, explicit props are merged over the stored props.
    pub fn render(&self, children: Vec<ChildView<T, E>>) -> Vec<ViewProps<T, E>> {
        children
            .into_iter()
            .map(|child| {
                let slot = self.slot(&child.token);
                let visible = child
                    .visible
                    .or_else(|| slot.map(|s| s.visible))
                    .unwrap_or(false);
                let handler = child
                    .handler
                    .or_else(|| slot.and_then(|s| s.handler.clone()));
                let props = match slot {
                    Some(s) => s.props.merged(&child.props),
                    None => child.props,
                };
                ViewProps {
                    token: child.token,
                    visible,
                    handler,
                    props,
                }
            })
            .collect()
    }

    fn slot(&self, token: &ViewToken) -> Option<&Slot<T, E>> {
        self.index.get(token).map(|&idx| &self.slots[idx])
    }

    fn slot_mut(&mut self, token: ViewToken) -> &mut Slot<T, E> {
        let idx = match self.index.get(&token) {
            Some(&idx) => idx,
            None => {
                self.slots.push(Slot::default());
                let idx = self.slots.len() - 1;
                self.index.insert(token, idx);
                idx
            }
        };
        &mut self.slots[idx]
    }
}

impl<T, E> Default for OverlayStackController<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> CommandSink<T, E> for OverlayStackController<T, E> {
    fn dispatch(&mut self, command: ControllerCommand<T, E>) {
        match command {
            ControllerCommand::Show {
                token,
                handler,
                props,
            } => self.show(token, handler, props),
            ControllerCommand::Hide { token } => self.hide(&token),
            ControllerCommand::UpdateProps { token, props } => self.update_state(token, &props),
            ControllerCommand::Release { token } => self.release(&token),
        }
    }
}
