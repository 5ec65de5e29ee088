//! # Overstack
//!
//! **Overstack** turns "show this dialog" into a value you can await. Call
//! sites ask an [`Orchestrator`] to show a named view; the view eventually
//! resolves or rejects, and the caller's future settles with that result.
//!
//! ## Overview
//!
//! ```text
//! call site ──show(token, props)──▶ Orchestrator ──Show/Hide/UpdateProps──▶ Controller
//!     ▲                                 │ active stack                       │ visibility
//!     │                                 │ pre-show props                     │ handlers
//!     └────────── Pending<T, E> ◀── ResultHandler ◀── view calls resolve ────┘ props
//! ```
//!
//! - The orchestrator owns the ordered stack of mounted overlays and pops a
//!   settled entry after a configurable grace delay, so exit transitions can
//!   play while the view is hidden but still mounted.
//! - The controller owns per-token visibility, result handlers and props and
//!   is driven only through [`ControllerCommand`]s.
//! - Bindings let call sites seed props before a view is shown and keep them
//!   in sync while it is mounted, with the same call.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use overstack::prelude::*;
//!
//! let overlays = Orchestrator::<String, String>::builder()
//!     .view(view_fn("confirm", |view: &ViewProps<String, String>| {
//!         view.visible.then(|| format!("{}? [y/n]", view.props.get_str("question")?))
//!     }))
//!     .build()?;
//!
//! let answer = overlays.show("confirm", Props::new().with("question", "Delete")).await;
//! ```

mod binding;
mod config;
mod controller;
mod error;
mod handler;
mod orchestrator;
mod props;
mod registry;
mod stack;
pub mod stream;
mod token;
mod view;

pub mod prelude;

pub use binding::Binding;
pub use config::{OverlayConfig, DEFAULT_GRACE_DELAY, MAX_GRACE_DELAY};
pub use controller::{CommandSink, ControllerCommand, OverlayStackController};
pub use error::{
    ConfigError, OverlayError, OverlayResult, PropsError, RegistryError, RegistryResult,
};
pub use handler::{Outcome, Pending, ResultHandler};
pub use orchestrator::{MountedView, Orchestrator, OrchestratorBuilder, OverlayContext};
pub use props::Props;
pub use registry::{SharedRenderer, ViewTable, ViewTableBuilder};
pub use stack::{ActiveStack, EntryId, StackEntry};
pub use stream::{EventSender, EventStream, OverlayEvent, StreamBuilder};
pub use token::{IdentifierFactory, SequentialFactory, UuidFactory, ViewToken, SUFFIX_SEPARATOR};
pub use view::{view_fn, ChildView, EmptyView, FnView, Rendered, ViewProps, ViewRenderer};
