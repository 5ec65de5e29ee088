//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use overstack::prelude::*;
//! ```

// Facade
pub use crate::orchestrator::{MountedView, Orchestrator, OrchestratorBuilder, OverlayContext};
pub use crate::binding::Binding;
pub use crate::config::OverlayConfig;

// Views
pub use crate::props::Props;
pub use crate::registry::{ViewTable, ViewTableBuilder};
pub use crate::view::{view_fn, FnView, Rendered, ViewProps, ViewRenderer};

// Tokens
pub use crate::token::{IdentifierFactory, ViewToken};

// Results and events
pub use crate::handler::{Outcome, Pending, ResultHandler};
pub use crate::stream::{EventStream, OverlayEvent};

// Errors
pub use crate::error::{ConfigError, OverlayError, OverlayResult, RegistryError};
