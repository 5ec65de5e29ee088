//! The overlay orchestrator.
//!
//! `Orchestrator` is the facade call sites talk to. It owns the active stack
//! and the pre-show props buffer, and drives the [`OverlayStackController`]
//! through commands only. A `show` call pushes an entry, hands the controller
//! a fresh [`ResultHandler`] and returns the matching [`Pending`] future.
//! When the view settles, the controller hides it at once and the entry is
//! popped after the configured grace delay.
//!
//! # Invariants
//!
//! - Stack order is `show` call order; the push happens before `show` returns.
//! - A settled entry stays mounted (hidden) for the full grace delay.
//! - Each pop removes exactly the entry of the cycle that settled.
//! - Buffered props are consumed by the next `show` of their token.
//!
//! # Failure Modes
//!
//! - Tokens with no registered view mount an [`EmptyView`] placeholder.
//! - Settling twice is ignored.
//! - The grace delay runs on the runtime the orchestrator was built in, so
//!   views may settle from any thread. Built outside a runtime and settled
//!   outside one, the grace delay is skipped and the pop is immediate.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

use crate::config::OverlayConfig;
use crate::controller::{CommandSink, ControllerCommand, OverlayStackController};
use crate::error::ConfigError;
use crate::handler::{Outcome, Pending, ResultHandler, SettleHook};
use crate::props::Props;
use crate::registry::{SharedRenderer, ViewTable};
use crate::stack::{ActiveStack, EntryId};
use crate::stream::{EventSender, EventStream, OverlayEvent, StreamBuilder};
use crate::token::ViewToken;
use crate::view::{ChildView, EmptyView, Rendered, ViewProps, ViewRenderer};

/// Capability surface handed to call sites that show overlays.
pub trait OverlayContext {
    /// Value a view resolves with.
    type Output;
    /// Value a view rejects with.
    type Error;

    /// Show `token` with `props`; the future settles with the view's result.
    fn show(&self, token: ViewToken, props: Props) -> Pending<Self::Output, Self::Error>;

    /// Update props of an active token, or buffer them for its next show.
    fn bind_and_sync(&self, token: ViewToken, props: Props);
}

impl<C: OverlayContext + ?Sized> OverlayContext for Arc<C> {
    type Output = C::Output;
    type Error = C::Error;

    fn show(&self, token: ViewToken, props: Props) -> Pending<Self::Output, Self::Error> {
        (**self).show(token, props)
    }

    fn bind_and_sync(&self, token: ViewToken, props: Props) {
        (**self).bind_and_sync(token, props);
    }
}

struct State<T, E> {
    stack: ActiveStack,
    controller: OverlayStackController<T, E>,
    pre_show: HashMap<ViewToken, Props>,
    subscribers: Vec<EventSender<OverlayEvent>>,
}

impl<T, E> State<T, E> {
    fn emit(&mut self, event: OverlayEvent) {
        self.subscribers.retain(|subscriber| !subscriber.is_closed());
        for subscriber in &self.subscribers {
            if subscriber.try_send(event.clone()).is_err() {
                warn!(token = %event.token(), "event subscriber is full; dropping event");
            }
        }
    }
}

struct Shared<T, E> {
    state: Mutex<State<T, E>>,
    views: ViewTable<T, E>,
    placeholder: SharedRenderer<T, E>,
    config: OverlayConfig,
    runtime: Option<Handle>,
}

impl<T, E> Shared<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn lock(&self) -> MutexGuard<'_, State<T, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settle_hook(self: &Arc<Self>) -> SettleHook {
        let weak = Arc::downgrade(self);
        Box::new(move |token: &ViewToken, entry: EntryId, outcome: Outcome| {
            if let Some(shared) = weak.upgrade() {
                shared.settled(token, entry, outcome);
            }
        })
    }

    fn settled(self: &Arc<Self>, token: &ViewToken, entry: EntryId, outcome: Outcome) {
        {
            let mut state = self.lock();
            state.controller.dispatch(ControllerCommand::Hide {
                token: token.clone(),
            });
            state.emit(OverlayEvent::Settled {
                token: token.clone(),
                entry,
                outcome,
            });
        }
        debug!(token = %token, entry = entry.get(), ?outcome, "overlay settled");
        self.schedule_pop(token.clone(), entry);
    }

    fn schedule_pop(self: &Arc<Self>, token: ViewToken, entry: EntryId) {
        let delay = self.config.grace_delay;
        if delay.is_zero() {
            self.pop(&token, entry);
            return;
        }

        let runtime = self.runtime.clone().or_else(|| Handle::try_current().ok());
        match runtime {
            Some(handle) => {
                let weak: Weak<Self> = Arc::downgrade(self);
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(shared) = weak.upgrade() {
                        shared.pop(&token, entry);
                    }
                });
            }
            None => {
                warn!(token = %token, "no tokio runtime for grace delay; unmounting now");
                self.pop(&token, entry);
            }
        }
    }

    fn pop(&self, token: &ViewToken, entry: EntryId) {
        let mut state = self.lock();
        if state.stack.remove(entry).is_none() {
            trace!(token = %token, entry = entry.get(), "entry already popped");
            return;
        }
        if !state.stack.contains(token) {
            state.controller.dispatch(ControllerCommand::Release {
                token: token.clone(),
            });
        }
        state.emit(OverlayEvent::Popped {
            token: token.clone(),
            entry,
        });
        debug!(token = %token, entry = entry.get(), remaining = state.stack.len(), "overlay popped");
    }

    fn renderer_for(&self, token: &ViewToken) -> (SharedRenderer<T, E>, bool) {
        match self.views.resolve(token) {
            Some(renderer) => (Arc::clone(renderer), false),
            None => (Arc::clone(&self.placeholder), true),
        }
    }
}

/// Shows overlays and tracks them until they unmount.
///
/// Cloning is cheap; every clone drives the same stack.
///
/// # Example
///
/// ```rust
/// use overstack::{view_fn, Orchestrator, Props, ViewProps, ViewTable};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut views: ViewTable<String, String> = ViewTable::new();
/// views.register(view_fn("alert", |view: &ViewProps<String, String>| {
///     view.props.get_str("message").map(str::to_string)
/// }));
/// let overlays = Orchestrator::new(views);
///
/// let pending = overlays.show("alert", Props::new().with("message", "hi"));
/// let frame = overlays.frame();
/// assert_eq!(frame[0].draw().as_deref(), Some("hi"));
///
/// frame[0].resolve("ok".to_string());
/// assert_eq!(pending.await.unwrap(), "ok");
/// # }
/// ```
pub struct Orchestrator<T = Value, E = Value> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> Orchestrator<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create an orchestrator with the default configuration.
    pub fn new(views: ViewTable<T, E>) -> Self {
        Self::build(views, OverlayConfig::default())
    }

    /// Create an orchestrator with a validated configuration.
    pub fn with_config(views: ViewTable<T, E>, config: OverlayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(views, config))
    }

    /// Start building an orchestrator.
    pub fn builder() -> OrchestratorBuilder<T, E> {
        OrchestratorBuilder::new()
    }

    fn build(views: ViewTable<T, E>, config: OverlayConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    stack: ActiveStack::new(),
                    controller: OverlayStackController::new(),
                    pre_show: HashMap::new(),
                    subscribers: Vec::new(),
                }),
                views,
                placeholder: Arc::new(EmptyView),
                config,
                runtime: Handle::try_current().ok(),
            }),
        }
    }

    /// Show the view for `token` and wait for its result.
    ///
    /// The entry is pushed and the controller updated before this returns;
    /// only the result is deferred. Props buffered through
    /// [`bind_and_sync`](Self::bind_and_sync) are merged under `props`.
    pub fn show(&self, token: impl Into<ViewToken>, props: Props) -> Pending<T, E> {
        let token = token.into();
        let mut state = self.shared.lock();

        let entry = state.stack.push(token.clone());
        let mut initial = state.pre_show.remove(&token).unwrap_or_default();
        initial.merge(&props);

        if self.shared.views.resolve(&token).is_none() {
            debug!(token = %token, "no view registered; mounting placeholder");
        }

        let (handler, pending) =
            ResultHandler::with_settle_hook(token.clone(), entry, self.shared.settle_hook());
        state.controller.dispatch(ControllerCommand::Show {
            token: token.clone(),
            handler,
            props: initial,
        });
        debug!(token = %token, entry = entry.get(), depth = state.stack.len(), "overlay pushed");
        state.emit(OverlayEvent::Pushed { token, entry });

        pending
    }

    /// Sync props for `token`.
    ///
    /// While the token is on the active stack the props go straight to the
    /// controller; otherwise they are buffered for its next `show`.
    pub fn bind_and_sync(&self, token: impl Into<ViewToken>, props: Props) {
        let token = token.into();
        let mut state = self.shared.lock();

        if state.stack.contains(&token) {
            state.controller.dispatch(ControllerCommand::UpdateProps {
                token: token.clone(),
                props,
            });
            state.emit(OverlayEvent::PropsUpdated { token });
        } else {
            trace!(token = %token, "buffering props until show");
            state.pre_show.entry(token.clone()).or_default().merge(&props);
            state.emit(OverlayEvent::PropsBuffered { token });
        }
    }

    /// Mount every active entry, bottom to top.
    pub fn frame(&self) -> Vec<MountedView<T, E>> {
        let state = self.shared.lock();
        let children = state
            .stack
            .entries()
            .iter()
            .map(|entry| ChildView::new(entry.token.clone()))
            .collect();
        let rendered = state.controller.render(children);

        state
            .stack
            .entries()
            .iter()
            .zip(rendered)
            .map(|(entry, view)| {
                let (renderer, placeholder) = self.shared.renderer_for(&entry.token);
                MountedView {
                    entry: entry.id,
                    renderer,
                    placeholder,
                    view,
                }
            })
            .collect()
    }

    /// Snapshot of the active stack's tokens, bottom to top.
    pub fn active_tokens(&self) -> Vec<ViewToken> {
        self.shared.lock().stack.tokens()
    }

    /// Check if `token` is on the active stack.
    pub fn is_active(&self, token: &ViewToken) -> bool {
        self.shared.lock().stack.contains(token)
    }

    /// Number of entries on the active stack.
    pub fn len(&self) -> usize {
        self.shared.lock().stack.len()
    }

    /// Check if nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.shared.lock().stack.is_empty()
    }

    /// Props buffered for `token` that its next show will consume.
    pub fn buffered_props(&self, token: &ViewToken) -> Option<Props> {
        self.shared.lock().pre_show.get(token).cloned()
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> EventStream<OverlayEvent> {
        let (sender, stream) = StreamBuilder::<OverlayEvent>::new()
            .buffer_size(self.shared.config.event_buffer)
            .build();
        self.shared.lock().subscribers.push(sender);
        stream
    }

    /// The configuration in use.
    pub fn config(&self) -> &OverlayConfig {
        &self.shared.config
    }

    /// The registered views.
    pub fn views(&self) -> &ViewTable<T, E> {
        &self.shared.views
    }
}

impl<T, E> OverlayContext for Orchestrator<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Error = E;

    fn show(&self, token: ViewToken, props: Props) -> Pending<T, E> {
        Orchestrator::show(self, token, props)
    }

    fn bind_and_sync(&self, token: ViewToken, props: Props) {
        Orchestrator::bind_and_sync(self, token, props);
    }
}

impl<T, E> Clone for Orchestrator<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> fmt::Debug for Orchestrator<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("views", &self.shared.views.names())
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

/// One active entry with its injected props and renderer.
#[derive(Debug)]
pub struct MountedView<T, E> {
    entry: EntryId,
    renderer: SharedRenderer<T, E>,
    placeholder: bool,
    view: ViewProps<T, E>,
}

impl<T, E> MountedView<T, E> {
    /// Show cycle of this entry.
    pub fn entry(&self) -> EntryId {
        self.entry
    }

    /// Token of the mounted view.
    pub fn token(&self) -> &ViewToken {
        &self.view.token
    }

    /// Whether the view is visible or waiting out its grace delay.
    pub fn visible(&self) -> bool {
        self.view.visible
    }

    /// The props injected into the view.
    pub fn view(&self) -> &ViewProps<T, E> {
        &self.view
    }

    /// The merged props.
    pub fn props(&self) -> &Props {
        &self.view.props
    }

    /// The renderer drawing this entry.
    pub fn renderer(&self) -> &SharedRenderer<T, E> {
        &self.renderer
    }

    /// Whether no view was registered for the token.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Render the entry.
    pub fn draw(&self) -> Rendered {
        self.renderer.render(&self.view)
    }

    /// Fulfil the show cycle currently attached to this token.
    pub fn resolve(&self, data: T) -> bool {
        self.view.resolve(data)
    }

    /// Reject the show cycle currently attached to this token.
    pub fn reject(&self, error: E) -> bool {
        self.view.reject(error)
    }
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder<T, E> {
    views: ViewTable<T, E>,
    config: OverlayConfig,
}

impl<T, E> OrchestratorBuilder<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create a builder with no views and the default configuration.
    pub fn new() -> Self {
        Self {
            views: ViewTable::new(),
            config: OverlayConfig::default(),
        }
    }

    /// Register a view.
    pub fn view(mut self, view: impl ViewRenderer<T, E> + 'static) -> Self {
        self.views.register(view);
        self
    }

    /// Replace the view table.
    pub fn views(mut self, views: ViewTable<T, E>) -> Self {
        self.views = views;
        self
    }

    /// Replace the configuration.
    pub fn config(mut self, config: OverlayConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the orchestrator, validating the configuration.
    pub fn build(self) -> Result<Orchestrator<T, E>, ConfigError> {
        Orchestrator::with_config(self.views, self.config)
    }
}

impl<T, E> Default for OrchestratorBuilder<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::view_fn;
    use std::time::Duration;

    type Overlays = Orchestrator<String, String>;

    fn alert_views() -> ViewTable<String, String> {
        let mut views = ViewTable::new();
        views.register(view_fn("alert", |view: &ViewProps<String, String>| {
            view.props.get_str("message").map(str::to_string)
        }));
        views
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_pushes_before_await() {
        let overlays = Overlays::new(alert_views());
        let _a = overlays.show("a", Props::new());
        let _b = overlays.show("b", Props::new());

        assert_eq!(overlays.active_tokens(), vec![ViewToken::from("a"), ViewToken::from("b")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pop_removes_the_settled_cycle_only() {
        let overlays = Overlays::new(alert_views());
        let first = overlays.show("a", Props::new());
        let _second = overlays.show("b", Props::new());

        let frame = overlays.frame();
        frame[0].resolve("done".to_string());
        assert_eq!(first.await.unwrap(), "done");

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(overlays.active_tokens(), vec![ViewToken::from("b")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_after_last_entry_pops() {
        let overlays = Overlays::new(alert_views());
        let pending = overlays.show("alert", Props::new());
        overlays.frame()[0].resolve("ok".to_string());
        pending.await.unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        let state = overlays.shared.lock();
        let token = ViewToken::from("alert");
        assert!(state.controller.handler(&token).is_none());
        assert_eq!(state.controller.visible(&token), Some(false));
    }

    #[test]
    fn test_without_runtime_pops_immediately() {
        let overlays = Overlays::new(alert_views());
        let _pending = overlays.show("alert", Props::new());
        assert!(overlays.frame()[0].resolve("ok".to_string()));
        assert!(overlays.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_from_foreign_thread_keeps_grace_delay() {
        let overlays = Overlays::new(alert_views());
        let pending = overlays.show("alert", Props::new());

        let view = overlays.frame().remove(0);
        std::thread::spawn(move || assert!(view.resolve("ok".to_string())))
            .join()
            .unwrap();

        assert_eq!(pending.await.unwrap(), "ok");
        assert_eq!(overlays.len(), 1);
        assert!(!overlays.frame()[0].visible());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(overlays.is_empty());
    }

    #[test]
    fn test_unknown_view_mounts_placeholder() {
        let overlays = Overlays::new(alert_views());
        let _pending = overlays.show("missing", Props::new().with("message", "x"));

        let frame = overlays.frame();
        assert_eq!(frame.len(), 1);
        assert!(frame[0].is_placeholder());
        assert!(frame[0].visible());
        assert_eq!(frame[0].draw(), None);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = Overlays::builder()
            .config(OverlayConfig::new().with_event_buffer(0))
            .build();
        assert!(matches!(result, Err(ConfigError::ZeroEventBuffer)));
    }
}
