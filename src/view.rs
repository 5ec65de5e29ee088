//! View renderers and the props injected into them.
//!
//! How a view draws itself is up to the host; Overstack only needs a name to
//! register it under and a function from injected props to something
//! displayable.

use std::fmt::{self, Debug};

use crate::handler::ResultHandler;
use crate::props::Props;
use crate::token::ViewToken;

/// What a renderer produces for one frame; `None` renders nothing.
pub type Rendered = Option<String>;

/// Renders one kind of overlay.
///
/// # Example
///
/// ```rust
/// use overstack::{Rendered, ViewProps, ViewRenderer};
///
/// #[derive(Debug)]
/// struct AlertView;
///
/// impl ViewRenderer<String, String> for AlertView {
///     fn name(&self) -> &str {
///         "alert"
///     }
///
///     fn render(&self, view: &ViewProps<String, String>) -> Rendered {
///         view.visible
///             .then(|| format!("[!] {}", view.props.get_str("message").unwrap_or_default()))
///     }
/// }
/// ```
pub trait ViewRenderer<T, E>: Send + Sync + Debug {
    /// Returns the name this view is registered under.
    ///
    /// Tokens equal to this name (or composed from it as `name%suffix`)
    /// render with this view.
    fn name(&self) -> &str;

    /// Render the view with its injected props.
    fn render(&self, view: &ViewProps<T, E>) -> Rendered;
}

/// Placeholder for tokens with no registered view. Renders nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyView;

impl<T, E> ViewRenderer<T, E> for EmptyView {
    fn name(&self) -> &str {
        ""
    }

    fn render(&self, _view: &ViewProps<T, E>) -> Rendered {
        None
    }
}

/// A renderer built from a closure.
pub struct FnView<F> {
    name: String,
    render: F,
}

impl<F> FnView<F> {
    /// Create a renderer named `name` that draws with `render`.
    pub fn new(name: impl Into<String>, render: F) -> Self {
        Self {
            name: name.into(),
            render,
        }
    }
}

impl<F> Debug for FnView<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnView").field("name", &self.name).finish()
    }
}

impl<T, E, F> ViewRenderer<T, E> for FnView<F>
where
    F: Fn(&ViewProps<T, E>) -> Rendered + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, view: &ViewProps<T, E>) -> Rendered {
        (self.render)(view)
    }
}

/// Build a [`FnView`], inferring the closure signature.
pub fn view_fn<T, E, F>(name: impl Into<String>, render: F) -> FnView<F>
where
    F: Fn(&ViewProps<T, E>) -> Rendered + Send + Sync,
{
    FnView::new(name, render)
}

/// Props injected into a view for one frame.
#[derive(Debug)]
pub struct ViewProps<T, E> {
    /// Token the view is mounted under.
    pub token: ViewToken,
    /// Whether the view should currently be shown.
    pub visible: bool,
    /// Resolve/reject pair for the current show cycle.
    pub handler: Option<ResultHandler<T, E>>,
    /// Merged props.
    pub props: Props,
}

impl<T, E> ViewProps<T, E> {
    /// Fulfil the current show cycle. No-op without a handler.
    pub fn resolve(&self, data: T) -> bool {
        self.handler.as_ref().is_some_and(|h| h.resolve(data))
    }

    /// Reject the current show cycle. No-op without a handler.
    pub fn reject(&self, error: E) -> bool {
        self.handler.as_ref().is_some_and(|h| h.reject(error))
    }
}

impl<T, E> Clone for ViewProps<T, E> {
    fn clone(&self) -> Self {
        Self {
            token: self.token.clone(),
            visible: self.visible,
            handler: self.handler.clone(),
            props: self.props.clone(),
        }
    }
}

/// A child view declared to the controller.
///
/// Anything set explicitly here takes precedence over what the controller
/// would inject.
#[derive(Debug)]
pub struct ChildView<T, E> {
    /// Token whose controller state is injected.
    pub token: ViewToken,
    /// Explicit visibility.
    pub visible: Option<bool>,
    /// Explicit result handler.
    pub handler: Option<ResultHandler<T, E>>,
    /// Explicit props, merged last.
    pub props: Props,
}

impl<T, E> ChildView<T, E> {
    /// Declare a child with no explicit overrides.
    pub fn new(token: impl Into<ViewToken>) -> Self {
        Self {
            token: token.into(),
            visible: None,
            handler: None,
            props: Props::new(),
        }
    }

    /// Force visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Force the result handler.
    pub fn with_handler(mut self, handler: ResultHandler<T, E>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Set explicit props.
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }
}
