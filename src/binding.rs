//! Props bindings for call sites.
//!
//! A [`Binding`] ties a call site to one overlay token. Each time the call
//! site re-renders it passes its latest props to [`Binding::sync`]; changed
//! props are forwarded through `bind_and_sync`, so they seed the overlay
//! before its first show and update it live while it is mounted.
//! [`Binding::trigger`] shows the overlay.

use tracing::trace;

use crate::handler::Pending;
use crate::orchestrator::{Orchestrator, OverlayContext};
use crate::props::Props;
use crate::token::{IdentifierFactory, ViewToken};

/// A call site's handle on one overlay token.
#[derive(Debug)]
pub struct Binding<C> {
    context: C,
    token: ViewToken,
    last: Option<Props>,
}

impl<C: OverlayContext> Binding<C> {
    /// Bind `token` and sync the initial props.
    pub fn new(context: C, token: impl Into<ViewToken>, props: Props) -> Self {
        let mut binding = Self {
            context,
            token: token.into(),
            last: None,
        };
        binding.sync(props);
        binding
    }

    /// Bind a fresh `base%suffix` token, unique to this call site.
    pub fn unique(
        context: C,
        base: impl AsRef<str>,
        identifiers: &dyn IdentifierFactory,
        props: Props,
    ) -> Self {
        let token = ViewToken::compose(base, identifiers.next_suffix());
        Self::new(context, token, props)
    }

    /// Sync the latest props. Returns `true` if they changed and were sent.
    pub fn sync(&mut self, props: Props) -> bool {
        if self.last.as_ref() == Some(&props) {
            trace!(token = %self.token, "binding props unchanged");
            return false;
        }
        self.context.bind_and_sync(self.token.clone(), props.clone());
        self.last = Some(props);
        true
    }

    /// Show the bound overlay.
    pub fn trigger(&self, props: Props) -> Pending<C::Output, C::Error> {
        self.context.show(self.token.clone(), props)
    }

    /// Token this binding drives.
    pub fn token(&self) -> &ViewToken {
        &self.token
    }

    /// The context the binding was created with.
    pub fn context(&self) -> &C {
        &self.context
    }
}

impl<T, E> Orchestrator<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Bind a call site to `token`, syncing `props` right away.
    pub fn bind(&self, token: impl Into<ViewToken>, props: Props) -> Binding<Self> {
        Binding::new(self.clone(), token, props)
    }

    /// Bind a call site to a fresh `base%suffix` token.
    ///
    /// Two call sites binding the same base get independent overlays.
    pub fn bind_unique(&self, base: impl AsRef<str>, props: Props) -> Binding<Self> {
        Binding::unique(self.clone(), base, self.config().identifiers.as_ref(), props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverlayConfig;
    use crate::registry::ViewTable;
    use crate::token::SequentialFactory;

    type Overlays = Orchestrator<(), ()>;

    fn overlays() -> Overlays {
        let config = OverlayConfig::new().with_identifiers(SequentialFactory::new());
        Overlays::with_config(ViewTable::new(), config).unwrap()
    }

    #[test]
    fn test_bind_buffers_props_before_show() {
        let overlays = overlays();
        let _binding = overlays.bind("form", Props::new().with("title", "a"));

        let buffered = overlays.buffered_props(&"form".into()).unwrap();
        assert_eq!(buffered.get_str("title"), Some("a"));
    }

    #[test]
    fn test_sync_skips_unchanged_props() {
        let overlays = overlays();
        let mut binding = overlays.bind("form", Props::new().with("title", "a"));

        assert!(!binding.sync(Props::new().with("title", "a")));
        assert!(binding.sync(Props::new().with("title", "b")));
    }

    #[test]
    fn test_trigger_consumes_buffer_and_updates_live() {
        let overlays = overlays();
        let mut binding = overlays.bind("form", Props::new().with("title", "a"));
        let _pending = binding.trigger(Props::new().with("step", 1));

        assert!(overlays.buffered_props(&"form".into()).is_none());
        binding.sync(Props::new().with("title", "b"));

        let frame = overlays.frame();
        assert_eq!(frame[0].props().get_str("title"), Some("b"));
        assert_eq!(frame[0].props().get("step"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn test_unique_bindings_are_independent() {
        let overlays = overlays();
        let first = overlays.bind_unique("alert", Props::new().with("n", 1));
        let second = overlays.bind_unique("alert", Props::new().with("n", 2));

        assert_eq!(first.token().as_str(), "alert%1");
        assert_eq!(second.token().as_str(), "alert%2");
        assert_ne!(first.token(), second.token());
    }
}
