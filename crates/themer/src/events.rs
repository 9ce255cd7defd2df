//! Activation notifications.
//!
//! Listeners observe the activation protocol at two points:
//!
//! ```text
//! set(name)
//!   → resolve alias           (ThemeNotFound aborts here, nothing emitted)
//!   → ACTIVATING ← requested name, before the swap
//!   → swap active theme + register resources
//!   → ACTIVATED  ← resolved record, after the swap
//! ```
//!
//! Notifications are fire-and-forget: listeners cannot veto or alter activation.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::theme::ThemeRecord;

/// A notification emitted by [`ThemeManager`](crate::ThemeManager).
#[derive(Debug, Clone, PartialEq)]
pub enum ThemeEvent {
    /// A theme is about to become active. Carries the alias as requested.
    Activating { requested: String },
    /// A theme became active and its resources are registered.
    Activated { theme: Arc<ThemeRecord> },
}

impl ThemeEvent {
    /// Short event name, handy for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ThemeEvent::Activating { .. } => "theme.activating",
            ThemeEvent::Activated { .. } => "theme.activated",
        }
    }
}

/// Type alias for listener functions.
pub type ListenerFn = Rc<dyn Fn(&ThemeEvent)>;

/// Ordered list of event listeners.
#[derive(Clone, Default)]
pub struct ThemeListeners {
    listeners: Vec<ListenerFn>,
}

impl ThemeListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Adds a listener for every event.
    pub fn listen<F>(&mut self, f: F)
    where
        F: Fn(&ThemeEvent) + 'static,
    {
        self.listeners.push(Rc::new(f));
    }

    /// Adds a listener that only sees [`ThemeEvent::Activating`].
    pub fn on_activating<F>(&mut self, f: F)
    where
        F: Fn(&str) + 'static,
    {
        self.listen(move |event| {
            if let ThemeEvent::Activating { requested } = event {
                f(requested);
            }
        });
    }

    /// Adds a listener that only sees [`ThemeEvent::Activated`].
    pub fn on_activated<F>(&mut self, f: F)
    where
        F: Fn(&Arc<ThemeRecord>) + 'static,
    {
        self.listen(move |event| {
            if let ThemeEvent::Activated { theme } = event {
                f(theme);
            }
        });
    }

    /// Delivers `event` to every listener in registration order.
    pub fn emit(&self, event: &ThemeEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for ThemeListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeListeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_listeners_empty() {
        let listeners = ThemeListeners::new();
        assert!(listeners.is_empty());
        listeners.emit(&ThemeEvent::Activating {
            requested: "x".into(),
        });
    }

    #[test]
    fn test_emit_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = ThemeListeners::new();

        let first = log.clone();
        listeners.listen(move |e| first.borrow_mut().push(format!("1:{}", e.kind())));
        let second = log.clone();
        listeners.listen(move |e| second.borrow_mut().push(format!("2:{}", e.kind())));

        listeners.emit(&ThemeEvent::Activating {
            requested: "dark".into(),
        });

        assert_eq!(
            *log.borrow(),
            vec!["1:theme.activating", "2:theme.activating"]
        );
    }

    #[test]
    fn test_filtered_listeners() {
        let requested = Rc::new(RefCell::new(Vec::new()));
        let activated = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = ThemeListeners::new();

        let r = requested.clone();
        listeners.on_activating(move |name| r.borrow_mut().push(name.to_string()));
        let a = activated.clone();
        listeners.on_activated(move |theme| a.borrow_mut().push(theme.slug().to_string()));

        let theme = Arc::new(ThemeRecord::builder("Dark", "/themes/dark").build());
        listeners.emit(&ThemeEvent::Activating {
            requested: "Dark".into(),
        });
        listeners.emit(&ThemeEvent::Activated { theme });

        assert_eq!(*requested.borrow(), vec!["Dark"]);
        assert_eq!(*activated.borrow(), vec!["dark"]);
    }
}
