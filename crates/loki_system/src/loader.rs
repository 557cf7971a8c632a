//! Component loader.
//!
//! Injects component scripts into the host document and tracks which
//! components have announced themselves. Requests for unknown or already
//! requested components are silent no-ops; nothing here returns an error
//! to the caller.
//!
//! A component that is injected but never calls
//! [`Loader::notify_available`] stays [`LoadState::Requested`] forever.
//! There is no retry or timeout; [`Loader::pending_loads`] reports them.

use std::fmt;

use loki_host::{HostDocument, HostError, ScriptElement};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::LoadTarget;
use crate::log::Logger;
use crate::registry::{ComponentDescriptor, ComponentRegistry, LoadState};

/// Callback invoked with the name of a component that became available.
pub type Listener = Box<dyn FnMut(&str)>;

/// Outcome of [`Loader::request_load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    /// A script was attached to the document.
    Injected {
        /// The resolved script location.
        src: String,
    },
    /// No component with that name is registered.
    Unknown,
    /// The component was already requested and has not announced itself.
    AlreadyRequested,
    /// The component has already announced itself.
    AlreadyLoaded,
    /// The host refused the script. The component stays requestable.
    HostRejected(HostError),
}

/// Handle returned by [`Loader::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Loads components into a host document of type `D`.
pub struct Loader<D> {
    registry: ComponentRegistry,
    target: LoadTarget,
    debug: bool,
    document: D,
    logger: Logger,
    /// Single observer slot; the last registration wins.
    listener: Option<Listener>,
    subscribers: Vec<(SubscriptionId, Listener)>,
    initialized: bool,
}

impl<D: fmt::Debug> fmt::Debug for Loader<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("registry", &self.registry)
            .field("target", &self.target)
            .field("debug", &self.debug)
            .field("document", &self.document)
            .field("has_listener", &self.listener.is_some())
            .field("subscribers", &self.subscribers.len())
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl<D: HostDocument> Loader<D> {
    /// Create a loader over `registry`.
    #[must_use]
    pub fn new(
        registry: ComponentRegistry,
        target: LoadTarget,
        debug: bool,
        document: D,
        logger: Logger,
    ) -> Self {
        Self {
            registry,
            target,
            debug,
            document,
            logger,
            listener: None,
            subscribers: Vec::new(),
            initialized: false,
        }
    }

    /// Inject the script for `name`.
    ///
    /// Only a component in [`LoadState::Declared`] is injected. Everything
    /// else is a no-op described by the returned [`LoadRequest`].
    pub fn request_load(&mut self, name: &str) -> LoadRequest {
        let Some(descriptor) = self.registry.get_mut(name) else {
            debug!(component = name, "load requested for unknown component");
            return LoadRequest::Unknown;
        };
        match descriptor.state() {
            LoadState::Loaded => return LoadRequest::AlreadyLoaded,
            LoadState::Requested => return LoadRequest::AlreadyRequested,
            LoadState::Declared => {}
        }

        let src = self.target.resolve(descriptor.source());
        let script = ScriptElement::javascript(name, src.clone());
        match self
            .document
            .attach_script(script, self.target.injection_point)
        {
            Ok(()) => {
                descriptor.mark_requested();
                debug!(component = name, src, target = %self.target.injection_point, "component requested");
                LoadRequest::Injected { src }
            }
            Err(err) => {
                self.logger
                    .warn(format!("could not inject component {name}: {err}"));
                LoadRequest::HostRejected(err)
            }
        }
    }

    /// Record that `name` finished initializing and notify observers.
    ///
    /// Unknown names are ignored. Announcing twice keeps the component
    /// loaded and notifies observers again.
    pub fn notify_available(&mut self, name: &str) {
        let Some(descriptor) = self.registry.get_mut(name) else {
            debug!(component = name, "unknown component announced itself");
            return;
        };
        if !descriptor.mark_loaded() {
            debug!(component = name, "component announced itself twice");
        }
        if self.debug {
            self.logger.info(format!("{name} has loaded"));
        }
        if let Some(listener) = self.listener.as_mut() {
            listener(name);
        }
        for (_, subscriber) in &mut self.subscribers {
            subscriber(name);
        }
    }

    /// Set the single availability listener, replacing any previous one.
    pub fn set_listener(&mut self, listener: impl FnMut(&str) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Remove the availability listener.
    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Add a broadcast subscriber. Unlike the listener slot, subscribers
    /// accumulate.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&str) + 'static) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Request every component that is not loaded, in declaration order.
    ///
    /// Meant to run once at startup. Later calls do nothing.
    pub fn initialize_all(&mut self) -> Vec<LoadRequest> {
        if self.initialized {
            debug!("loader already initialized");
            return Vec::new();
        }
        self.initialized = true;

        let names: Vec<String> = self
            .registry
            .iter()
            .filter(|c| !c.is_loaded())
            .map(|c| c.name().to_string())
            .collect();
        let requests: Vec<LoadRequest> = names.iter().map(|n| self.request_load(n)).collect();
        info!(
            components = self.registry.len(),
            requested = requests
                .iter()
                .filter(|r| matches!(r, LoadRequest::Injected { .. }))
                .count(),
            "loader initialized"
        );
        requests
    }

    /// Components that were injected but have not announced themselves.
    #[must_use]
    pub fn pending_loads(&self) -> Vec<String> {
        self.registry
            .pending()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Returns `true` if `name` is registered and loaded.
    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.registry
            .get(name)
            .is_some_and(ComponentDescriptor::is_loaded)
    }

    /// The component registry.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Mutable access to the registry, for declaring components at runtime.
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// The host document.
    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Mutable access to the host document.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use loki_host::{HeadlessDocument, InjectionPoint};

    use super::*;
    use crate::log::Severity;

    fn make_loader(names: &[&str]) -> Loader<HeadlessDocument> {
        let mut registry = ComponentRegistry::new();
        for name in names {
            registry.register(*name, format!("{name}.js")).unwrap();
        }
        Loader::new(
            registry,
            LoadTarget::default(),
            true,
            HeadlessDocument::new(),
            Logger::buffered(),
        )
    }

    #[test]
    fn test_request_load_injects_resolved_script() {
        let mut loader = make_loader(&["refs"]);
        let result = loader.request_load("refs");
        assert_eq!(
            result,
            LoadRequest::Injected {
                src: "src/refs.js".to_string()
            }
        );
        let scripts: Vec<_> = loader.document().scripts_in(InjectionPoint::Head).collect();
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].src, "src/refs.js");
        assert_eq!(scripts[0].script_type, "text/javascript");
    }

    #[test]
    fn test_request_load_respects_body_target() {
        let registry = ComponentRegistry::from_entries(&[crate::ComponentEntry::new("a", "a.js")])
            .unwrap();
        let target = LoadTarget {
            base_path: "/js/".to_string(),
            injection_point: InjectionPoint::Body,
        };
        let mut loader = Loader::new(
            registry,
            target,
            false,
            HeadlessDocument::new(),
            Logger::buffered(),
        );
        loader.request_load("a");
        let scripts: Vec<_> = loader.document().scripts_in(InjectionPoint::Body).collect();
        assert_eq!(scripts[0].src, "/js/a.js");
    }

    #[test]
    fn test_unknown_component_is_noop() {
        let mut loader = make_loader(&["refs"]);
        let logger = loader.logger.clone();
        assert_eq!(loader.request_load("nope"), LoadRequest::Unknown);
        loader.notify_available("nope");
        assert!(loader.document().additions().is_empty());
        assert!(!loader.is_loaded("refs"));
        assert!(logger.book().is_empty());
    }

    #[test]
    fn test_second_request_is_noop() {
        let mut loader = make_loader(&["refs"]);
        loader.request_load("refs");
        assert_eq!(loader.request_load("refs"), LoadRequest::AlreadyRequested);
        loader.notify_available("refs");
        assert_eq!(loader.request_load("refs"), LoadRequest::AlreadyLoaded);
        assert_eq!(loader.document().additions().len(), 1);
    }

    #[test]
    fn test_notify_twice_keeps_loaded() {
        let mut loader = make_loader(&["refs"]);
        let calls = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&calls);
        loader.set_listener(move |_| *seen.borrow_mut() += 1);

        loader.notify_available("refs");
        loader.notify_available("refs");
        assert!(loader.is_loaded("refs"));
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn test_notify_logs_only_in_debug() {
        let mut loader = make_loader(&["refs"]);
        let logger = loader.logger.clone();
        loader.notify_available("refs");
        assert_eq!(logger.book().entries(Severity::Info), ["refs has loaded"]);

        loader.debug = false;
        loader.notify_available("refs");
        assert_eq!(logger.count(Severity::Info), 1);
    }

    #[test]
    fn test_listener_slot_last_writer_wins() {
        let mut loader = make_loader(&["refs"]);
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        loader.set_listener(move |name| first.borrow_mut().push(format!("first:{name}")));
        let second = Rc::clone(&log);
        loader.set_listener(move |name| second.borrow_mut().push(format!("second:{name}")));

        loader.notify_available("refs");
        assert_eq!(*log.borrow(), ["second:refs"]);
    }

    #[test]
    fn test_subscribers_broadcast() {
        let mut loader = make_loader(&["a", "b"]);
        let log = Rc::new(RefCell::new(Vec::new()));

        let one = Rc::clone(&log);
        let id = loader.subscribe(move |name| one.borrow_mut().push(format!("1:{name}")));
        let two = Rc::clone(&log);
        loader.subscribe(move |name| two.borrow_mut().push(format!("2:{name}")));

        loader.notify_available("a");
        assert!(loader.unsubscribe(id));
        assert!(!loader.unsubscribe(id));
        loader.notify_available("b");

        assert_eq!(*log.borrow(), ["1:a", "2:a", "2:b"]);
    }

    #[test]
    fn test_initialize_all_requests_each_once_in_order() {
        let mut loader = make_loader(&["a", "b"]);
        let requests = loader.initialize_all();
        assert_eq!(requests.len(), 2);

        let srcs: Vec<_> = loader
            .document()
            .additions()
            .iter()
            .map(|(_, s)| s.src.as_str())
            .collect();
        assert_eq!(srcs, ["src/a.js", "src/b.js"]);

        assert!(loader.initialize_all().is_empty());
        assert_eq!(loader.document().additions().len(), 2);
    }

    #[test]
    fn test_initialize_all_skips_loaded() {
        let mut loader = make_loader(&["a", "b"]);
        loader.notify_available("a");
        loader.initialize_all();
        let components: Vec<_> = loader
            .document()
            .additions()
            .iter()
            .map(|(_, s)| s.component.as_str())
            .collect();
        assert_eq!(components, ["b"]);
    }

    #[test]
    fn test_host_rejection_leaves_component_requestable() {
        let registry = ComponentRegistry::from_entries(&[crate::ComponentEntry::new("a", "a.js")])
            .unwrap();
        let logger = Logger::buffered();
        let mut loader = Loader::new(
            registry,
            LoadTarget::default(),
            true,
            HeadlessDocument::new().without_container(InjectionPoint::Head),
            logger.clone(),
        );

        let result = loader.request_load("a");
        assert_eq!(
            result,
            LoadRequest::HostRejected(HostError::MissingContainer(InjectionPoint::Head))
        );
        assert_eq!(logger.count(Severity::Warn), 1);
        assert_eq!(
            loader.registry().get("a").unwrap().state(),
            LoadState::Declared
        );
    }

    #[test]
    fn test_pending_loads_reports_stuck_components() {
        let mut loader = make_loader(&["a", "b"]);
        loader.initialize_all();
        loader.notify_available("a");
        assert_eq!(loader.pending_loads(), ["b"]);
    }
}
