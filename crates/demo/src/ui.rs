//! Headless stand-in for the out-of-scope native UI subsystem.
//!
//! A real deployment would put a windowing toolkit behind
//! [`UiSurface`]; the demo drives the same seam with named actions and a
//! script of simulated user inputs fired at chosen refresh counts.
//! Actions bind in the two supported modes: a direct synchronous
//! callback, or a deferred work unit enqueued on the bridge.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use fenster_bridge::{BridgeHandle, UiSurface};
use tracing::{debug, warn};

type SyncCallback = Box<dyn FnMut() + Send>;
type DeferredFactory =
    Box<dyn FnMut() -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>> + Send>;

enum Binding {
    Callback(SyncCallback),
    Deferred {
        handle: BridgeHandle,
        label: String,
        make: DeferredFactory,
    },
}

/// One scripted user input: fire `action` during refresh number `at_refresh`.
#[derive(Debug, Clone)]
pub struct ScriptEvent {
    pub at_refresh: u64,
    pub action: String,
}

struct Inner {
    bindings: HashMap<String, Binding>,
    script: Vec<ScriptEvent>,
    refreshes: u64,
}

/// The scripted UI surface handed to the bridge.
pub struct HeadlessUi {
    inner: Arc<Mutex<Inner>>,
}

impl HeadlessUi {
    pub fn new(script: Vec<ScriptEvent>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                bindings: HashMap::new(),
                script,
                refreshes: 0,
            })),
        }
    }

    /// Binding surface kept by the caller after the UI itself has been
    /// moved into the bridge.
    pub fn controls(&self) -> UiControls {
        UiControls {
            inner: self.inner.clone(),
        }
    }
}

/// Registers actions on a [`HeadlessUi`] after construction.
#[derive(Clone)]
pub struct UiControls {
    inner: Arc<Mutex<Inner>>,
}

impl UiControls {
    /// Bind an action to a direct synchronous callback.
    pub fn bind_callback(&self, action: &str, callback: impl FnMut() + Send + 'static) {
        self.inner
            .lock()
            .expect("ui state lock poisoned")
            .bindings
            .insert(action.to_string(), Binding::Callback(Box::new(callback)));
    }

    /// Bind an action to a deferred work unit, enqueued on `handle` each
    /// time the action fires.
    pub fn bind_deferred<F, Fut>(&self, action: &str, handle: BridgeHandle, mut make: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.inner.lock().expect("ui state lock poisoned").bindings.insert(
            action.to_string(),
            Binding::Deferred {
                handle,
                label: action.to_string(),
                make: Box::new(move || Box::pin(make())),
            },
        );
    }
}

impl UiSurface for HeadlessUi {
    fn refresh(&mut self) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().expect("ui state lock poisoned");
        inner.refreshes += 1;
        let n = inner.refreshes;

        let due: Vec<String> = inner
            .script
            .iter()
            .filter(|event| event.at_refresh == n)
            .map(|event| event.action.clone())
            .collect();

        for action in due {
            match inner.bindings.get_mut(&action) {
                Some(Binding::Callback(callback)) => {
                    debug!(action = %action, refresh = n, "firing callback");
                    callback();
                }
                Some(Binding::Deferred {
                    handle,
                    label,
                    make,
                }) => {
                    debug!(action = %action, refresh = n, "enqueueing deferred action");
                    let work = make();
                    handle.enqueue(label.clone(), work);
                }
                None => warn!(action = %action, "script fired an unbound action"),
            }
        }

        Ok(())
    }
}
