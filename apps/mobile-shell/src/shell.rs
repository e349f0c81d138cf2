//! # Application Shell
//!
//! Turns the current [`AuthState`] into one of three top-level layouts and
//! hands each new frame to a [`Renderer`].
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Shell::new ──► start() ──► run_until(shutdown) ──► teardown()        │
//! │                    │              │                      │              │
//! │                    │              │                      ├─ resolver    │
//! │                    │              │                      │  released    │
//! │                    │              │                      └─ every store │
//! │                    │              │                         listener    │
//! │                    │              │                         dropped     │
//! │                    │              ▼                                     │
//! │                    │     AuthState changed? ──► select layout ──► render│
//! │                    ▼                                                    │
//! │              bootstrap + first frame (Loading while Unknown)            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::sync::Arc;

use satchel_core::{AuthState, Layout, LayoutPolicy, TabSpec, TabStyle, MAIN_TABS};
use satchel_store::PersistentStore;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ShellResult;
use crate::state::AuthResolver;

/// What the shell shows for a given auth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub state: AuthState,
    pub layout: Layout,
}

impl Frame {
    pub fn new(state: AuthState, policy: LayoutPolicy) -> Self {
        Frame {
            state,
            layout: Layout::select(state, policy),
        }
    }

    /// Tabs to show, if the layout is the tab navigator.
    pub fn tabs(&self) -> Option<&'static [TabSpec]> {
        match self.layout {
            Layout::MainTabs => Some(&MAIN_TABS[..]),
            _ => None,
        }
    }

    /// Tint and label settings for the tab bar, alongside [`tabs`](Self::tabs).
    pub fn tab_style(&self) -> Option<TabStyle> {
        match self.layout {
            Layout::MainTabs => Some(TabStyle::default()),
            _ => None,
        }
    }

    pub fn initial_route(&self) -> Option<&'static str> {
        self.layout.initial_route()
    }
}

/// Presentation seam.
///
/// Implementations draw a frame; the shell decides when.
pub trait Renderer: Send + Sync {
    fn render(&self, frame: &Frame);
}

/// Renderer that only logs, for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRenderer;

impl Renderer for TracingRenderer {
    fn render(&self, frame: &Frame) {
        match (frame.tabs(), frame.tab_style()) {
            (Some(tabs), Some(style)) => {
                let names: Vec<&str> = tabs.iter().map(|t| t.name).collect();
                info!(
                    state = %frame.state,
                    layout = ?frame.layout,
                    tabs = ?names,
                    focused = style.tint(true),
                    unfocused = style.tint(false),
                    label_size = style.label_font_size,
                    "Render"
                );
            }
            _ => info!(
                state = %frame.state,
                layout = ?frame.layout,
                route = frame.initial_route().unwrap_or("-"),
                "Render"
            ),
        }
    }
}

/// Root of the running app.
pub struct Shell {
    store: PersistentStore,
    resolver: Arc<AuthResolver>,
    renderer: Arc<dyn Renderer>,
    policy: LayoutPolicy,
    last_frame: Option<Frame>,
    torn_down: bool,
}

impl Shell {
    pub fn new(store: PersistentStore, renderer: Arc<dyn Renderer>, policy: LayoutPolicy) -> Self {
        let resolver = Arc::new(AuthResolver::new(store.clone()));

        Shell {
            store,
            resolver,
            renderer,
            policy,
            last_frame: None,
            torn_down: false,
        }
    }

    pub fn resolver(&self) -> &Arc<AuthResolver> {
        &self.resolver
    }

    pub fn store(&self) -> &PersistentStore {
        &self.store
    }

    pub fn policy(&self) -> LayoutPolicy {
        self.policy
    }

    /// Last frame handed to the renderer.
    pub fn current_frame(&self) -> Option<Frame> {
        self.last_frame
    }

    /// Bootstraps auth and renders the first frame.
    ///
    /// A frame is rendered even when bootstrap fails: the state is still
    /// `Unknown`, so that frame is the loading indicator. Calling it again
    /// renders nothing unless the frame changed.
    pub async fn start(&mut self) -> ShellResult<()> {
        info!(policy = %self.policy, "Starting shell");

        let bootstrapped = self.resolver.bootstrap().await;
        self.render_if_changed();

        bootstrapped?;
        Ok(())
    }

    /// Renders on every state change until `shutdown` resolves, then tears
    /// down.
    ///
    /// Call [`start`](Self::start) first; the frame it rendered is the
    /// baseline that later frames are compared against.
    pub async fn run_until<F>(&mut self, shutdown: F) -> ShellResult<()>
    where
        F: Future,
    {
        let mut rx = self.resolver.watch();
        rx.borrow_and_update();
        // Catch a change that landed between start() and here.
        self.render_if_changed();

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                changed = rx.changed() => {
                    if changed.is_err() {
                        warn!("Auth state channel closed");
                        break;
                    }
                    rx.borrow_and_update();
                    self.render_if_changed();
                }
            }
        }

        self.teardown();
        Ok(())
    }

    /// Releases the resolver and every store subscription. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        self.resolver.release();
        let dropped = self.store.notifier().unsubscribe_all();
        info!(dropped, "Shell torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn render_if_changed(&mut self) {
        let frame = Frame::new(self.resolver.state(), self.policy);
        if self.last_frame == Some(frame) {
            debug!(state = %frame.state, "Frame unchanged, skipping render");
            return;
        }
        self.renderer.render(&frame);
        self.last_frame = Some(frame);
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("policy", &self.policy)
            .field("last_frame", &self.last_frame)
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}
