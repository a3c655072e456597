//! Screen registry — maps screen ids to renderer functions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::channels::{Action, RenderInstruction};
use crate::screens::ScreenRenderer;
use crate::session::model::{ScreenId, Session};

/// Registry of screen renderers. Populated once at startup; last write wins.
pub struct ScreenRegistry {
    renderers: RwLock<HashMap<ScreenId, Arc<dyn ScreenRenderer>>>,
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self {
            renderers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a renderer under its own screen id.
    ///
    /// Registration happens before the registry is shared, so it takes
    /// exclusive access and cannot be lost to lock contention.
    pub fn register(&mut self, renderer: Arc<dyn ScreenRenderer>) {
        let screen = renderer.screen();
        self.renderers.get_mut().insert(screen, renderer);
        tracing::debug!(screen = %screen, "Registered screen");
    }

    /// Get the renderer for a screen, if one is registered.
    pub async fn get(&self, screen: ScreenId) -> Option<Arc<dyn ScreenRenderer>> {
        self.renderers.read().await.get(&screen).cloned()
    }

    /// Number of registered screens.
    pub async fn count(&self) -> usize {
        self.renderers.read().await.len()
    }

    /// Hard-coded degradation when a screen has no renderer.
    ///
    /// A broken navigation chain must not strand the user, so the gap is
    /// logged and the user is sent back to start.
    pub fn fallback_start(session: &Session, missing: ScreenId) -> RenderInstruction {
        tracing::warn!(user_id = session.user_id, screen = %missing, "No renderer registered; falling back to start");
        RenderInstruction::new(
            ScreenId::Start,
            "❌ Navigation error. Returning to the main menu.",
        )
        .with_choice("🌸 Main menu", Action::GoTo(ScreenId::Start))
    }
}

impl Default for ScreenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::RenderContext;
    use async_trait::async_trait;

    struct FixedRenderer {
        screen: ScreenId,
    }

    #[async_trait]
    impl ScreenRenderer for FixedRenderer {
        fn screen(&self) -> ScreenId {
            self.screen
        }
        async fn render(&self, _session: &Session, _ctx: &RenderContext) -> RenderInstruction {
            RenderInstruction::new(self.screen, "fixed")
        }
    }

    #[tokio::test]
    async fn register_and_get() {
        let mut registry = ScreenRegistry::new();
        registry.register(Arc::new(FixedRenderer {
            screen: ScreenId::Catalog,
        }));

        assert_eq!(registry.count().await, 1);
        assert!(registry.get(ScreenId::Catalog).await.is_some());
        assert!(registry.get(ScreenId::Cart).await.is_none());
    }

    #[tokio::test]
    async fn last_registration_wins() {
        let mut registry = ScreenRegistry::new();
        registry.register(Arc::new(FixedRenderer {
            screen: ScreenId::Cart,
        }));
        registry.register(Arc::new(FixedRenderer {
            screen: ScreenId::Cart,
        }));
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn every_registration_lands() {
        let mut registry = ScreenRegistry::new();
        let screens = [ScreenId::Start, ScreenId::Catalog, ScreenId::Cart, ScreenId::History];
        for screen in screens {
            registry.register(Arc::new(FixedRenderer { screen }));
        }
        assert_eq!(registry.count().await, screens.len());
        for screen in screens {
            assert!(registry.get(screen).await.is_some());
        }
    }

    #[test]
    fn fallback_targets_start() {
        let session = Session::new(1);
        let instruction = ScreenRegistry::fallback_start(&session, ScreenId::History);
        assert_eq!(instruction.screen, ScreenId::Start);
        assert!(!instruction.choices.is_empty());
    }
}
