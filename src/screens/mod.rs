//! Screen rendering — registry plus the concrete screen renderers.

pub mod registry;
pub mod renderers;

use std::sync::Arc;

use async_trait::async_trait;

pub use registry::ScreenRegistry;

use crate::catalog::CatalogProvider;
use crate::channels::RenderInstruction;
use crate::config::BotConfig;
use crate::session::model::{ScreenId, Session};
use crate::store::Storage;

/// Read-only collaborators available to renderers.
#[derive(Clone)]
pub struct RenderContext {
    pub catalog: Arc<dyn CatalogProvider>,
    pub storage: Arc<dyn Storage>,
    pub config: BotConfig,
}

/// Renders one screen for a session.
///
/// Rendering never fails: collaborator errors degrade to an apologetic text
/// inside the renderer, so the dispatcher always has something to send.
#[async_trait]
pub trait ScreenRenderer: Send + Sync {
    /// Which screen this renderer draws.
    fn screen(&self) -> ScreenId;

    async fn render(&self, session: &Session, ctx: &RenderContext) -> RenderInstruction;
}
