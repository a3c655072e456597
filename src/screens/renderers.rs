//! The concrete screen renderers.
//!
//! Renderers are pure "state in, instruction out" views over the session and
//! the read-only collaborators; all mutation happens before rendering.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;

use crate::cart;
use crate::channels::{Action, RenderInstruction};
use crate::screens::{RenderContext, ScreenRegistry, ScreenRenderer};
use crate::session::model::{CartItem, ItemKind, ScreenId, Session, WizardId};

/// Register all screens. Called once from main, before the registry is shared.
pub fn register_all(registry: &mut ScreenRegistry) {
    registry.register(Arc::new(StartRenderer));
    registry.register(Arc::new(CatalogRenderer));
    registry.register(Arc::new(CartRenderer));
    registry.register(Arc::new(AiMenuRenderer));
    registry.register(Arc::new(HistoryRenderer));
    registry.register(Arc::new(AdminMainRenderer));
    registry.register(Arc::new(AdminListItemsRenderer));
    registry.register(Arc::new(AdminOrdersRenderer));
    registry.register(Arc::new(AdminUsersRenderer));
}

fn describe_item(item: &CartItem) -> String {
    match &item.kind {
        ItemKind::Catalog { name, .. } => format!("{name} — {}₽", item.unit_price),
        ItemKind::Custom { descriptor } => {
            format!("Custom bouquet ({descriptor}) — {}₽", item.unit_price)
        }
    }
}

pub struct StartRenderer;

#[async_trait]
impl ScreenRenderer for StartRenderer {
    fn screen(&self) -> ScreenId {
        ScreenId::Start
    }

    async fn render(&self, _session: &Session, _ctx: &RenderContext) -> RenderInstruction {
        RenderInstruction::new(
            ScreenId::Start,
            "👋 Welcome to the flower shop! 🌸\n\nWhat would you like to do?",
        )
        .with_choice("🌸 Catalog", Action::GoTo(ScreenId::Catalog))
        .with_choice("🤖 AI recommendation", Action::GoTo(ScreenId::AiMenu))
        .with_choice("🎨 Build a bouquet", Action::StartWizard(WizardId::BouquetBuilder))
        .with_choice("🛒 Cart", Action::GoTo(ScreenId::Cart))
        .with_choice("📦 My orders", Action::GoTo(ScreenId::History))
    }
}

pub struct CatalogRenderer;

#[async_trait]
impl ScreenRenderer for CatalogRenderer {
    fn screen(&self) -> ScreenId {
        ScreenId::Catalog
    }

    async fn render(&self, _session: &Session, ctx: &RenderContext) -> RenderInstruction {
        let items = ctx.catalog.list_available().await;
        if items.is_empty() {
            return RenderInstruction::new(ScreenId::Catalog, "🌸 The catalog is empty right now.")
                .with_back();
        }

        let mut text = String::from("🌸 Catalog:\n\n");
        let mut instruction = RenderInstruction::new(ScreenId::Catalog, "");
        for item in &items {
            let _ = writeln!(text, "• {} — {}₽\n  {}", item.name, item.price, item.description);
            instruction = instruction.with_choice(
                format!("➕ {}", item.name),
                Action::AddCatalogItem { item_id: item.id },
            );
        }
        instruction.text = text;
        instruction.with_choice("🛒 Cart", Action::GoTo(ScreenId::Cart)).with_back()
    }
}

pub struct CartRenderer;

#[async_trait]
impl ScreenRenderer for CartRenderer {
    fn screen(&self) -> ScreenId {
        ScreenId::Cart
    }

    async fn render(&self, session: &Session, _ctx: &RenderContext) -> RenderInstruction {
        if session.cart.is_empty() {
            return RenderInstruction::new(
                ScreenId::Cart,
                "🛒 Your cart is empty.\n\nBrowse the catalog to pick something.",
            )
            .with_choice("🌸 To the catalog", Action::GoTo(ScreenId::Catalog))
            .with_back();
        }

        let mut text = String::from("🛒 Your cart:\n\n");
        for (i, item) in session.cart.iter().enumerate() {
            let _ = writeln!(text, "{}. {}", i + 1, describe_item(item));
            for (key, value) in &item.attributes {
                let _ = writeln!(text, "   {key}: {value}");
            }
        }
        let _ = write!(text, "\n💰 Total: {}₽", cart::total(session));
        if let Some(address) = &session.delivery_address {
            let _ = write!(text, "\n📍 Delivery: {address}");
        }

        let mut instruction = RenderInstruction::new(ScreenId::Cart, text)
            .with_choice("📍 Set delivery address", Action::RequestAddress)
            .with_choice("💫 Pay", Action::Checkout)
            .with_choice("🗑️ Clear cart", Action::ClearCart);
        for i in 0..session.cart.len() {
            instruction = instruction
                .with_choice(format!("✖️ Remove #{}", i + 1), Action::RemoveCartItem { index: i });
        }
        instruction.with_back()
    }
}

pub struct AiMenuRenderer;

#[async_trait]
impl ScreenRenderer for AiMenuRenderer {
    fn screen(&self) -> ScreenId {
        ScreenId::AiMenu
    }

    async fn render(&self, _session: &Session, _ctx: &RenderContext) -> RenderInstruction {
        RenderInstruction::new(
            ScreenId::AiMenu,
            "🤖 AI bouquet recommendation\n\n\
             Tell me the occasion and budget and I'll suggest a bouquet.\n\
             You can also type it directly, e.g.:\n\
             occasion: birthday, budget: 2000",
        )
        .with_choice("✨ Start", Action::StartWizard(WizardId::AiRecommend))
        .with_back()
    }
}

pub struct HistoryRenderer;

#[async_trait]
impl ScreenRenderer for HistoryRenderer {
    fn screen(&self) -> ScreenId {
        ScreenId::History
    }

    async fn render(&self, session: &Session, ctx: &RenderContext) -> RenderInstruction {
        let orders = match ctx.storage.orders_for_user(session.user_id, 10).await {
            Ok(orders) => orders,
            Err(e) => {
                tracing::warn!(user_id = session.user_id, error = %e, "Failed to load order history");
                return RenderInstruction::new(
                    ScreenId::History,
                    "❌ Couldn't load your orders right now. Please try again.",
                )
                .with_back();
            }
        };

        if orders.is_empty() {
            return RenderInstruction::new(ScreenId::History, "📦 You have no orders yet.")
                .with_choice("🌸 To the catalog", Action::GoTo(ScreenId::Catalog))
                .with_back();
        }

        let mut text = String::from("📦 Your orders:\n\n");
        for order in &orders {
            let _ = writeln!(
                text,
                "🆔 {}\n💰 {}₽ | 📊 {} | 💳 {}\n📅 {}\n",
                order.id,
                order.total_price,
                order.status,
                order.payment_status,
                order.created_at.format("%Y-%m-%d %H:%M"),
            );
        }
        RenderInstruction::new(ScreenId::History, text).with_back()
    }
}

pub struct AdminMainRenderer;

#[async_trait]
impl ScreenRenderer for AdminMainRenderer {
    fn screen(&self) -> ScreenId {
        ScreenId::AdminMain
    }

    async fn render(&self, _session: &Session, _ctx: &RenderContext) -> RenderInstruction {
        RenderInstruction::new(ScreenId::AdminMain, "🔧 Admin panel\n\nChoose an action:")
            .with_choice("➕ Add item", Action::StartWizard(WizardId::AddCatalogItem))
            .with_choice("📋 List items", Action::GoTo(ScreenId::AdminListItems))
            .with_choice("📦 Orders", Action::GoTo(ScreenId::AdminOrders))
            .with_choice("👥 Users", Action::GoTo(ScreenId::AdminUsers))
    }
}

pub struct AdminListItemsRenderer;

#[async_trait]
impl ScreenRenderer for AdminListItemsRenderer {
    fn screen(&self) -> ScreenId {
        ScreenId::AdminListItems
    }

    async fn render(&self, _session: &Session, ctx: &RenderContext) -> RenderInstruction {
        let items = ctx.catalog.list_available().await;
        let text = if items.is_empty() {
            "📋 No items in the catalog.\n\nUse \"Add item\" to create one.".to_string()
        } else {
            let mut text = String::from("📋 Catalog items:\n\n");
            for item in &items {
                let _ = writeln!(
                    text,
                    "✅ ID {}: {} — {}₽ ({})",
                    item.id,
                    item.name,
                    item.price,
                    item.category.as_deref().unwrap_or("uncategorized"),
                );
            }
            text
        };
        RenderInstruction::new(ScreenId::AdminListItems, text).with_back()
    }
}

pub struct AdminOrdersRenderer;

#[async_trait]
impl ScreenRenderer for AdminOrdersRenderer {
    fn screen(&self) -> ScreenId {
        ScreenId::AdminOrders
    }

    async fn render(&self, _session: &Session, ctx: &RenderContext) -> RenderInstruction {
        let limit = ctx.config.admin_list_limit;
        let orders = match ctx.storage.recent_orders(limit).await {
            Ok(orders) => orders,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load orders");
                return RenderInstruction::new(ScreenId::AdminOrders, "❌ Couldn't load orders.")
                    .with_back();
            }
        };

        let text = if orders.is_empty() {
            "📦 No orders yet.".to_string()
        } else {
            let mut text = String::from("📦 Recent orders:\n\n");
            for order in &orders {
                let _ = writeln!(
                    text,
                    "🆔 {}\n👤 {} | 💰 {}₽\n📍 {}\n📊 {} | 💳 {}\n",
                    order.id,
                    order.user_id,
                    order.total_price,
                    order.delivery_address,
                    order.status,
                    order.payment_status,
                );
            }
            text
        };
        RenderInstruction::new(ScreenId::AdminOrders, text).with_back()
    }
}

pub struct AdminUsersRenderer;

#[async_trait]
impl ScreenRenderer for AdminUsersRenderer {
    fn screen(&self) -> ScreenId {
        ScreenId::AdminUsers
    }

    async fn render(&self, _session: &Session, ctx: &RenderContext) -> RenderInstruction {
        let limit = ctx.config.admin_list_limit;
        let users = match ctx.storage.known_users(limit).await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load users");
                return RenderInstruction::new(ScreenId::AdminUsers, "❌ Couldn't load users.")
                    .with_back();
            }
        };

        let text = if users.is_empty() {
            "👥 No users yet.".to_string()
        } else {
            let mut text = String::from("👥 Recent users:\n\n");
            for user_id in &users {
                let _ = writeln!(text, "🆔 {user_id}");
            }
            text
        };
        RenderInstruction::new(ScreenId::AdminUsers, text).with_back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::config::BotConfig;
    use crate::store::InMemoryStorage;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn ctx() -> RenderContext {
        RenderContext {
            catalog: Arc::new(InMemoryCatalog::with_samples()),
            storage: Arc::new(InMemoryStorage::new()),
            config: BotConfig::default(),
        }
    }

    #[tokio::test]
    async fn start_offers_the_main_actions() {
        let instruction = StartRenderer.render(&Session::new(1), &ctx()).await;
        assert_eq!(instruction.screen, ScreenId::Start);
        assert!(instruction
            .choices
            .iter()
            .any(|c| c.action == Action::StartWizard(WizardId::BouquetBuilder)));
        assert!(instruction
            .choices
            .iter()
            .any(|c| c.action == Action::GoTo(ScreenId::Cart)));
    }

    #[tokio::test]
    async fn catalog_lists_items_with_add_buttons() {
        let instruction = CatalogRenderer.render(&Session::new(1), &ctx()).await;
        assert!(instruction.text.contains("Classic Roses"));
        assert!(instruction
            .choices
            .iter()
            .any(|c| matches!(c.action, Action::AddCatalogItem { .. })));
    }

    #[tokio::test]
    async fn empty_cart_points_to_catalog() {
        let instruction = CartRenderer.render(&Session::new(1), &ctx()).await;
        assert!(instruction.text.contains("empty"));
        assert!(instruction
            .choices
            .iter()
            .any(|c| c.action == Action::GoTo(ScreenId::Catalog)));
    }

    #[tokio::test]
    async fn cart_shows_total_and_remove_buttons() {
        let mut session = Session::new(1);
        session.cart.push(CartItem {
            kind: ItemKind::Custom {
                descriptor: "red, 11 flowers".into(),
            },
            attributes: BTreeMap::from([("color".to_string(), "red".to_string())]),
            unit_price: dec!(2500),
        });
        let instruction = CartRenderer.render(&session, &ctx()).await;
        assert!(instruction.text.contains("Total: 2500₽"));
        assert!(instruction
            .choices
            .iter()
            .any(|c| c.action == Action::RemoveCartItem { index: 0 }));
        assert!(instruction.choices.iter().any(|c| c.action == Action::Checkout));
    }

    #[tokio::test]
    async fn registry_covers_every_screen() {
        let mut registry = ScreenRegistry::new();
        register_all(&mut registry);
        for screen in [
            ScreenId::Start,
            ScreenId::Catalog,
            ScreenId::Cart,
            ScreenId::AiMenu,
            ScreenId::History,
            ScreenId::AdminMain,
            ScreenId::AdminListItems,
            ScreenId::AdminOrders,
            ScreenId::AdminUsers,
        ] {
            assert!(registry.get(screen).await.is_some(), "{screen} unregistered");
        }
    }
}
