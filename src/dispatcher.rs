//! The dispatcher — routes inbound events to navigation, wizards, and the
//! cart, and produces exactly one render instruction per event.
//!
//! Concurrency model: events for one user are serialized by holding the
//! session store's per-user lock across the get → mutate → save cycle.
//! External collaborator calls (recommendation, invoicing, geocoding) run
//! with that lock released; state touched before the call is re-validated
//! after the lock is re-acquired.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::cart;
use crate::catalog::{CatalogProvider, NewCatalogItem};
use crate::channels::{Action, EventKind, InboundEvent, RenderInstruction};
use crate::config::BotConfig;
use crate::error::{CartError, EngineError, Error, Result};
use crate::external::recommend::CannedRecommender;
use crate::external::{Geocoder, PaymentProvider, Recommender, coords_fallback, parse_request};
use crate::nav;
use crate::screens::{RenderContext, ScreenRegistry};
use crate::session::model::{
    CartItem, FieldValue, ItemKind, OrderId, ScreenId, Session, UserId, WizardId,
};
use crate::session::store::SessionStore;
use crate::store::Storage;
use crate::wizard::engine::{
    AdvanceOutcome, CancelReason, StepPrompt, WizardEngine, WizardInput, WizardOutcome,
};
use crate::wizard::flows;

/// What a locked wizard advance resolved to, seen from outside the lock.
enum Advanced {
    /// Ready to send.
    Render(RenderInstruction),
    /// The AI wizard completed; call the recommender with the lock released.
    Recommend { occasion: String, budget: Decimal },
}

pub struct Dispatcher {
    sessions: Arc<SessionStore>,
    registry: Arc<ScreenRegistry>,
    engine: WizardEngine,
    catalog: Arc<dyn CatalogProvider>,
    storage: Arc<dyn Storage>,
    recommender: Arc<dyn Recommender>,
    payments: Arc<dyn PaymentProvider>,
    geocoder: Option<Arc<dyn Geocoder>>,
    config: BotConfig,
    render_ctx: RenderContext,
}

impl Dispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sessions: Arc<SessionStore>,
        registry: Arc<ScreenRegistry>,
        catalog: Arc<dyn CatalogProvider>,
        storage: Arc<dyn Storage>,
        recommender: Arc<dyn Recommender>,
        payments: Arc<dyn PaymentProvider>,
        geocoder: Option<Arc<dyn Geocoder>>,
        config: BotConfig,
    ) -> Self {
        let engine = WizardEngine::new(config.wizard_timeout, config.price_ceiling);
        let render_ctx = RenderContext {
            catalog: Arc::clone(&catalog),
            storage: Arc::clone(&storage),
            config: config.clone(),
        };
        Self {
            sessions,
            registry,
            engine,
            catalog,
            storage,
            recommender,
            payments,
            geocoder,
            config,
            render_ctx,
        }
    }

    /// Handle one inbound event. Never fails outward: internal errors degrade
    /// to an apologetic instruction so the user is never left without a reply.
    pub async fn dispatch(&self, event: InboundEvent) -> RenderInstruction {
        let user_id = event.user_id;
        let lock = self.sessions.user_lock(user_id).await;

        match self.handle(&event, &lock).await {
            Ok(instruction) => instruction,
            Err(e) => {
                tracing::error!(user_id, error = %e, "event handling failed");
                RenderInstruction::new(
                    ScreenId::Start,
                    "❌ Something went wrong. Please try again.",
                )
                .with_choice("🌸 Main menu", Action::GoTo(ScreenId::Start))
            }
        }
    }

    async fn handle(
        &self,
        event: &InboundEvent,
        lock: &Arc<Mutex<()>>,
    ) -> Result<RenderInstruction> {
        let user_id = event.user_id;
        match &event.kind {
            EventKind::Command(cmd) => {
                let advanced = {
                    let _guard = lock.lock().await;
                    self.handle_command(user_id, cmd).await?
                };
                self.resolve(advanced).await
            }
            EventKind::MenuChoice(action) => self.handle_action(user_id, action, lock).await,
            EventKind::FreeText(text) => self.handle_text(user_id, text, lock).await,
            EventKind::Photo(file_id) => {
                let advanced = {
                    let _guard = lock.lock().await;
                    self.advance_wizard(user_id, WizardInput::Photo(file_id.clone()))
                        .await?
                };
                self.resolve(advanced).await
            }
            EventKind::Location { lat, lon } => self.handle_location(user_id, *lat, *lon, lock).await,
        }
    }

    /// Finish an `Advanced`, running the unlocked recommendation leg if any.
    async fn resolve(&self, advanced: Advanced) -> Result<RenderInstruction> {
        match advanced {
            Advanced::Render(instruction) => Ok(instruction),
            Advanced::Recommend { occasion, budget } => {
                Ok(self.recommend_response(&occasion, budget).await)
            }
        }
    }

    // ── Commands ────────────────────────────────────────────────────

    async fn handle_command(&self, user_id: UserId, cmd: &str) -> Result<Advanced> {
        let mut session = self.sessions.get(user_id).await;
        match cmd {
            "start" => {
                session.wizard = None;
                session.awaiting_address = false;
                nav::reset(&mut session, ScreenId::Start);
                self.save_and_render(session).await.map(Advanced::Render)
            }
            "cart" => {
                nav::push(&mut session, ScreenId::Cart);
                self.save_and_render(session).await.map(Advanced::Render)
            }
            "orders" => {
                nav::push(&mut session, ScreenId::History);
                self.save_and_render(session).await.map(Advanced::Render)
            }
            "admin" => {
                if !self.config.is_admin(user_id) {
                    tracing::warn!(user_id, "admin command from non-admin");
                    let instruction = self.render_screen(&session).await;
                    return Ok(Advanced::Render(prefixed(
                        instruction,
                        "🚫 You don't have access to the admin panel.",
                    )));
                }
                session.wizard = None;
                nav::reset(&mut session, ScreenId::AdminMain);
                self.save_and_render(session).await.map(Advanced::Render)
            }
            "build" => self.start_wizard(session, WizardId::BouquetBuilder).await,
            "recommend" => {
                nav::push(&mut session, ScreenId::AiMenu);
                self.save_and_render(session).await.map(Advanced::Render)
            }
            "cancel" => {
                if session.wizard.is_none() {
                    let instruction = self.render_screen(&session).await;
                    return Ok(Advanced::Render(prefixed(
                        instruction,
                        "Nothing to cancel.",
                    )));
                }
                self.advance_loaded(session, WizardInput::Cancel).await
            }
            "skip" => self.advance_loaded(session, WizardInput::Skip).await,
            other => {
                tracing::debug!(user_id, command = other, "unknown command");
                let instruction = self.render_screen(&session).await;
                Ok(Advanced::Render(prefixed(
                    instruction,
                    &format!("Unknown command /{other}."),
                )))
            }
        }
    }

    // ── Menu actions ────────────────────────────────────────────────

    async fn handle_action(
        &self,
        user_id: UserId,
        action: &Action,
        lock: &Arc<Mutex<()>>,
    ) -> Result<RenderInstruction> {
        match action {
            Action::Checkout => return self.handle_checkout(user_id, lock).await,
            Action::ConfirmOrder { order_id } => {
                let _guard = lock.lock().await;
                return self.handle_confirm(user_id, *order_id).await;
            }
            _ => {}
        }

        let advanced = {
            let _guard = lock.lock().await;
            let mut session = self.sessions.get(user_id).await;
            match action {
                Action::Back => {
                    nav::back(&mut session);
                    session.awaiting_address = false;
                    self.save_and_render(session).await.map(Advanced::Render)?
                }
                Action::GoTo(screen) => {
                    if screen.is_admin() && !self.config.is_admin(user_id) {
                        let instruction = self.render_screen(&session).await;
                        return Ok(prefixed(
                            instruction,
                            "🚫 You don't have access to the admin panel.",
                        ));
                    }
                    nav::push(&mut session, *screen);
                    self.save_and_render(session).await.map(Advanced::Render)?
                }
                Action::StartWizard(id) => {
                    if *id == WizardId::AddCatalogItem && !self.config.is_admin(user_id) {
                        let instruction = self.render_screen(&session).await;
                        return Ok(prefixed(
                            instruction,
                            "🚫 Only admins can add catalog items.",
                        ));
                    }
                    self.start_wizard(session, *id).await?
                }
                Action::WizardChoice { step, choice } => {
                    self.advance_loaded(
                        session,
                        WizardInput::Choice {
                            fingerprint: step.clone(),
                            value: choice.clone(),
                        },
                    )
                    .await?
                }
                Action::CancelWizard => {
                    self.advance_loaded(session, WizardInput::Cancel).await?
                }
                Action::AddCatalogItem { item_id } => {
                    Advanced::Render(self.add_catalog_item(session, *item_id).await?)
                }
                Action::RemoveCartItem { index } => {
                    match cart::remove_item(&mut session, *index) {
                        Ok(_) => {
                            let instruction = self.save_and_render(session).await?;
                            Advanced::Render(prefixed(instruction, "✖️ Item removed."))
                        }
                        Err(CartError::IndexOutOfRange { .. }) => {
                            // Stale remove button after the cart changed.
                            let instruction = self.render_screen(&session).await;
                            Advanced::Render(prefixed(
                                instruction,
                                "⚠️ That item is no longer in the cart.",
                            ))
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                Action::ClearCart => {
                    cart::clear(&mut session);
                    let instruction = self.save_and_render(session).await?;
                    Advanced::Render(prefixed(instruction, "🗑️ Cart cleared."))
                }
                Action::RequestAddress => {
                    session.awaiting_address = true;
                    self.sessions.save(user_id, session).await?;
                    Advanced::Render(
                        RenderInstruction::new(
                            ScreenId::Cart,
                            "📍 Send your delivery address as a message, or share a location.",
                        )
                        .with_back(),
                    )
                }
                Action::Checkout | Action::ConfirmOrder { .. } => unreachable!("handled above"),
            }
        };
        self.resolve(advanced).await
    }

    // ── Free text and location ──────────────────────────────────────

    async fn handle_text(
        &self,
        user_id: UserId,
        text: &str,
        lock: &Arc<Mutex<()>>,
    ) -> Result<RenderInstruction> {
        let advanced = {
            let _guard = lock.lock().await;
            let mut session = self.sessions.get(user_id).await;

            if session.awaiting_address {
                session.delivery_address = Some(text.trim().to_string());
                session.awaiting_address = false;
                nav::push(&mut session, ScreenId::Cart);
                let instruction = self.save_and_render(session).await?;
                Advanced::Render(prefixed(instruction, "📍 Delivery address saved."))
            } else if session.wizard.is_some() {
                self.advance_loaded(session, WizardInput::Text(text.to_string()))
                    .await?
            } else if let Some((occasion, budget)) = parse_request(text) {
                // Direct "occasion: ..., budget: ..." request, no wizard.
                Advanced::Recommend { occasion, budget }
            } else {
                let instruction = self.render_screen(&session).await;
                Advanced::Render(prefixed(
                    instruction,
                    "I didn't catch that. Please use the menu below.",
                ))
            }
        };
        self.resolve(advanced).await
    }

    async fn handle_location(
        &self,
        user_id: UserId,
        lat: f64,
        lon: f64,
        lock: &Arc<Mutex<()>>,
    ) -> Result<RenderInstruction> {
        // Geocoding needs no session state, so it runs before taking the lock.
        let address = match &self.geocoder {
            Some(geocoder) => match geocoder.reverse(lat, lon).await {
                Ok(address) => address,
                Err(e) => {
                    tracing::warn!(user_id, error = %e, "geocoder failed; storing coordinates");
                    coords_fallback(lat, lon)
                }
            },
            None => coords_fallback(lat, lon),
        };

        let _guard = lock.lock().await;
        let mut session = self.sessions.get(user_id).await;
        session.delivery_address = Some(address);
        session.awaiting_address = false;
        nav::push(&mut session, ScreenId::Cart);
        let instruction = self.save_and_render(session).await?;
        Ok(prefixed(instruction, "📍 Delivery address saved."))
    }

    // ── Wizards ─────────────────────────────────────────────────────

    async fn start_wizard(&self, mut session: Session, id: WizardId) -> Result<Advanced> {
        let prompt = self.engine.start(&mut session, id, Utc::now());
        let instruction = prompt_instruction(&session, prompt);
        self.sessions.save(session.user_id, session).await?;
        Ok(Advanced::Render(instruction))
    }

    /// Advance the wizard of an already-loaded session (lock must be held).
    async fn advance_wizard(&self, user_id: UserId, input: WizardInput) -> Result<Advanced> {
        let session = self.sessions.get(user_id).await;
        self.advance_loaded(session, input).await
    }

    async fn advance_loaded(&self, mut session: Session, input: WizardInput) -> Result<Advanced> {
        let user_id = session.user_id;
        match self.engine.advance(&mut session, input, Utc::now()) {
            Ok(AdvanceOutcome::Prompt(prompt)) => {
                let instruction = prompt_instruction(&session, prompt);
                self.sessions.save(user_id, session).await?;
                Ok(Advanced::Render(instruction))
            }
            Ok(AdvanceOutcome::Completed(outcome)) => self.complete_wizard(session, outcome).await,
            Ok(AdvanceOutcome::Cancelled(reason)) => {
                let instruction = self.save_and_render(session).await?;
                let note = match reason {
                    CancelReason::Explicit => "❌ Cancelled.",
                    CancelReason::Expired => "⏰ That took a while, so I closed the wizard. \
                                              Start again whenever you're ready.",
                };
                Ok(Advanced::Render(prefixed(instruction, note)))
            }
            Err(EngineError::NoActiveWizard) => {
                let instruction = self.render_screen(&session).await;
                Ok(Advanced::Render(prefixed(
                    instruction,
                    "There's no active wizard right now.",
                )))
            }
            Err(EngineError::StaleInput { .. }) => {
                // Session untouched; re-prompt the step the user is really on.
                Ok(Advanced::Render(self.reprompt(
                    &session,
                    "⚠️ That button is from an earlier step.",
                )))
            }
            Err(EngineError::Validation(message)) => {
                Ok(Advanced::Render(self.reprompt(&session, &format!("⚠️ {message}"))))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Re-render the current wizard step with a note on top.
    fn reprompt(&self, session: &Session, note: &str) -> RenderInstruction {
        match &session.wizard {
            Some(wizard) => {
                let def = flows::definition(wizard.definition);
                let prompt = self.engine.prompt(def, &wizard.step);
                prefixed(prompt_instruction(session, prompt), note)
            }
            None => RenderInstruction::new(session.current_screen, note.to_string()).with_back(),
        }
    }

    /// Turn a completed wizard's collected fields into a durable effect.
    async fn complete_wizard(&self, session: Session, outcome: WizardOutcome) -> Result<Advanced> {
        match outcome.definition {
            WizardId::BouquetBuilder => self.complete_bouquet(session, outcome).await,
            WizardId::AddCatalogItem => self.complete_catalog_item(session, outcome).await,
            WizardId::AiRecommend => {
                let occasion = outcome
                    .collected
                    .get("occasion")
                    .and_then(FieldValue::as_text)
                    .unwrap_or("any occasion")
                    .to_string();
                let budget = outcome
                    .collected
                    .get("budget")
                    .and_then(FieldValue::as_number)
                    .unwrap_or(self.config.custom_bouquet_base_price);
                // Persist the cleared wizard before the external call.
                self.sessions.save(session.user_id, session).await?;
                Ok(Advanced::Recommend { occasion, budget })
            }
        }
    }

    async fn complete_bouquet(&self, mut session: Session, outcome: WizardOutcome) -> Result<Advanced> {
        let color = outcome
            .collected
            .get("color")
            .and_then(FieldValue::as_text)
            .unwrap_or("mixed")
            .to_string();
        let quantity = outcome
            .collected
            .get("quantity")
            .and_then(FieldValue::as_text)
            .unwrap_or("11")
            .to_string();
        let addons: Vec<String> = match outcome.collected.get("addons") {
            Some(FieldValue::List(items)) => items.clone(),
            _ => Vec::new(),
        };

        let mut descriptor = format!("{color}, {quantity} flowers");
        if !addons.is_empty() {
            descriptor.push_str(&format!(" + {}", addons.join(", ")));
        }

        let unit_price = self.config.custom_bouquet_base_price
            + self.config.addon_price * Decimal::from(addons.len());

        let mut attributes = std::collections::BTreeMap::new();
        attributes.insert("color".to_string(), color);
        attributes.insert("quantity".to_string(), quantity);
        if !addons.is_empty() {
            attributes.insert("addons".to_string(), addons.join(","));
        }

        cart::add_item(
            &mut session,
            CartItem {
                kind: ItemKind::Custom { descriptor },
                attributes,
                unit_price,
            },
        );
        nav::push(&mut session, ScreenId::Cart);
        let instruction = self.save_and_render(session).await?;
        Ok(Advanced::Render(prefixed(
            instruction,
            "✅ Custom bouquet added to the cart!",
        )))
    }

    async fn complete_catalog_item(
        &self,
        mut session: Session,
        outcome: WizardOutcome,
    ) -> Result<Advanced> {
        let name = outcome
            .collected
            .get("name")
            .and_then(FieldValue::as_text)
            .unwrap_or("Unnamed")
            .to_string();
        let description = outcome
            .collected
            .get("description")
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
            .to_string();
        let price = outcome
            .collected
            .get("price")
            .and_then(FieldValue::as_number)
            .unwrap_or(Decimal::ZERO);
        let category = outcome
            .collected
            .get("category")
            .and_then(FieldValue::as_text)
            .map(String::from);
        let photo_ref = outcome
            .collected
            .get("photo")
            .and_then(FieldValue::as_text)
            .map(String::from);

        let item = self
            .catalog
            .insert(NewCatalogItem {
                name,
                description,
                price,
                category,
                photo_ref,
            })
            .await;
        tracing::info!(user_id = session.user_id, item_id = item.id, "catalog item added");

        nav::push(&mut session, ScreenId::AdminMain);
        let instruction = self.save_and_render(session).await?;
        Ok(Advanced::Render(prefixed(
            instruction,
            &format!("✅ \"{}\" added to the catalog (ID {}).", item.name, item.id),
        )))
    }

    /// Recommendation leg, run with the user's lock released. API failures
    /// degrade to a canned suggestion, never to an error reply.
    async fn recommend_response(&self, occasion: &str, budget: Decimal) -> RenderInstruction {
        let suggestion = match self.recommender.recommend(occasion, budget).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "recommender failed; using canned suggestion");
                CannedRecommender::pick()
            }
        };

        RenderInstruction::new(
            ScreenId::AiMenu,
            format!("🤖 For {occasion} with a budget of {budget}₽:\n\n{suggestion}"),
        )
        .with_choice("🎨 Build it", Action::StartWizard(WizardId::BouquetBuilder))
        .with_choice("🌸 Catalog", Action::GoTo(ScreenId::Catalog))
        .with_back()
    }

    // ── Cart and orders ─────────────────────────────────────────────

    async fn add_catalog_item(
        &self,
        mut session: Session,
        item_id: i64,
    ) -> Result<RenderInstruction> {
        let Some(item) = self.catalog.get(item_id).await.filter(|i| i.available) else {
            let instruction = self.render_screen(&session).await;
            return Ok(prefixed(instruction, "⚠️ That item is no longer available."));
        };

        cart::add_item(
            &mut session,
            CartItem {
                kind: ItemKind::Catalog {
                    item_id: item.id,
                    name: item.name.clone(),
                },
                attributes: std::collections::BTreeMap::new(),
                unit_price: item.price,
            },
        );
        let instruction = self.save_and_render(session).await?;
        Ok(prefixed(
            instruction,
            &format!("✅ \"{}\" added to the cart.", item.name),
        ))
    }

    async fn handle_checkout(
        &self,
        user_id: UserId,
        lock: &Arc<Mutex<()>>,
    ) -> Result<RenderInstruction> {
        // Locked: snapshot the cart into a pending order and persist it.
        let order = {
            let _guard = lock.lock().await;
            let mut session = self.sessions.get(user_id).await;
            match cart::checkout(&mut session, Utc::now()) {
                Ok(order) => {
                    self.storage.store_order(&order).await?;
                    self.sessions.save(user_id, session).await?;
                    order
                }
                Err(CartError::EmptyCart) => {
                    let instruction = self.render_screen(&session).await;
                    return Ok(prefixed(instruction, "🛒 Your cart is empty."));
                }
                Err(CartError::MissingAddress) => {
                    return Ok(RenderInstruction::new(
                        ScreenId::Cart,
                        "📍 I need a delivery address before checkout.",
                    )
                    .with_choice("📍 Set delivery address", Action::RequestAddress)
                    .with_back());
                }
                Err(e) => return Err(e.into()),
            }
        };

        // Unlocked: issue the invoice.
        let invoice = self.payments.create_invoice(&order).await;

        // Locked again: re-validate that this order is still the pending one.
        let _guard = lock.lock().await;
        let session = self.sessions.get(user_id).await;
        if session.pending_order != Some(order.id) {
            tracing::info!(user_id, order_id = %order.id, "checkout superseded during invoicing");
            let instruction = self.render_screen(&session).await;
            return Ok(prefixed(
                instruction,
                "⚠️ That checkout is no longer current.",
            ));
        }

        match invoice {
            Ok(invoice_ref) => {
                let mut order = self
                    .storage
                    .load_order(order.id)
                    .await?
                    .ok_or(Error::Cart(CartError::OrderNotFound { id: order.id }))?;
                cart::mark_awaiting_payment(&mut order)?;
                self.storage.store_order(&order).await?;
                tracing::info!(order_id = %order.id, invoice = invoice_ref.external_id, "awaiting payment");
                Ok(RenderInstruction::new(
                    ScreenId::Cart,
                    format!(
                        "💫 Invoice sent! Total: {}₽.\n\n\
                         Pay it in the chat, or confirm here once you have.",
                        order.total_price
                    ),
                )
                .with_choice("✅ I've paid", Action::ConfirmOrder { order_id: order.id })
                .with_back())
            }
            Err(e) => {
                // Order stays pending; offer the manual confirmation path.
                tracing::warn!(user_id, order_id = %order.id, error = %e, "invoice failed");
                Ok(RenderInstruction::new(
                    ScreenId::Cart,
                    format!(
                        "⚠️ Couldn't issue an invoice right now.\n\n\
                         Your order ({}₽) is saved. You can confirm it manually \
                         and we'll arrange payment on delivery.",
                        order.total_price
                    ),
                )
                .with_choice("✅ Confirm order", Action::ConfirmOrder { order_id: order.id })
                .with_back())
            }
        }
    }

    async fn handle_confirm(&self, user_id: UserId, order_id: OrderId) -> Result<RenderInstruction> {
        let mut session = self.sessions.get(user_id).await;
        let order = self.storage.load_order(order_id).await?;
        let Some(mut order) = order.filter(|o| o.user_id == user_id) else {
            let instruction = self.render_screen(&session).await;
            return Ok(prefixed(instruction, "⚠️ Order not found."));
        };

        let first_confirmation = cart::confirm_payment(&mut session, &mut order)?;
        if first_confirmation {
            self.storage.store_order(&order).await?;
            nav::reset(&mut session, ScreenId::Start);
            self.sessions.save(user_id, session).await?;
            Ok(RenderInstruction::new(
                ScreenId::Start,
                format!(
                    "🎉 Order confirmed!\n\n🆔 {}\n💰 {}₽\n📍 {}\n\n\
                     We'll be in touch about delivery. Thank you!",
                    order.id, order.total_price, order.delivery_address
                ),
            )
            .with_choice("🌸 Main menu", Action::GoTo(ScreenId::Start)))
        } else {
            // Duplicate confirmation press: report, change nothing.
            Ok(RenderInstruction::new(
                session.current_screen,
                format!("✅ Order {} is already confirmed.", order.id),
            )
            .with_choice("🌸 Main menu", Action::GoTo(ScreenId::Start)))
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    async fn save_and_render(&self, session: Session) -> Result<RenderInstruction> {
        let user_id = session.user_id;
        let instruction = self.render_screen(&session).await;
        self.sessions.save(user_id, session).await?;
        Ok(instruction)
    }

    async fn render_screen(&self, session: &Session) -> RenderInstruction {
        let screen = session.current_screen;
        match self.registry.get(screen).await {
            Some(renderer) => renderer.render(session, &self.render_ctx).await,
            None => ScreenRegistry::fallback_start(session, screen),
        }
    }
}

/// Wizard prompts render on the session's current screen.
fn prompt_instruction(session: &Session, prompt: StepPrompt) -> RenderInstruction {
    RenderInstruction {
        screen: session.current_screen,
        text: prompt.text,
        choices: prompt.choices,
    }
}

fn prefixed(mut instruction: RenderInstruction, note: &str) -> RenderInstruction {
    instruction.text = format!("{note}\n\n{}", instruction.text);
    instruction
}
