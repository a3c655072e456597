//! The concrete wizard flows.
//!
//! One declarative definition per multi-step conversation. All flows share
//! the single engine interpreter; none registers its own handlers.

use crate::session::model::WizardId;
use crate::wizard::definition::{InputShape, MenuOption, Next, StepDef, WizardDefinition};

/// Custom bouquet builder: color → quantity → add-ons → done.
pub static BOUQUET_BUILDER: WizardDefinition = WizardDefinition {
    id: WizardId::BouquetBuilder,
    entry: "color",
    steps: &[
        StepDef {
            id: "color",
            field: "color",
            prompt: "🎨 Building your bouquet\n\nStep 1/3: pick the main color:",
            input: InputShape::Menu {
                options: &[
                    MenuOption { label: "🔴 Red", value: "red" },
                    MenuOption { label: "🟡 Yellow", value: "yellow" },
                    MenuOption { label: "🔵 Blue", value: "blue" },
                    MenuOption { label: "🟣 Purple", value: "purple" },
                    MenuOption { label: "🟢 Green", value: "green" },
                    MenuOption { label: "⚪ White", value: "white" },
                    MenuOption { label: "🟠 Orange", value: "orange" },
                    MenuOption { label: "🟤 Mix", value: "mix" },
                ],
                multi: false,
            },
            next: Next::Step("quantity"),
        },
        StepDef {
            id: "quantity",
            field: "quantity",
            prompt: "Step 2/3: how many flowers?",
            input: InputShape::Menu {
                options: &[
                    MenuOption { label: "5 flowers", value: "5" },
                    MenuOption { label: "7 flowers", value: "7" },
                    MenuOption { label: "11 flowers", value: "11" },
                    MenuOption { label: "15 flowers", value: "15" },
                    MenuOption { label: "21 flowers", value: "21" },
                    MenuOption { label: "25 flowers", value: "25" },
                ],
                multi: false,
            },
            next: Next::Step("addons"),
        },
        StepDef {
            id: "addons",
            field: "addons",
            prompt: "Step 3/3: pick add-ons (then Done):",
            input: InputShape::Menu {
                options: &[
                    MenuOption { label: "🎀 Ribbon", value: "ribbon" },
                    MenuOption { label: "🎁 Deluxe wrap", value: "deluxe_wrap" },
                    MenuOption { label: "🧸 Plush toy", value: "plush_toy" },
                    MenuOption { label: "🍫 Chocolates", value: "chocolates" },
                    MenuOption { label: "✅ Done", value: "done" },
                ],
                multi: true,
            },
            next: Next::Complete,
        },
    ],
};

/// Admin flow: add one catalog item.
pub static ADD_CATALOG_ITEM: WizardDefinition = WizardDefinition {
    id: WizardId::AddCatalogItem,
    entry: "name",
    steps: &[
        StepDef {
            id: "name",
            field: "name",
            prompt: "➕ New catalog item\n\nStep 1/5: item name:",
            input: InputShape::FreeText,
            next: Next::Step("description"),
        },
        StepDef {
            id: "description",
            field: "description",
            prompt: "Step 2/5: description:",
            input: InputShape::FreeText,
            next: Next::Step("price"),
        },
        StepDef {
            id: "price",
            field: "price",
            prompt: "Step 3/5: price:",
            input: InputShape::Number { max: None },
            next: Next::Step("category"),
        },
        StepDef {
            id: "category",
            field: "category",
            prompt: "Step 4/5: category (roses, tulips, peonies, mixed, ...):",
            input: InputShape::FreeText,
            next: Next::Step("photo"),
        },
        StepDef {
            id: "photo",
            field: "photo",
            prompt: "Step 5/5: send a photo (or /skip):",
            input: InputShape::Photo { skippable: true },
            next: Next::Complete,
        },
    ],
};

/// AI recommendation intake: occasion → budget.
pub static AI_RECOMMEND: WizardDefinition = WizardDefinition {
    id: WizardId::AiRecommend,
    entry: "occasion",
    steps: &[
        StepDef {
            id: "occasion",
            field: "occasion",
            prompt: "🤖 AI recommendation\n\nWhat's the occasion?",
            input: InputShape::Menu {
                options: &[
                    MenuOption { label: "🎂 Birthday", value: "birthday" },
                    MenuOption { label: "💍 Wedding", value: "wedding" },
                    MenuOption { label: "❤️ Romance", value: "romance" },
                    MenuOption { label: "🌸 Just because", value: "other" },
                ],
                multi: false,
            },
            next: Next::Step("budget"),
        },
        StepDef {
            id: "budget",
            field: "budget",
            prompt: "And your budget?",
            input: InputShape::Number { max: None },
            next: Next::Complete,
        },
    ],
};

/// Look up the definition for a wizard id.
pub fn definition(id: WizardId) -> &'static WizardDefinition {
    match id {
        WizardId::BouquetBuilder => &BOUQUET_BUILDER,
        WizardId::AddCatalogItem => &ADD_CATALOG_ITEM,
        WizardId::AiRecommend => &AI_RECOMMEND,
    }
}
