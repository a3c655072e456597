//! Configuration types.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot name for identification.
    pub name: String,
    /// Wizards inactive longer than this are cancelled on the next input.
    pub wizard_timeout: Duration,
    /// Upper bound for any user-entered price (admin item price, budget).
    pub price_ceiling: Decimal,
    /// Base price for a custom-built bouquet.
    pub custom_bouquet_base_price: Decimal,
    /// Price added per selected add-on.
    pub addon_price: Decimal,
    /// Telegram user ids with admin access. Empty = everyone (dev mode).
    pub admin_ids: Vec<i64>,
    /// How many orders/users the admin screens show.
    pub admin_list_limit: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "bloom-bot".to_string(),
            wizard_timeout: Duration::from_secs(600), // 10 minutes
            price_ceiling: dec!(100_000),
            custom_bouquet_base_price: dec!(2500),
            addon_price: dec!(350),
            admin_ids: Vec::new(),
            admin_list_limit: 20,
        }
    }
}

impl BotConfig {
    /// Build a config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(secs) = std::env::var("BLOOM_WIZARD_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse::<u64>()
        {
            config.wizard_timeout = Duration::from_secs(secs);
        }
        if let Ok(ceiling) = std::env::var("BLOOM_PRICE_CEILING")
            && let Ok(ceiling) = ceiling.parse::<Decimal>()
        {
            config.price_ceiling = ceiling;
        }
        if let Ok(base) = std::env::var("BLOOM_BOUQUET_BASE_PRICE")
            && let Ok(base) = base.parse::<Decimal>()
        {
            config.custom_bouquet_base_price = base;
        }
        if let Ok(ids) = std::env::var("BLOOM_ADMIN_IDS") {
            config.admin_ids = ids
                .split(',')
                .filter_map(|s| s.trim().parse::<i64>().ok())
                .collect();
        }

        config
    }

    /// Check if a user has admin access.
    ///
    /// Matches the source policy: an empty admin list allows everyone.
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.is_empty() || self.admin_ids.contains(&user_id)
    }
}
