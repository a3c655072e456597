//! Bouquet recommendation service.
//!
//! The real backend is Perplexity's chat completions API; `CannedRecommender`
//! serves a random pre-written suggestion and is also the fallback the
//! dispatcher uses when the API call fails.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use regex::Regex;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use std::sync::OnceLock;

use crate::error::CollaboratorError;

/// Suggests a bouquet for an occasion and budget.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(&self, occasion: &str, budget: Decimal) -> Result<String, CollaboratorError>;
}

/// Parse a free-text request like `occasion: birthday, budget: 2000`.
///
/// Returns `None` when the text doesn't follow the pattern; the caller then
/// walks the user through the wizard instead.
pub fn parse_request(text: &str) -> Option<(String, Decimal)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)occasion:\s*([^,]+),\s*budget:\s*(\d+(?:\.\d+)?)")
            .unwrap_or_else(|_| Regex::new("$^").unwrap())
    });
    let caps = re.captures(text)?;
    let occasion = caps.get(1)?.as_str().trim().to_string();
    let budget: Decimal = caps.get(2)?.as_str().parse().ok()?;
    Some((occasion, budget))
}

/// Perplexity-backed recommender.
pub struct PerplexityRecommender {
    api_key: secrecy::SecretString,
    model: String,
    client: reqwest::Client,
}

impl PerplexityRecommender {
    pub fn new(api_key: secrecy::SecretString, model: impl Into<String>) -> Self {
        Self {
            api_key,
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Recommender for PerplexityRecommender {
    async fn recommend(&self, occasion: &str, budget: Decimal) -> Result<String, CollaboratorError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a florist assistant. Suggest one concrete bouquet \
                                (flowers, colors, size) within the budget, in 2-3 sentences."
                },
                {
                    "role": "user",
                    "content": format!("Occasion: {occasion}. Budget: {budget} RUB.")
                }
            ],
            "max_tokens": 300,
        });

        let resp = self
            .client
            .post("https://api.perplexity.ai/chat/completions")
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| CollaboratorError::Recommendation(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CollaboratorError::Recommendation(format!(
                "API returned {}",
                resp.status()
            )));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| CollaboratorError::Recommendation(e.to_string()))?;

        data.pointer("/choices/0/message/content")
            .and_then(serde_json::Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CollaboratorError::Recommendation("empty completion".into()))
    }
}

/// Canned suggestions, randomly picked. Used standalone and as the fallback
/// when the API recommender fails.
pub struct CannedRecommender;

static CANNED: &[&str] = &[
    "A classic bouquet of 11 red roses with eucalyptus. Timeless and always appreciated.",
    "A bright mix of gerberas and chrysanthemums in warm tones, wrapped in kraft paper.",
    "White lilies with greenery accents. Elegant and fragrant, great for a formal occasion.",
    "A compact bouquet of peonies and ranunculus in pastel shades. Soft and romantic.",
    "Sunflowers with solidago and a satin ribbon. Cheerful and hard to go wrong with.",
];

impl CannedRecommender {
    pub fn pick() -> String {
        let mut rng = rand::thread_rng();
        CANNED
            .choose(&mut rng)
            .copied()
            .unwrap_or(CANNED[0])
            .to_string()
    }
}

#[async_trait]
impl Recommender for CannedRecommender {
    async fn recommend(
        &self,
        _occasion: &str,
        _budget: Decimal,
    ) -> Result<String, CollaboratorError> {
        Ok(Self::pick())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_request_happy_path() {
        let (occasion, budget) = parse_request("occasion: birthday, budget: 2000").unwrap();
        assert_eq!(occasion, "birthday");
        assert_eq!(budget, dec!(2000));
    }

    #[test]
    fn parse_request_is_case_insensitive_and_trims() {
        let (occasion, budget) = parse_request("Occasion:  wedding day , Budget: 3500.50").unwrap();
        assert_eq!(occasion, "wedding day");
        assert_eq!(budget, dec!(3500.50));
    }

    #[test]
    fn parse_request_rejects_other_text() {
        assert!(parse_request("hello there").is_none());
        assert!(parse_request("occasion: birthday").is_none());
        assert!(parse_request("budget: 2000").is_none());
        assert!(parse_request("occasion: x, budget: lots").is_none());
    }

    #[tokio::test]
    async fn canned_recommender_always_answers() {
        let text = CannedRecommender
            .recommend("birthday", dec!(2000))
            .await
            .unwrap();
        assert!(!text.is_empty());
        assert!(CANNED.contains(&text.as_str()));
    }
}
