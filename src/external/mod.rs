//! External collaborators: recommendation, payments, geocoding.
//!
//! Each collaborator is a trait so the dispatcher can be tested with stubs.
//! Calls to these services happen with the per-user session lock released.

pub mod geocode;
pub mod payment;
pub mod recommend;

pub use geocode::{Geocoder, YandexGeocoder, coords_fallback};
pub use payment::{InvoiceRef, MockPaymentProvider, PaymentProvider, TelegramStarsProvider};
pub use recommend::{CannedRecommender, PerplexityRecommender, Recommender, parse_request};
