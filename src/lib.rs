//! Cart page detection and cart-total extraction from arbitrary shop markup,
//! with debounced re-detection as the page changes.

pub mod cart_shame;
pub mod classifier;
pub mod config;
pub mod detector;
pub mod error;
pub mod models;
pub mod page;
pub mod price;
pub mod selectors;
pub mod sites;
pub mod tracking;
pub mod traits;
pub mod watcher;

pub use cart_shame::{CartReport, CartShame};
pub use classifier::is_cart_page;
pub use detector::{OverridePolicy, TotalDetector, find_by_text_proximity};
pub use models::{CartView, DetectionResult, PageSnapshot, Provenance};
pub use price::parse_price;
pub use selectors::SelectorCatalog;
pub use sites::SiteOverrideRegistry;
pub use watcher::{ChangeWatcher, Mutation, WatchHandle};
