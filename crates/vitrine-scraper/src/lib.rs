pub mod collectors;
pub mod diagnostics;
pub mod embedded;
pub mod error;
pub mod money;
pub mod page;
pub mod rate_limit;
pub mod resolver;
pub mod text;
pub mod tree;
pub mod vtex;

pub use collectors::{CollectContext, CollectorSettings, PriceExtractor, PriceFields, Retailer};
pub use diagnostics::{DiagnosticsSink, FsDiagnostics, NoDiagnostics, PageSnapshot};
pub use error::{PageError, ScraperError};
pub use page::{HttpPage, PageSession, Readiness};
pub use resolver::resolve;
pub use vtex::VtexClient;
