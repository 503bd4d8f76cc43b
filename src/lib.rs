// gigstore - Freelance gig/proposal generator with a local result log and CSV/JSON export

pub mod config;
pub mod export;
pub mod filter;
pub mod generate;
pub mod json;
pub mod record;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use export::{ExportOutcome, Exporter, ResultsTable, list};
pub use filter::PlatformFilter;
pub use generate::{CommandSuggester, Generated, Generator, GigRequest, NoSuggester, ProposalRequest, TitleSuggester};
pub use record::{GeneratedRecord, Platform, now_timestamp};
pub use store::Store;
