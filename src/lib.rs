/// Karaoke Prompts - a party-game topic generator for karaoke singers
///
/// Draws one to three constraints (era, genre, first kana, ...) from a
/// catalog, pairs a lone constraint with a special challenge prompt, and
/// reveals the result through a timed spin / slow / staggered-reveal cycle.
///
/// # Example
///
/// ```
/// # tokio_test::block_on(async {
/// use karaoke_prompts::{parse_catalog, Session, SessionOptions};
/// use std::sync::Arc;
///
/// let catalog = parse_catalog("era\n\t90s\n\t2000s\n\tfree\n\n$special\n\tShout\n").unwrap();
/// let session = Session::new(Arc::new(catalog), SessionOptions::seeded(42));
/// let cycle = session.generate_standard().unwrap();
/// let snapshot = session.wait_revealed(cycle).await;
/// for item in snapshot.revealed_items() {
///     println!("{}", item);
/// }
/// # });
/// ```
pub mod catalog;
pub mod chance;
pub mod diagnostic;
pub mod generator;
pub mod loader;
pub mod parser;
pub mod pool;
pub mod prompt;
pub mod reveal;
pub mod schedule;
pub mod session;
pub mod span;

#[cfg(feature = "builtin-catalog")]
pub mod builtin_catalog;

use std::sync::Arc;
use thiserror::Error;

/// Re-export main types for convenience
pub use catalog::{Catalog, CatalogBuilder, CatalogError, Category};
pub use chance::{Chance, Scripted};
pub use generator::Generator;
pub use loader::{CatalogLoader, LoadError};
pub use parser::ParseError;
pub use pool::SpecialPool;
pub use prompt::{GenerationResult, PromptItem, Slot};
pub use reveal::{Cycle, RevealState};
pub use schedule::Timing;
pub use session::{Mode, Session, SessionError, SessionOptions, Snapshot, SpecialEntry};

/// Combined error type for the crate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KaraokeError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Parse and validate a catalog written in the catalog text format
///
/// # Example
/// ```
/// use karaoke_prompts::parse_catalog;
///
/// let catalog = parse_catalog("genre\n\tpop\n\tfree\n$special\n\tShout\n").unwrap();
/// assert_eq!(catalog.categories()[0].name(), "genre");
/// ```
pub fn parse_catalog(source: &str) -> Result<Catalog, ParseError> {
    parser::parse(source)?.into_catalog()
}

/// The catalog of the original party game
#[cfg(feature = "builtin-catalog")]
pub fn default_catalog() -> Result<Arc<Catalog>, KaraokeError> {
    Ok(Arc::new(parse_catalog(builtin_catalog::DEFAULT)?))
}

/// Create a session with deterministic draws
pub fn session_with_seed(catalog: Arc<Catalog>, seed: u64) -> Session {
    Session::new(catalog, SessionOptions::seeded(seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "builtin-catalog")]
    #[test]
    fn test_default_catalog() {
        let catalog = default_catalog().unwrap();
        let names: Vec<_> = catalog.categories().iter().map(|c| c.name()).collect();
        assert_eq!(names, ["年代", "ジャンル", "先頭文字"]);
        assert_eq!(catalog.free(), "自由");
        assert_eq!(catalog.unconstrained(), "縛りなし");
        assert_eq!(catalog.category("先頭文字").unwrap().choice_count(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_sessions_agree() {
        let catalog = Arc::new(
            parse_catalog("A\n\ta1\n\ta2\n\tfree\nB\n\tb1\n\tb2\n\tfree\nC\n\tc1\n\tfree\n$special\n\ts1\n\ts2\n\ts3\n")
                .unwrap(),
        );
        let first = session_with_seed(catalog.clone(), 777);
        let second = session_with_seed(catalog, 777);

        for _ in 0..5 {
            let a = first.generate_standard().unwrap();
            let b = second.generate_standard().unwrap();
            let a = first.wait_revealed(a).await;
            let b = second.wait_revealed(b).await;
            assert_eq!(a.result, b.result);
        }
    }

    #[test]
    fn test_error_conversion() {
        let err: KaraokeError = parse_catalog("A\n").unwrap_err().into();
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn test_session_error_reported_plainly() {
        fn start(session: &Session) -> Result<Cycle, KaraokeError> {
            Ok(session.generate_standard()?)
        }

        let catalog = Arc::new(parse_catalog("A\n\ta1\n\tfree\n$special\n\ts1\n").unwrap());
        let err = start(&session_with_seed(catalog, 1)).unwrap_err();
        assert_eq!(err, KaraokeError::Session(SessionError::NoRuntime));

        let report = diagnostic::report_error("party.catalog", "", &err);
        assert_eq!(report, "Error: Session error: a session needs a running tokio runtime\n");
    }
}
