pub mod aggregator;
pub mod analyzer;
pub mod burst_detector;
pub mod line_parser;
pub mod pattern_matcher;
pub mod reporter;
pub mod signature;


pub use aggregator::{AggregationState, Aggregator, ErrorBucket, ErrorMark, SignatureStats};
pub use analyzer::{AnalysisSession, LogAnalyzer};
pub use burst_detector::{detect_bursts, detect_clusters};
pub use line_parser::{LineParser, ParseFailure, ParseOutcome};
pub use pattern_matcher::{SeverityMatch, SeverityMatcher};
pub use reporter::build_report;
pub use signature::SignatureNormalizer;
