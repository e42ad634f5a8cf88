//! paperlens-ingestion — Structural extraction over raw paper text.
//! Covers the analysis half of the engine:
//! - Ordered matcher pipeline shared by the scanners
//! - Section segmentation and title detection
//! - Citation extraction and reference-list resolution
//! - Figure/table caption location
//! - Mathematical content detection and equation reading
//! - Keyword extraction
//! - The analysis pipeline that merges all of the above

pub mod matcher;
pub mod segmenter;
pub mod title;
pub mod references;
pub mod citations;
pub mod figures;
pub mod math;
pub mod interpret;
pub mod keywords;
pub mod pipeline;

pub use citations::{CitationExtractor, CitationScan};
pub use figures::{FigureLocator, FigureScan};
pub use keywords::KeywordExtractor;
pub use math::MathDetector;
pub use pipeline::{analyze_document, Analyzer};
pub use references::Bibliography;
pub use segmenter::{HeadingCatalogue, HeadingMark, SectionSegmenter, Segmentation};
