// Humanizer Core Services

pub mod text_processor;
pub mod paragraphs;
pub mod rewrite_cache;
pub mod config_store;
pub mod providers;
pub mod rewriter;
pub mod detection;
pub mod sentences;
pub mod humanizer;
pub mod training_data;

pub use text_processor::preprocess_text;
pub use paragraphs::{paragraph_id, restore_format, split_paragraphs, ParagraphUnit};
pub use rewrite_cache::RewriteCache;
pub use config_store::{AppConfig, ConfigStore};
pub use providers::{ProviderClient, ProviderError};
pub use rewriter::{ChatRewriter, RewriteError, RewriteModel};
pub use detection::{
    detect_paragraphs,
    ChatDetector,
    DetectError,
    DetectionOptions,
    DetectionReport,
    Detector,
    ParagraphScore,
};
pub use sentences::{detect_sentences, split_sentences, SentenceReport};
pub use humanizer::{HumanizeOutcome, Humanizer, ACCEPT_THRESHOLD};
pub use training_data::{TrainingPair, TrainingSet};
