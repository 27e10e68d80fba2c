// Transaction Sequences - Core Library
// Groups flat transaction lists into recurring, evenly spaced sequences

pub mod comparison;
pub mod error;
pub mod loader;
pub mod parser;
pub mod sequence;
pub mod storage;
pub mod transaction;

// Re-export commonly used types
pub use comparison::{compare_iterables, compare_sentences, split_sentence, DEFAULT_SPLITTERS};
pub use error::{Result, SequenceError};
pub use loader::{load_csv, load_json, load_transactions};
pub use parser::{
    parse_sequences, parse_storage, ParserConfig, SequenceParser,
    DEFAULT_MARGIN, MINIMUM_INTERVAL, MINIMUM_TRANSACTIONS, SIMILARITY_RATIO,
};
pub use sequence::TransactionSequence;
pub use storage::{SequenceStorage, SharedStorage};
pub use transaction::{RawTransaction, SequenceId, Transaction};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
