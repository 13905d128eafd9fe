// Sorting Hat 2.0 - Core Library
// Exposes all modules for use in the CLI and tests

pub mod auth;
pub mod error;
pub mod generation;
pub mod houses;
pub mod quiz;
pub mod sorting;
pub mod store;

// Re-export commonly used types
pub use auth::{
    validate_registration, Credentials, RegistrationRequest, SessionManager, ValidationError,
    ValidationResult,
};
pub use error::{AuthError, GenerationError};
pub use generation::{parse_generated, GeminiClient, GenerationResult};
pub use houses::{House, HouseScores, ALL_HOUSES};
pub use quiz::{score_houses, static_questions, QuizQuestion, QuizSubmission};
pub use sorting::{
    keyword_scores, ClassificationResult, SortingEngine, ANSWER_BONUS, NOISE_CEILING,
    PERSONALITY_BONUS,
};
pub use store::{open_database, setup_database, UserRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
