mod loader;

pub use loader::{
    load_quiz_document, parse_quiz, DocumentError, DocumentFormat, LoadError, QuizLibrary,
};
