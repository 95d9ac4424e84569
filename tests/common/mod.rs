use std::path::PathBuf;

use quizdeck::data::QuizLibrary;

pub const GEOGRAPHY: &str = r#"{
    "Quiz": "Geography",
    "Question": [
        { "Type": "singlechoice", "Question": "Capital of France?",
          "Answers": { "A": "Berlin", "B": "Paris", "C": "Rome", "D": "Madrid" },
          "Correct": "B" },
        { "Type": "multiplechoice", "Question": "Which are in Europe?",
          "Answers": ["Spain", "Peru", "Norway"], "Correct": [0, 2] },
        { "Type": "word", "Question": "Capital of France, in one word?",
          "Correct": ["Paris"] }
    ]
}"#;

/// Twelve word questions whose answer is their own index.
pub fn counting_document() -> String {
    let questions: Vec<String> = (0..12)
        .map(|i| {
            format!(
                r#"{{ "Type": "word", "Question": "Say {i}", "Correct": ["{i}"] }}"#
            )
        })
        .collect();
    format!(r#"{{ "Quiz": "Counting", "Question": [{}] }}"#, questions.join(","))
}

pub fn create_test_library(documents: &[(&str, &str)]) -> QuizLibrary {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir: PathBuf =
        std::env::temp_dir().join(format!("quizdeck_test_{}_{}", std::process::id(), id));
    // Clean up leftovers from previous runs
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("failed to create quiz directory");
    for (name, json) in documents {
        std::fs::write(dir.join(name), json).expect("failed to write quiz document");
    }
    QuizLibrary::new(dir)
}
