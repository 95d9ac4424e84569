use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{LabeledOption, Question, QuestionKind, Quiz, CHOICE_LABELS, DEFAULT_TITLE};

/// Extensions tried, in order, when a quiz is named without one.
const QUIZ_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Syntax of a quiz document, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Error loading a quiz document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("quiz '{name}' not found")]
    NotFound { name: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse '{name}': {source}")]
    Parse {
        name: String,
        #[source]
        source: DocumentError,
    },

    #[error("'{name}', question {position}: {reason}")]
    Invalid {
        name: String,
        position: usize,
        reason: String,
    },
}

/// A directory of quiz documents, one `.json`, `.yaml` or `.yml` file per quiz.
#[derive(Debug, Clone)]
pub struct QuizLibrary {
    dir: PathBuf,
}

impl QuizLibrary {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File names of every quiz in the directory, sorted.
    pub fn list(&self) -> Result<Vec<String>, LoadError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| LoadError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| has_quiz_extension(name))
            .collect();
        names.sort();

        Ok(names)
    }

    /// Load a quiz by file name. Without an extension the first existing
    /// `.json`, `.yaml` or `.yml` file wins.
    pub fn load(&self, name: &str) -> Result<Quiz, LoadError> {
        let not_found = || LoadError::NotFound {
            name: name.to_string(),
        };

        if !is_plain_name(name) {
            return Err(not_found());
        }

        let path = if has_quiz_extension(name) {
            Some(self.dir.join(name)).filter(|path| path.is_file())
        } else {
            QUIZ_EXTENSIONS
                .iter()
                .map(|ext| self.dir.join(format!("{}.{}", name, ext)))
                .find(|path| path.is_file())
        };

        load_quiz_document(path.ok_or_else(not_found)?)
    }
}

/// Load a single quiz document from a path.
pub fn load_quiz_document<P: AsRef<Path>>(path: P) -> Result<Quiz, LoadError> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_quiz(&name, &content)
}

/// Parse a quiz document. `name` labels errors, and its extension picks the
/// syntax (JSON when it has none).
pub fn parse_quiz(name: &str, content: &str) -> Result<Quiz, LoadError> {
    let format = DocumentFormat::from_name(name).unwrap_or(DocumentFormat::Json);
    let raw: RawQuiz = match format {
        DocumentFormat::Json => serde_json::from_str(content).map_err(DocumentError::from),
        DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(DocumentError::from),
    }
    .map_err(|source| LoadError::Parse {
        name: name.to_string(),
        source,
    })?;

    let questions = raw
        .questions
        .into_vec()
        .into_iter()
        .enumerate()
        .map(|(i, q)| {
            q.into_question().map_err(|reason| LoadError::Invalid {
                name: name.to_string(),
                position: i + 1,
                reason,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Quiz::new(raw.title, questions))
}

#[derive(Deserialize)]
struct RawQuiz {
    #[serde(rename = "Quiz", default = "default_title")]
    title: String,
    #[serde(rename = "Question", default)]
    questions: OneOrMany<RawQuestion>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

/// Documents may hold a single object where a list is expected.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

#[derive(Deserialize)]
struct RawQuestion {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Question", default)]
    prompt: String,
    #[serde(rename = "Answers", default)]
    answers: Value,
    #[serde(rename = "Correct", default)]
    correct: Value,
}

impl RawQuestion {
    fn into_question(self) -> Result<Question, String> {
        let kind = match self.kind.as_str() {
            "singlechoice" => single_choice(self.answers, self.correct)?,
            "multiplechoice" => multi_choice(self.answers, self.correct)?,
            "word" => word(self.correct)?,
            other => QuestionKind::Unsupported {
                declared: other.to_string(),
            },
        };

        Ok(Question {
            prompt: self.prompt,
            kind,
        })
    }
}

fn single_choice(answers: Value, correct: Value) -> Result<QuestionKind, String> {
    let Value::Object(map) = answers else {
        return Err("single choice answers must map labels to text".to_string());
    };

    if map.is_empty() || map.len() > CHOICE_LABELS.len() {
        return Err(format!(
            "single choice needs 1 to {} options, found {}",
            CHOICE_LABELS.len(),
            map.len()
        ));
    }

    if let Some(label) = map.keys().find(|l| !CHOICE_LABELS.contains(&l.as_str())) {
        return Err(format!("unknown option label '{}'", label));
    }

    let options: Vec<LabeledOption> = CHOICE_LABELS
        .iter()
        .filter_map(|label| map.get(*label).map(|text| LabeledOption::new(*label, text_of(text))))
        .collect();

    let correct = match correct {
        Value::String(label) => label,
        _ => return Err("single choice needs one correct label".to_string()),
    };

    if !options.iter().any(|o| o.label == correct) {
        return Err(format!("correct label '{}' is not an option", correct));
    }

    Ok(QuestionKind::SingleChoice { options, correct })
}

fn multi_choice(answers: Value, correct: Value) -> Result<QuestionKind, String> {
    let Value::Array(items) = answers else {
        return Err("multiple choice answers must be a list".to_string());
    };
    let options: Vec<String> = items.iter().map(text_of).collect();

    let indices: OneOrMany<usize> = serde_json::from_value(correct)
        .map_err(|_| "multiple choice needs a list of correct option indices".to_string())?;
    let correct: BTreeSet<usize> = indices.into_vec().into_iter().collect();

    if let Some(index) = correct.iter().find(|&&i| i >= options.len()) {
        return Err(format!(
            "correct index {} is outside {} options",
            index,
            options.len()
        ));
    }

    Ok(QuestionKind::MultiChoice { options, correct })
}

fn word(correct: Value) -> Result<QuestionKind, String> {
    let accepted: Vec<String> = match correct {
        Value::Array(items) => items.iter().map(text_of).collect(),
        Value::Null => Vec::new(),
        other => vec![text_of(&other)],
    };

    if accepted.is_empty() {
        return Err("word question needs at least one accepted answer".to_string());
    }

    Ok(QuestionKind::Word { accepted })
}

/// Strings as-is, anything else (numbers, booleans) in its JSON form.
/// YAML scalars arrive here as the same values.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn has_quiz_extension(name: &str) -> bool {
    DocumentFormat::from_name(name).is_some()
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\'])
        && !name.contains("..")
        && !name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPITALS: &str = r#"{
        "Quiz": "Capitals",
        "Question": [
            { "Type": "singlechoice", "Question": "Capital of France?",
              "Answers": { "A": "Lyon", "B": "Paris", "C": "Nice" }, "Correct": "B" },
            { "Type": "multiplechoice", "Question": "Primes?",
              "Answers": ["2", "4", 5], "Correct": [0, 2] },
            { "Type": "word", "Question": "6 * 7?", "Correct": ["42", 42] }
        ]
    }"#;

    const CAPITALS_YAML: &str = "
Quiz: Capitals
Question:
  - Type: singlechoice
    Question: Capital of France?
    Answers:
      A: Lyon
      B: Paris
      C: Nice
    Correct: B
  - Type: multiplechoice
    Question: Primes?
    Answers: ['2', '4', 5]
    Correct: [0, 2]
  - Type: word
    Question: 6 * 7?
    Correct: ['42', 42]
";

    #[test]
    fn test_format_follows_extension() {
        assert_eq!(DocumentFormat::from_name("a.json"), Some(DocumentFormat::Json));
        assert_eq!(DocumentFormat::from_name("a.yaml"), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_name("a.YML"), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_name("a.txt"), None);
        assert_eq!(DocumentFormat::from_name("capitals"), None);
    }

    #[test]
    fn test_yaml_matches_json() {
        let from_yaml = parse_quiz("capitals.yaml", CAPITALS_YAML).unwrap();
        let from_json = parse_quiz("capitals.json", CAPITALS).unwrap();
        assert_eq!(from_yaml, from_json);

        let single = parse_quiz(
            "one.yml",
            "Question:\n  Type: word\n  Question: Hi?\n  Correct: [hello]\n",
        )
        .unwrap();
        assert_eq!(single.title, DEFAULT_TITLE);
        assert_eq!(single.questions, vec![Question::word("Hi?", &["hello"])]);

        assert!(matches!(
            parse_quiz("broken.yaml", "Question: [unclosed"),
            Err(LoadError::Parse {
                source: DocumentError::Yaml(_),
                ..
            })
        ));
    }

    #[test]
    fn test_parse_all_question_types() {
        let quiz = parse_quiz("capitals.json", CAPITALS).unwrap();
        assert_eq!(quiz.title, "Capitals");
        assert_eq!(quiz.questions.len(), 3);

        assert_eq!(
            quiz.questions[0],
            Question::single_choice(
                "Capital of France?",
                &[("A", "Lyon"), ("B", "Paris"), ("C", "Nice")],
                "B"
            )
        );
        assert_eq!(
            quiz.questions[1],
            Question::multi_choice("Primes?", &["2", "4", "5"], &[0, 2])
        );
        assert_eq!(quiz.questions[2], Question::word("6 * 7?", &["42", "42"]));
    }

    #[test]
    fn test_single_question_object_and_default_title() {
        let quiz = parse_quiz(
            "one.json",
            r#"{ "Question": { "Type": "word", "Question": "Hi?", "Correct": ["hello"] } }"#,
        )
        .unwrap();
        assert_eq!(quiz.title, DEFAULT_TITLE);
        assert_eq!(quiz.questions, vec![Question::word("Hi?", &["hello"])]);
    }

    #[test]
    fn test_unknown_type_loads_as_unsupported() {
        let quiz = parse_quiz(
            "odd.json",
            r#"{ "Question": [{ "Type": "essay", "Question": "Discuss." }] }"#,
        )
        .unwrap();
        assert_eq!(
            quiz.questions[0].kind,
            QuestionKind::Unsupported {
                declared: "essay".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_documents() {
        let bad_label = r#"{ "Question": { "Type": "singlechoice",
            "Answers": { "A": "x", "E": "y" }, "Correct": "A" } }"#;
        assert!(matches!(
            parse_quiz("q.json", bad_label),
            Err(LoadError::Invalid { position: 1, .. })
        ));

        let missing_correct = r#"{ "Question": { "Type": "singlechoice",
            "Answers": { "A": "x", "B": "y" }, "Correct": "C" } }"#;
        assert!(matches!(
            parse_quiz("q.json", missing_correct),
            Err(LoadError::Invalid { .. })
        ));

        let out_of_range = r#"{ "Question": [
            { "Type": "word", "Correct": ["ok"] },
            { "Type": "multiplechoice", "Answers": ["x"], "Correct": [3] } ] }"#;
        assert!(matches!(
            parse_quiz("q.json", out_of_range),
            Err(LoadError::Invalid { position: 2, .. })
        ));

        assert!(matches!(
            parse_quiz("q.json", "{ not json"),
            Err(LoadError::Parse { .. })
        ));
    }

    #[test]
    fn test_plain_names_only() {
        assert!(is_plain_name("capitals.json"));
        assert!(is_plain_name("capitals"));
        assert!(!is_plain_name("../secret.json"));
        assert!(!is_plain_name("nested/quiz.json"));
        assert!(!is_plain_name(""));
    }

    #[test]
    fn test_library_list_and_load() {
        let dir =
            std::env::temp_dir().join(format!("quizdeck_loader_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("capitals.json"), CAPITALS).unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let library = QuizLibrary::new(&dir);
        assert_eq!(library.list().unwrap(), vec!["capitals.json".to_string()]);
        assert_eq!(library.load("capitals").unwrap().title, "Capitals");
        assert_eq!(library.load("capitals.json").unwrap().questions.len(), 3);
        assert!(matches!(
            library.load("missing.json"),
            Err(LoadError::NotFound { .. })
        ));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_library_serves_yaml_documents() {
        let dir = std::env::temp_dir()
            .join(format!("quizdeck_loader_yaml_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("capitals.yaml"), CAPITALS_YAML).unwrap();
        fs::write(dir.join("short.yml"), CAPITALS_YAML).unwrap();
        fs::write(dir.join("alpha.json"), CAPITALS).unwrap();

        let library = QuizLibrary::new(&dir);
        assert_eq!(
            library.list().unwrap(),
            vec![
                "alpha.json".to_string(),
                "capitals.yaml".to_string(),
                "short.yml".to_string()
            ]
        );
        assert_eq!(library.load("capitals").unwrap().title, "Capitals");
        assert_eq!(library.load("short").unwrap().questions.len(), 3);
        assert_eq!(library.load("capitals.yaml").unwrap().questions.len(), 3);

        let _ = fs::remove_dir_all(&dir);
    }
}
