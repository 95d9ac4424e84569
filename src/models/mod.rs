mod question;

pub use question::{
    LabeledOption, Question, QuestionKind, QuestionType, Quiz, CHOICE_LABELS, DEFAULT_TITLE,
};
