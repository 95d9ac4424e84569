mod common;

use std::collections::BTreeSet;

use quizdeck::engine::{
    self, AnswerSlot, QuestionBody, ReplayTokenError, Submission, SubmittedAnswer, Verdict,
};
use quizdeck::protocol::QuestionView;
use rand::rngs::StdRng;
use rand::SeedableRng;

use common::{counting_document, create_test_library, GEOGRAPHY};

/// Answer by option text, the way a player reading the screen would.
fn answer_by_text(view: &QuestionView, word: &str) -> SubmittedAnswer {
    match &view.body {
        QuestionBody::SingleChoice { options } => SubmittedAnswer::SingleChoice {
            label: options
                .iter()
                .find(|o| o.text == "Paris")
                .map(|o| o.label.clone()),
        },
        QuestionBody::MultiChoice { options } => SubmittedAnswer::MultiChoice {
            indices: options
                .iter()
                .enumerate()
                .filter(|(_, text)| *text == "Spain" || *text == "Norway")
                .map(|(i, _)| i)
                .collect::<BTreeSet<_>>(),
        },
        _ => SubmittedAnswer::Word {
            text: word.to_string(),
        },
    }
}

fn submit(views: &[QuestionView], selection: &str, word: &str) -> Submission {
    Submission {
        selection: Some(selection.to_string()),
        answers: views
            .iter()
            .map(|view| AnswerSlot {
                position: view.position,
                answer_key: view.answer_key.clone(),
                answer: answer_by_text(view, word),
            })
            .collect(),
    }
}

#[test]
fn test_answering_by_text_scores_full_marks() {
    let library = create_test_library(&[("geography.json", GEOGRAPHY)]);
    let quiz = library.load("geography").expect("failed to load quiz");

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let rendered = engine::render(&quiz, 10, &mut rng);
        let views: Vec<QuestionView> = rendered.questions.iter().map(QuestionView::from).collect();

        let submission = submit(&views, &rendered.selection_token(), " Paris ");
        let evaluation =
            engine::evaluate(&quiz, &submission, 10, &mut rng).expect("submission should replay");

        assert_eq!((evaluation.score, evaluation.total), (3, 3), "seed {seed}");
        assert!(!evaluation.reselected);
    }
}

#[test]
fn test_word_answers_are_case_sensitive() {
    let library = create_test_library(&[("geography.json", GEOGRAPHY)]);
    let quiz = library.load("geography.json").expect("failed to load quiz");
    let mut rng = StdRng::seed_from_u64(7);

    let rendered = engine::render(&quiz, 10, &mut rng);
    let views: Vec<QuestionView> = rendered.questions.iter().map(QuestionView::from).collect();
    let submission = submit(&views, &rendered.selection_token(), "paris");

    let evaluation = engine::evaluate(&quiz, &submission, 10, &mut rng).unwrap();
    assert_eq!(evaluation.score, 2);

    let word = evaluation
        .outcomes
        .iter()
        .find(|o| o.prompt.starts_with("Capital of France, in one word"))
        .unwrap();
    assert_eq!(word.verdict, Verdict::Incorrect);
    assert_eq!(word.expected_answer, "Paris");
}

#[test]
fn test_non_numeric_selection_is_rejected() {
    let library = create_test_library(&[("geography.json", GEOGRAPHY)]);
    let quiz = library.load("geography").unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let submission = Submission {
        selection: Some("abc".to_string()),
        answers: Vec::new(),
    };

    assert!(matches!(
        engine::evaluate(&quiz, &submission, 10, &mut rng),
        Err(ReplayTokenError::NonNumericIndex { .. })
    ));
}

#[test]
fn test_selection_respects_cap_without_repeats() {
    let document = counting_document();
    let library = create_test_library(&[("counting.json", &document)]);
    let quiz = library.load("counting").unwrap();
    assert_eq!(quiz.questions.len(), 12);

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let rendered = engine::render(&quiz, 10, &mut rng);

        let drawn: BTreeSet<usize> = rendered.questions.iter().map(|q| q.pool_index).collect();
        assert_eq!(rendered.questions.len(), 10);
        assert_eq!(drawn.len(), 10, "seed {seed}");
        assert!(drawn.iter().all(|&i| i < 12));

        let views: Vec<QuestionView> = rendered.questions.iter().map(QuestionView::from).collect();
        let submission = Submission {
            selection: Some(rendered.selection_token()),
            answers: views
                .iter()
                .zip(&rendered.questions)
                .map(|(view, question)| AnswerSlot {
                    position: view.position,
                    answer_key: view.answer_key.clone(),
                    answer: SubmittedAnswer::Word {
                        text: question.pool_index.to_string(),
                    },
                })
                .collect(),
        };
        let evaluation = engine::evaluate(&quiz, &submission, 10, &mut rng).unwrap();
        assert_eq!((evaluation.score, evaluation.total), (10, 10));
    }
}

#[test]
fn test_library_lists_documents() {
    let library = create_test_library(&[
        ("geography.json", GEOGRAPHY),
        ("notes.txt", "not a quiz"),
    ]);

    assert_eq!(library.list().unwrap(), vec!["geography.json".to_string()]);
}
