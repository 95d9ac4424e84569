//! Client state management.

use std::collections::BTreeSet;
use std::time::Instant;

use crate::engine::{AnswerSlot, Outcome, QuestionBody, SubmittedAnswer};
use crate::protocol::{ClientMessage, QuestionView, USERNAME_MAX_LENGTH};

/// Current state of the client.
#[derive(Debug, Clone, Default)]
pub enum ClientState {
    /// Connecting to server.
    #[default]
    Connecting,

    /// Entering username.
    NameEntry {
        input: String,
        error: Option<String>,
    },

    /// Picking a quiz from the server's list.
    QuizSelect {
        username: String,
        quizzes: Vec<String>,
        selected: usize,
        error: Option<String>,
    },

    /// Answering an attempt.
    Quiz(Attempt),

    /// Viewing a scored attempt.
    Results {
        username: String,
        quiz: String,
        score: usize,
        total: usize,
        outcomes: Vec<Outcome>,
        reselected: bool,
        scroll: usize,
    },

    /// Disconnected from server.
    Disconnected { message: String },
}

impl ClientState {
    /// Create a new name entry state.
    pub fn name_entry() -> Self {
        Self::NameEntry {
            input: String::new(),
            error: None,
        }
    }

    /// Create a quiz selection state waiting for the list.
    pub fn quiz_select(username: String) -> Self {
        Self::QuizSelect {
            username,
            quizzes: Vec::new(),
            selected: 0,
            error: None,
        }
    }

    /// Create a disconnected state.
    pub fn disconnected(message: String) -> Self {
        Self::Disconnected { message }
    }

    /// Get the username if available.
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::QuizSelect { username, .. } | Self::Results { username, .. } => {
                Some(username.as_str())
            }
            Self::Quiz(attempt) => Some(attempt.username.as_str()),
            _ => None,
        }
    }
}

/// The player's answer so far for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    SingleChoice(Option<String>),
    MultiChoice(BTreeSet<usize>),
    Word(String),
    Unanswerable,
}

impl Draft {
    fn for_body(body: &QuestionBody) -> Self {
        match body {
            QuestionBody::SingleChoice { .. } => Draft::SingleChoice(None),
            QuestionBody::MultiChoice { .. } => Draft::MultiChoice(BTreeSet::new()),
            QuestionBody::Word => Draft::Word(String::new()),
            QuestionBody::Unsupported { .. } => Draft::Unanswerable,
        }
    }

    fn to_answer(&self) -> Option<SubmittedAnswer> {
        match self {
            Draft::SingleChoice(label) => Some(SubmittedAnswer::SingleChoice {
                label: label.clone(),
            }),
            Draft::MultiChoice(indices) => Some(SubmittedAnswer::MultiChoice {
                indices: indices.clone(),
            }),
            Draft::Word(text) => Some(SubmittedAnswer::Word { text: text.clone() }),
            Draft::Unanswerable => None,
        }
    }

    pub fn is_answered(&self) -> bool {
        match self {
            Draft::SingleChoice(label) => label.is_some(),
            Draft::MultiChoice(indices) => !indices.is_empty(),
            Draft::Word(text) => !text.trim().is_empty(),
            Draft::Unanswerable => false,
        }
    }
}

/// An attempt as received from the server, plus the player's drafts.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub username: String,
    pub quiz: String,
    pub title: String,
    /// Selection list, sent back untouched.
    pub selection: String,
    pub questions: Vec<QuestionView>,
    pub drafts: Vec<Draft>,
    pub current: usize,
    /// Highlighted option of the current choice question.
    pub cursor: usize,
    pub started_at: Instant,
    /// Waiting for the server to score the submission.
    pub submitted: bool,
    pub error: Option<String>,
}

impl Attempt {
    pub fn new(
        username: String,
        quiz: String,
        title: String,
        selection: String,
        questions: Vec<QuestionView>,
    ) -> Self {
        let drafts = questions.iter().map(|q| Draft::for_body(&q.body)).collect();
        Self {
            username,
            quiz,
            title,
            selection,
            questions,
            drafts,
            current: 0,
            cursor: 0,
            started_at: Instant::now(),
            submitted: false,
            error: None,
        }
    }

    pub fn current_question(&self) -> Option<&QuestionView> {
        self.questions.get(self.current)
    }

    pub fn current_draft(&self) -> Option<&Draft> {
        self.drafts.get(self.current)
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    pub fn answered_count(&self) -> usize {
        self.drafts.iter().filter(|d| d.is_answered()).count()
    }

    fn option_count(&self) -> usize {
        self.current_question()
            .map(|q| q.body.option_count())
            .unwrap_or(0)
    }

    pub fn next_question(&mut self) {
        if !self.is_last() {
            self.current += 1;
            self.cursor = 0;
        }
    }

    pub fn previous_question(&mut self) {
        if self.current > 0 {
            self.current -= 1;
            self.cursor = 0;
        }
    }

    pub fn cursor_down(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.cursor = (self.cursor + 1) % count;
        }
    }

    pub fn cursor_up(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.cursor = (self.cursor + count - 1) % count;
        }
    }

    /// Pick the highlighted option, or toggle it on a multiple choice question.
    pub fn choose(&mut self) {
        let Some(question) = self.questions.get(self.current) else {
            return;
        };
        let Some(draft) = self.drafts.get_mut(self.current) else {
            return;
        };

        match (&question.body, draft) {
            (QuestionBody::SingleChoice { options }, Draft::SingleChoice(label)) => {
                if let Some(option) = options.get(self.cursor) {
                    *label = Some(option.label.clone());
                }
            }
            (QuestionBody::MultiChoice { options }, Draft::MultiChoice(indices)) => {
                if self.cursor < options.len() && !indices.remove(&self.cursor) {
                    indices.insert(self.cursor);
                }
            }
            _ => {}
        }
    }

    /// Whether the current question takes typed text.
    pub fn is_typing(&self) -> bool {
        matches!(self.current_draft(), Some(Draft::Word(_)))
    }

    pub fn type_char(&mut self, c: char) {
        if let Some(Draft::Word(text)) = self.drafts.get_mut(self.current) {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(Draft::Word(text)) = self.drafts.get_mut(self.current) {
            text.pop();
        }
    }

    /// Build the submission, carrying back every answer key.
    pub fn submit(&mut self) -> Option<ClientMessage> {
        if self.submitted {
            return None;
        }
        self.submitted = true;
        self.error = None;

        let answers = self
            .questions
            .iter()
            .zip(&self.drafts)
            .filter_map(|(question, draft)| {
                Some(AnswerSlot {
                    position: question.position,
                    answer_key: question.answer_key.clone(),
                    answer: draft.to_answer()?,
                })
            })
            .collect();

        Some(ClientMessage::SubmitQuiz {
            quiz: self.quiz.clone(),
            selection: Some(self.selection.clone()),
            answers,
            elapsed_seconds: Some(self.started_at.elapsed().as_secs()),
        })
    }
}

/// Client application state.
pub struct ClientApp {
    /// Current state.
    pub state: ClientState,
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Whether the client should quit.
    pub should_quit: bool,
}

impl ClientApp {
    /// Create a new client app.
    pub fn new(host: String, port: u16) -> Self {
        Self {
            state: ClientState::Connecting,
            host,
            port,
            should_quit: false,
        }
    }

    /// Get the server address string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Move to name entry state.
    pub fn enter_name_entry(&mut self) {
        self.state = ClientState::name_entry();
    }

    /// Move to quiz selection.
    pub fn enter_quiz_select(&mut self, username: String) {
        self.state = ClientState::quiz_select(username);
    }

    /// Fill the quiz list.
    pub fn set_quizzes(&mut self, list: Vec<String>) {
        if let ClientState::QuizSelect {
            quizzes,
            selected,
            error,
            ..
        } = &mut self.state
        {
            *selected = (*selected).min(list.len().saturating_sub(1));
            *quizzes = list;
            *error = None;
        }
    }

    pub fn select_next_quiz(&mut self) {
        if let ClientState::QuizSelect {
            quizzes, selected, ..
        } = &mut self.state
        {
            if !quizzes.is_empty() {
                *selected = (*selected + 1) % quizzes.len();
            }
        }
    }

    pub fn select_previous_quiz(&mut self) {
        if let ClientState::QuizSelect {
            quizzes, selected, ..
        } = &mut self.state
        {
            if !quizzes.is_empty() {
                *selected = (*selected + quizzes.len() - 1) % quizzes.len();
            }
        }
    }

    /// Name of the highlighted quiz.
    pub fn selected_quiz(&self) -> Option<&str> {
        if let ClientState::QuizSelect {
            quizzes, selected, ..
        } = &self.state
        {
            quizzes.get(*selected).map(String::as_str)
        } else {
            None
        }
    }

    /// Begin answering a rendered attempt.
    pub fn start_attempt(
        &mut self,
        quiz: String,
        title: String,
        selection: String,
        questions: Vec<QuestionView>,
    ) {
        let username = self.state.username().unwrap_or_default().to_string();
        self.state = ClientState::Quiz(Attempt::new(username, quiz, title, selection, questions));
    }

    pub fn attempt_mut(&mut self) -> Option<&mut Attempt> {
        if let ClientState::Quiz(attempt) = &mut self.state {
            Some(attempt)
        } else {
            None
        }
    }

    /// Move to results state.
    pub fn enter_results(
        &mut self,
        quiz: String,
        score: usize,
        total: usize,
        outcomes: Vec<Outcome>,
        reselected: bool,
    ) {
        let username = self.state.username().unwrap_or_default().to_string();
        self.state = ClientState::Results {
            username,
            quiz,
            score,
            total,
            outcomes,
            reselected,
            scroll: 0,
        };
    }

    /// Go back to picking a quiz; the caller asks for a fresh list.
    pub fn back_to_quiz_select(&mut self) {
        let username = self.state.username().unwrap_or_default().to_string();
        self.state = ClientState::quiz_select(username);
    }

    /// Show a server error where the player will see it.
    pub fn show_error(&mut self, message: String) {
        match &mut self.state {
            ClientState::Quiz(attempt) => {
                attempt.submitted = false;
                attempt.error = Some(message);
            }
            ClientState::QuizSelect { error, .. } => *error = Some(message),
            ClientState::NameEntry { error, .. } => *error = Some(message),
            _ => {}
        }
    }

    /// Move to disconnected state.
    pub fn disconnect(&mut self, message: String) {
        self.state = ClientState::disconnected(message);
    }

    /// Scroll results down.
    pub fn scroll_results_down(&mut self) {
        if let ClientState::Results {
            scroll, outcomes, ..
        } = &mut self.state
        {
            let max_scroll = outcomes.len().saturating_sub(1);
            *scroll = (*scroll + 1).min(max_scroll);
        }
    }

    /// Scroll results up.
    pub fn scroll_results_up(&mut self) {
        if let ClientState::Results { scroll, .. } = &mut self.state {
            *scroll = scroll.saturating_sub(1);
        }
    }

    /// Add a character to name input.
    pub fn name_input_push(&mut self, c: char) {
        if let ClientState::NameEntry { input, .. } = &mut self.state {
            if input.chars().count() < USERNAME_MAX_LENGTH {
                input.push(c);
            }
        }
    }

    /// Remove a character from name input.
    pub fn name_input_pop(&mut self) {
        if let ClientState::NameEntry { input, .. } = &mut self.state {
            input.pop();
        }
    }

    /// Get name input value.
    pub fn name_input(&self) -> &str {
        if let ClientState::NameEntry { input, .. } = &self.state {
            input
        } else {
            ""
        }
    }

    /// Clear name entry error.
    pub fn clear_name_error(&mut self) {
        if let ClientState::NameEntry { error, .. } = &mut self.state {
            *error = None;
        }
    }
}
