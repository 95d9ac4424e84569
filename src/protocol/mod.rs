mod messages;

pub use messages::{
    validate_username, ClientMessage, ErrorKind, QuestionView, ServerMessage, ANONYMOUS,
    DEFAULT_PORT, USERNAME_MAX_LENGTH, USERNAME_MIN_LENGTH,
};
