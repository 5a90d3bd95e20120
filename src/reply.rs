use std::fmt;

use crate::database::quiz::Question;

const HELP: &str = "Sorry, we don't understand please send a number for the question & possible answers or number followed by the letter for your answer.

example
1 for question 1 and it's answers
OR
1a to answer a for question 1";

/// Every text the service can send back to a participant.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Help,
    Thanks,
    Question(Question),
    NotFound(i32),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Help => f.write_str(HELP),
            Reply::Thanks => f.write_str("Thank you for the answer."),
            Reply::Question(question) => fmt::Display::fmt(question, f),
            Reply::NotFound(id) => write!(f, "Sorry, question {} doesn't exist.", id),
        }
    }
}
