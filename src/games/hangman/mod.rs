/// Single-player hangman, one word per connection
pub mod game;
pub mod session;
pub mod words;

pub use game::{HangmanEvent, HangmanInput, HangmanRoom};
pub use session::{HangmanSession, Status, MAX_LIVES};
