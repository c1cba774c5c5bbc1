use serde::Serialize;

/// Wrong guesses allowed before the game is lost
pub const MAX_LIVES: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Won,
    Lost,
}

/// One player's private game: a secret word and what has been uncovered so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HangmanSession {
    word: Vec<char>,
    category: String,
    revealed: Vec<bool>,
    guessed: Vec<char>,
    wrong: u8,
    max_wrong: u8,
    status: Status,
}

impl HangmanSession {
    pub fn new(word: &str, category: impl Into<String>) -> Self {
        let word: Vec<char> = word.to_uppercase().chars().collect();
        // only letters are hidden
        let revealed = word.iter().map(|c| !c.is_ascii_alphabetic()).collect();

        let mut session = Self {
            word,
            category: category.into(),
            revealed,
            guessed: Vec::new(),
            wrong: 0,
            max_wrong: MAX_LIVES,
            status: Status::Active,
        };
        if session.revealed.iter().all(|r| *r) {
            session.status = Status::Won;
        }
        session
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != Status::Active
    }

    pub fn wrong_guesses(&self) -> u8 {
        self.wrong
    }

    pub fn max_lives(&self) -> u8 {
        self.max_wrong
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn secret(&self) -> String {
        self.word.iter().collect()
    }

    /// Letters and non-letters that are visible, `_` for hidden ones, space separated
    pub fn display_word(&self) -> String {
        self.word
            .iter()
            .zip(&self.revealed)
            .map(|(c, shown)| if *shown { c.to_string() } else { "_".to_string() })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Guess a letter. Returns whether it was in the word, or `None` when the
    /// guess doesn't count: game over, not a letter, or already tried.
    pub fn guess(&mut self, letter: char) -> Option<bool> {
        if self.is_over() {
            return None;
        }
        let letter = letter.to_ascii_uppercase();
        if !letter.is_ascii_alphabetic() || self.guessed.contains(&letter) {
            return None;
        }
        self.guessed.push(letter);

        let mut correct = false;
        for (c, shown) in self.word.iter().zip(self.revealed.iter_mut()) {
            if *c == letter {
                *shown = true;
                correct = true;
            }
        }

        if correct {
            if self.revealed.iter().all(|r| *r) {
                self.status = Status::Won;
            }
        } else {
            self.wrong += 1;
            if self.wrong >= self.max_wrong {
                self.status = Status::Lost;
            }
        }
        Some(correct)
    }
}
