use rand::Rng;

pub struct Category {
    pub name: &'static str,
    pub words: &'static [&'static str],
}

pub const WORD_BANK: &[Category] = &[
    Category {
        name: "Programming",
        words: &["RUST", "ASYNC", "TOKIO", "WEBSOCKET", "TERMINAL", "NETWORK", "COMPILER", "SOCKET"],
    },
    Category {
        name: "Animals",
        words: &["ELEPHANT", "GIRAFFE", "PENGUIN", "DOLPHIN", "KANGAROO", "TIGER", "OCTOPUS"],
    },
    Category {
        name: "Fruits",
        words: &["BANANA", "MANGO", "PINEAPPLE", "DURIAN", "PAPAYA", "WATERMELON", "ICE APPLE"],
    },
    Category {
        name: "Countries",
        words: &["THAILAND", "JAPAN", "BRAZIL", "CANADA", "NEW ZEALAND", "EGYPT", "NORWAY"],
    },
];

/// Uniformly pick a category, then a word from it
pub fn pick(rng: &mut impl Rng) -> (&'static str, &'static str) {
    let category = &WORD_BANK[rng.random_range(0..WORD_BANK.len())];
    let word = category.words[rng.random_range(0..category.words.len())];
    (word, category.name)
}
