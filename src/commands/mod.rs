mod flashcard;

pub use flashcard::*;
