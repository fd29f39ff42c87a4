pub mod bracket;
pub mod highlight_engine;
pub mod highlighter;
