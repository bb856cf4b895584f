pub mod fuzzy;
pub mod ranker;
pub mod scorer;
