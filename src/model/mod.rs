pub mod concordance;
pub mod score;
