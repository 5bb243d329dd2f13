pub mod count_vectorizer;
pub mod linear;
