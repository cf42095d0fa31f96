//! Corpus, glossary and annotation loading.

pub mod corpus;
pub mod glossary;
pub mod master_table;
