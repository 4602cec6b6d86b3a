pub mod corpus;
pub mod index;
pub mod store;
pub mod suggest;
pub mod tokenizer;
pub mod vectorizer;

use serde::{Deserialize, Serialize};

pub use index::SemanticIndex;
pub use store::StoryStore;

pub type TermId = u32;

/// A saved story as handed to the index by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl StoryRecord {
    /// Text fitted into the index for this story: title and body joined.
    pub fn search_text(&self) -> String {
        format!("{}. {}", self.title, self.body)
    }
}
