//! Helpers that join ranked ids back to story records for display.

use crate::{SemanticIndex, StoryRecord};
use serde::Serialize;
use std::collections::HashMap;

const PREVIEW_CHARS: usize = 180;
const CONTEXT_STORIES: usize = 20;
const CONTEXT_BODY_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub id: String,
    pub score: f32,
    pub title: String,
    pub preview: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Insights {
    pub total_stories: usize,
    pub average_length: usize,
    /// Tag counts, most frequent first, ties by name.
    pub tag_counts: Vec<(String, usize)>,
}

fn round3(x: f32) -> f32 { (x * 1000.0).round() / 1000.0 }

pub fn preview(body: &str) -> String {
    let head: String = body.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// Search the index and attach title and preview from `records`. Hits without a record keep empty fields.
pub fn recommend(index: &SemanticIndex, records: &[StoryRecord], query: &str, k: usize) -> Vec<Recommendation> {
    let by_id: HashMap<&str, &StoryRecord> = records.iter().rev().map(|r| (r.id.as_str(), r)).collect();
    index
        .search(query, k)
        .into_iter()
        .map(|(id, score)| {
            let (title, preview) = match by_id.get(id.as_str()) {
                Some(r) => (r.title.clone(), preview(&r.body)),
                None => (String::new(), preview("")),
            };
            Recommendation { id, score: round3(score), title, preview }
        })
        .collect()
}

/// Context handed to the chat service: the first stories, one `title: body` line each.
pub fn chat_context(records: &[StoryRecord]) -> String {
    records
        .iter()
        .take(CONTEXT_STORIES)
        .map(|r| {
            let body: String = r.body.chars().take(CONTEXT_BODY_CHARS).collect();
            format!("{}: {}", r.title, body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn insights(records: &[StoryRecord]) -> Insights {
    if records.is_empty() { return Insights::default(); }
    let total_chars: usize = records.iter().map(|r| r.body.chars().count()).sum();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        for t in &r.tags { *counts.entry(t.as_str()).or_insert(0) += 1; }
    }
    let mut tag_counts: Vec<(String, usize)> = counts.into_iter().map(|(t, c)| (t.to_string(), c)).collect();
    tag_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Insights { total_stories: records.len(), average_length: total_chars / records.len(), tag_counts }
}
