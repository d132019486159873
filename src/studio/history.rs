//! Bounded, most-recent-first record of plain image generations.

use crate::catalog::{AspectRatio, Style};
use crate::media::GeneratedImage;
use std::collections::VecDeque;

/// Number of entries kept; older ones are evicted.
pub const HISTORY_CAPACITY: usize = 20;

/// One successful text-to-image generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Sequential identifier, unique within a session.
    pub id: u64,
    /// First image of the generation.
    pub image: GeneratedImage,
    /// Prompt as typed, before style and negative prompt were folded in.
    pub prompt: String,
    /// Negative prompt as typed.
    pub negative_prompt: String,
    /// Display name of the model used.
    pub model_name: String,
    /// Aspect ratio used.
    pub aspect_ratio: AspectRatio,
    /// Style used.
    pub style: Style,
    /// Number of images requested.
    pub count: u8,
}

/// Form values captured for a history entry before the call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntryDraft {
    pub prompt: String,
    pub negative_prompt: String,
    pub model_name: String,
    pub aspect_ratio: AspectRatio,
    pub style: Style,
    pub count: u8,
}

/// Most-recent-first list capped at [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    next_id: u64,
}

impl History {
    /// Prepends an entry built from `draft` and returns its id.
    pub(crate) fn record(&mut self, draft: EntryDraft, image: GeneratedImage) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push_front(HistoryEntry {
            id,
            image,
            prompt: draft.prompt,
            negative_prompt: draft.negative_prompt,
            model_name: draft.model_name,
            aspect_ratio: draft.aspect_ratio,
            style: draft.style,
            count: draft.count,
        });
        self.entries.truncate(HISTORY_CAPACITY);
        id
    }

    /// Looks an entry up by id.
    pub fn get(&self, id: u64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Iterates from most to least recent.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True before the first recorded generation.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
