pub const MAX_TAGS: usize = 8;

/// Ordered, lowercase, duplicate-free tag list capped at [`MAX_TAGS`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagList {
    tags: Vec<String>,
}

impl TagList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the tag was appended.
    pub fn add(&mut self, text: &str) -> bool {
        let tag = text.trim().to_lowercase();
        if tag.is_empty() || self.tags.len() >= MAX_TAGS || self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.tags.len()).then(|| self.tags.remove(index))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tags.len() >= MAX_TAGS
    }

    pub fn joined(&self) -> String {
        self.tags.join(",")
    }
}
