use serde::{Deserialize, Serialize};

/// One page of the reference document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number in the reference document
    pub number: u32,
    pub text: String,
}

/// Binary slice artifact: the pages of the reference document covering one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageExcerpt {
    pub name: String,
    /// Span as listed in the index, before offset and clamping
    pub requested_start: u32,
    pub requested_end: u32,
    pub pages: Vec<Page>,
}

impl PageExcerpt {
    /// Text form of the excerpt: page texts joined by newlines
    pub fn to_text(&self) -> String {
        self.pages.iter().map(|p| p.text.as_str()).collect::<Vec<_>>().join("\n")
    }

    pub fn first_page(&self) -> Option<u32> {
        self.pages.first().map(|p| p.number)
    }

    pub fn last_page(&self) -> Option<u32> {
        self.pages.last().map(|p| p.number)
    }
}
