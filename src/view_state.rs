//! Client view state.
//!
//! The page's interactive pieces keep a little state each: which carousel
//! slide is showing, which project modal is open, the chat transcript, the
//! contact form's progress, and the navbar's scroll direction. None of it
//! persists past a page load. Each type owns a disjoint piece of state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{ChatReply, ChatSource, Project};

// ============ Carousel ============

/// Wrap-around index over `len` slides.
///
/// Invariant: `index < len` whenever `len > 0`; `index == 0` when `len == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Carousel {
    index: usize,
    len: usize,
    /// +1 after moving forward, -1 after moving back, 0 before any move.
    direction: i8,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self {
            index: 0,
            len,
            direction: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn direction(&self) -> i8 {
        self.direction
    }

    pub fn next(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
            self.direction = 1;
        }
        self.index
    }

    pub fn prev(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
            self.direction = -1;
        }
        self.index
    }

    /// Timer-driven advance; same as [`next`](Self::next).
    pub fn tick(&mut self) -> usize {
        self.next()
    }

    /// Jump to a slide. Out-of-range targets wrap.
    pub fn go_to(&mut self, target: usize) -> usize {
        if self.len > 0 {
            let target = target % self.len;
            self.direction = if target >= self.index { 1 } else { -1 };
            self.index = target;
        }
        self.index
    }

    /// Resize after the item list changes, keeping the index in range.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if len == 0 {
            self.index = 0;
        } else if self.index >= len {
            self.index = len - 1;
        }
    }
}

/// Depth of `item` in a card stack whose front card is `current`.
/// The front card is 0; the card just behind it is 1.
pub fn stack_offset(item: usize, current: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (item % len + len - current % len) % len
}

// ============ Project modal ============

/// The open project and its gallery position.
#[derive(Debug, Clone, Default)]
pub struct ProjectModal {
    selected: Option<Project>,
    gallery: Carousel,
}

impl ProjectModal {
    pub fn open(&mut self, project: Project) {
        let len = gallery_len(&project);
        self.selected = Some(project);
        self.gallery = Carousel::new(len);
    }

    pub fn close(&mut self) {
        self.selected = None;
        self.gallery = Carousel::default();
    }

    pub fn selected(&self) -> Option<&Project> {
        self.selected.as_ref()
    }

    pub fn gallery(&mut self) -> &mut Carousel {
        &mut self.gallery
    }

    pub fn image_index(&self) -> usize {
        self.gallery.index()
    }
}

/// Gallery slides; the thumbnail stands in when there are no gallery images.
fn gallery_len(project: &Project) -> usize {
    if project.images.is_empty() {
        usize::from(project.thumbnail.is_some())
    } else {
        project.images.len()
    }
}

// ============ Chat transcript ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ChatSource>,
}

pub const CONNECTION_ERROR_REPLY: &str = "Sorry, I'm having trouble connecting. Please try again!";

/// In-memory chat history for one browser session. Ids strictly increase.
#[derive(Debug, Clone)]
pub struct ChatTranscript {
    entries: Vec<TranscriptEntry>,
    next_id: u64,
    pending: bool,
}

impl ChatTranscript {
    pub fn new(greeting: impl Into<String>) -> Self {
        let mut transcript = Self {
            entries: Vec::new(),
            next_id: 1,
            pending: false,
        };
        transcript.push(greeting.into(), Sender::Bot, None);
        transcript
    }

    fn push(&mut self, text: String, sender: Sender, source: Option<ChatSource>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(TranscriptEntry {
            id,
            text,
            sender,
            timestamp: Utc::now(),
            source,
        });
        id
    }

    /// Record the visitor's message. Blank input, or input while a reply is
    /// pending, is ignored and returns `None`.
    pub fn push_user(&mut self, text: &str) -> Option<u64> {
        if text.trim().is_empty() || self.pending {
            return None;
        }
        self.pending = true;
        Some(self.push(text.to_string(), Sender::User, None))
    }

    pub fn push_bot(&mut self, reply: &ChatReply) -> u64 {
        self.pending = false;
        self.push(reply.response.clone(), Sender::Bot, Some(reply.source))
    }

    pub fn push_error(&mut self) -> u64 {
        self.pending = false;
        self.push(CONNECTION_ERROR_REPLY.to_string(), Sender::Bot, None)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }
}

// ============ Contact form ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    #[default]
    Idle,
    Sending,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub draft: ContactDraft,
    status: FormStatus,
}

impl ContactForm {
    pub fn status(&self) -> FormStatus {
        self.status
    }

    /// Begin submitting. Returns false (and does nothing) if already sending.
    pub fn start_sending(&mut self) -> bool {
        if self.status == FormStatus::Sending {
            return false;
        }
        self.status = FormStatus::Sending;
        true
    }

    /// Record the relay's answer. Success clears the draft; failure keeps it.
    pub fn finish(&mut self, ok: bool) {
        if self.status != FormStatus::Sending {
            return;
        }
        if ok {
            self.status = FormStatus::Success;
            self.draft = ContactDraft::default();
        } else {
            self.status = FormStatus::Error;
        }
    }

    /// Return to idle after the status banner times out.
    pub fn reset_status(&mut self) {
        if self.status != FormStatus::Sending {
            self.status = FormStatus::Idle;
        }
    }
}

// ============ Scroll tracking ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    #[default]
    Up,
    Down,
}

pub const HIDE_NAV_AFTER_PX: f64 = 100.0;
pub const SCROLLED_AFTER_PX: f64 = 50.0;

/// Navbar scroll state: hidden while scrolling down past 100px, styled
/// as "scrolled" past 50px.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollTracker {
    previous: f64,
    direction: ScrollDirection,
}

impl ScrollTracker {
    pub fn update(&mut self, scroll_y: f64) -> ScrollDirection {
        self.direction = if scroll_y > self.previous && scroll_y > HIDE_NAV_AFTER_PX {
            ScrollDirection::Down
        } else {
            ScrollDirection::Up
        };
        self.previous = scroll_y;
        self.direction
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn is_scrolled(&self) -> bool {
        self.previous > SCROLLED_AFTER_PX
    }
}

/// Cycle of the hero headlines.
pub type RotatingText = Carousel;

/// Counter value `elapsed` into a count-up animation of `duration`, ease-out.
pub fn count_up(end: u32, elapsed_ms: u64, duration_ms: u64) -> u32 {
    if duration_ms == 0 || elapsed_ms >= duration_ms {
        return end;
    }
    let t = elapsed_ms as f64 / duration_ms as f64;
    let eased = 1.0 - (1.0 - t).powi(3);
    (eased * end as f64).floor() as u32
}
