//! Letter content resolution.
//!
//! Decides at startup whether the card shows a server-fetched personalized
//! letter or a random built-in greeting, and flattens both into the same
//! display shape. Every failure path degrades to the built-in pool; the
//! viewer never sees an error, only a generic greeting.

use crate::store::{LetterRecord, LetterStore};
use crate::utils::logger;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    BuiltIn,
    Remote,
}

/// The uniform display shape. Rendering is agnostic to provenance except
/// that remote letters suppress the replay affordance and surface the
/// sender attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterContent {
    pub title: String,
    pub paragraphs: Vec<String>,
    /// Closing line and name, e.g. `("With love,", "Alex")`.
    pub signoff: (String, String),
    pub provenance: Provenance,
}

impl LetterContent {
    pub fn is_remote(&self) -> bool {
        self.provenance == Provenance::Remote
    }

    /// Sender attribution for remote letters; built-in letters have none.
    pub fn sender(&self) -> Option<&str> {
        match self.provenance {
            Provenance::Remote => Some(&self.signoff.1),
            Provenance::BuiltIn => None,
        }
    }
}

/// Why a requested shared letter fell back to the built-in pool. Only ever
/// logged; the display contract stays two-valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    NotFound,
    StoreError,
    Unavailable,
}

struct BuiltinLetter {
    title: &'static str,
    paragraphs: &'static [&'static str],
    signoff: (&'static str, &'static str),
}

static BUILTIN_POOL: &[BuiltinLetter] = &[
    BuiltinLetter {
        title: "Dearest you,",
        paragraphs: &[
            "Some days deserve a little ceremony, and today I wanted to make one for you.",
            "Thank you for being exactly the kind of person worth writing letters to.",
        ],
        signoff: ("With love,", "A secret admirer"),
    },
    BuiltinLetter {
        title: "To someone wonderful,",
        paragraphs: &[
            "If hearts kept ledgers, yours would be full of small kindnesses nobody else noticed.",
            "Consider this envelope a receipt for all of them.",
        ],
        signoff: ("Warmly,", "Someone who noticed"),
    },
    BuiltinLetter {
        title: "Hello, valentine,",
        paragraphs: &[
            "No grand speeches here. Just a burst of confetti, a folded page, and the simple fact that you make things brighter.",
        ],
        signoff: ("Yours,", "The envelope"),
    },
    BuiltinLetter {
        title: "A small note,",
        paragraphs: &[
            "They say good things come in small envelopes.",
            "This one carries a whole afternoon of someone thinking fondly of you.",
        ],
        signoff: ("Fondly,", "A friend"),
    },
    BuiltinLetter {
        title: "For the finder of this letter,",
        paragraphs: &[
            "Luck works in funny ways. You opened an envelope, and it happened to be holding exactly the encouragement you needed.",
            "Keep it. It was always meant for you.",
        ],
        signoff: ("With love,", "Fate"),
    },
];

/// Uniform pick from the fixed pool. No network involved.
pub fn random_builtin() -> LetterContent {
    let letter = &BUILTIN_POOL[fastrand::usize(..BUILTIN_POOL.len())];
    LetterContent {
        title: letter.title.to_string(),
        paragraphs: letter.paragraphs.iter().map(|p| p.to_string()).collect(),
        signoff: (letter.signoff.0.to_string(), letter.signoff.1.to_string()),
        provenance: Provenance::BuiltIn,
    }
}

pub fn builtin_pool_size() -> usize {
    BUILTIN_POOL.len()
}

fn from_record(record: &LetterRecord) -> LetterContent {
    let title = match record.recipient_name.as_deref() {
        Some(name) if !name.trim().is_empty() => format!("For {},", name.trim()),
        _ => "For you,".to_string(),
    };

    let sender = match record.sender_name.as_deref() {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => "Unknown".to_string(),
    };

    LetterContent {
        title,
        paragraphs: vec![record.message.clone()],
        signoff: ("With love,".to_string(), sender),
        provenance: Provenance::Remote,
    }
}

fn fall_back(letter_id: &str, reason: FallbackReason, detail: &str) -> LetterContent {
    logger::warn(&format!(
        "letter {} fell back to builtin pool ({:?}): {}",
        letter_id, reason, detail
    ));
    random_builtin()
}

/// Resolves what the card should display.
///
/// `store` is `None` when the letter store is unconfigured; a requested
/// identifier then falls back the same way a failed fetch does.
pub async fn resolve(
    letter_id: Option<&str>,
    store: Option<Arc<dyn LetterStore>>,
) -> LetterContent {
    let Some(letter_id) = letter_id else {
        return random_builtin();
    };

    let Some(store) = store else {
        return fall_back(letter_id, FallbackReason::Unavailable, "store not configured");
    };

    match store.fetch_by_id(letter_id).await {
        Ok(Some(record)) => {
            // Fire-and-forget: the counter bump must never delay or fail
            // the reveal.
            let counted_id = letter_id.to_string();
            let count_store = Arc::clone(&store);
            tokio::spawn(async move {
                if let Err(e) = count_store.increment_view_count(&counted_id).await {
                    logger::warn(&format!(
                        "view count update for {} failed: {}",
                        counted_id, e
                    ));
                }
            });

            from_record(&record)
        }
        Ok(None) => fall_back(letter_id, FallbackReason::NotFound, "no matching record"),
        Err(e) => fall_back(letter_id, FallbackReason::StoreError, &e.to_string()),
    }
}
