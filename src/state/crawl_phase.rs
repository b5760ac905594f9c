/// Crawl phase definitions for a single seed
///
/// A seed moves strictly forward through these phases. The only shortcut is
/// `FetchSeed -> Done`, taken when the seed page itself cannot be fetched.
use std::fmt;

/// Represents where a seed currently is in its crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Seed accepted, nothing fetched yet
    Start,

    /// Seed page is being fetched
    FetchSeed,

    /// Outbound anchors of the seed page are being filtered
    FilterLinks,

    /// Filtered contact-likely pages are being fetched (one hop, no recursion)
    FetchEach,

    /// Emails are being extracted from every fetched page
    Extract,

    /// Terminal
    Done,
}

impl CrawlPhase {
    /// Returns true if the transition to `next` is allowed
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;
        matches!(
            (self, next),
            (Start, FetchSeed)
                | (FetchSeed, FilterLinks)
                | (FetchSeed, Done)
                | (FilterLinks, FetchEach)
                | (FetchEach, Extract)
                | (Extract, Done)
        )
    }

    /// Returns true for the terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::FetchSeed => "fetch_seed",
            Self::FilterLinks => "filter_links",
            Self::FetchEach => "fetch_each",
            Self::Extract => "extract",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a seed's crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedOutcome {
    /// The seed page was fetched; filtered pages may still have failed
    Completed,
    /// The seed page could not be fetched; nothing was extracted
    SeedUnreachable,
    /// The seed string was not a usable http(s) URL
    InvalidSeed,
}

impl SeedOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for SeedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Completed => "completed",
            Self::SeedUnreachable => "seed_unreachable",
            Self::InvalidSeed => "invalid_seed",
        };
        write!(f, "{}", label)
    }
}

/// Tracks one seed through its phases, rejecting illegal jumps
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    seed: String,
    phase: CrawlPhase,
}

impl PhaseTracker {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            phase: CrawlPhase::Start,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Moves to `next`; an illegal transition is logged and ignored
    pub fn advance(&mut self, next: CrawlPhase) -> bool {
        if !self.phase.can_transition_to(next) {
            tracing::warn!(
                "Ignoring invalid phase transition for {}: {} -> {}",
                self.seed,
                self.phase,
                next
            );
            return false;
        }

        tracing::trace!("{}: {} -> {}", self.seed, self.phase, next);
        self.phase = next;
        true
    }
}
