//! Upsell prompts and when to surface them.
use serde::{Deserialize, Serialize};

use crate::constants::{
    OFFER_LIST_PRICE_EUR, OFFER_WINDOW_END_PCT, OFFER_WINDOW_START_PCT, PRO_ACCESS_BADGE,
};
use crate::feedback::Tone;

/// Whether the dashboard banner should render.
///
/// True while progress sits in `[40, 90)` and the player does not already
/// hold the PRO access badge. Recomputed on every render; nothing is cached.
#[must_use]
pub fn should_show_offer<S: AsRef<str>>(progress_percent: f64, badges: &[S]) -> bool {
    let in_window =
        (OFFER_WINDOW_START_PCT..OFFER_WINDOW_END_PCT).contains(&progress_percent);
    in_window && !badges.iter().any(|b| b.as_ref() == PRO_ACCESS_BADGE)
}

/// Moment in the funnel at which an offer is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferKind {
    /// Mid-journey banner on the dashboard.
    Flash,
    /// Full offer page opened from a locked module.
    Main,
    /// Offer attached to the final results.
    Final,
}

/// Pricing and copy hints for one offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OfferTerms {
    pub kind: OfferKind,
    pub original_price_eur: u32,
    pub offer_price_eur: u32,
    pub tone: Tone,
}

impl OfferTerms {
    #[must_use]
    pub const fn for_kind(kind: OfferKind) -> Self {
        let (offer_price_eur, tone) = match kind {
            OfferKind::Flash => (19, Tone::Warning),
            OfferKind::Main => (29, Tone::Primary),
            OfferKind::Final => (39, Tone::Success),
        };
        Self {
            kind,
            original_price_eur: OFFER_LIST_PRICE_EUR,
            offer_price_eur,
            tone,
        }
    }

    /// Discount against list price, rounded down to a whole percent.
    #[must_use]
    pub const fn discount_pct(&self) -> u32 {
        if self.original_price_eur == 0 {
            return 0;
        }
        (self.original_price_eur - self.offer_price_eur) * 100 / self.original_price_eur
    }
}
