//! Text similarity between the award title/description and the contract
//! description.

use transition_domain::non_blank;

use super::{SignalContext, SignalOutcome};
use crate::text::tf_cosine;

pub(super) fn evaluate(ctx: &SignalContext<'_>) -> SignalOutcome {
    let tiers = &ctx.config.text_similarity;
    let award_text = ctx.award.text();
    let Some(contract_text) = non_blank(ctx.contract.description.as_deref()) else {
        return SignalOutcome::new(0.0, "contract description unavailable")
            .detail("similarity", 0.0);
    };
    if award_text.is_empty() {
        return SignalOutcome::new(0.0, "award text unavailable").detail("similarity", 0.0);
    }

    let similarity = tf_cosine(&award_text, contract_text);
    let bonus = if similarity >= tiers.high_threshold {
        tiers.high_bonus
    } else if similarity >= tiers.low_threshold {
        tiers.low_bonus
    } else {
        0.0
    };
    SignalOutcome::new(bonus, format!("description similarity {similarity:.2}"))
        .detail("similarity", similarity)
        .detail("high_threshold", tiers.high_threshold)
        .detail("low_threshold", tiers.low_threshold)
}
