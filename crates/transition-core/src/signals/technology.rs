//! Technology-area alignment between the award label and the label
//! inferred for the contract.

use transition_domain::{non_blank, TechnologyArea};

use super::{SignalContext, SignalOutcome};

fn label(area: Option<&TechnologyArea>) -> Option<&str> {
    non_blank(area.map(|a| a.label.as_str()))
}

pub(super) fn evaluate(ctx: &SignalContext<'_>) -> SignalOutcome {
    let award_area = ctx.award.technology_area.as_ref();
    let contract_area = ctx.contract.technology_area.as_ref();

    let outcome = match (label(award_area), label(contract_area)) {
        (Some(a), Some(c)) if a.to_lowercase() == c.to_lowercase() => SignalOutcome::new(
            ctx.config.technology_area.match_bonus,
            format!("technology area match: {a}"),
        ),
        (Some(a), Some(c)) => {
            SignalOutcome::new(0.0, format!("technology areas differ: {a} vs {c}"))
        }
        _ => SignalOutcome::new(0.0, "technology area unavailable"),
    };

    outcome
        .detail("award_label", label(award_area))
        .detail("contract_label", label(contract_area))
        .detail("award_confidence", award_area.map(|a| a.confidence))
        .detail("contract_confidence", contract_area.map(|a| a.confidence))
}
