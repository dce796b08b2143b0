//! Patent evidence: patents tied to the award, filed before the contract,
//! and on the contract's topic.

use transition_domain::non_blank;

use super::{SignalContext, SignalOutcome};
use crate::text::tf_cosine;

pub(super) fn evaluate(ctx: &SignalContext<'_>) -> SignalOutcome {
    let config = &ctx.config.patent;
    let patents = ctx.patents;
    if patents.is_empty() {
        return SignalOutcome::new(0.0, "no patents").detail("patent_count", 0);
    }

    let action_date = ctx.contract.action_date;
    let filed_before = patents
        .iter()
        .filter(|p| p.filing_date.is_some_and(|d| d < action_date))
        .count();

    let description = non_blank(ctx.contract.description.as_deref());
    let mut best: Option<(&str, f64)> = None;
    if let Some(description) = description {
        for patent in patents {
            let similarity = tf_cosine(&patent.text(), description);
            if best.map_or(true, |(_, b)| similarity > b) {
                best = Some((patent.patent_id.as_str(), similarity));
            }
        }
    }
    let max_similarity = best.map_or(0.0, |(_, s)| s);
    let topic_match = max_similarity >= config.similarity_threshold;

    let mut bonus = config.presence_bonus;
    let mut parts = vec![format!("{} patent(s)", patents.len())];
    if filed_before > 0 {
        bonus += config.filed_before_contract_bonus;
        parts.push(format!("{filed_before} filed before contract"));
    }
    if topic_match {
        bonus += config.topic_match_bonus;
        parts.push(format!("topic similarity {max_similarity:.2}"));
    }

    SignalOutcome::new(bonus, parts.join(", "))
        .detail("patent_count", patents.len())
        .detail("filed_before_contract", filed_before)
        .detail("max_similarity", max_similarity)
        .detail("best_patent_id", best.map(|(id, _)| id))
        .detail("similarity_threshold", config.similarity_threshold)
        .detail("topic_match", topic_match)
}
