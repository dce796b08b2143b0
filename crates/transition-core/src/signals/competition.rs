//! Competition type: sole-source follow-ons are the strongest transition
//! evidence, open competitions the weakest.

use transition_domain::CompetitionType;

use super::{SignalContext, SignalOutcome};

pub(super) fn evaluate(ctx: &SignalContext<'_>) -> SignalOutcome {
    let table = &ctx.config.competition;
    let competition = ctx.contract.competition_type;
    let bonus = match competition {
        CompetitionType::SoleSource => table.sole_source,
        CompetitionType::Limited => table.limited,
        CompetitionType::FullAndOpen => table.full_and_open,
        CompetitionType::Unknown => table.unknown,
    };
    let snippet = match competition {
        CompetitionType::SoleSource => "sole-source award".to_string(),
        CompetitionType::Limited => "limited competition".to_string(),
        CompetitionType::FullAndOpen => "full and open competition".to_string(),
        CompetitionType::Unknown => "competition type unknown".to_string(),
    };
    SignalOutcome::new(bonus, snippet).detail("competition_type", competition.as_str())
}
