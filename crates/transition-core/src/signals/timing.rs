//! Timing proximity: contracts soon after the award anchor score higher.

use serde_json::json;
use transition_domain::AnchorDate;

use super::{SignalContext, SignalOutcome};

pub(super) fn evaluate(ctx: &SignalContext<'_>) -> SignalOutcome {
    let days = ctx.days_after_anchor;
    let anchor = match ctx.anchor_kind {
        AnchorDate::CompletionDate => "completion",
        AnchorDate::AwardDate => "award",
    };
    let window = ctx
        .config
        .timing_windows
        .iter()
        .find(|window| window.contains(days));

    match window {
        Some(window) => SignalOutcome::new(
            window.multiplier,
            format!("contract {days} days after award {anchor}"),
        )
        .detail("days_after_anchor", days)
        .detail("anchor", anchor)
        .detail("window", json!([window.day_range.0, window.day_range.1]))
        .detail("multiplier", window.multiplier),
        None => SignalOutcome::new(
            0.0,
            format!("contract {days} days after award {anchor}, outside timing windows"),
        )
        .detail("days_after_anchor", days)
        .detail("anchor", anchor)
        .detail("window", serde_json::Value::Null)
        .detail("multiplier", 0.0),
    }
}

#[cfg(test)]
mod tests {
    use transition_domain::{SignalKind, TimingWindow, TransitionConfig};

    use super::super::fixtures::*;

    #[test]
    fn default_windows() {
        let award = award();
        let mut contract = contract();
        for (action, bonus) in [
            (date(2023, 1, 15), 1.0),
            (date(2023, 4, 15), 1.0),
            (date(2023, 4, 16), 0.75),
            (date(2024, 1, 15), 0.75),
            (date(2024, 1, 16), 0.50),
            (date(2025, 1, 14), 0.50),
        ] {
            contract.action_date = action;
            let result = run(SignalKind::TimingProximity, &award, &contract, &[]);
            assert_eq!(result.raw_bonus, bonus, "action date {action}");
        }
    }

    #[test]
    fn forty_five_days_gets_full_multiplier() {
        let result = run(SignalKind::TimingProximity, &award(), &contract(), &[]);
        assert_eq!(result.raw_bonus, 1.0);
        assert_eq!(result.score_contribution, 0.20);
        assert_eq!(result.details["days_after_anchor"], 45);
        assert_eq!(result.snippet, "contract 45 days after award completion");
    }

    #[test]
    fn outside_configured_windows_is_zero() {
        let mut config = TransitionConfig::default();
        config.timing_windows = vec![TimingWindow::new(0, 30, 1.0)];
        let result = run_with(SignalKind::TimingProximity, &award(), &contract(), &[], &config);
        assert_eq!(result.raw_bonus, 0.0);
        assert!(result.details["window"].is_null());
    }
}
