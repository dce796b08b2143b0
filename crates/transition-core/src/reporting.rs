use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use transition_domain::{sha256_hex, ConfidenceBand};

use crate::gate::GateVerdict;
use crate::summary::RunSummary;

const SUMMARY_FILE: &str = "summary.json";
const DIGEST_FILE: &str = "summary.digest";

/// Persist `<dir>/<run_id>/summary.json` and `<dir>/<run_id>/summary.digest`.
pub fn write_summary_artifact(summary: &RunSummary, dir: &Path) -> Result<PathBuf> {
    let run_dir = dir.join(summary.run_id.to_string());
    std::fs::create_dir_all(&run_dir).with_context(|| format!("create {:?}", run_dir))?;

    let path = run_dir.join(SUMMARY_FILE);
    let json = serde_json::to_vec_pretty(summary).context("serialize run summary")?;
    let digest = sha256_hex(&json);

    std::fs::write(&path, &json).with_context(|| format!("write {:?}", path))?;
    let digest_path = run_dir.join(DIGEST_FILE);
    std::fs::write(&digest_path, digest.as_bytes())
        .with_context(|| format!("write {:?}", digest_path))?;
    Ok(path)
}

/// Read `<dir>/<run_id>/summary.json` and verify it against its digest file.
pub fn read_summary_artifact(run_id: &str, dir: &Path) -> Result<RunSummary> {
    let run_dir = dir.join(run_id);
    let path = run_dir.join(SUMMARY_FILE);
    let digest_path = run_dir.join(DIGEST_FILE);

    let json = std::fs::read(&path).with_context(|| format!("read {:?}", path))?;
    let expected =
        std::fs::read_to_string(&digest_path).with_context(|| format!("read {:?}", digest_path))?;
    let actual = sha256_hex(&json);
    if expected.trim() != actual {
        bail!(
            "summary digest mismatch for run {run_id}: expected {}, actual {actual}",
            expected.trim()
        );
    }
    serde_json::from_slice(&json).with_context(|| format!("parse {:?}", path))
}

/// Render a markdown overview of a run for review comments and dashboards.
pub fn render_summary_md(summary: &RunSummary, verdict: Option<&GateVerdict>) -> String {
    let mut out = String::new();
    out.push_str("# Transition Detection Run\n\n");
    out.push_str(&format!(
        "- run: `{}`\n- status: {:?}\n- awards processed: {} of {}\n- vendor resolution rate: {:.1}%\n- detections: {}\n- validation failures: {}\n\n",
        summary.run_id,
        summary.status,
        summary.awards_processed,
        summary.awards_total,
        summary.vendor_resolution_rate * 100.0,
        summary.detections,
        summary.validation_failures,
    ));

    out.push_str("## Confidence\n");
    for band in ConfidenceBand::ALL.iter().rev() {
        let count = summary.by_confidence.get(band).copied().unwrap_or(0);
        out.push_str(&format!("- {band}: {count}\n"));
    }
    out.push('\n');

    out.push_str("## Vendor Match Methods\n");
    for (method, count) in &summary.by_method {
        out.push_str(&format!("- {method}: {count}\n"));
    }
    out.push('\n');

    if let Some(stats) = &summary.score_stats {
        out.push_str("## Scores\n");
        out.push_str(&format!(
            "- min: {:.3}\n- median: {:.3}\n- mean: {:.3}\n- max: {:.3}\n\n",
            stats.min, stats.median, stats.mean, stats.max
        ));
    }

    if !summary.flagged.is_empty() {
        out.push_str("## Flagged Detections\n");
        for f in &summary.flagged {
            let kinds: Vec<String> = f.issues.iter().map(|k| format!("{k:?}")).collect();
            out.push_str(&format!(
                "- `{}` ({} -> {}): {}\n",
                f.detection_id,
                f.award_id,
                f.contract_id,
                kinds.join(", ")
            ));
        }
        out.push('\n');
    }

    if let Some(verdict) = verdict {
        out.push_str("## Quality Gate\n");
        if verdict.passed() {
            out.push_str("- passed\n");
        } else {
            for v in &verdict.violations {
                out.push_str(&format!("- {}\n", v.reason));
            }
        }
    }
    out
}

/// Write the markdown overview next to the summary artifact.
pub fn write_summary_md(
    summary: &RunSummary,
    verdict: Option<&GateVerdict>,
    path: &Path,
) -> Result<()> {
    let md = render_summary_md(summary, verdict);
    std::fs::write(path, md).with_context(|| format!("write {:?}", path))?;
    Ok(())
}
