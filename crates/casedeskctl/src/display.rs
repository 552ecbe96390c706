//! Terminal rendering of a dashboard snapshot.

use casedesk_common::{CaseStatus, DashboardSnapshot, SnapshotEnvelope};
use owo_colors::OwoColorize;
use std::fmt::Write;

/// Reasons longer than this are cut in the cases table.
pub const REASON_MAX_CHARS: usize = 50;

/// Shorten a reason for the table, appending "..." when cut.
pub fn truncate_reason(reason: &str) -> String {
    if reason.chars().count() > REASON_MAX_CHARS {
        let cut: String = reason.chars().take(REASON_MAX_CHARS).collect();
        format!("{}...", cut)
    } else {
        reason.to_string()
    }
}

/// Status label coloured like the dashboard badges.
fn status_badge(status: CaseStatus) -> String {
    let label = status.label();
    match status {
        CaseStatus::Open => label.yellow().to_string(),
        CaseStatus::ResolvedOk => label.bright_green().to_string(),
        CaseStatus::ResolvedNotOk => label.bright_red().to_string(),
        CaseStatus::Unknown => label.dimmed().to_string(),
    }
}

/// Render KPIs, status breakdown, vendor ranking and the recent open cases.
pub fn render_snapshot(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    let counts = &snapshot.counts;

    let _ = writeln!(out, "{}", "Cases".bold());
    let _ = writeln!(out, "  Total          {}", counts.total);
    let _ = writeln!(out, "  Open           {}", counts.open);
    let _ = writeln!(out, "  Resolved OK    {}", counts.resolved_ok);
    let _ = writeln!(out, "  Resolved NOK   {}", counts.resolved_not_ok);
    let resolved = counts.resolved_ok + counts.resolved_not_ok;
    if resolved > 0 {
        let _ = writeln!(out, "  OK rate        {:.0}%", counts.ok_rate() * 100.0);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "Top vendors".bold());
    if snapshot.top_vendors.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (rank, entry) in snapshot.top_vendors.iter().enumerate() {
        let _ = writeln!(out, "  {}. {} ({})", rank + 1, entry.vendor, entry.count);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "Recent open cases".bold());
    if snapshot.recent_open_cases.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for case in &snapshot.recent_open_cases {
        let _ = writeln!(
            out,
            "  {:<12} {:<20} {:<53} {}",
            case.communication_date_raw,
            case.vendor,
            truncate_reason(&case.reason),
            status_badge(case.status)
        );
    }

    let quality = &snapshot.quality;
    if !quality.is_clean() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Data quality".yellow().bold());
        let _ = writeln!(out, "  Rows read                {}", quality.rows_seen);
        let _ = writeln!(out, "  Dropped (incomplete)     {}", quality.dropped_rows);
        let _ = writeln!(out, "  Unreadable dates         {}", quality.date_anomalies);
        let _ = writeln!(out, "  Ambiguous dates          {}", quality.ambiguous_dates);
        let _ = writeln!(out, "  Presumed NOK (no flag)   {}", quality.fallback_classifications);
        if !quality.missing_columns.is_empty() {
            let _ = writeln!(out, "  Missing columns          {}", quality.missing_columns.join(", "));
        }
    }

    out
}

/// Render a daemon envelope with its cycle header.
pub fn render_envelope(envelope: &SnapshotEnvelope) -> String {
    format!(
        "{} published {}\n\n{}",
        format!("Snapshot #{}", envelope.seq).cyan(),
        envelope.published_at.format("%Y-%m-%d %H:%M:%S UTC"),
        render_snapshot(&envelope.snapshot)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use casedesk_common::pipeline::{transform, TransformOptions};
    use casedesk_common::RawRecord;

    #[test]
    fn test_truncate_reason() {
        assert_eq!(truncate_reason("curto"), "curto");
        let long = "x".repeat(60);
        let cut = truncate_reason(&long);
        assert_eq!(cut.len(), 53);
        assert!(cut.ends_with("..."));
        // Multi-byte characters are cut on char boundaries
        let accents = "ç".repeat(55);
        assert_eq!(truncate_reason(&accents).chars().count(), 53);
    }

    #[test]
    fn test_render_snapshot_sections() {
        let records = vec![RawRecord::new()
            .with("Nº", "1")
            .with("Data comunicação", "25/12/2025")
            .with("Estado", "Aberto")
            .with("Fornecedor", "EDP")
            .with("Motivo", "Leitura errada")];
        let snapshot = transform(&records, &TransformOptions::default()).unwrap();
        let text = render_snapshot(&snapshot);
        assert!(text.contains("Total          1"));
        assert!(text.contains("1. EDP (1)"));
        assert!(text.contains("25/12/2025"));
        assert!(text.contains("Aberto"));
        assert!(!text.contains("Data quality"));
    }

    #[test]
    fn test_status_badges_keep_labels() {
        assert!(status_badge(CaseStatus::Open).contains("Aberto"));
        assert!(status_badge(CaseStatus::ResolvedOk).contains("OK"));
        let nok = status_badge(CaseStatus::ResolvedNotOk);
        assert!(nok.contains("NOK"));
        assert_ne!(nok, "NOK");
    }

    #[test]
    fn test_render_quality_lists_missing_columns() {
        let records = vec![RawRecord::new()
            .with("Nº", "1")
            .with("Data comunicação", "3/4/2025")
            .with("Estado", "Aberto")];
        let snapshot = transform(&records, &TransformOptions::default()).unwrap();
        let text = render_snapshot(&snapshot);
        assert!(text.contains("Ambiguous dates          1"));
        assert!(text.contains("Missing columns          ok_flag, vendor, reason"));
    }

    #[test]
    fn test_render_empty_snapshot() {
        let text = render_snapshot(&DashboardSnapshot::default());
        assert!(text.contains("  (none)"));
        assert!(!text.contains("OK rate"));
    }
}
