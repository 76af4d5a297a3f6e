use clap::Args;
use std::path::PathBuf;
use subscription_intake::error::AppError;
use subscription_intake::workflows::financing::{
    reconcile_roster, RosterImporter, RosterReconciliation, StatusTransition,
};

#[derive(Args, Debug)]
pub(crate) struct ReconcileArgs {
    /// Customer sheet export (CSV) to check
    #[arg(long)]
    pub(crate) roster_csv: PathBuf,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_reconcile(args: ReconcileArgs) -> Result<(), AppError> {
    let mut applications = RosterImporter::from_path(&args.roster_csv)?;
    let report = reconcile_roster(&mut applications);

    if args.json {
        let encoded = serde_json::to_string_pretty(&report)?;
        println!("{encoded}");
    } else {
        print!("{}", render_report(&report, applications.len()));
    }

    Ok(())
}

pub(crate) fn render_report(report: &RosterReconciliation, total: usize) -> String {
    let mut out = String::new();
    out.push_str("Roster reconciliation\n");
    out.push_str(&format!(
        "{total} applications: {} promoted, {} demoted, {} unchanged\n",
        report.promoted(),
        report.demoted(),
        report.unchanged
    ));

    if report.changes.is_empty() {
        out.push_str("\nStatus changes: none\n");
        return out;
    }

    out.push_str("\nStatus changes\n");
    for change in &report.changes {
        let direction = match change.transition {
            StatusTransition::Promoted => "promoted",
            StatusTransition::Demoted => "demoted",
            StatusTransition::Unchanged => "unchanged",
        };
        out.push_str(&format!(
            "- {} [{direction}] {} -> {}\n",
            change.id.0, change.from, change.to
        ));
    }
    out
}
