use anyhow::{Context, anyhow};
use chrono::Local;
use ecourts_core::DownloadTarget;
use ecourts_portal::{PortalClient, download};
use tracing::info;

use crate::cli::RunPlan;
use crate::{display, report};

/// Execute one plan: cause lists first, then the case lookup, listing
/// check, summary and PDF download.
pub async fn run(plan: &RunPlan) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let client = PortalClient::connect(&plan.portal)
        .await
        .with_context(|| format!("opening portal session at {}", plan.portal.base_url))?;

    if plan.causelist {
        for day in &plan.days {
            let target = DownloadTarget::cause_list(plan.court.clone(), day.resolve(today));
            let path = download(&client, &target, &plan.output_dir)
                .await
                .with_context(|| format!("downloading cause list for {day}"))?;
            println!("Cause list saved: {}", path.display());
        }
    }

    let Some(query) = &plan.query else {
        return Ok(());
    };

    let record = client
        .find_case(query)
        .await
        .with_context(|| format!("searching for {query}"))?
        .ok_or_else(|| anyhow!("case not found: {query}"))?;

    let mut listings = Vec::with_capacity(plan.days.len());
    for &day in &plan.days {
        let status = client
            .listing_status(&plan.court, &record, day, today)
            .await
            .with_context(|| format!("checking listing for {day}"))?;
        info!(day = %day, listed = status.listed, "listing checked");
        listings.push(status);
    }

    display::print_case_card(&record, &listings);

    if plan.save_summary {
        let path = report::save_summary(&plan.output_dir, query, &record, &listings)?;
        println!("Results saved: {}", path.display());
    }

    if plan.download_pdf {
        let target = DownloadTarget::case_pdf(&record, plan.court.clone()).ok_or_else(|| {
            anyhow!(
                "no document available: case {} carries no document reference",
                record.display_id().unwrap_or("-")
            )
        })?;
        let path = download(&client, &target, &plan.output_dir)
            .await
            .context("downloading case PDF")?;
        println!("PDF saved: {}", path.display());
    }

    Ok(())
}
