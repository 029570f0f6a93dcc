use anyhow::Result;

use inkdash_core::columns::{ProtocolTable, TableView};
use inkdash_core::fmt::format_timestamp_ms;
use inkdash_core::output::{render_json_or, OutputFormat, TableDisplay};
use inkdash_core::{build_rankings, RankingsOptions};

use crate::factory::Context;

/// `inkdash rankings`: JSON mode prints the full report, table mode the
/// chosen view.
pub async fn run(ctx: &Context, view: TableView, fmt: OutputFormat) -> Result<()> {
    let opts = RankingsOptions::from(&ctx.config);
    let report = build_rankings(ctx.upstream.as_ref(), &opts).await?;

    if render_json_or(fmt, &report)? {
        return Ok(());
    }

    let counts = report.counts;
    let table = ProtocolTable::for_view(&report.chain, report.rows, view);
    table.print_table();
    println!();
    println!(
        "{} protocols on {} ({} listed upstream) · {}",
        counts.base_rows,
        report.chain,
        counts.all_protocols,
        format_timestamp_ms(report.ts),
    );
    if counts.enriched < counts.base_rows {
        println!("Showing the top {} by TVL.", counts.enriched);
    }
    if !view.advanced {
        println!("Tip: `inkdash rankings --advanced` adds 7d/30d/1y fees and volume columns.");
    }
    Ok(())
}
