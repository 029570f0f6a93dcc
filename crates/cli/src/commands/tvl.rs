use anyhow::Result;

use inkdash_core::build_snapshot;
use inkdash_core::output::{render, OutputFormat};

use crate::factory::Context;

/// `inkdash tvl`
pub async fn run(ctx: &Context, fmt: OutputFormat) -> Result<()> {
    let snapshot = build_snapshot(ctx.upstream.as_ref(), &ctx.config.chain.target()).await?;
    render(fmt, &snapshot)
}
