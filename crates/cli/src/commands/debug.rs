use anyhow::{bail, Result};

use inkdash_core::output::{render, OutputFormat};
use inkdash_core::probe::probe_protocol;

use crate::factory::Context;

/// `inkdash debug <slug>`
pub async fn run(ctx: &Context, slug: &str, fmt: OutputFormat) -> Result<()> {
    let slug = slug.trim();
    if slug.is_empty() {
        bail!("slug must not be empty");
    }
    let report = probe_protocol(ctx.upstream.as_ref(), slug).await?;
    render(fmt, &report)
}
