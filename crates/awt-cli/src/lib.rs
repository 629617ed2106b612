//! Driver for the awt await pattern resolver.
//!
//! Loads a JSON fixture describing a symbol table and a list of `await`
//! sites, resolves every site and reports bindings, completion kinds and
//! diagnostics.

pub mod args;
pub mod fixture;
pub mod report;
pub mod tracing_config;

use std::io::Write;

use anyhow::{Context, Result};
use awt_checker::{AwaitResolution, AwaitResolver, AwaitSite, ResolverOptions};
use rayon::prelude::*;

use crate::args::{CliArgs, OutputFormat};
use crate::fixture::Fixture;
use crate::report::Report;

/// Counts from one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub sites: usize,
    pub errors: usize,
}

/// Resolve every site of the fixture named by `args` and write the report.
pub fn run(args: &CliArgs, out: &mut dyn Write, color: bool) -> Result<RunSummary> {
    let fixture = Fixture::load(&args.fixture)
        .with_context(|| format!("failed to load {}", args.fixture.display()))?;
    let program = fixture
        .build(&args.fixture.display().to_string())
        .context("failed to build symbol table")?;

    let policy = args
        .policy
        .map(|p| p.to_pattern_policy())
        .or(program.policy)
        .unwrap_or_default();
    let options = ResolverOptions::default().with_policy(policy);
    let resolver = AwaitResolver::new(&program.table, options);

    let resolutions = resolve_all(&resolver, &program.sites, args.sequential);
    let report = Report::build(&resolver, &program.sites, &resolutions);
    match args.format {
        OutputFormat::Text => report.write_text(out, color),
        OutputFormat::Json => report.write_json(out),
    }
    .context("failed to write report")?;

    Ok(RunSummary {
        sites: report.sites.len(),
        errors: report.error_count(),
    })
}

/// Sites are independent; the resolver's caches are shared across threads.
pub fn resolve_all(
    resolver: &AwaitResolver<'_>,
    sites: &[AwaitSite],
    sequential: bool,
) -> Vec<AwaitResolution> {
    let _span = tracing::info_span!("resolve_sites", sites = sites.len(), sequential).entered();
    if sequential {
        sites.iter().map(|site| resolver.resolve(site)).collect()
    } else {
        sites.par_iter().map(|site| resolver.resolve(site)).collect()
    }
}
