//! Text and JSON reports of resolved await sites.

use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

use awt_binder::SymbolTable;
use awt_checker::{AwaitOperand, AwaitResolution, AwaitResolver, AwaitSite, CompletionRegistration};
use awt_common::Diagnostic;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    Resolved,
    Poisoned,
    Cancelled,
}

#[derive(Debug, Serialize)]
pub struct SiteReport {
    pub index: usize,
    pub operand: String,
    pub status: SiteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get_awaiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awaiter_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionRegistration>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub sites: Vec<SiteReport>,
    pub declaration_diagnostics: Vec<Diagnostic>,
}

fn describe_operand(table: &SymbolTable, operand: AwaitOperand) -> String {
    match operand {
        AwaitOperand::Expression(ty) => table.display_type(ty),
        AwaitOperand::Null => "null".to_string(),
        AwaitOperand::MethodGroup => "method group".to_string(),
        AwaitOperand::Lambda => "lambda expression".to_string(),
        AwaitOperand::VoidCall => "void call".to_string(),
        AwaitOperand::Error => "<error>".to_string(),
    }
}

impl Report {
    pub fn build(
        resolver: &AwaitResolver<'_>,
        sites: &[AwaitSite],
        resolutions: &[AwaitResolution],
    ) -> Self {
        let table = resolver.table();
        let sites = sites
            .iter()
            .zip(resolutions)
            .enumerate()
            .map(|(index, (site, resolution))| {
                let mut report = SiteReport {
                    index,
                    operand: describe_operand(table, site.operand),
                    status: SiteStatus::Poisoned,
                    get_awaiter: None,
                    awaiter_type: None,
                    result_type: None,
                    completion: None,
                    diagnostics: resolution
                        .diagnostics()
                        .iter()
                        .map(|d| resolver.render(d))
                        .collect(),
                };
                match resolution {
                    AwaitResolution::Resolved(info) => {
                        report.status = SiteStatus::Resolved;
                        report.get_awaiter = Some(table.display_member(info.get_awaiter));
                        report.awaiter_type = Some(table.display_type(info.awaiter_type));
                        report.result_type = Some(table.display_type(info.result_type));
                        report.completion = info.registration();
                    }
                    AwaitResolution::Cancelled => report.status = SiteStatus::Cancelled,
                    AwaitResolution::Poison { .. } => {}
                }
                report
            })
            .collect();
        let declaration_diagnostics = resolver
            .declaration_diagnostics()
            .iter()
            .map(|d| resolver.render(d))
            .collect();
        Report {
            sites,
            declaration_diagnostics,
        }
    }

    pub fn error_count(&self) -> usize {
        self.declaration_diagnostics.len()
            + self.sites.iter().map(|s| s.diagnostics.len()).sum::<usize>()
    }

    fn count(&self, status: SiteStatus) -> usize {
        self.sites.iter().filter(|s| s.status == status).count()
    }

    pub fn write_json(&self, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)
    }

    pub fn write_text(&self, out: &mut dyn Write, color: bool) -> io::Result<()> {
        let text = TextFormatter { color };
        for site in &self.sites {
            writeln!(out, "[{}] await {}", site.index, site.operand)?;
            match site.status {
                SiteStatus::Resolved => {
                    let completion = site
                        .completion
                        .map_or("none", CompletionRegistration::builder_method_name);
                    writeln!(
                        out,
                        "    {} {} -> {}, result {}, {}",
                        text.resolved(),
                        site.get_awaiter.as_deref().unwrap_or_default(),
                        site.awaiter_type.as_deref().unwrap_or_default(),
                        site.result_type.as_deref().unwrap_or_default(),
                        completion
                    )?;
                }
                SiteStatus::Cancelled => writeln!(out, "    cancelled")?,
                SiteStatus::Poisoned if site.diagnostics.is_empty() => {
                    writeln!(out, "    poisoned")?;
                }
                SiteStatus::Poisoned => {}
            }
            for diagnostic in &site.diagnostics {
                writeln!(out, "    {}", text.diagnostic(diagnostic))?;
            }
        }
        if !self.declaration_diagnostics.is_empty() {
            writeln!(out, "declarations")?;
            for diagnostic in &self.declaration_diagnostics {
                writeln!(out, "    {}", text.diagnostic(diagnostic))?;
            }
        }
        writeln!(
            out,
            "{} sites: {} resolved, {} poisoned, {} cancelled; {} errors",
            self.sites.len(),
            self.count(SiteStatus::Resolved),
            self.count(SiteStatus::Poisoned),
            self.count(SiteStatus::Cancelled),
            self.error_count()
        )
    }
}

struct TextFormatter {
    color: bool,
}

impl TextFormatter {
    fn resolved(&self) -> String {
        if self.color {
            "resolved".green().bold().to_string()
        } else {
            "resolved".to_string()
        }
    }

    fn diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let location = if diagnostic.file.is_empty() {
            "<unknown>".to_string()
        } else {
            format!(
                "{}[{}..{}]",
                diagnostic.file,
                diagnostic.start,
                diagnostic.start.saturating_add(diagnostic.length)
            )
        };
        let (category, code) = if self.color {
            (
                "error".red().bold().to_string(),
                diagnostic.display_code().bright_blue().to_string(),
            )
        } else {
            ("error".to_string(), diagnostic.display_code())
        };
        format!(
            "{location} - {category} {code}: {}",
            diagnostic.message_text
        )
    }
}
