//! Deal document commands: analyze, template, convert.

use std::path::{Path, PathBuf};

use rei_calc::analysis::{DealAnalysis, DealAnalyzer, DealInputs};
use rei_calc::document;
use rei_calc::format::{money, percent, percent_or_na};
use rei_calc::DealReport;
use rei_common::config::Config;
use rei_common::{Error, Result, ResultExt};

use crate::OutputFormat;

/// File name used by `rei template` when no path is given.
const TEMPLATE_FILE_NAME: &str = "new-deal.md";

/// Load, analyze and print a deal.
pub fn analyze(config: &Config, file: &Path, format: OutputFormat) -> Result<()> {
    let deal = document::load(file).context(format!("Failed to load deal from {}", file.display()))?;
    let analysis = DealAnalyzer::with_defaults(config.calculator.clone()).analyze(&deal)?;

    println!("{}", render_analysis(&deal, &analysis, format)?);
    Ok(())
}

fn render_analysis(deal: &DealInputs, analysis: &DealAnalysis, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(analysis)?,
        OutputFormat::Markdown => DealReport::generate(deal, analysis).text_report,
        OutputFormat::Text => summary_text(deal, analysis),
    })
}

/// Headline numbers, one per line.
fn summary_text(deal: &DealInputs, a: &DealAnalysis) -> String {
    let name = if deal.name.is_empty() { "Unnamed deal" } else { deal.name.as_str() };
    let mut lines = vec![
        format!("{name} ({})", a.strategy),
        format!("  All-in cost:        {:>14}", money(a.all_in_cost)),
        format!("  Cash invested:      {:>14}", money(a.total_cash_invested)),
        format!("  Monthly payment:    {:>14}", money(a.monthly_payment)),
        format!("  NOI (annual):       {:>14}", money(a.net_operating_income)),
        format!("  Monthly cash flow:  {:>14}", money(a.monthly_cash_flow)),
        format!("  Cap rate:           {:>14}", percent(a.cap_rate)),
        format!("  Cash-on-cash ROI:   {:>14}", percent_or_na(a.cash_on_cash_roi)),
    ];
    if let Some(t) = &a.temporary_financing {
        lines.push(format!("  Cash out at refi:   {:>14}", money(t.cash_out)));
        lines.push(format!("  Cash left in deal:  {:>14}", money(t.cash_left_in_deal)));
    }
    if let Some(p) = &a.projection {
        lines.push(format!("  IRR ({} yr hold):    {:>14}", p.years.len(), percent_or_na(p.irr)));
    }
    for warning in &a.warnings {
        lines.push(format!("  ! {warning}"));
    }
    lines.join("\n")
}

/// Write a blank deal document and return its path.
pub fn template(config: &Config, out: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let path = out.unwrap_or_else(|| config.deals_dir().join(TEMPLATE_FILE_NAME));
    if path.exists() && !force {
        return Err(Error::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let deal = DealInputs::with_defaults(&config.calculator);
    document::save(&path, &deal).context(format!("Failed to write template to {}", path.display()))?;
    Ok(path)
}

/// Re-save a deal in the format implied by `output`'s extension.
pub fn convert(input: &Path, output: &Path) -> Result<()> {
    if input == output {
        return Err(Error::InvalidInput("Input and output are the same file".into()));
    }
    let deal = document::load(input).context(format!("Failed to load deal from {}", input.display()))?;
    document::save(output, &deal).context(format!("Failed to write {}", output.display()))?;

    tracing::debug!(from = %input.display(), to = %output.display(), "Deal converted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.storage.deals_dir = dir.join("deals").display().to_string();
        config
    }

    #[test]
    fn test_template_defaults_to_deals_dir() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());

        let path = template(&config, None, false).unwrap();
        assert_eq!(path, dir.path().join("deals").join(TEMPLATE_FILE_NAME));

        let deal = document::load(&path).unwrap();
        assert_eq!(deal.expenses.management_pct, config.calculator.management_pct);
        assert!(deal.projection.is_some());
    }

    #[test]
    fn test_template_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let out = dir.path().join("deal.md");

        template(&config, Some(out.clone()), false).unwrap();
        assert!(template(&config, Some(out.clone()), false).is_err());
        assert!(template(&config, Some(out), true).is_ok());
    }

    #[test]
    fn test_convert_markdown_to_json_and_back() {
        let dir = TempDir::new().unwrap();
        let md = dir.path().join("deal.md");
        let json = dir.path().join("deal.json");
        let back = dir.path().join("copy.md");

        let mut deal = DealInputs::default();
        deal.name = "Pine Cottage".into();
        deal.property.purchase_price = 140_000.0;
        deal.income.monthly_rent = 1_450.0;
        document::save(&md, &deal).unwrap();

        convert(&md, &json).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(value["name"], "Pine Cottage");

        convert(&json, &back).unwrap();
        assert_eq!(document::load(&back).unwrap(), deal);
        assert!(convert(&md, &md).is_err());
    }

    #[test]
    fn test_analyze_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nowhere.md");

        let err = analyze(&Config::default(), &missing, OutputFormat::Text).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load deal from"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_render_formats() {
        let mut deal = DealInputs::default();
        deal.name = "Ash St".into();
        deal.property.purchase_price = 100_000.0;
        deal.income.monthly_rent = 1_200.0;
        let analysis = DealAnalyzer::new().analyze(&deal).unwrap();

        let text = render_analysis(&deal, &analysis, OutputFormat::Text).unwrap();
        assert!(text.starts_with("Ash St (Conventional)"));
        assert!(text.contains("Cap rate:"));

        let json = render_analysis(&deal, &analysis, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["strategy"], "conventional");

        let markdown = render_analysis(&deal, &analysis, OutputFormat::Markdown).unwrap();
        assert!(markdown.starts_with("# Ash St"));
    }
}
