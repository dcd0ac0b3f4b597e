use anyhow::Result;
use clap::Parser;
use radar_sig::analysis::{analyze, AnalysisWindow};
use radar_sig::cli::{AnalyzeArgs, Cli, Command, ConfigArgs, OutputFormat, QuantilesArgs, RulesArgs};
use radar_sig::commit::Commit;
use radar_sig::report;
use radar_sig::significance::{QuantileTable, RuleBook, SignificanceConfig};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; warnings always reach stderr
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &ConfigArgs) -> Result<SignificanceConfig> {
    if let Some(path) = &args.config {
        return SignificanceConfig::from_toml(path);
    }
    let config = if args.strict {
        SignificanceConfig::strict()
    } else if args.permissive {
        SignificanceConfig::permissive()
    } else {
        SignificanceConfig::default()
    };
    Ok(config)
}

fn load_rules(path: Option<&Path>) -> Result<RuleBook> {
    match path {
        Some(path) => RuleBook::from_toml(path),
        None => RuleBook::builtin(),
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let config = load_config(&args.thresholds)?;
    let rules = load_rules(args.rules.as_deref())?;
    let commits = Commit::load_all(&args.data)?;

    let window = AnalysisWindow::new(args.amount, args.skip);
    let analysis = analyze(&args.repo, &commits, window, &rules, &config)?;

    match args.format {
        OutputFormat::Text => print!("{}", report::analysis_to_text(&analysis)),
        OutputFormat::Json => println!("{}", report::JsonReport::new(&analysis).to_json()?),
    }
    Ok(())
}

fn run_quantiles(args: QuantilesArgs) -> Result<()> {
    let config = load_config(&args.thresholds)?;
    let commits = Commit::load_all(&args.data)?;
    let quantiles = QuantileTable::from_commits(&commits, &config);

    match args.format {
        OutputFormat::Text => print!("{}", report::quantiles_to_text(&quantiles)),
        OutputFormat::Json => println!("{}", report::quantiles_to_json(&quantiles)?),
    }
    Ok(())
}

fn run_rules(args: RulesArgs) -> Result<()> {
    let rules = load_rules(args.rules.as_deref())?;
    if !rules.has_repo(&args.repo) {
        anyhow::bail!(
            "No rules for repo '{}' (known: {})",
            args.repo,
            rules.repos().collect::<Vec<_>>().join(", ")
        );
    }

    let rule = rules.rule_for_metric(&args.repo, &args.metric);
    print!("{}", report::rule_to_text(&args.repo, &args.metric, rule));
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing, verbose with --debug
    init_tracing(cli.debug);

    match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Quantiles(args) => run_quantiles(args),
        Command::Rules(args) => run_rules(args),
    }
}
