use std::{io::Write, path::PathBuf};

use anyhow::{Context, bail};
use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};
use log::{error, info, warn};
use xpg_explain::config::ExplainConfig;
use xpg_explain::{FeatureId, XpG};

/// Computes abductive and contrastive explanations for an eXplanation Graph.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the `.xpg` file describing the classifier and instance.
    file: PathBuf,

    /// Enumerate every AXp and every CXp instead of computing one.
    #[arg(short = 'a', long = "all")]
    all: bool,

    /// Use the Horn-SAT back-end for AXp minimization.
    #[arg(short = 'H', long = "Horn")]
    horn: bool,

    /// Increase verbosity; may be repeated (`-vv`, `-vvv`).
    #[arg(short = 'v', long = "verb", action = clap::ArgAction::Count)]
    verb: u8,

    /// Which single explanation type to compute when `-a` is absent.
    #[arg(short = 'x', long = "xtype", value_enum, default_value_t = XType::Axp)]
    xtype: XType,

    /// Run a feature-membership query instead of AXp/CXp computation.
    /// Accepts either a feature name or a 0-based feature index.
    #[arg(short = 'f', long = "feature")]
    feature: Option<String>,

    /// Report every AXp containing the queried feature, not just one.
    #[arg(long = "all-membership", requires = "feature")]
    all_membership: bool,

    /// Write the resulting explanation(s) to this path as a JSON array of
    /// feature-index arrays.
    #[arg(short = 's', long = "save-exp")]
    save_exp: Option<PathBuf>,

    /// Optional TOML config file overriding this crate's defaults; CLI
    /// flags still take precedence over whatever it sets.
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum XType {
    Axp,
    Cxp,
}

fn parse_or_readline() -> anyhow::Result<Cli> {
    if std::env::args_os().len() > 1 {
        return Ok(Cli::parse());
    }

    let mut cmd = Cli::command().no_binary_name(true);

    println!("No CLI arguments were provided");
    println!("Specify arguments via stdin:");
    println!("{}", cmd.render_long_help());

    std::io::stdout().flush().context("could not write to stdout")?;
    let mut buffer = String::new();
    std::io::stdin().read_line(&mut buffer).context("could not read stdin")?;

    let args = shlex::split(buffer.trim()).context("invalid quoting")?;
    let matches = cmd.try_get_matches_from(args).context("failed to parse args")?;

    Cli::from_arg_matches(&matches).context("failed to parse args")
}

fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    match run() {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<()> {
    // Every engine call in this crate runs to completion in a single
    // `solve()` step, so there is no live solver handle to interrupt
    // mid-flight; a second Ctrl-C still aborts the process immediately.
    if let Err(err) = ctrlc::set_handler({
        let mut is_repeat = false;
        move || {
            if is_repeat {
                warn!("Aborting immediately");
                std::process::exit(-1);
            }
            is_repeat = true;
            warn!("Stopping... (press Ctrl-C again to abort immediately)");
        }
    }) {
        warn!("Failed to set interrupt handler! {}", err);
    }

    let args = parse_or_readline()?;

    let config = match &args.config {
        Some(path) => ExplainConfig::load(path)?,
        None => ExplainConfig::default(),
    };
    let use_horn = args.horn || config.use_horn;

    if args.verb > 0 {
        info!(target: "cli", "verbosity raised by {} level(s)", args.verb);
    }

    let xpg = xpg_explain::xpg_load(&args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;
    info!(target: "cli", "loaded {} with {} nodes, {} features", args.file.display(), xpg.n_nodes(), xpg.n_features());

    let explanations: Vec<Vec<FeatureId>> = if let Some(query) = &args.feature {
        let f = resolve_feature(&xpg, query)?;
        info!(target: "membership", "querying membership for feature {} ({})", f, xpg.feature_name(f));
        let guess_one = !args.all_membership;
        let result = if config.membership_algorithm == xpg_explain::config::MembershipAlgorithm::Brute {
            xpg_explain::membership_brute(&xpg, f, guess_one)
        } else {
            xpg_explain::membership_cnf(&xpg, f, guess_one)
        };
        result
            .map_err(|err| xpg_explain::error::with_feature_context(err, f))
            .context("feature membership query failed")?
    } else if args.all {
        info!(target: "marco", "enumerating all AXps and CXps (Horn back-end: {use_horn})");
        let (axps, cxps) = xpg_explain::enumerate(&xpg, use_horn).context("enumeration failed")?;
        println!("{} AXps, {} CXps", axps.len(), cxps.len());
        let mut combined = axps;
        combined.extend(cxps);
        combined
    } else {
        match args.xtype {
            XType::Axp => {
                let axp = xpg_explain::find_axp(&xpg, None, use_horn).context("AXp computation failed")?;
                vec![axp]
            }
            XType::Cxp => {
                let cxp = xpg_explain::find_cxp(&xpg, None).context("CXp computation failed")?;
                vec![cxp]
            }
        }
    };

    for exp in &explanations {
        let names: Vec<&str> = exp.iter().map(|&f| xpg.feature_name(f)).collect();
        println!("{:?} ({})", exp, names.join(", "));
    }

    if let Some(path) = &args.save_exp {
        let json = serde_json::to_string_pretty(&explanations).context("failed to serialize explanations")?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        info!(target: "cli", "saved {} explanation(s) to {}", explanations.len(), path.display());
    }

    Ok(())
}

/// Resolves a `-f` argument to a feature index: a bare integer is taken as
/// an index, otherwise the query is matched against the feature-name table.
fn resolve_feature(xpg: &XpG, query: &str) -> anyhow::Result<FeatureId> {
    if let Ok(idx) = query.parse::<FeatureId>() {
        if idx < xpg.n_features() {
            return Ok(idx);
        }
        bail!(
            "feature index {idx} is out of range (this graph has {} features)",
            xpg.n_features()
        );
    }
    (0..xpg.n_features())
        .find(|&f| xpg.feature_name(f) == query)
        .ok_or_else(|| anyhow::anyhow!("no feature named `{query}`"))
}
