use anyhow::{Context, Result};
use clap::Parser;
use nexus_core::{
    execute_command, Calculator, MemoryStore, PlayerInputs, PlayerStore, RuleBook, TurnMetrics,
    TurnNumber, TurnProcessor,
};
use std::path::PathBuf;

mod loader;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// World file (JSON: players, alliances, optional inputs)
    #[arg(long)]
    world: PathBuf,

    /// Number of turns to run
    #[arg(short, long, default_value_t = 1)]
    turns: u64,

    /// Number of the first turn to run
    #[arg(long, default_value_t = 1)]
    start_turn: TurnNumber,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Engine config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Edict catalog replacing the built-in one (JSON)
    #[arg(long)]
    edicts: Option<PathBuf>,

    /// Write the resulting world here
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the full bonus breakdown for every player
    #[arg(long)]
    report: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = std::str::FromStr::from_str(&args.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    log::info!("Starting nexus-sim...");

    let rules = loader::load_rules(args.edicts.as_deref())?;
    let config = loader::load_config(args.config.as_deref())?;
    let (store, inputs) = loader::load_world(&args.world)?.into_store();

    run_inputs(&store, &rules, &inputs, args.start_turn);

    let processor = TurnProcessor::new(&store, &rules, config);
    let mut metrics = TurnMetrics::default();
    for turn in args.start_turn..args.start_turn + args.turns {
        let summary = processor.process_batch(turn);
        summary.record_into(&mut metrics);
        if !summary.is_clean() {
            log::warn!(
                "Turn {}: {} players failed ({:.2}ms)",
                turn,
                summary.failures.len(),
                summary.elapsed.as_secs_f64() * 1000.0
            );
        }
    }

    print_players(&store, &rules, args.report)?;

    log::info!(
        "Finished {} batches: {} processed, {} skipped, {} failed, {} retried ({:.2}ms/batch, {:.0} players/s)",
        metrics.batches,
        metrics.players_processed,
        metrics.players_skipped,
        metrics.players_failed,
        metrics.conflicts_retried,
        metrics.batch_avg_ms(),
        metrics.players_per_second()
    );

    if let Some(path) = &args.output {
        loader::write_world(path, &loader::WorldFile::from_store(&store))?;
    }

    Ok(())
}

/// Commands run before the first batch. A rejected command is logged and
/// skipped; the rest still run.
fn run_inputs(store: &MemoryStore, rules: &RuleBook, inputs: &[PlayerInputs], turn: TurnNumber) {
    for input in inputs {
        for command in &input.commands {
            if let Err(e) = execute_command(store, rules, input.player, command, turn) {
                log::warn!("{}: {:?} rejected: {}", input.player, command, e);
            }
        }
    }
}

fn print_players(store: &MemoryStore, rules: &RuleBook, report: bool) -> Result<()> {
    let calculator = Calculator::new(rules);
    for id in store.player_ids() {
        let record = store.player(id)?;
        let alliance = match record.alliance {
            Some(a) => Some(store.alliance(a)?),
            None => None,
        };
        let metrics = calculator
            .compute(&record.sources(alliance.as_ref().map(|a| &a.structures)))
            .with_context(|| format!("Failed to compute metrics for {id}"))?;

        let power = metrics.power;
        let income = metrics.income;
        println!(
            "{} {} | offense {} defense {} spy {} sentry {} | credits {} citizens {} research {} protoform {} dark matter {} | net worth {}",
            id,
            record.name,
            power.offense,
            power.defense,
            power.spy,
            power.sentry,
            income.credits,
            income.citizens,
            income.research_data,
            income.protoform,
            income.dark_matter,
            record.progression.net_worth
        );

        if report {
            for (metric, b) in &metrics.breakdown {
                println!(
                    "  {}: {} = ({} + {} + {}) x (1 + {}) x (1 + {}) [synergy {}]",
                    metric,
                    b.value,
                    b.base,
                    b.personal_flat,
                    b.effective_alliance_flat,
                    b.total_percent,
                    b.edict_percent,
                    b.synergy_factor
                );
                for c in &b.contributions {
                    println!("    {:<10} {:<8} {:<24} {}", c.tier, c.kind, c.label, c.value);
                }
            }
        }
    }
    Ok(())
}
