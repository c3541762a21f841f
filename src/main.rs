use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, LevelFilter};
use rusty_ic::catalog::IcRegistry;
use rusty_ic::config::EmulatorConfig;
use rusty_ic::console::run_console;
use rusty_ic::dispatcher::Dispatcher;
use rusty_ic::pin::SimulatedPinBank;
use rusty_ic::server::Server;
use rusty_ic::transport::{LogStatusSink, StdioTransport};
use std::process::exit;
use std::thread;
use std::time::{Duration, Instant};

/// Cadence of the engine loop in the non-interactive front ends.
const TICK: Duration = Duration::from_millis(5);

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct CommonArgs {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Extra IC catalog merged over the built-in one
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal UI (default)
    Console,
    /// Line protocol on stdin/stdout
    Stdio,
    /// Line protocol over TCP, one transport per client
    Serve {
        /// Address to listen on, overrides the configuration
        #[arg(short, long)]
        listen: Option<String>,
    },
    /// Print the IC catalog and exit
    List,
}

fn init_logger(verbose: u8, quiet_default: bool) {
    let level = match verbose {
        0 if quiet_default => LevelFilter::Error,
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::builder()
        .format_timestamp(None)
        .format_target(false)
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_config(args: &CommonArgs) -> Result<EmulatorConfig> {
    match &args.config {
        Some(path) => EmulatorConfig::from_json_file(path)
            .with_context(|| format!("loading configuration {}", path)),
        None => Ok(EmulatorConfig::default()),
    }
}

fn load_registry(args: &CommonArgs, config: &EmulatorConfig) -> Result<IcRegistry> {
    let mut registry = IcRegistry::builtin().context("built-in IC catalog")?;
    if let Some(path) = args.catalog.as_ref().or(config.catalog_path.as_ref()) {
        let extra = IcRegistry::from_json_file(path)
            .with_context(|| format!("loading IC catalog {}", path))?;
        info!("Merging {} ICs from {}", extra.len(), path);
        registry.merge(extra);
    }
    Ok(registry)
}

fn run_stdio(dispatcher: &mut Dispatcher<SimulatedPinBank>) {
    dispatcher.attach_transport(Box::new(StdioTransport::spawn()));
    while dispatcher.transport_count() > 0 {
        dispatcher.tick(Instant::now());
        thread::sleep(TICK);
    }
    info!("stdin closed, exiting");
}

fn run_server(dispatcher: Dispatcher<SimulatedPinBank>, listen: &str) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(async {
        let server = Server::bind(listen)
            .await
            .with_context(|| format!("binding {}", listen))?;
        server
            .run(dispatcher, TICK, std::future::pending::<()>())
            .await;
        Ok::<(), anyhow::Error>(())
    })
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.common)?;
    let registry = load_registry(&cli.common, &config)?;
    let command = cli.command.unwrap_or(Commands::Console);

    if let Commands::List = command {
        for entry in registry.list() {
            println!("{:<8} {:>2} pins  {} gates", entry.name, entry.pin_count, entry.gate_count);
        }
        return Ok(());
    }

    let mut dispatcher = Dispatcher::new(registry, SimulatedPinBank::new(), &config);
    match command {
        Commands::Console => run_console(dispatcher, config.console.clone())
            .map_err(|e| anyhow::anyhow!("console: {}", e)),
        Commands::Stdio => {
            dispatcher.attach_sink(Box::new(LogStatusSink));
            run_stdio(&mut dispatcher);
            Ok(())
        }
        Commands::Serve { listen } => {
            dispatcher.attach_sink(Box::new(LogStatusSink));
            let addr = listen.unwrap_or_else(|| config.listen_addr.clone());
            run_server(dispatcher, &addr)
        }
        Commands::List => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Console));
    init_logger(cli.common.verbose, interactive);

    if let Err(e) = run(cli) {
        log::error!("{:#}", e);
        exit(1);
    }
}
