mod cli;

use clap::Parser;
use cli::{Cli, OutputFormat};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::str::FromStr;
use subnet_calc::config::Config;
use subnet_calc::models::Ipv4;
use subnet_calc::output::{render_csv, render_table};
use subnet_calc::processing::{BaseChange, Session};

const LOG_CONFIG_FILE: &str = "log4rs.yml";

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logging(&config.log_level)?;
    log::debug!("config: {config:?}");
    let cli = Cli::parse();
    log::info!("#Start main()");

    let mut session = load_session(&cli, &config)?;

    for subnet in &cli.divide {
        session.divide(subnet)?;
    }
    for subnet in &cli.join {
        session.join(subnet)?;
    }
    for (subnet, name) in &cli.label {
        session.assign_label(subnet, name)?;
    }

    session.display.binary_format = cli.binary || config.binary;
    for column in &cli.hide {
        session.display.columns.hide(*column);
    }

    let rendered = match cli.format {
        OutputFormat::Table => render_table(&session)?,
        OutputFormat::Csv => render_csv(&session)?,
    };
    print!("{rendered}");

    let metrics = session.tree().metrics();
    log::info!(
        "# {} subnets, join depth {}",
        metrics.leaf_count,
        metrics.height.max(1)
    );
    let base_url = cli.base_url.as_deref().unwrap_or(&config.base_url);
    println!("{}", session.share_link(base_url)?);
    Ok(())
}

fn init_logging(level: &str) -> Result<(), Box<dyn Error>> {
    if Path::new(LOG_CONFIG_FILE).exists() {
        log4rs::init_file(LOG_CONFIG_FILE, Default::default())?;
        return Ok(());
    }
    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::Info);
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();
    let log_config = LogConfig::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))?;
    log4rs::init_config(log_config)?;
    Ok(())
}

fn load_session(cli: &Cli, config: &Config) -> Result<Session, Box<dyn Error>> {
    let mut session = match &cli.link {
        Some(link) => {
            let fallback = Session::from_config(config)?.base();
            Session::from_share_link(link, fallback)?
        }
        None => Session::from_config(config)?,
    };

    if cli.network.is_some() || cli.mask.is_some() {
        let base = session.base();
        let network = cli
            .network
            .clone()
            .unwrap_or_else(|| base.addr.to_string());
        let mask = cli.mask.clone().unwrap_or_else(|| base.mask.to_string());
        let outcome = session.update_network(&network, &mask, |old, new| {
            cli.yes || ask_reset(old, new)
        })?;
        if let Some(corrected) = outcome.corrected {
            eprintln!(
                "The network address entered is not on a network boundary for this mask. \
                 It has been changed to {corrected}."
            );
        }
        if outcome.change == BaseChange::Declined {
            eprintln!("Keeping base {}", session.base());
        }
    }

    if let Some(token) = &cli.division {
        session.load_token(token)?;
    }
    Ok(session)
}

/// Synchronous confirmation on the terminal.
fn ask_reset(old: &Ipv4, new: &Ipv4) -> bool {
    eprint!(
        "You are changing the base network from {old} to {new}. \
         This will reset any changes you have made. Proceed? [y/N] "
    );
    io::stderr().flush().ok();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
