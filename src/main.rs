use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pulse_midi::config::Config;
use pulse_midi::constants::DEFAULT_CONFIG_PATH;
use pulse_midi::logging::{self, LogFormat, LogLevel, LoggingConfig};
use pulse_midi::midi::{self, MidirSink};
use pulse_midi::{source, DispatchSettings, Dispatcher, HeartRateProcessor};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about = "Drive MIDI CC from a live heart rate", long_about = None)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Overrides [logging] level
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// Overrides [logging] format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Default)]
enum Commands {
    /// Stream heart rate to MIDI until interrupted
    #[default]
    Run,
    /// List available MIDI output ports
    ListPorts,
    /// Load and validate the config, then exit
    CheckConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match real_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn real_main(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or_default();

    if let Commands::ListPorts = command {
        init_logging(cli.log_level, cli.log_format, LoggingConfig::default());
        for (i, name) in midi::list_output_ports()?.iter().enumerate() {
            println!("{}: {}", i, name);
        }
        return Ok(());
    }

    // 1. 加载配置，出错直接退出
    let config = Config::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()));
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            init_logging(cli.log_level, cli.log_format, LoggingConfig::default());
            return Err(err);
        }
    };
    init_logging(cli.log_level, cli.log_format, config.logging.clone());

    if config.smoothing.window_width < 1 {
        tracing::warn!(
            window_width = config.smoothing.window_width,
            "window_width below 1, using 1"
        );
    }
    if config.smoothing.rapid_growth_cooldown > 0 {
        tracing::debug!("rapid_growth_cooldown_seconds is not used");
    }

    if let Commands::CheckConfig = command {
        println!("{:#?}", config);
        return Ok(());
    }

    // 2. 数据源和 MIDI 输出
    let source = source::from_config(&config.data_source).context("opening data source")?;
    let sink = MidirSink::connect(&config.midi.port_name).context("opening midi output")?;

    // 3. Ctrl+C 退出
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("installing Ctrl-C handler")?;

    // 4. 主循环
    let processor = HeartRateProcessor::new(
        config.smoothing.width(),
        config.smoothing.rapid_growth_threshold,
    );
    let mut dispatcher = Dispatcher::new(source, sink, processor, DispatchSettings::from(&config));
    dispatcher.run(&shutdown);

    Ok(())
}

fn init_logging(level: Option<LogLevel>, format: Option<LogFormat>, mut base: LoggingConfig) {
    if let Some(level) = level {
        base.level = level;
    }
    if let Some(format) = format {
        base.format = format;
    }
    logging::init(&base);
}
