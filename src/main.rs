//! 日志模式分析器 - 命令行入口
//!
//! 报告写到 stdout，诊断日志写到 stderr。

use clap::Parser;
use std::io::{self, BufReader, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};

use log_pattern_analyzer::cli::{Args, OutputFormat};
use log_pattern_analyzer::error::Result;
use log_pattern_analyzer::infrastructure::config::load_config;
use log_pattern_analyzer::infrastructure::logging::init_logging;
use log_pattern_analyzer::output::{render_json, render_text};
use log_pattern_analyzer::services::LogAnalyzer;

fn run(args: &Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    args.apply_overrides(&mut config)?;

    if args.print_config {
        let toml = config.to_toml()?;
        io::stdout().write_all(toml.as_bytes())?;
        return Ok(());
    }

    let analyzer = LogAnalyzer::new(config)?;

    let report = if args.reads_stdin() {
        debug!("Reading log lines from stdin");
        let stdin = io::stdin();
        analyzer.analyze_reader(BufReader::new(stdin.lock()), Path::new("<stdin>"))?
    } else {
        info!(path = %args.input.display(), "Analysing log file");
        analyzer.analyze_file(&args.input)?
    };

    let rendered = match args.format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => render_json(&report)?,
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    if !rendered.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let code = error.exit_code();
            eprintln!("{:?}", miette::Report::new(error));
            ExitCode::from(code)
        }
    }
}
