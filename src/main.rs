use clap::Parser;
use ledger_merge::app::{render, repl};
use ledger_merge::core::ConfigProvider;
use ledger_merge::utils::error::LedgerError;
use ledger_merge::utils::{logger, validation::Validate};
use ledger_merge::{CliConfig, LedgerEngine, LedgerPipeline, LocalStorage, Session};
use std::io::Write;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting ledger-merge");
    if args.verbose {
        tracing::debug!("Ledger: {}, price list: {}", args.ledger, args.price);
    }

    let config = match args.validate().and_then(|_| args.resolve()) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    let format = args.format;
    let max_rows = config.max_display_rows();
    let uploads = args.uploads(&config);

    let pipeline = LedgerPipeline::new(LocalStorage::default(), config);
    let engine = LedgerEngine::new(pipeline, max_rows);
    let mut session = Session::new();
    session.upload(uploads);

    match engine.submit(&mut session).await {
        Ok(rows) => tracing::info!("✅ Merged table ready: {} rows", rows),
        Err(e) => exit_with(&e),
    }

    let stdout = std::io::stdout();
    if !args.skip_table {
        let mut out = stdout.lock();
        writeln!(out, "📋 Merged data")?;
        render::render_rows(&mut out, &session.merged()?.rows, format)?;
    }

    for keyword in args.keyword.iter().filter(|keyword| !keyword.is_empty()) {
        let result = engine.search(&mut session, keyword)?;
        render::render_search(stdout.lock(), result, format)?;
    }

    if args.interactive {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        repl::run_interactive(&engine, &mut session, stdin, std::io::stdout(), format).await?;
    }

    Ok(())
}

fn exit_with(e: &LedgerError) -> ! {
    tracing::error!(
        "❌ Failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}
