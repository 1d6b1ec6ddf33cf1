use {
    clap::Parser,
    coin_scanner::{Cli, app},
    std::panic,
};

fn init_log(verbose: u8) {
    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Warn)
    };

    let my_code_level = match verbose {
        0 => my_code_level,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();

    // RUST_LOG, when set, wins over the defaults above
    builder
        .filter(None, global_level)
        .filter(Some("coin_scanner"), my_code_level)
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("CRITICAL PANIC:\n{}\nStack Trace:\n{}", info, backtrace);
    }));

    let args = Cli::parse();
    init_log(args.verbose);

    app::run(args).await
}
