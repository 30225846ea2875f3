use statichttpd::cache::FileCache;
use statichttpd::config::Config;
use statichttpd::error::StartupError;
use statichttpd::pool::ThreadPool;
use statichttpd::server;

use std::net::TcpListener;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

fn main() -> ExitCode {
    env_logger::init();

    let config = match Config::parse(std::env::args()) {
        Ok(config) => config,
        Err(StartupError::Help(message)) => {
            println!("{message}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config) -> Result<(), StartupError> {
    let cache = Arc::new(FileCache::new(config.root.clone()));
    let pool = Arc::new(ThreadPool::new(config.threads));

    spawn_sweep_thread(Arc::clone(&cache));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).map_err(|source| StartupError::Bind {
        addr: addr.clone(),
        source,
    })?;

    log::info!(
        "statichttpd listening on {addr}, {} worker threads, serving {}",
        config.threads,
        config.root.display()
    );

    server::serve(listener, cache, pool);
    Ok(())
}

/// Runs the cache's revalidation sweep forever on its own thread.
fn spawn_sweep_thread(cache: Arc<FileCache>) {
    thread::spawn(move || loop {
        thread::sleep(cache.sweep_interval());
        cache.sweep();
    });
}
