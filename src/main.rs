use shiptrack::cli::run;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("SHIPTRACK_LOG", "warn")).init();
    // No-op outside Windows
    let _ = enable_ansi_support::enable_ansi_support();

    if let Err(e) = run() {
        // Everything that reaches here is a storage or system failure; user errors exit earlier
        eprintln!("Internal error: {}", e);
        let mut source = e.source();
        if source.is_some() {
            eprintln!("\nCaused by:");
            let mut indent = 1;
            while let Some(err) = source {
                eprintln!("{:indent$}  {}", "", err);
                source = err.source();
                indent += 1;
            }
        }
        std::process::exit(2);
    }
}
