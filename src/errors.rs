use color_eyre::{
    config::HookBuilder,
    Result,
};

pub fn init_errors() -> Result<()> {
    let (panic_hook, eyre_hook) = HookBuilder::default()
        .panic_section(format!(
            "This is a bug. Consider reporting it at {}",
            env!("CARGO_PKG_REPOSITORY")
        ))
        .display_location_section(true)
        .display_env_section(true)
        .into_hooks();
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |panic_info| {
        let report = panic_hook.panic_report(panic_info).to_string();
        // The log file is plain text.
        error!("Error: {}", strip_ansi_escapes::strip_str(&report));

        #[cfg(debug_assertions)]
        better_panic::Settings::auto()
            .most_recent_first(false)
            .lineno_suffix(true)
            .verbosity(better_panic::Verbosity::Full)
            .create_panic_handler()(panic_info);

        #[cfg(not(debug_assertions))]
        eprintln!("{report}");

        std::process::exit(libc::EXIT_FAILURE);
    }));

    Ok(())
}
