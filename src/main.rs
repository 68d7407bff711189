mod args;
mod commands;
mod output;

use chromadesk_infra::config::ConfigFile;
use chromadesk_infra::logging::init_logging;
use chromadesk_infra::paths;
use tracing::warn;

fn main() {
    if let Err(err) = real_main() {
        output::print_error(&err);
        std::process::exit(1);
    }
}

fn real_main() -> anyhow::Result<()> {
    use clap::Parser as _;

    let cli = args::Cli::parse();
    let config = ConfigFile::locate(cli.config)?;
    let (settings, warnings) = config.load_with_warnings();

    let log_file = paths::default_log_path().ok();
    init_logging(&settings.log_level, log_file.as_deref());
    for w in warnings {
        warn!(path = %config.path().display(), "{w}");
    }

    match cli.cmd {
        args::Command::Update => commands::update(&config, &settings),
        args::Command::Set { image, url } => match (image, url) {
            (_, Some(url)) => commands::set_url(&settings, &url),
            (Some(image), None) => commands::set(&settings, image),
            (None, None) => anyhow::bail!("set needs an image path or --url"),
        },
        args::Command::Fetch { region } => commands::fetch(&settings, region),
        args::Command::History => commands::history(&settings),
        args::Command::Config { cmd } => match cmd {
            args::ConfigCommand::Show => commands::config_show(&settings),
            args::ConfigCommand::Path => {
                println!("{}", config.path().display());
                Ok(())
            }
            args::ConfigCommand::Init => commands::config_init(&config),
            args::ConfigCommand::Set {
                section,
                key,
                value,
            } => commands::config_set(&config, &section, &key, &value),
        },
    }
}
