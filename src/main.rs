use smali_patch::patch::{run_batch, Console, Settings};
use smali_patch::rules;

use clap::{crate_version, value_parser, Arg, Command};
use std::path::PathBuf;
use std::process::exit;
use termcolor::ColorChoice;

fn main() {
    env_logger::init();

    let matches = Command::new("smali patcher")
        .version(crate_version!())
        .about("Route activity lifecycle calls of a disassembled services.jar through PreventRunning")
        .arg(
            Arg::new("apk")
                .short('a')
                .long("apk")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .default_value(Settings::DEFAULT_APK_DIR)
                .help("Disassembled apk providing replacement methods and support classes"),
        )
        .arg(
            Arg::new("services")
                .short('s')
                .long("service")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .default_value(Settings::DEFAULT_SERVICES_DIR)
                .help("Disassembled services.jar to patch in place"),
        )
        .arg(
            Arg::new("color")
                .long("color")
                .value_name("WHEN")
                .value_parser(["auto", "always", "never"])
                .default_value("auto")
                .help("Colorize console output"),
        )
        .get_matches();

    let settings = match (
        matches.get_one::<PathBuf>("apk"),
        matches.get_one::<PathBuf>("services"),
    ) {
        (Some(apk), Some(services)) => Settings::new(apk, services),
        _ => Settings::default(),
    };
    let color = match matches.get_one::<String>("color").map(String::as_str) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    };
    let console = Console::new(color);
    log::debug!("Running with {:?}", settings);

    let outcome = rules::default_rules(&settings)
        .and_then(|rules| run_batch(&settings, rules, &console));

    // Exit code
    if let Err(err) = outcome {
        log::debug!("{:?}", err);
        let _ = console.failed(&err);
        exit(1);
    }
}
