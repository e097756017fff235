// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn target_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("platform")
            .short('p')
            .long("platform")
            .help("Platform name (e.g. el, ubuntu, mac_os_x, windows)"),
    )
    .arg(
        Arg::new("platform_version")
            .long("platform-version")
            .help("Platform version as reported by the host (e.g. 6.5, 10.9.5, 6.1.7601)"),
    )
    .arg(
        Arg::new("machine_arch")
            .short('m')
            .long("machine-arch")
            .help("Machine architecture (e.g. x86_64, i686)"),
    )
}

fn build_cli() -> Command {
    Command::new("omnitruck")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Omnitruck Client Contributors")
        .about("Query an Omnitruck package catalog")
        .subcommand_required(false)
        .arg(
            Arg::new("base_url")
                .long("base-url")
                .global(true)
                .default_value("https://www.getchef.com/chef")
                .help("API base URL"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .global(true)
                .default_value("30")
                .help("Request timeout in seconds"),
        )
        .subcommand(
            target_args(
                Command::new("metadata")
                    .about("Resolve the package matching a platform")
                    .arg(Arg::new("project").required(true).help("Project name (e.g. chef, chef_dk)")),
            )
            .arg(
                Arg::new("package_version")
                    .long("package-version")
                    .default_value("latest")
                    .help("Package version to resolve"),
            )
            .arg(
                Arg::new("prerelease")
                    .long("prerelease")
                    .action(ArgAction::SetTrue)
                    .help("Include prerelease packages"),
            )
            .arg(
                Arg::new("nightlies")
                    .long("nightlies")
                    .action(ArgAction::SetTrue)
                    .help("Include nightly packages"),
            )
            .arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Print JSON instead of key/value lines"),
            ),
        )
        .subcommand(
            Command::new("list")
                .about("List the full package catalog, optionally narrowed by platform")
                .arg(Arg::new("project").required(true).help("Project name (e.g. chef, chef_dk)"))
                .arg(
                    Arg::new("platform")
                        .short('p')
                        .long("platform")
                        .help("Only show this platform"),
                )
                .arg(
                    Arg::new("platform_version")
                        .long("platform-version")
                        .requires("platform")
                        .help("Only show this platform version (requires --platform)"),
                )
                .arg(
                    Arg::new("machine_arch")
                        .short('m')
                        .long("machine-arch")
                        .help("Only show this machine architecture"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print JSON instead of one package per line"),
                ),
        )
        .subcommand(
            target_args(
                Command::new("verify")
                    .about("Check a downloaded package against the catalog's SHA-256")
                    .arg(Arg::new("project").required(true).help("Project name (e.g. chef, chef_dk)"))
                    .arg(Arg::new("file").required(true).help("Downloaded package file")),
            )
            .arg(
                Arg::new("package_version")
                    .long("package-version")
                    .default_value("latest")
                    .help("Package version the file should match"),
            ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer)
        .expect("Failed to render man page");

    let man_path = man_dir.join("omnitruck.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");
}
