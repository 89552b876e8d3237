use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    ArgGroup, ArgMatches, Command,
};
use scaffold::{
    config::{Config, Overrides, Settings},
    NamePolicy, Request, ScaffoldError, SpecSource,
};
use std::path::PathBuf;

// The CLI layer should only parse inputs and forward them to library code.
fn main() -> miette::Result<()> {
    let matches = Command::new(crate_name!())
        .about(crate_description!())
        .author(crate_authors!())
        .version(crate_version!())
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("spec")
                .short('s')
                .long("spec")
                .value_name("FILE")
                .help("Outline file describing the tree, or '-' to read stdin")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("text")
                .short('t')
                .long("text")
                .value_name("TEXT")
                .help("Outline given inline, with '\\n' separating lines"),
        )
        .group(
            ArgGroup::new("input")
                .args(["spec", "text"])
                .required(true),
        )
        .arg(
            Arg::new("out")
                .short('o')
                .long("out")
                .value_name("DIR")
                .help("Directory the tree is created in")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("indent")
                .short('i')
                .long("indent")
                .value_name("N")
                .help("Whitespace characters per nesting level [default: inferred]")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("no-files")
                .long("no-files")
                .help("Only create folders")
                .action(ArgAction::SetTrue)
                .overrides_with("files"),
        )
        .arg(
            Arg::new("files")
                .long("files")
                .help("Create files even if the settings file says folders only")
                .action(ArgAction::SetTrue)
                .overrides_with("no-files"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Show what would be created without writing anything")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("names")
                .long("names")
                .value_name("POLICY")
                .help("Which filesystem naming rules entries must follow [default: portable]")
                .value_parser(["portable", "posix", "windows"]),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML settings file with defaults for indent_width, folders_only and names")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("confirm")
                .long("confirm")
                .help("Preview the tree and ask before writing")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let is_verbose = matches.get_flag("verbose");

    init_logging(is_verbose);

    handle_scaffold(&matches)
}

fn init_logging(is_verbose: bool) {
    let default_filter = if is_verbose { "debug" } else { "warn" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn handle_scaffold(args: &ArgMatches) -> miette::Result<()> {
    let source = match (
        args.get_one::<PathBuf>("spec"),
        args.get_one::<String>("text"),
    ) {
        (Some(path), _) if path.as_os_str() == "-" => SpecSource::Stdin,
        (Some(path), _) => SpecSource::File(path.clone()),
        (None, Some(text)) => SpecSource::Inline(text.clone()),
        (None, None) => unreachable!("clap requires one of --spec or --text"),
    };

    let output_root = args
        .get_one::<PathBuf>("out")
        .cloned()
        .expect("out required");

    let settings = match args.get_one::<PathBuf>("config") {
        Some(path) => Settings::from_file(path).map_err(ScaffoldError::from)?,
        None => Settings::default(),
    };

    let overrides = Overrides {
        indent_width: args.get_one::<usize>("indent").copied(),
        folders_only: match (args.get_flag("no-files"), args.get_flag("files")) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        },
        dry_run: args.get_flag("dry-run"),
        names: args
            .get_one::<String>("names")
            .map(|name| name.parse::<NamePolicy>())
            .transpose()
            .map_err(|message| miette::miette!(message))?,
    };

    let config = Config::resolve(output_root, settings, overrides).map_err(ScaffoldError::from)?;

    log::debug!("running with {:?}", config);

    let request = Request {
        source,
        config,
        confirm: args.get_flag("confirm"),
    };

    let Some(report) = scaffold::run(&request)? else {
        println!("Nothing was written.");
        return Ok(());
    };

    report.print();

    if report.has_failures() {
        let failed = report.failures().count();

        return Err(ScaffoldError::Incomplete { failed }.into());
    }

    Ok(())
}
