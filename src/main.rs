use clap::{ArgAction, Parser, ValueEnum};
use shac::compile::{self, CompileError, Outcome};
use shac::config::{self, Overrides};
use shac::output;
use shac::substitute::PlaceholderStyle;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Asset placeholder grammar as spelled on the command line.
#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    /// @N@
    Bare,
    /// "@N@", quotes included
    Quoted,
}

impl From<StyleArg> for PlaceholderStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Bare => PlaceholderStyle::Bare,
            StyleArg::Quoted => PlaceholderStyle::Quoted,
        }
    }
}

#[derive(Parser)]
#[command(name = "shac")]
#[command(about = "Compile a directive document into a page plus content-addressed assets")]
#[command(long_about = "\
Compile a directive document into a page plus content-addressed assets

Source format:

  @page Home                  # output file name (line 1, required)
  @asset img/logo.png         # asset @0@
  @asset css/site.css         # asset @1@
  @html                       # end of header
  <link href=\"@1@\"><img src=\"@0@\"><a href=\"@$@/about\">

Assets are copied to <outdir>/<assetdir>/<sha256> and @N@ becomes
<assetdir>/<sha256>. @$@ becomes the root URL. A document whose first
line is @ignore is skipped.

Exit codes: 0 success, 1 system error, 2 usage error, 3 parse error.")]
#[command(version = version_string(), disable_version_flag = true)]
struct Cli {
    /// Source document
    #[arg(required_unless_present_any = ["stdin", "gen_config"], conflicts_with = "stdin")]
    source: Option<PathBuf>,

    /// Read the source document from stdin (source should be left empty)
    #[arg(short = 'x', long)]
    stdin: bool,

    /// Output website directory [default: .]
    #[arg(short = 'd', long = "outdir", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Asset subdirectory name [default: assets]
    #[arg(short = 'a', long = "assetdir", value_name = "DIR")]
    asset_dir: Option<String>,

    /// Root URL [default: output directory]
    #[arg(short = 'r', long = "root", value_name = "URL")]
    root_url: Option<String>,

    /// Asset placeholder grammar [default: bare]
    #[arg(short = 'p', long, value_enum, value_name = "STYLE")]
    placeholders: Option<StyleArg>,

    /// Config file [default: ./shac.toml if present]
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print nothing on success
    #[arg(short = 'q', long, conflicts_with = "json")]
    quiet: bool,

    /// Print the compile report as JSON
    #[arg(long)]
    json: bool,

    /// Print a stock shac.toml with all options documented
    #[arg(long)]
    gen_config: bool,

    /// Show program version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.kind().exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), CompileError> {
    let overrides = Overrides {
        output_dir: cli.output_dir.clone(),
        asset_dir: cli.asset_dir.clone(),
        root_url: cli.root_url.clone(),
        placeholders: cli.placeholders.map(PlaceholderStyle::from),
    };
    let build = config::load_config(Path::new("."), cli.config.as_deref(), &overrides)?;

    let outcome = match &cli.source {
        Some(path) => compile::compile_file(path, &build)?,
        None => compile::compile(io::stdin().lock(), &build)?,
    };

    if !cli.quiet {
        report(cli, &outcome);
    }
    Ok(())
}

fn report(cli: &Cli, outcome: &Outcome) {
    match outcome {
        Outcome::Skipped if cli.json => {
            let source = cli.source.as_ref().map(|p| p.display().to_string());
            println!("{}", serde_json::json!({ "skipped": true, "source": source }));
        }
        Outcome::Skipped => output::print_skipped(cli.source.as_deref()),
        Outcome::Compiled(report) if cli.json => match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("failed to encode report: {err}"),
        },
        Outcome::Compiled(report) => output::print_compile_output(report),
    }
}
