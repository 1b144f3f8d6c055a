use bundle_js::Bundle;
use bundle_js::BundleOptions;
use clap::Parser;
use std::fs;
use std::io::stdout;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bundle-js", version, about = "Bundles an ES module graph into one script")]
struct Cli {
  /// Entry module; `.js` is appended if missing.
  entry: PathBuf,

  /// Output destination; omit for stdout.
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Only keep these exports of the entry module.
  #[arg(long, value_delimiter = ',')]
  exports: Option<Vec<String>>,

  /// Drop comments attached to kept statements.
  #[arg(long)]
  no_comments: bool,

  /// Keep blank lines between statements of the same module.
  #[arg(long)]
  margins: bool,

  /// Print the build plan as JSON instead of code.
  #[arg(long)]
  plan: bool,

  /// Log build steps to stderr.
  #[arg(long)]
  trace: bool,
}

fn print_error(err: impl std::fmt::Display) -> ExitCode {
  eprintln!("error: {err}");
  ExitCode::from(1)
}

fn init_tracing(trace: bool) {
  let default = if trace { "debug" } else { "warn" };
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  let builder = fmt()
    .with_env_filter(env_filter)
    .with_writer(std::io::stderr);
  if let Err(err) = builder.try_init() {
    eprintln!("failed to install tracing subscriber: {err}");
  }
}

fn main() -> ExitCode {
  let args = Cli::parse();
  init_tracing(args.trace);

  let mut options = BundleOptions::new()
    .with_comments(!args.no_comments)
    .with_margins(args.margins);
  if let Some(exports) = args.exports {
    options = options.with_exports(exports);
  };
  let bundle = match Bundle::build(&args.entry, options) {
    Ok(bundle) => bundle,
    Err(err) => return print_error(err),
  };

  let mut text = if args.plan {
    match serde_json::to_string_pretty(&bundle.plan()) {
      Ok(json) => json,
      Err(err) => return print_error(err),
    }
  } else {
    match bundle.generate() {
      Ok(output) => {
        for external in output.externals.iter() {
          debug!(specifier = %external.specifier, name = %external.name, "external module");
        }
        output.code
      }
      Err(err) => return print_error(err),
    }
  };
  if args.plan {
    text.push('\n');
  };

  let written = match args.output.as_ref() {
    Some(path) => fs::write(path, &text).map_err(|err| format!("{}: {err}", path.display())),
    None => stdout()
      .write_all(text.as_bytes())
      .map_err(|err| format!("<stdout>: {err}")),
  };
  match written {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => print_error(format!("failed to write output to {err}")),
  }
}
