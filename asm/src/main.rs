use color_print::cprintln;
use std::{fs::File, io::Write, path::Path, process::ExitCode};
use xeasm::{assembler::Assembly, config, listing, msg, Config, Error, Mode};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    #[clap(default_value = "main.asm")]
    input: String,

    /// Output file [default: <INPUT stem>.obj]
    #[clap(short, long)]
    output: Option<String>,

    /// Operation table file [default: built-in SIC/XE]
    #[clap(short = 't', long)]
    optab: Option<String>,

    /// Assembly strategy
    #[clap(short, long, value_enum)]
    mode: Option<Mode>,

    /// Configuration file (YAML)
    #[clap(short, long)]
    config: Option<String>,

    /// Dump assembly listing
    #[clap(short, long)]
    dump: bool,
}

fn main() -> ExitCode {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("SIC/XE Assembler");

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            cprintln!("<red,bold>error</>: {}", err);
            if let Some(source) = std::error::Error::source(&err) {
                cprintln!("  <blue>caused by</>: {}", source);
            }
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` when the source had errors.
fn run(args: &Args) -> Result<bool, Error> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let mode = args.mode.unwrap_or(config.mode);
    let optab = config::load_optab(args.optab.as_deref().or(config.optab.as_deref()))?;
    let output = args.output.clone().unwrap_or_else(|| {
        Path::new(&args.input)
            .with_extension("obj")
            .to_string_lossy()
            .into_owned()
    });

    println!("1. Read Source");
    println!("  < {}", args.input);
    let source = config::read(&args.input)?;

    println!("2. Assemble ({})", mode);
    let assembly = match xeasm::assemble(&source, &optab, mode) {
        Ok(assembly) => assembly,
        Err(failed) => {
            msg::dump(&failed.diags, &args.input);
            if let Some(err) = failed.error() {
                cprintln!("<red,bold>aborted</>: {}", err);
            }
            return Ok(false);
        }
    };
    msg::dump(&assembly.diags, &args.input);

    println!("3. Write Object Program");
    println!("  > {}", output);
    write(&output, &assembly)?;

    if args.dump || config.dump {
        listing::dump(&assembly);
    }

    Ok(!assembly.has_error())
}

fn write(path: &str, assembly: &Assembly) -> Result<(), Error> {
    let mut file = File::create(path).map_err(|e| Error::FileCreate(path.to_string(), e))?;
    file.write_all(assembly.program.to_string().as_bytes())
        .map_err(|e| Error::FileWrite(path.to_string(), e))
}
