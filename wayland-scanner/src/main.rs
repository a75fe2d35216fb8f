use std::fs;
use std::io::{self, Read as _, Write as _};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use wayland_scanner::{Mode, ScanError, compile};

/// generates c bindings from a wayland protocol description.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    mode: Mode,
    /// protocol xml, stdin if omitted.
    #[arg(long)]
    input: Option<PathBuf>,
    /// stdout if omitted.
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long, env = "WAYLAND_SCANNER_LOG", default_value = "warn")]
    log_level: log::LevelFilter,
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        // stdout may carry the generated code
        eprintln!(
            "{level:<5} {file}:{line} > {text}",
            level = record.level(),
            file = record.file().unwrap_or_else(|| record.target()),
            line = record
                .line()
                .map_or_else(|| "??".to_string(), |line| line.to_string()),
            text = record.args(),
        );
    }

    fn flush(&self) {}
}

impl Logger {
    fn init(level: log::LevelFilter) -> anyhow::Result<()> {
        log::set_logger(&Logger).map_err(|err| anyhow::anyhow!("could not set logger: {err}"))?;
        log::set_max_level(level);
        Ok(())
    }
}

fn read_input(input: Option<&PathBuf>) -> Result<(Vec<u8>, String), ScanError> {
    let mut buf = Vec::new();
    let (filename, result) = match input {
        Some(path) => {
            let result = fs::File::open(path).and_then(|mut file| file.read_to_end(&mut buf));
            (path.display().to_string(), result)
        }
        None => ("<stdin>".to_string(), io::stdin().lock().read_to_end(&mut buf)),
    };
    match result {
        Ok(_) => Ok((buf, filename)),
        Err(source) => Err(ScanError::Read { filename, source }),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    Logger::init(cli.log_level)?;

    let (input, filename) = read_input(cli.input.as_ref())?;
    log::info!("compiling {filename} as {:?}", cli.mode);

    let out = compile(&input, &filename, cli.mode)?;

    match cli.output {
        Some(path) => {
            fs::write(&path, &out).with_context(|| format!("could not write {path:?}"))?
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&out).context("could not write stdout")?;
            stdout.flush().context("could not flush stdout")?;
        }
    }

    Ok(())
}

#[test]
fn test_cli() {
    use clap::CommandFactory as _;
    Cli::command().debug_assert();

    let cli = Cli::try_parse_from(["wayland-scanner", "shared-code", "--input", "a.xml"]).unwrap();
    assert_eq!(cli.mode, Mode::Code);
    assert_eq!(cli.input, Some(PathBuf::from("a.xml")));
    assert!(cli.output.is_none());

    assert!(Cli::try_parse_from(["wayland-scanner"]).is_err());
    assert!(Cli::try_parse_from(["wayland-scanner", "bogus"]).is_err());
    assert!(Cli::try_parse_from(["wayland-scanner", "code", "extra"]).is_err());
}
