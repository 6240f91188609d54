use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};
use serde::Serialize;
use std::{
    env,
    fs::{self, File},
    io::{self, BufWriter, Read, Write},
};
use tracing::{info, warn, Level};

use jrp_markup::markup::{
    formatter::{format_compact, format_tagged},
    settings_parser::{parse_settings, SettingValue, Settings, MIGAKU},
    syntax_detector::{detect_syntax, split_lines, squash_newlines},
    unit::Unit,
    Syntax,
};

enum OutputFormat {
    Json,
    Compact,
    Tagged,
}

struct Args {
    settings: Settings,
    auto_detect: bool,
    field: bool,
    format: OutputFormat,
    verbose: bool,
    input_path: Option<String>,
    output_path: Option<String>,
}

fn get_args() -> Result<Option<Args>> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut opts = getopts::Options::new();
    opts.optopt(
        "s",
        "settings",
        "settings attribute, e.g. \"migaku;bare-empty-units\"",
        "SETTINGS",
    );
    opts.optflag("m", "migaku", "parse the tagged (Migaku) notation");
    opts.optflag("a", "auto", "detect the notation of each line");
    opts.optflag(
        "F",
        "field",
        "treat the input as one field: join newlines and split at <br>",
    );
    opts.optopt("f", "format", "json (default), compact or tagged", "FORMAT");
    opts.optflag("v", "verbose", "print debug logs to stderr");
    opts.optflag("h", "help", "print this help");

    let matches = match opts.parse(&args) {
        Ok(m) => m,
        Err(f) => bail!(f),
    };

    if matches.opt_present("h") {
        print!("{}", opts.usage("Usage: jrp-markup [options] [INPUT] [OUTPUT]"));
        return Ok(None);
    }

    let mut settings = match matches.opt_str("s") {
        Some(attr) => parse_settings(&attr).context("Invalid settings")?,
        None => Settings::default(),
    };
    if matches.opt_present("m") {
        settings.set(MIGAKU, SettingValue::Flag);
    }

    let format = match matches.opt_str("f").as_deref() {
        None | Some("json") => OutputFormat::Json,
        Some("compact") => OutputFormat::Compact,
        Some("tagged") => OutputFormat::Tagged,
        Some(format) => bail!("Unknown output format: {}", format),
    };

    let input_path = matches.free.first().filter(|&p| p != "-").cloned();
    let output_path = matches.free.get(1).cloned();

    Ok(Some(Args {
        settings,
        auto_detect: matches.opt_present("a"),
        field: matches.opt_present("F"),
        format,
        verbose: matches.opt_present("v"),
        input_path,
        output_path,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct LineOutput<'a> {
    line: usize,
    syntax: Syntax,
    #[serde(skip_serializing_if = "Option::is_none")]
    units: Option<&'a [Unit]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<()> {
    let args = match get_args()? {
        Some(args) => args,
        None => return Ok(()),
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .init();

    let input = match &args.input_path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
        }
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            input
        }
    };

    let input = if args.field {
        squash_newlines(&input)
    } else {
        input
    };
    let lines: Vec<&str> = if args.field {
        split_lines(&input)
    } else {
        input.lines().collect()
    };

    info!(lines = lines.len(), settings = args.settings.len(), "start");

    // ファイルに書き出すときだけ進捗を表示する
    let (mut out, pb) = match &args.output_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            (
                Box::new(BufWriter::new(file)) as Box<dyn Write>,
                create_progress_bar(lines.len() as u64),
            )
        }
        None => (
            Box::new(BufWriter::new(io::stdout().lock())) as Box<dyn Write>,
            ProgressBar::hidden(),
        ),
    };

    let mut failed = 0;
    for (i, line) in lines.iter().enumerate().progress_with(pb) {
        let syntax = if args.auto_detect {
            detect_syntax(line).unwrap_or_else(|| args.settings.syntax())
        } else {
            args.settings.syntax()
        };

        // 失敗した行はエラー表示に置き換え，次の行へ進む
        let rendered = match syntax.parse(line) {
            Ok(units) => render(&args.format, i + 1, syntax, &units),
            Err(err) => Err(err),
        };
        let rendered = rendered.unwrap_or_else(|err| {
            failed += 1;
            warn!(line = i + 1, "{:#}", err);
            render_error(&args.format, i + 1, syntax, &err)
        });

        writeln!(out, "{}", rendered)?;
    }
    out.flush()?;

    info!(failed, "finished");

    Ok(())
}

fn render(format: &OutputFormat, line: usize, syntax: Syntax, units: &[Unit]) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(&LineOutput {
            line,
            syntax,
            units: Some(units),
            error: None,
        })?,
        OutputFormat::Compact => format_compact(units),
        OutputFormat::Tagged => format_tagged(units)?,
    };
    Ok(rendered)
}

fn render_error(format: &OutputFormat, line: usize, syntax: Syntax, err: &anyhow::Error) -> String {
    let message = format!("{:#}", err);
    match format {
        OutputFormat::Json => {
            let output = LineOutput {
                line,
                syntax,
                units: None,
                error: Some(message.clone()),
            };
            serde_json::to_string(&output)
                .unwrap_or_else(|_| format!("⚠ Error during parsing: {}", message))
        }
        _ => format!("⚠ Error during parsing: {}", message),
    }
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{percent:>3}% [{wide_bar:.cyan/blue}] {pos}/{len} [{elapsed_precise} < {eta_precise}]",
        )
        .unwrap()
        .progress_chars("#-"),
    );
    pb
}
