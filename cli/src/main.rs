mod test_runner;

use std::io::Read;
use std::ops::Range;
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use slate::html::{self, ClassificationOverrides, ClassificationTables};
use slate::plain::{self, SerializeOptions};
use slate::Document;

#[derive(Parser)]
#[command(
    name = "slate",
    version,
    about = "Convert between HTML, plain text and Slate documents"
)]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log conversion details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an HTML fragment into a JSON document
    HtmlToJson(HtmlToJsonArgs),

    /// Convert a JSON document into HTML
    JsonToHtml(InputArgs),

    /// Convert plain text into a JSON document
    TextToJson(TextToJsonArgs),

    /// Convert a JSON document into plain text
    JsonToText(JsonToTextArgs),

    /// Run .test.html and .test.txt fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct InputArgs {
    /// Input file (reads stdin when omitted)
    file: Option<String>,
}

#[derive(clap::Args)]
struct HtmlToJsonArgs {
    #[command(flatten)]
    input: InputArgs,

    /// TOML file overriding the classification tables
    #[arg(short, long)]
    tables: Option<String>,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,
}

#[derive(clap::Args)]
struct TextToJsonArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,
}

#[derive(clap::Args)]
struct JsonToTextArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Separator placed between nodes at every level (taken literally)
    #[arg(short, long, default_value = "\n")]
    delimiter: String,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a fixture file or a directory containing them
    path: String,

    /// Run only fixtures in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

/// Source files loaded so far, for diagnostics.
struct Inputs {
    files: SimpleFiles<String, String>,
    color_choice: ColorChoice,
}

fn main() {
    let cli = Cli::parse();

    let _ = {
        use log::LevelFilter::*;

        env_logger::builder()
            .filter_module("slate", if cli.verbose { Debug } else { Warn })
            .parse_default_env()
            .try_init()
    };

    let mut inputs = Inputs {
        files: SimpleFiles::new(),
        color_choice: if cli.no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        },
    };

    match cli.command {
        Command::HtmlToJson(args) => do_html_to_json(args, &mut inputs),
        Command::JsonToHtml(args) => do_json_to_html(args, &mut inputs),
        Command::TextToJson(args) => do_text_to_json(args, &mut inputs),
        Command::JsonToText(args) => do_json_to_text(args, &mut inputs),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn do_html_to_json(args: HtmlToJsonArgs, inputs: &mut Inputs) {
    let tables = match &args.tables {
        Some(path) => load_tables(path, inputs),
        None => ClassificationTables::default(),
    };
    let (_, source) = read_input(&args.input, inputs);

    let document = html::deserialize_with(source.as_str(), &tables);
    print_document(&document, args.compact);
}

fn do_json_to_html(args: InputArgs, inputs: &mut Inputs) {
    let (file_id, source) = read_input(&args, inputs);
    let value = parse_json(file_id, &source, inputs);

    match html::serialize_value(&value) {
        Ok(output) => println!("{}", output),
        Err(error) => {
            eprintln!("error: {}", error);
            process::exit(1);
        }
    }
}

fn do_text_to_json(args: TextToJsonArgs, inputs: &mut Inputs) {
    let (_, source) = read_input(&args.input, inputs);
    let document = plain::deserialize(source.as_str());
    print_document(&document, args.compact);
}

fn do_json_to_text(args: JsonToTextArgs, inputs: &mut Inputs) {
    let (file_id, source) = read_input(&args.input, inputs);
    let value = parse_json(file_id, &source, inputs);
    let options = SerializeOptions::with_delimiter(args.delimiter);

    match plain::serialize_value(&value, &options) {
        Ok(output) => println!("{}", output),
        Err(error) => {
            eprintln!("error: {}", error);
            process::exit(1);
        }
    }
}

/// Read the input file, or stdin when no file is given.
fn read_input(args: &InputArgs, inputs: &mut Inputs) -> (usize, String) {
    let (name, result) = match &args.file {
        Some(file) => (file.clone(), std::fs::read_to_string(file)),
        None => {
            let mut buf = String::new();
            let result = std::io::stdin().read_to_string(&mut buf).map(|_| buf);
            ("<stdin>".to_string(), result)
        }
    };

    match result {
        Ok(source) => {
            let file_id = inputs.files.add(name, source.clone());
            (file_id, source)
        }
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", name, e);
            process::exit(1);
        }
    }
}

fn load_tables(path: &str, inputs: &mut Inputs) -> ClassificationTables {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path, e);
            process::exit(1);
        }
    };
    let file_id = inputs.files.add(path.to_string(), source.clone());

    match toml::from_str::<ClassificationOverrides>(&source) {
        Ok(overrides) => {
            log::debug!("loaded classification overrides from {}", path);
            ClassificationTables::from(overrides)
        }
        Err(e) => {
            let span = e.span().unwrap_or(0..0);
            emit_input_error(inputs, file_id, "invalid classification tables", e.message(), span);
            process::exit(1);
        }
    }
}

fn parse_json(file_id: usize, source: &str, inputs: &Inputs) -> serde_json::Value {
    match serde_json::from_str(source) {
        Ok(value) => value,
        Err(e) => {
            let span = json_error_span(source, &e);
            emit_input_error(inputs, file_id, "invalid JSON document", &e.to_string(), span);
            process::exit(1);
        }
    }
}

fn print_document(document: &Document, compact: bool) {
    let rendered = if compact {
        serde_json::to_string(document)
    } else {
        serde_json::to_string_pretty(document)
    };
    match rendered {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("error: cannot encode document: {}", e);
            process::exit(1);
        }
    }
}

fn emit_input_error(
    inputs: &Inputs,
    file_id: usize,
    message: &str,
    detail: &str,
    span: Range<usize>,
) {
    let writer = StandardStream::stderr(inputs.color_choice);
    let config = term::Config::default();
    let diagnostic = Diagnostic::error()
        .with_message(message)
        .with_labels(vec![Label::primary(file_id, span).with_message(detail)]);
    let _ = term::emit_to_write_style(&mut writer.lock(), &config, &inputs.files, &diagnostic);
}

/// Byte range of the character serde_json points at (1-based line and column).
fn json_error_span(source: &str, error: &serde_json::Error) -> Range<usize> {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(error.line().saturating_sub(1))
        .map(str::len)
        .sum();
    let mut start = (line_start + error.column().saturating_sub(1)).min(source.len());
    while !source.is_char_boundary(start) {
        start -= 1;
    }
    let end = source[start..]
        .chars()
        .next()
        .map_or(start, |c| start + c.len_utf8());
    start..end
}
