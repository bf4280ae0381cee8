//! The gramtab compiler CLI.
//!
//! Reads an EBNF grammar from standard input and emits a table-driven
//! parsing specification:
//!
//! - `gramtabc <file-stem>` - write `<stem>.h` + `<stem>.c`
//! - `gramtabc --asm <file-stem>` - write `<stem>.inc` + `<stem>.nasm`
//! - `gramtabc --tree` - dump the canonicalized tree to stdout and exit
//!
//! Exit code is 0 on success (and for `--help`/`--version`) and 1 for
//! every user-visible error.

use std::io::Read;
use std::process;

use clap::error::ErrorKind;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "gramtabc",
    version,
    about = "Compile an EBNF grammar into a table-driven parsing specification"
)]
struct Cli {
    /// Output file stem; `<stem>.h` + `<stem>.c` (or `.inc` + `.nasm`) are created
    #[arg(value_name = "file-stem", required_unless_present = "tree")]
    stem: Option<String>,

    /// Dump the canonicalized syntax tree to stdout and exit
    #[arg(short, long)]
    tree: bool,

    /// Emit NASM assembly instead of C
    #[arg(short, long)]
    asm: bool,
}

fn main() {
    // clap's default usage-error exit code is 2; this tool promises 1.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            process::exit(code);
        }
    };
    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

/// Execute the pipeline: read stdin -> parse -> canonicalize -> either
/// dump the tree or lay out the table and write the two output files.
fn run(cli: &Cli) -> Result<(), String> {
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .map_err(|e| format!("cannot read standard input: {}", e))?;

    let mut tree = match gramtab_parser::parse(&source) {
        Ok(tree) => tree,
        Err(err) => {
            report_parse_error(&source, &err);
            return Err("compilation failed".to_string());
        }
    };

    if cli.tree {
        gramtab_parser::canonicalize(&mut tree);
        print!("{}", tree.dump());
        return Ok(());
    }

    let stem = cli
        .stem
        .as_deref()
        .expect("clap requires a file stem unless --tree is given");
    let table = gramtab_codegen::lower(&mut tree).map_err(|e| e.to_string())?;

    // Both files are rendered before either is created, so a failed
    // pipeline never leaves partial output behind.
    let (first, second) = if cli.asm {
        let (include, body) = gramtab_codegen::emit_nasm(&table, stem);
        ((format!("{stem}.inc"), include), (format!("{stem}.nasm"), body))
    } else {
        let (header, body) = gramtab_codegen::emit_c(&table, stem);
        ((format!("{stem}.h"), header), (format!("{stem}.c"), body))
    };
    write_output(&first.0, &first.1)?;
    write_output(&second.0, &second.1)?;
    Ok(())
}

fn write_output(path: &str, contents: &str) -> Result<(), String> {
    std::fs::write(path, contents).map_err(|e| format!("cannot create '{}': {}", path, e))
}

/// Render the parse diagnostic with ariadne: the message carries the
/// line/column, the label marks the error span in the source.
fn report_parse_error(source: &str, err: &gramtab_parser::ParseError) {
    use ariadne::{Label, Report, ReportKind, Source};

    let mut start = err.span.start as usize;
    let mut end = (err.span.end as usize).max(start + 1);
    // Errors at end of input land one past the last character; point the
    // label at the final character instead so the span stays in bounds.
    if end > source.len() {
        end = source.len();
        start = end.saturating_sub(1);
    }
    if source.is_empty() {
        eprintln!("error: {}", err);
        return;
    }
    let _ = Report::<std::ops::Range<usize>>::build(ReportKind::Error, start..end)
        .with_message(err.to_string())
        .with_label(Label::new(start..end).with_message(&err.message))
        .finish()
        .eprint(Source::from(source));
}
