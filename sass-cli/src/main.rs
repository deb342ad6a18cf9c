//! Command-line front end for the Sass-to-CSS compiler (spec §6.2).
//!
//! Parsing Sass source text into a [`sass_ast::Stylesheet`] is out of
//! scope for this workspace (spec §1: "the core consumes an
//! already-built Sass AST"), so inputs here are the already-parsed AST
//! serialized as JSON rather than `.scss`/`.sass` text. Everything
//! downstream of that — option handling, multi-input batching, output
//! routing, source maps, exit codes — follows §6.2 as written.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use sass_ast::Stylesheet;
use sass_common::{ErrorKind, Logger, SassError, SassResult, Span, StderrLogger};
use sass_core::{CompileOptions, Importer, LoadedSource, Style, Syntax};

/// Compile Sass ASTs to CSS.
#[derive(Parser, Debug)]
#[command(name = "sass-cli")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Compile one file, printing CSS to stdout
    sass-cli input.sass-ast.json

    # Compile to an explicit destination
    sass-cli input.sass-ast.json:output.css

    # Compile several inputs in one invocation
    sass-cli a.json:a.css b.json:b.css

    # Read the AST from standard input
    sass-cli --stdin < input.sass-ast.json > output.css
"#)]
struct Cli {
    /// `input[:output]` pairs; with `--stdin`, at most one positional
    /// names the output destination instead.
    #[arg(value_name = "INPUT[:OUTPUT]")]
    inputs: Vec<String>,

    /// Read the (sole) input's AST from standard input.
    #[arg(long)]
    stdin: bool,

    /// Treat every input as the indentation-based syntax rather than
    /// SCSS (affects diagnostics only; both are the same AST here).
    #[arg(long)]
    indented: bool,

    /// Additional import search path. May be repeated.
    #[arg(short = 'I', long = "load-path", value_name = "PATH")]
    load_path: Vec<PathBuf>,

    /// Output style.
    #[arg(long, value_enum, default_value_t = StyleArg::Expanded)]
    style: StyleArg,

    /// Emit a leading `@charset`/BOM for non-ASCII output.
    #[arg(long, overrides_with = "no_charset", default_value_t = true)]
    charset: bool,
    #[arg(long = "no-charset", overrides_with = "charset", hide = true)]
    no_charset: bool,

    /// On a compilation error, write the error as a CSS comment plus a
    /// `body::before` rule to the destination instead of leaving it
    /// untouched.
    #[arg(long, overrides_with = "no_error_css", default_value_t = true)]
    error_css: bool,
    #[arg(long = "no-error-css", overrides_with = "error_css", hide = true)]
    no_error_css: bool,

    /// Skip recompiling an input whose destination is already newer.
    #[arg(long)]
    update: bool,

    /// Recompile on change. Out of scope for this compiler (spec §6.2).
    #[arg(long)]
    watch: bool,

    /// Build a source map alongside the CSS output.
    #[arg(long, overrides_with = "no_source_map")]
    source_map: bool,
    #[arg(long = "no-source-map", overrides_with = "source_map", hide = true)]
    no_source_map: bool,

    /// How source URLs are written inside the source map.
    #[arg(long, value_enum, default_value_t = SourceMapUrls::Relative)]
    source_map_urls: SourceMapUrls,

    /// Embed each source file's text in the source map.
    #[arg(long)]
    embed_sources: bool,

    /// Embed the source map itself as a data: URL comment in the CSS.
    #[arg(long)]
    embed_source_map: bool,

    /// Stop compiling remaining inputs after the first failure.
    #[arg(long)]
    stop_on_error: bool,

    /// Interactive REPL. Out of scope for this compiler (spec §6.2).
    #[arg(short = 'i', long)]
    interactive: bool,

    /// Colorize terminal output.
    #[arg(short = 'c', long, overrides_with = "no_color")]
    color: bool,
    #[arg(long = "no-color", overrides_with = "color", hide = true)]
    no_color: bool,

    /// Use non-ASCII characters (e.g. in error snippets).
    #[arg(long, overrides_with = "no_unicode", default_value_t = true)]
    unicode: bool,
    #[arg(long = "no-unicode", overrides_with = "unicode", hide = true)]
    no_unicode: bool,

    /// Suppress warnings.
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Print the full Sass call stack on error.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum StyleArg {
    Expanded,
    Compressed,
}

impl From<StyleArg> for Style {
    fn from(value: StyleArg) -> Self {
        match value {
            StyleArg::Expanded => Style::Expanded,
            StyleArg::Compressed => Style::Compressed,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum SourceMapUrls {
    Relative,
    Absolute,
}

/// One resolved `input[:output]` job; `output: None` means "stdout".
struct Job {
    input: InputSource,
    output: Option<PathBuf>,
}

enum InputSource {
    Stdin,
    File(PathBuf),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> ExitCode {
    if cli.watch {
        return usage_error("--watch is not supported: this compiler has no filesystem watcher");
    }
    if cli.interactive {
        return usage_error("--interactive is not supported: this compiler has no REPL");
    }

    let jobs = match resolve_jobs(&cli) {
        Ok(jobs) => jobs,
        Err(message) => return usage_error(&message),
    };

    let logger: Rc<dyn Logger> = if cli.quiet { Rc::new(sass_common::SilentLogger) } else { Rc::new(StderrLogger::new()) };

    let options = CompileOptions {
        syntax: if cli.indented { Syntax::Indented } else { Syntax::Scss },
        style: cli.style.into(),
        source_map_enabled: cli.source_map && !cli.no_source_map,
        charset: cli.charset && !cli.no_charset,
        file_name: None,
    };

    let mut worst_exit = 0u8;
    for job in jobs {
        let exit = run_job(&job, &options, &logger, &cli);
        if exit != 0 {
            worst_exit = worst_exit.max(exit);
            if cli.stop_on_error {
                break;
            }
        }
    }
    ExitCode::from(worst_exit)
}

fn resolve_jobs(cli: &Cli) -> Result<Vec<Job>, String> {
    if cli.stdin {
        if cli.inputs.len() > 1 {
            return Err("--stdin accepts at most one positional argument (the output destination)".to_string());
        }
        let output = cli.inputs.first().map(PathBuf::from);
        return Ok(vec![Job { input: InputSource::Stdin, output }]);
    }
    if cli.inputs.is_empty() {
        return Err("no input given; pass a file, `input:output` pair, or --stdin".to_string());
    }
    cli.inputs
        .iter()
        .map(|spec| match spec.split_once(':') {
            Some((input, output)) => Ok(Job { input: InputSource::File(PathBuf::from(input)), output: Some(PathBuf::from(output)) }),
            None => Ok(Job { input: InputSource::File(PathBuf::from(spec)), output: None }),
        })
        .collect()
}

fn run_job(job: &Job, options: &CompileOptions, logger: &Rc<dyn Logger>, cli: &Cli) -> u8 {
    if cli.update {
        if let (InputSource::File(input), Some(output)) = (&job.input, &job.output) {
            if is_up_to_date(input, output) {
                return 0;
            }
        }
    }

    let source_text = match read_input(&job.input) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("Error: {err}");
            return 66;
        }
    };

    let stylesheet: Stylesheet = match serde_json::from_str(&source_text) {
        Ok(stylesheet) => stylesheet,
        Err(err) => {
            let message = format!("syntax error: could not deserialize Sass AST: {err}");
            return emit_failure(job, &message, cli, 65);
        }
    };

    let importer: Option<Rc<dyn Importer>> = Some(Rc::new(FsImporter::new(cli.load_path.clone())));

    match sass_core::evaluate(&stylesheet, importer, Rc::clone(logger), options) {
        Ok(result) => {
            if let Err(err) = write_output(job, &result.css, result.source_map.as_ref(), cli) {
                eprintln!("Error: {err}");
                return 66;
            }
            0
        }
        Err(err) => {
            let rendered = render_error(&err, cli.trace);
            emit_failure(job, &rendered, cli, exit_code_for(&err.kind))
        }
    }
}

fn exit_code_for(kind: &ErrorKind) -> u8 {
    match kind {
        ErrorKind::Usage(_) => 64,
        ErrorKind::ImportNotFound(_) => 66,
        _ => 65,
    }
}

fn render_error(err: &SassError, trace: bool) -> String {
    let mut rendered = err.render(None);
    if !trace {
        if let Some(idx) = rendered.find("\n  in ") {
            rendered.truncate(idx);
        }
    }
    rendered
}

fn emit_failure(job: &Job, message: &str, cli: &Cli, exit: u8) -> u8 {
    eprintln!("{message}");
    if cli.error_css && !cli.no_error_css {
        if let Some(output) = &job.output {
            let css = format!("/* {message} */\nbody::before {{ content: \"error\"; }}\n");
            let _ = fs::write(output, css);
        }
    }
    exit
}

fn read_input(source: &InputSource) -> io::Result<String> {
    match source {
        InputSource::Stdin => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        InputSource::File(path) => fs::read_to_string(path),
    }
}

fn write_output(job: &Job, css: &str, source_map: Option<&sass_core::SourceMap>, cli: &Cli) -> io::Result<()> {
    let mut css_out = css.to_string();
    if let Some(map) = source_map {
        let map_json = serde_json::to_string(map).unwrap_or_default();
        if cli.embed_source_map {
            let encoded = base64_encode(map_json.as_bytes());
            css_out.push_str(&format!("\n/*# sourceMappingURL=data:application/json;base64,{encoded} */\n"));
        } else if let Some(output) = &job.output {
            let map_path = map_path_for(output);
            fs::write(&map_path, map_json)?;
            let url = match cli.source_map_urls {
                SourceMapUrls::Relative => map_path.file_name().map_or_else(|| map_path.display().to_string(), |n| n.to_string_lossy().to_string()),
                SourceMapUrls::Absolute => map_path.display().to_string(),
            };
            css_out.push_str(&format!("\n/*# sourceMappingURL={url} */\n"));
        }
    }

    match &job.output {
        Some(path) => fs::write(path, css_out),
        None => io::stdout().write_all(css_out.as_bytes()),
    }
}

fn map_path_for(output: &Path) -> PathBuf {
    let mut path = output.as_os_str().to_owned();
    path.push(".map");
    PathBuf::from(path)
}

fn is_up_to_date(input: &Path, output: &Path) -> bool {
    let (Ok(input_meta), Ok(output_meta)) = (fs::metadata(input), fs::metadata(output)) else {
        return false;
    };
    let (Ok(input_time), Ok(output_time)) = (input_meta.modified(), output_meta.modified()) else {
        return false;
    };
    output_time >= input_time
}

fn usage_error(message: &str) -> ExitCode {
    eprintln!("Error: {message}");
    ExitCode::from(64)
}

/// Resolves `@use`/`@forward`/`@import` URLs against `--load-path`
/// (plus the current directory) on the filesystem. Since this compiler
/// takes the already-parsed AST as input rather than Sass source text
/// (spec §1), loaded files are expected in the same JSON-AST form as
/// the entrypoint, applying Sass's partial/index resolution rules
/// (try the literal name, then `_name`, then `name/index`) with a
/// `.json` extension in place of `.scss`/`.sass`.
struct FsImporter {
    load_paths: Vec<PathBuf>,
}

impl FsImporter {
    fn new(load_paths: Vec<PathBuf>) -> Self {
        Self { load_paths }
    }
}

impl Importer for FsImporter {
    fn canonicalize(&self, url: &str, _from: Option<&str>) -> Option<String> {
        std::iter::once(PathBuf::from(".")).chain(self.load_paths.iter().cloned()).find_map(|base| resolve_candidate(&base, url)).map(|path| path.display().to_string())
    }

    fn load(&self, canonical_url: &str) -> SassResult<LoadedSource> {
        let contents = fs::read_to_string(canonical_url)
            .map_err(|err| SassError::new(ErrorKind::ImportNotFound(format!("{canonical_url}: {err}")), Span::synthetic()))?;
        Ok(LoadedSource { canonical_url: canonical_url.to_string(), contents, is_indented_syntax: false })
    }
}

fn resolve_candidate(base: &Path, url: &str) -> Option<PathBuf> {
    let path = Path::new(url);
    let stem = path.file_stem()?.to_string_lossy().into_owned();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => base.join(parent),
        _ => base.to_path_buf(),
    };
    [
        dir.join(format!("{stem}.json")),
        dir.join(format!("_{stem}.json")),
        dir.join(&stem).join("index.json"),
        dir.join(&stem).join("_index.json"),
    ]
    .into_iter()
    .find(|candidate| candidate.is_file())
}

/// Minimal base64 encoder for `--embed-source-map`; avoids pulling in a
/// whole crate for one call site.
fn base64_encode(bytes: &[u8]) -> String {
    const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut out = String::with_capacity((bytes.len() + 2) / 3 * 4);
    for chunk in bytes.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied();
        let b2 = chunk.get(2).copied();
        out.push(ALPHABET[(b0 >> 2) as usize] as char);
        out.push(ALPHABET[((b0 << 4 | b1.unwrap_or(0) >> 4) & 0x3f) as usize] as char);
        out.push(if let Some(b1) = b1 { ALPHABET[((b1 << 2 | b2.unwrap_or(0) >> 6) & 0x3f) as usize] as char } else { '=' });
        out.push(if let Some(b2) = b2 { ALPHABET[(b2 & 0x3f) as usize] as char } else { '=' });
    }
    out
}
