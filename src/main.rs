//! Command-line shell over the distill library: sanitize a file or stdin to
//! stdout.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use mimalloc::MiMalloc;

use distill::{
    DistillerConfig, HtmlFilter, SafeFilter, StripFilter, StrictFilter, UnsafeFilter,
    WordBreakFilter, distill,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    /// Drop all markup, keep text.
    Strip,
    /// Small whitelist: links, lists, emphasis, images.
    Strict,
    /// Permissive HTML4 whitelist minus script-capable surface.
    Safe,
    /// Keep everything (pre-trusted content only).
    Unsafe,
}

#[derive(Debug, Parser)]
#[command(name = "distiller", about = "Distill untrusted HTML into whitelist-conformant HTML")]
struct Args {
    /// Input file; stdin when omitted.
    input: Option<PathBuf>,

    /// Filter policy.
    #[arg(long, value_enum, default_value = "safe")]
    policy: PolicyArg,

    /// Maximum literal (non-markup) characters; 0 means unbounded.
    #[arg(long, default_value_t = 0)]
    max_length: usize,

    /// Encode chars above 0x7F as numeric entities.
    #[arg(long)]
    encode_non_ascii: bool,

    /// Leave whitespace untouched.
    #[arg(long)]
    no_normalize_whitespace: bool,

    /// Drop mismatched end tags instead of repairing nesting.
    #[arg(long)]
    no_balance_tags: bool,

    /// Inject a soft break into unbroken spans longer than this; 0 disables.
    #[arg(long, default_value_t = 0)]
    word_break: usize,
}

impl Args {
    fn config(&self) -> DistillerConfig {
        DistillerConfig {
            max_length: self.max_length,
            normalize_whitespace: !self.no_normalize_whitespace,
            encode_non_ascii: self.encode_non_ascii,
            balance_tags: !self.no_balance_tags,
            ..DistillerConfig::default()
        }
    }

    fn filter(&self) -> Arc<dyn HtmlFilter> {
        let base: Arc<dyn HtmlFilter> = match self.policy {
            PolicyArg::Strip => Arc::new(StripFilter),
            PolicyArg::Strict => Arc::new(StrictFilter),
            PolicyArg::Safe => Arc::new(SafeFilter),
            PolicyArg::Unsafe => Arc::new(UnsafeFilter),
        };
        if self.word_break > 0 {
            Arc::new(WordBreakFilter::new(self.word_break, base))
        } else {
            base
        }
    }
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let mut source = String::new();
    match &args.input {
        Some(path) => {
            source = std::fs::read_to_string(path)?;
        }
        None => {
            std::io::stdin().read_to_string(&mut source)?;
        }
    }

    let output = distill(&source, &args.config(), args.filter());

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.write_all(b"\n")?;
    Ok(())
}
