// Wed Jan 15 2026 - Alex

use super::args::{Args, Command, HeaderArgs, InputArgs, ListArgs, LookupArgs, ResolveArgs, VerifyArgs};
use crate::config::Config;
use crate::layout::verify;
use crate::memory::{Address, BinaryImage, MetadataBlob, MmapMemory};
use crate::output::{
    HeaderReport, InputInfo, JsonSerializer, ListReport, LookupReport, OutputFormatter, ResolveOutcome,
    ResolveReport, VerifyOutput,
};
use crate::symbol::SymbolResolver;
use anyhow::Context;
use colored::Colorize;
use regex::Regex;
use serde::Serialize;

/// A loaded input file, either a raw metadata dump or an executable with a
/// metadata section.
enum Source {
    Raw { memory: MmapMemory, base: Address },
    Image { image: BinaryImage, base: Option<Address> },
}

impl Source {
    fn blob(&self) -> anyhow::Result<MetadataBlob<'_>> {
        match self {
            Source::Raw { memory, base } => Ok(memory.whole_blob(*base)),
            Source::Image { image, base } => {
                let blob = image
                    .blob()
                    .with_context(|| format!("Failed to read {} from {}", image.section().name, image.path().display()))?;
                Ok(match base {
                    Some(base) => MetadataBlob::with_base(blob.bytes(), *base),
                    None => blob,
                })
            }
        }
    }

    fn info(&self, path: &str, blob: &MetadataBlob<'_>) -> InputInfo {
        match self {
            Source::Raw { .. } => InputInfo::raw(path, blob.range()),
            Source::Image { image, .. } => InputInfo::section(path, image.section().name.clone(), blob.range()),
        }
    }
}

pub struct CommandHandler {
    config: Config,
    quiet: bool,
    json_output: bool,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            quiet: false,
            json_output: false,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn execute(mut self, args: Args) -> anyhow::Result<()> {
        self.setup_logging(&args)?;

        if args.no_color {
            colored::control::set_override(false);
        }
        if let Some(path) = &args.config {
            self.config = Config::load(path).with_context(|| format!("Failed to load config {}", path.display()))?;
        }
        self.quiet = args.quiet;
        self.json_output = args.json_output;

        match args.command {
            Command::Header(header_args) => self.handle_header(header_args),
            Command::Resolve(resolve_args) => self.handle_resolve(resolve_args),
            Command::List(list_args) => self.handle_list(list_args),
            Command::Lookup(lookup_args) => self.handle_lookup(lookup_args),
            Command::Verify(verify_args) => self.handle_verify(verify_args),
        }
    }

    fn setup_logging(&self, args: &Args) -> anyhow::Result<()> {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            "off" => log::LevelFilter::Off,
            other => anyhow::bail!("Unknown log level: {}", other),
        };

        env_logger::Builder::new()
            .filter_level(level)
            .format_timestamp(None)
            .try_init()
            .context("Failed to initialise logging")?;

        Ok(())
    }

    fn formatter(&self) -> OutputFormatter {
        OutputFormatter::new().with_address_width(self.config.address_width)
    }

    fn open(&self, input: &InputArgs) -> anyhow::Result<Source> {
        input.validate().map_err(|e| anyhow::anyhow!(e))?;
        let base = input.base_address().or(self.config.base_address);

        if input.raw {
            let memory = MmapMemory::from_file(&input.input)
                .with_context(|| format!("Failed to map {}", input.input.display()))?;
            return Ok(Source::Raw {
                memory,
                base: base.unwrap_or_else(Address::zero),
            });
        }

        let sections = if input.section.is_empty() {
            self.config.section_names.clone()
        } else {
            input.section.clone()
        };
        let image = BinaryImage::load(&input.input, &sections)
            .with_context(|| format!("Failed to load metadata from {}", input.input.display()))?;
        Ok(Source::Image { image, base })
    }

    fn announce(&self, formatter: &OutputFormatter, info: &InputInfo) {
        if !self.quiet && !self.json_output {
            println!("{} {}", "[*]".blue(), formatter.format_input(info));
        }
    }

    fn emit_json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let text = JsonSerializer::new().serialize(value)?;
        println!("{}", text);
        Ok(())
    }

    fn handle_header(&self, args: HeaderArgs) -> anyhow::Result<()> {
        let source = self.open(&args.input)?;
        let blob = source.blob()?;
        let resolver = SymbolResolver::new(blob);
        let header = resolver.header().context("Failed to decode metadata header")?;
        let report = HeaderReport::new(source.info(&args.input.input.to_string_lossy(), &blob), header, blob.len());

        if self.json_output {
            return self.emit_json(&report);
        }

        let formatter = self.formatter();
        self.announce(&formatter, &report.input);
        for line in formatter.format_header(&report) {
            println!("  {}", line);
        }
        Ok(())
    }

    fn resolve_report(&self, args: &ResolveArgs) -> anyhow::Result<ResolveReport> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;
        let source = self.open(&args.input)?;
        let blob = source.blob()?;
        let resolver = SymbolResolver::new(blob);

        let mut results = Vec::with_capacity(args.names.len());
        if args.index || self.config.use_index {
            let index = resolver.build_index().context("Failed to index function table")?;
            for name in &args.names {
                results.push(ResolveOutcome::from_result(name, index.resolve(name)));
            }
        } else {
            for name in &args.names {
                // Anything but a missing name aborts the whole batch.
                match resolver.resolve(name) {
                    Err(err) if !err.is_not_found() => {
                        return Err(anyhow::Error::new(err).context("Metadata layout is not compatible"));
                    }
                    result => results.push(ResolveOutcome::from_result(name, result)),
                }
            }
        }

        Ok(ResolveReport {
            input: source.info(&args.input.input.to_string_lossy(), &blob),
            results,
        })
    }

    fn handle_resolve(&self, args: ResolveArgs) -> anyhow::Result<()> {
        let report = self.resolve_report(&args)?;

        if self.json_output {
            self.emit_json(&report)?;
        } else {
            let formatter = self.formatter();
            self.announce(&formatter, &report.input);
            for outcome in &report.results {
                let line = formatter.format_outcome(outcome);
                if outcome.is_resolved() {
                    println!("{} {}", "[+]".green(), line);
                } else {
                    println!("{} {}", "[-]".red(), line);
                }
            }
        }

        match report.unresolved() {
            0 => Ok(()),
            missing => Err(anyhow::anyhow!("{} of {} names unresolved", missing, report.results.len())),
        }
    }

    fn list_report(&self, args: &ListArgs) -> anyhow::Result<ListReport> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;
        let filter = args
            .filter
            .as_deref()
            .map(Regex::new)
            .transpose()
            .context("Invalid filter")?;

        let source = self.open(&args.input)?;
        let blob = source.blob()?;
        let symbols = SymbolResolver::new(blob)
            .symbols()
            .context("Failed to enumerate function table")?;
        let total = symbols.len();
        let symbols = symbols
            .into_iter()
            .filter(|symbol| filter.as_ref().map_or(true, |re| re.is_match(&symbol.name)))
            .take(args.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(ListReport {
            input: source.info(&args.input.input.to_string_lossy(), &blob),
            total,
            symbols,
        })
    }

    fn handle_list(&self, args: ListArgs) -> anyhow::Result<()> {
        let report = self.list_report(&args)?;

        if self.json_output {
            return self.emit_json(&report);
        }

        let formatter = self.formatter();
        self.announce(&formatter, &report.input);
        for line in formatter.format_list(&report) {
            println!("{}", line);
        }
        if !self.quiet {
            println!(
                "{}",
                format!("{} of {} functions", report.symbols.len(), report.total).cyan()
            );
        }
        Ok(())
    }

    fn lookup_report(&self, args: &LookupArgs) -> anyhow::Result<LookupReport> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;
        let pc = args.pc_address().map_err(|e| anyhow::anyhow!(e))?;
        let source = self.open(&args.input)?;
        let blob = source.blob()?;
        let function = SymbolResolver::new(blob)
            .function_at(pc)
            .context("Failed to search function table")?;
        Ok(LookupReport::new(source.info(&args.input.input.to_string_lossy(), &blob), pc, function))
    }

    fn handle_lookup(&self, args: LookupArgs) -> anyhow::Result<()> {
        let report = self.lookup_report(&args)?;

        if self.json_output {
            return self.emit_json(&report);
        }

        let formatter = self.formatter();
        self.announce(&formatter, &report.input);
        let line = formatter.format_lookup(&report);
        if report.function.is_some() {
            println!("{} {}", "[+]".green(), line);
        } else {
            println!("{} {}", "[-]".yellow(), line);
        }
        Ok(())
    }

    fn handle_verify(&self, args: VerifyArgs) -> anyhow::Result<()> {
        let source = self.open(&args.input)?;
        let blob = source.blob()?;
        let report = verify(&blob).context("Metadata layout is not compatible")?;
        let output = VerifyOutput {
            input: source.info(&args.input.input.to_string_lossy(), &blob),
            report,
        };

        if self.json_output {
            self.emit_json(&output)?;
        } else {
            let formatter = self.formatter();
            self.announce(&formatter, &output.input);
            for issue in &output.report.issues {
                println!("{} {}", "[!]".yellow(), formatter.format_issue(issue));
            }
            if output.report.is_clean() {
                println!("{}", format!("{} functions checked, no issues", output.report.checked).green());
            } else {
                println!(
                    "{}",
                    format!("{} functions checked, {} issues", output.report.checked, output.report.issues.len()).yellow()
                );
            }
        }

        if args.strict && !output.report.is_clean() {
            anyhow::bail!("{} layout issues found", output.report.issues.len());
        }
        Ok(())
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
