// Wed Jan 15 2026 - Alex

use crate::memory::Address;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pclntab-resolver")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Resolve function names to entry addresses through Go pclntab metadata", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true)]
    pub no_color: bool,

    #[arg(long, global = true)]
    pub json_output: bool,

    /// JSON config file; flags given on the command line take precedence.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the decoded metadata header
    Header(HeaderArgs),
    /// Resolve function names to entry addresses
    Resolve(ResolveArgs),
    /// List every function in table order
    List(ListArgs),
    /// Find the function containing an address
    Lookup(LookupArgs),
    /// Check the function table for layout drift
    Verify(VerifyArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct InputArgs {
    /// Executable, or a raw metadata dump with --raw
    pub input: PathBuf,

    /// Treat the whole file as the metadata blob
    #[arg(long)]
    pub raw: bool,

    /// Load address of the blob, hex or decimal
    #[arg(long)]
    pub base: Option<String>,

    /// Section holding the metadata; may be repeated
    #[arg(long)]
    pub section: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct HeaderArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(required = true)]
    pub names: Vec<String>,

    /// Build a name index once instead of scanning per name
    #[arg(long)]
    pub index: bool,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Only list names matching this regular expression
    #[arg(short, long)]
    pub filter: Option<String>,

    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct LookupArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Program counter, hex or decimal
    pub pc: String,
}

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Exit with an error if any issue is found
    #[arg(long)]
    pub strict: bool,
}

impl InputArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.input.exists() {
            return Err(format!("Input file does not exist: {:?}", self.input));
        }
        if self.raw && !self.section.is_empty() {
            return Err("Cannot combine --raw with --section".to_string());
        }
        if let Some(base) = &self.base {
            if Address::parse(base).is_none() {
                return Err(format!("Invalid base address: {}", base));
            }
        }
        Ok(())
    }

    pub fn base_address(&self) -> Option<Address> {
        self.base.as_deref().and_then(Address::parse)
    }
}

impl ResolveArgs {
    pub fn validate(&self) -> Result<(), String> {
        self.input.validate()?;
        if self.names.iter().any(|name| name.is_empty()) {
            return Err("Function names must not be empty".to_string());
        }
        Ok(())
    }
}

impl ListArgs {
    pub fn validate(&self) -> Result<(), String> {
        self.input.validate()?;
        if let Some(pattern) = &self.filter {
            regex::Regex::new(pattern).map_err(|e| format!("Invalid filter: {}", e))?;
        }
        if self.limit == Some(0) {
            return Err("Limit must be at least 1".to_string());
        }
        Ok(())
    }
}

impl LookupArgs {
    pub fn validate(&self) -> Result<(), String> {
        self.input.validate()?;
        self.pc_address().map(|_| ())
    }

    pub fn pc_address(&self) -> Result<Address, String> {
        Address::parse(&self.pc).ok_or_else(|| format!("Invalid address: {}", self.pc))
    }
}
