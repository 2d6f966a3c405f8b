use std::path::PathBuf;

use clap::Parser;

/// Nate: a conversational assistant for biodiversity questions.
#[derive(Parser, Debug)]
#[command(name = "nate", version, about)]
pub struct Args {
    /// System prompt file (overrides `session.system_prompt_path`).
    #[arg(short = 'p', long)]
    pub prompt: Option<PathBuf>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// CSV file to preload as a table before the conversation starts.
    #[arg(long)]
    pub seed: Option<PathBuf>,

    /// Name of the preloaded table (overrides `session.seed_name`).
    #[arg(long, requires = "seed")]
    pub seed_name: Option<String>,

    /// Model name override, e.g. gemini-2.0-flash.
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Log filter override, e.g. `debug` or `nate_ai=trace`.
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_name_requires_seed() {
        assert!(Args::try_parse_from(["nate", "--seed-name", "df"]).is_err());
        let args =
            Args::try_parse_from(["nate", "--seed", "toads.csv", "--seed-name", "toads"]).unwrap();
        assert_eq!(args.seed_name.as_deref(), Some("toads"));
    }

    #[test]
    fn defaults_are_empty() {
        let args = Args::try_parse_from(["nate"]).unwrap();
        assert!(args.prompt.is_none());
        assert!(args.model.is_none());
    }
}
