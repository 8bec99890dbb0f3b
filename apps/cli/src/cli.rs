use claimdesk_claims::{RequestKind, Track};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "claimdesk")]
#[command(version, about = "Resolve, review and decide FHIR claim bundles", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./claimdesk.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve every entry of a bundle and print the dereferenced resources
    Resolve {
        /// Bundle JSON file
        bundle: PathBuf,
    },

    /// Print the first resource of a kind, fully dereferenced
    Locate {
        /// Bundle JSON file
        bundle: PathBuf,

        /// Resource type, e.g. Patient or Coverage
        #[arg(short, long)]
        kind: String,
    },

    /// Tabulate the requests of a list file
    List {
        #[command(flatten)]
        source: SourceArgs,

        /// Print views as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one request with its review gate
    Show {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long)]
        id: String,
    },

    /// Approve one review track of a request
    Approve {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long)]
        id: String,

        /// medical | financial
        #[arg(short, long)]
        track: Track,

        /// Approved amount (defaults to the prefilled draft amount)
        #[arg(long)]
        amount: Option<Decimal>,

        #[arg(long)]
        remarks: Option<String>,

        /// Write the updated list here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Reject one review track of a request
    Reject {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long)]
        id: String,

        /// medical | financial
        #[arg(short, long)]
        track: Track,

        /// Write the updated list here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Attach a response bundle to a request
    UpdateResponse {
        /// List response JSON file
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        id: String,

        /// File holding the response JSON text
        #[arg(short, long)]
        response: PathBuf,

        /// Write the updated list here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Approve a pending coverage eligibility request
    ApproveEligibility {
        #[command(flatten)]
        target: EligibilityArgs,
    },

    /// Reject a pending coverage eligibility request
    RejectEligibility {
        #[command(flatten)]
        target: EligibilityArgs,
    },

    /// Tabulate coverage eligibility requests
    Eligibility {
        /// List response JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Print views as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// List response JSON file (`{"data": {"<kind>": [...]}}`)
    #[arg(short, long)]
    pub input: PathBuf,

    /// claim | preauth
    #[arg(short, long, default_value = "claim")]
    pub kind: RequestKind,
}

#[derive(Args, Debug, Clone)]
pub struct EligibilityArgs {
    /// List response JSON file
    #[arg(short, long)]
    pub input: PathBuf,

    #[arg(long)]
    pub id: String,

    /// Write the updated list here
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_approve_arguments() {
        let cli = Cli::try_parse_from([
            "claimdesk",
            "approve",
            "--input",
            "list.json",
            "--id",
            "r-1",
            "--track",
            "financial",
            "--amount",
            "1500.50",
        ])
        .unwrap();

        match cli.command {
            Command::Approve {
                source,
                track,
                amount,
                ..
            } => {
                assert_eq!(source.kind, RequestKind::Claim);
                assert_eq!(track, Track::Financial);
                assert_eq!(amount, Some(Decimal::new(150050, 2)));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_track() {
        assert!(Cli::try_parse_from([
            "claimdesk", "reject", "--input", "l.json", "--id", "x", "--track", "legal"
        ])
        .is_err());
    }

    #[test]
    fn parses_eligibility_answer() {
        let cli = Cli::try_parse_from([
            "claimdesk",
            "reject-eligibility",
            "-i",
            "elig.json",
            "--id",
            "e-1",
            "-o",
            "out.json",
        ])
        .unwrap();

        match cli.command {
            Command::RejectEligibility { target } => {
                assert_eq!(target.id, "e-1");
                assert_eq!(target.output, Some(PathBuf::from("out.json")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
