use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "customer-export")]
#[command(about = "Export BuildOps customers and properties to CSV")]
pub struct Cli {
    #[arg(long, global = true, default_value = "config.json", help = "Credentials file (JSON, or TOML by extension)")]
    pub config: PathBuf,

    #[arg(long, global = true, help = "Directory for CSV output [default: beside the executable]")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List all customers
    #[command(name = "get_customers")]
    GetCustomers,
    /// List customers with no properties
    #[command(name = "get_customers_no_properties")]
    GetCustomersNoProperties,
    /// List properties
    #[command(name = "get_properties")]
    GetProperties,
    /// List properties with more than 2 addresses
    #[command(name = "get_properties_more_than_two_address")]
    GetPropertiesMoreThanTwoAddress,
    /// Check that the credentials can obtain a token
    #[command(name = "test")]
    Test,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommand_names() {
        let cli = Cli::parse_from(["customer-export", "get_customers_no_properties"]);
        assert_eq!(cli.command, Command::GetCustomersNoProperties);
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert!(cli.output_dir.is_none());

        let cli = Cli::parse_from(["customer-export", "get_properties_more_than_two_address"]);
        assert_eq!(cli.command, Command::GetPropertiesMoreThanTwoAddress);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "customer-export",
            "get_properties",
            "--output-dir",
            "/tmp/out",
            "--verbose",
        ]);
        assert_eq!(cli.command, Command::GetProperties);
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/out")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["customer-export"]).is_err());
        assert!(Cli::try_parse_from(["customer-export", "get-customers"]).is_err());
    }
}
