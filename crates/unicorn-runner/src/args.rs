//! Command-line arguments of `unicorn-run`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use unicorn_core::config::CliOverrides;

/// Evaluate every enabled pattern as of one date and publish the day's
/// leaderboard.
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "unicorn-run")]
#[command(version)]
pub struct RunArgs {
    /// As-of date (YYYY-MM-DD); today when absent
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Directory holding `unicorn.toml` and the default database
    #[arg(long = "root")]
    pub project_root: Option<PathBuf>,

    /// SQLite database path, relative to the project root
    #[arg(long = "db")]
    pub db_path: Option<PathBuf>,

    /// Pattern catalog TOML file, relative to the project root
    #[arg(long = "catalog")]
    pub catalog_path: Option<PathBuf>,

    /// Restrict market context to one season
    #[arg(long)]
    pub season_year: Option<i32>,

    /// Leaderboard length
    #[arg(long)]
    pub target_count: Option<usize>,

    /// Pattern evaluation threads
    #[arg(long = "workers")]
    pub worker_threads: Option<usize>,
}

impl RunArgs {
    /// Highest-precedence config layer; anything unset falls through to
    /// `UNICORN_*`, then `unicorn.toml`, then defaults.
    pub fn cli_overrides(&self) -> CliOverrides {
        CliOverrides {
            db_path: self.db_path.clone(),
            catalog_path: self.catalog_path.clone(),
            target_count: self.target_count,
            worker_threads: self.worker_threads,
            season_year: self.season_year,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    fn parse(args: &[&str]) -> Result<RunArgs, clap::Error> {
        RunArgs::try_parse_from(std::iter::once("unicorn-run").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_all_flags() {
        let args = parse(&[
            "--date",
            "2024-06-01",
            "--season-year=2024",
            "--db",
            "/tmp/u.db",
            "--catalog",
            "patterns.toml",
            "--root",
            "/srv/unicorn",
            "--target-count",
            "25",
            "--workers",
            "8",
        ])
        .unwrap();
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(args.season_year, Some(2024));
        assert_eq!(args.db_path, Some(PathBuf::from("/tmp/u.db")));
        assert_eq!(args.project_root, Some(PathBuf::from("/srv/unicorn")));
        assert_eq!(args.worker_threads, Some(8));

        let cli = args.cli_overrides();
        assert_eq!(cli.catalog_path, Some(PathBuf::from("patterns.toml")));
        assert_eq!(cli.target_count, Some(25));
        assert_eq!(cli.worker_threads, Some(8));
    }

    #[test]
    fn test_errors() {
        assert!(parse(&["--date"]).is_err());
        assert_eq!(
            parse(&["--date", "06/01/2024"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            parse(&["--workers", "many"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert_eq!(parse(&["--verbose"]).unwrap_err().kind(), ErrorKind::UnknownArgument);
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_no_args_means_today_and_defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args, RunArgs::default());
        assert!(args.cli_overrides().db_path.is_none());
    }

    #[test]
    fn test_command_definition_is_consistent() {
        use clap::CommandFactory;
        RunArgs::command().debug_assert();
    }
}
