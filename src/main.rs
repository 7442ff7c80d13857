use std::fs;
use std::io;
use std::path;
use std::process;

use clap::ArgEnum;
use env_logger;
use log;

use pway_sort::{ExternalSorterBuilder, RecordReader};

fn main() {
    let arg_parser = build_arg_parser();

    let log_level: LogLevel = arg_parser.value_of_t_or_exit("log_level");
    init_logger(log_level);

    let ways: usize = arg_parser.value_of_t_or_exit("ways");

    let input = arg_parser.value_of("input").expect("value is required");
    let input_path = path::Path::new(input);
    if !input_path.exists() {
        log::error!("input file '{}' not found", input_path.display());
        process::exit(1);
    }

    let input_stream = match fs::File::open(input_path) {
        Ok(file) => RecordReader::new(io::BufReader::new(file)),
        Err(err) => {
            log::error!("input file opening error: {}", err);
            process::exit(1);
        }
    };

    let output = arg_parser.value_of("output").expect("value is required");

    let sorter = match ExternalSorterBuilder::new(ways).build() {
        Ok(sorter) => sorter,
        Err(err) => {
            log::error!("sorter initialization error: {}", err);
            process::exit(1);
        }
    };

    let report = match sorter.sort(input_stream, path::Path::new(output)) {
        Ok(report) => report,
        Err(err) => {
            log::error!("data sorting error: {}", err);
            process::exit(1);
        }
    };

    println!("#Regs Ways #Runs #Parses");
    println!(
        "{} {} {} {}",
        report.records, report.fan_in, report.initial_runs, report.merge_passes
    );
}

#[derive(Copy, Clone, clap::ArgEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn possible_values() -> impl Iterator<Item = clap::PossibleValue<'static>> {
        Self::value_variants().iter().filter_map(|v| v.to_possible_value())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <LogLevel as clap::ArgEnum>::from_str(s, false)
    }
}

fn build_arg_parser() -> clap::ArgMatches {
    clap::App::new("pway-sort")
        .about("p-way external merge sorter")
        .arg(
            clap::Arg::new("ways")
                .help("merge fan-in factor, at least 2")
                .required(true)
                .validator(|v| match v.parse::<usize>() {
                    Ok(ways) if ways >= 2 => Ok(()),
                    Ok(ways) => Err(format!("fan-in factor must be at least 2, got {}", ways)),
                    Err(_) => Err(String::from("fan-in factor must be an integer")),
                }),
        )
        .arg(
            clap::Arg::new("input")
                .help("file to be sorted")
                .required(true),
        )
        .arg(
            clap::Arg::new("output")
                .help("result file")
                .required(true),
        )
        .arg(
            clap::Arg::new("log_level")
                .short('l')
                .long("loglevel")
                .help("logging level")
                .takes_value(true)
                .default_value("info")
                .possible_values(LogLevel::possible_values()),
        )
        .get_matches()
}

fn init_logger(log_level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(match log_level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        })
        .format_timestamp_millis()
        .init();
}

#[cfg(test)]
mod test {
    use super::LogLevel;

    #[test]
    fn test_log_level_parses_case_insensitively() {
        assert!(matches!("info".parse::<LogLevel>(), Ok(LogLevel::Info)));
        assert!(matches!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug)));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_level_possible_values() {
        let values: Vec<_> = LogLevel::possible_values().map(|v| v.get_name()).collect();
        assert_eq!(values, ["off", "error", "warn", "info", "debug", "trace"]);
    }
}
