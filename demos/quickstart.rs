use std::fs;
use std::io;
use std::path;

use env_logger;
use log;

use pway_sort::{ExternalSorterBuilder, RecordReader};

fn main() {
    env_logger::Builder::new().filter_level(log::LevelFilter::Debug).init();

    let input = RecordReader::new(io::BufReader::new(fs::File::open("input.txt").unwrap()));

    let sorter = ExternalSorterBuilder::new(8)
        .with_tmp_dir(path::Path::new("./"))
        .build()
        .unwrap();

    let report = sorter.sort(input, path::Path::new("output.txt")).unwrap();

    println!("#Regs Ways #Runs #Parses");
    println!(
        "{} {} {} {}",
        report.records, report.fan_in, report.initial_runs, report.merge_passes
    );
}
