//! Induce the insurance risk rules of the applicants table and write them to an
//! in-memory rulesheet.
//!
//! cargo run --example applicants [path/to/table.csv]
use rulesheet::{Config, ConfigIO, MemorySink, RuleInducer, RulesheetError, SinkConfig, Table};
use std::env;

fn applicants() -> Result<Table, RulesheetError> {
    let mut table = Table::new("Applicants", &["Age", "Skydiver", "Weight", "Gender", "Risk"]);
    for row in [
        ["young", "yes", "heavy", "male", "high"],
        ["young", "yes", "light", "female", "high"],
        ["old", "yes", "heavy", "male", "high"],
        ["old", "yes", "light", "female", "high"],
        ["young", "no", "light", "female", "low"],
        ["young", "no", "heavy", "female", "medium"],
        ["young", "no", "heavy", "male", "medium"],
        ["old", "no", "light", "male", "medium"],
        ["old", "no", "heavy", "female", "medium"],
    ] {
        table.push_row(&row)?;
    }
    Ok(table)
}

fn main() -> Result<(), RulesheetError> {
    let table = match env::args().nth(1) {
        Some(path) => Table::from_csv_path(path)?,
        None => applicants()?,
    };

    let cfg = Config {
        sink: SinkConfig::from_env(),
        ..Default::default()
    };
    println!("{}", cfg.json_dump()?);

    let induced = RuleInducer::new(cfg).induce(&table)?;
    println!("{}", induced.tree);
    println!("{}", induced);

    let sink: MemorySink = induced.export_to()?;
    println!("{}", sink.render());
    Ok(())
}
