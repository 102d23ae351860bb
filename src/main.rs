use ipcidr::output::{print_summary, summarize};
use ipcidr::AddressTable;
use std::env::VarError;
use std::error::Error;

/// Env var naming a JSON file that replaces the built-in classification table.
const TABLE_ENV: &str = "IPCIDR_TABLE";

/// Table path from the env var lookup; `None` means use the built-in table.
fn table_path(var: Result<String, VarError>) -> Result<Option<String>, Box<dyn Error>> {
    match var {
        Ok(path) => Ok(Some(path)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(path)) => {
            Err(format!("{TABLE_ENV} is not valid unicode: {path:?}").into())
        }
    }
}

fn load_table() -> Result<AddressTable, Box<dyn Error>> {
    match table_path(std::env::var(TABLE_ENV))? {
        Some(path) => {
            log::info!("Loading address table from {path}");
            let json = std::fs::read_to_string(&path)
                .map_err(|e| format!("Error reading address table {path}: {e}"))?;
            Ok(AddressTable::from_json(&json)?)
        }
        None => Ok(AddressTable::default()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs
    if let Err(e) = log4rs::init_file("log4rs.yml", Default::default()) {
        eprintln!("Logging disabled, could not load log4rs.yml: {e}");
    }
    dotenv::dotenv().ok();
    log::info!("#Start main()");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let tokens: Vec<&String> = args.iter().filter(|a| *a != "--json").collect();
    if tokens.is_empty() {
        eprintln!("usage: ipcidr [--json] <address | address/prefix | first-last>...");
        return Err("no address given".into());
    }

    let table = load_table()?;
    let mut failed = 0;
    for token in tokens {
        match summarize(token, &table) {
            Ok(summary) if json => println!("{}", serde_json::to_string_pretty(&summary)?),
            Ok(summary) => print_summary(&summary),
            Err(e) => {
                log::warn!("Skipping {token}: {e}");
                eprintln!("{token}: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} token(s) could not be parsed").into());
    }
    Ok(())
}
