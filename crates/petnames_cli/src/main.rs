//! One-shot reconciliation of two JSON state files.
//!
//! # Responsibility
//! - Load an address-book state and a name state from disk.
//! - Replay one store into the other through the bridge and print both results.
//!
//! Usage: `petnames <address_book.json> <names.json> [address-book|petnames]`
//!
//! The optional third argument names the authoritative side (default
//! `address-book`). Set `PETNAMES_LOG_DIR` to an absolute path to enable file
//! logging.

use petnames_core::{
    core_version, default_log_level, init_logging, AddressBookPetnamesBridge, AddressBookState,
    AddressBookStore, BridgeConfig, ControllerMessenger, InMemoryAddressBook, InMemoryNameStore,
    NameState, NameStore, SyncOutcome, BRIDGE_MESSENGER_NAME, NAME_STATE_CHANGE_EVENT,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

const LOG_DIR_ENV: &str = "PETNAMES_LOG_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    AddressBook,
    Petnames,
}

impl Source {
    fn parse(value: Option<&str>) -> Result<Self, String> {
        match value {
            None | Some("address-book") => Ok(Self::AddressBook),
            Some("petnames") => Ok(Self::Petnames),
            Some(other) => Err(format!(
                "unknown source `{other}`; expected address-book|petnames"
            )),
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("petnames: logging disabled: {err}");
        }
    }

    match run(&args) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("petnames {}: {message}", core_version());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<String, String> {
    let [address_book_path, names_path, rest @ ..] = args else {
        return Err("usage: petnames <address_book.json> <names.json> [address-book|petnames]"
            .to_string());
    };
    let source = Source::parse(rest.first().map(String::as_str))?;

    let address_book: AddressBookState = read_json(Path::new(address_book_path))?;
    let names: NameState = read_json(Path::new(names_path))?;

    let bus: ControllerMessenger<NameState> = ControllerMessenger::new();
    let address_book = Arc::new(InMemoryAddressBook::with_state(address_book));
    let name_store = Arc::new(InMemoryNameStore::with_state(names, bus.clone()));
    let bridge = Arc::new(
        AddressBookPetnamesBridge::new(
            address_book.clone(),
            name_store.clone(),
            bus.restricted(BRIDGE_MESSENGER_NAME, &[NAME_STATE_CHANGE_EVENT]),
            BridgeConfig::default(),
        )
        .map_err(|err| err.to_string())?,
    );
    bridge.init().map_err(|err| err.to_string())?;

    let outcome = match source {
        Source::AddressBook => bridge.on_address_book_state_change(&address_book.state()),
        Source::Petnames => bridge.on_petname_state_change(&name_store.state()),
    }
    .map_err(|err| err.to_string())?;

    let (added, updated, deleted) = match &outcome {
        SyncOutcome::Applied(groups) => (
            groups.added.len(),
            groups.updated.len(),
            groups.deleted.len(),
        ),
        SyncOutcome::Suppressed => (0, 0, 0),
    };
    log::info!(
        "event=cli_reconcile module=cli status=ok added={added} updated={updated} deleted={deleted}"
    );

    let report = serde_json::json!({
        "added": added,
        "updated": updated,
        "deleted": deleted,
        "addressBook": address_book.state(),
        "names": name_store.state(),
    });
    serde_json::to_string_pretty(&report).map_err(|err| err.to_string())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("cannot read `{}`: {err}", path.display()))?;
    serde_json::from_str(&raw).map_err(|err| format!("invalid JSON in `{}`: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::{run, Source};
    use std::fs;

    fn write_inputs(address_book: &str, names: &str) -> (tempfile::TempDir, Vec<String>) {
        let dir = tempfile::tempdir().expect("temp dir");
        let book_path = dir.path().join("address_book.json");
        let names_path = dir.path().join("names.json");
        fs::write(&book_path, address_book).expect("write address book");
        fs::write(&names_path, names).expect("write names");
        let args = vec![
            book_path.display().to_string(),
            names_path.display().to_string(),
        ];
        (dir, args)
    }

    #[test]
    fn source_defaults_to_address_book() {
        assert_eq!(Source::parse(None), Ok(Source::AddressBook));
        assert_eq!(Source::parse(Some("petnames")), Ok(Source::Petnames));
        assert!(Source::parse(Some("ledger")).is_err());
    }

    #[test]
    fn reconciles_address_book_into_names() {
        let (_dir, args) = write_inputs(
            r#"{"addressBook":{"1":{"0xABC":{"address":"0xABC","name":"Alice","chainId":"1"}}}}"#,
            r#"{"ethereumAddress":{}}"#,
        );

        let report = run(&args).expect("run");
        let report: serde_json::Value = serde_json::from_str(&report).expect("report json");
        assert_eq!(report["added"], 1);
        assert_eq!(report["names"]["ethereumAddress"]["0xabc"]["1"]["name"], "Alice");
    }

    #[test]
    fn petnames_source_removes_entries_missing_from_names() {
        let (_dir, mut args) = write_inputs(
            r#"{"addressBook":{"1":{"0xabc":{"address":"0xabc","name":"Alice","chainId":"1"}}}}"#,
            r#"{"ethereumAddress":{}}"#,
        );
        args.push("petnames".to_string());

        let report = run(&args).expect("run");
        let report: serde_json::Value = serde_json::from_str(&report).expect("report json");
        assert_eq!(report["deleted"], 1);
        assert_eq!(report["addressBook"]["addressBook"], serde_json::json!({}));
    }

    #[test]
    fn reports_usage_and_bad_json() {
        assert!(run(&[]).unwrap_err().starts_with("usage"));

        let (_dir, args) = write_inputs("not json", "{}");
        assert!(run(&args).unwrap_err().contains("invalid JSON"));
    }
}
