use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ELEC_CSV: &str = "\
ContributorType,ContributionAmount,FirstName,LastName,NonIndName,ContributionDate,EmpName,OccupationName,City,State
BUSINESS/CORP,\"$5,400.00\",,,McManimon Scotland & Baumann LLC,01/10/2025,,,Roseland,NJ
INDIVIDUAL,100,Jane,Doe,,2025-02-01,Acme,Engineer,Jersey City,NJ
";

/// A HOME of its own, so settings and data never touch the real user's.
struct Sandbox {
    home: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let sandbox = Self {
            home: tempfile::tempdir().unwrap(),
        };
        sandbox
            .cmd()
            .args(["init", "--data-dir"])
            .arg(sandbox.data_dir())
            .assert()
            .success()
            .stdout(predicate::str::contains("Initialized donortrail"));
        sandbox
    }

    fn data_dir(&self) -> PathBuf {
        self.home.path().join("trail")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("donortrail").unwrap();
        cmd.env("HOME", self.home.path())
            .env_remove("DONORTRAIL_DATA_DIR")
            .env_remove("DONORTRAIL_API_URL")
            .env_remove("RUST_LOG");
        cmd
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.home.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn import_elec(&self) -> PathBuf {
        let path = self.write("solomon.csv", ELEC_CSV);
        self.cmd()
            .args(["import", "contributions", "--candidate", "James Solomon"])
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("2 imported, 0 skipped"));
        path
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("donortrail")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dashboard"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("search"));
}

#[test]
fn init_seeds_registry() {
    let sandbox = Sandbox::new();
    assert!(sandbox.data_dir().join("donortrail.db").exists());

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Candidates:     5"));

    sandbox
        .cmd()
        .args(["candidates", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("James_Solomon"))
        .stdout(predicate::str::contains("Bill_ODea"));
}

#[test]
fn add_candidate_then_duplicate_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["candidates", "add", "Ada Lovelace", "--first", "Ada", "--last", "Lovelace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added candidate: Ada Lovelace (Ada_Lovelace)"));
    sandbox
        .cmd()
        .args(["candidates", "add", "Ada Lovelace", "--first", "Ada", "--last", "Lovelace"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Candidate already exists"));

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Candidates:     6"));
}

#[test]
fn preloaded_candidate_cannot_be_added_again() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["candidates", "add", "Joyce Watterman", "--first", "Joyce", "--last", "Watterman"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Candidate already exists"));
}

#[test]
fn import_is_deduplicated_by_checksum() {
    let sandbox = Sandbox::new();
    let path = sandbox.import_elec();
    sandbox
        .cmd()
        .args(["import", "contributions", "--candidate", "James_Solomon"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("already been imported"));

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Contributions:  2"))
        .stdout(predicate::str::contains("1 files, 2 rows"));
}

#[test]
fn reports_read_imported_rows() {
    let sandbox = Sandbox::new();
    sandbox.import_elec();

    sandbox
        .cmd()
        .args(["report", "total", "jamessolomon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$5,500.00"));

    sandbox
        .cmd()
        .args(["report", "breakdown", "James_Solomon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Corporate"))
        .stdout(predicate::str::contains("98.18%"));

    sandbox
        .cmd()
        .args(["report", "donors", "James_Solomon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("McManimon Scotland & Baumann LLC"))
        .stdout(predicate::str::contains("$5,400"));
}

#[test]
fn employer_report_keeps_cents() {
    let sandbox = Sandbox::new();
    let path = sandbox.write(
        "cents.csv",
        "\
ContributorType,ContributionAmount,FirstName,LastName,NonIndName,ContributionDate,EmpName,OccupationName,City,State
INDIVIDUAL,100.25,Jane,Doe,,2025-02-01,Acme,Engineer,Jersey City,NJ
INDIVIDUAL,50.50,John,Roe,,2025-02-03,Acme,Analyst,Hoboken,NJ
",
    );
    sandbox
        .cmd()
        .args(["import", "contributions", "--candidate", "James_Solomon"])
        .arg(&path)
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["report", "employers", "James_Solomon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme"))
        .stdout(predicate::str::contains("$150.75"));
}

#[test]
fn search_found_and_suggestions() {
    let sandbox = Sandbox::new();
    sandbox.import_elec();

    sandbox
        .cmd()
        .args(["search", "James_Solomon", "jane doe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jane Doe"))
        .stdout(predicate::str::contains("$100"));

    sandbox
        .cmd()
        .args(["search", "James_Solomon", "mcmanimon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Did you mean:"))
        .stdout(predicate::str::contains("McManimon Scotland & Baumann LLC"));

    sandbox
        .cmd()
        .args(["search", "James_Solomon", "nobody at all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("This person or business cannot be found."));
}

#[test]
fn unknown_candidate_is_an_error() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["report", "total", "Nobody"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Unknown candidate: Nobody"));
}

#[test]
fn export_writes_combined_csv() {
    let sandbox = Sandbox::new();
    sandbox.import_elec();

    sandbox
        .cmd()
        .args(["export", "James Solomon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 contributions"));

    let path = sandbox
        .data_dir()
        .join("exports")
        .join("James_Solomon_combined_contributions.csv");
    let csv = read(&path);
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.starts_with("ContributorGroup,"));
}

#[test]
fn data_dir_env_override() {
    let sandbox = Sandbox::new();
    let other = sandbox.home.path().join("elsewhere");
    sandbox
        .cmd()
        .env("DONORTRAIL_DATA_DIR", &other)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database not found"));
}

#[test]
fn completions_for_bash() {
    Command::cargo_bin("donortrail")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("donortrail"));
}
