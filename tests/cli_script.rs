use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

const FULL_LISTING: &str = r#"goal rent
type flat
next
set city Pune
set state Maharashtra
set district Pune
set pincode 411045
set rent 20000
set bedrooms 2
set bathrooms 2
next
next
amenity add Lift
next
set description "Bright two bedroom flat near the IT park"
next
image add https://cdn.example.com/1.jpg
image add https://cdn.example.com/2.jpg
image add https://cdn.example.com/3.jpg
next
poi add transit "Bus Stop" 2
next
next
submit
exit
"#;

fn wizard(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("listing_wizard_cli").unwrap();
    cmd.env("LISTING_WIZARD_SCRIPT", "1")
        .env("LISTING_WIZARD_HOME", home.path())
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn script_mode_submits_a_listing() {
    let home = TempDir::new().unwrap();
    wizard(&home)
        .write_stdin(FULL_LISTING)
        .assert()
        .success()
        .stdout(contains("Now on 2. Location & Pricing"))
        .stdout(contains("created"));

    let listings: Vec<_> = std::fs::read_dir(home.path().join("listings"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(listings.len(), 1);
    let json = std::fs::read_to_string(&listings[0]).unwrap();
    assert!(json.contains("\"Bus Stop\""));
    assert!(json.contains("\"2 km\""));
}

#[test]
fn validation_errors_are_printed_and_the_step_is_kept() {
    let home = TempDir::new().unwrap();
    wizard(&home)
        .write_stdin("goal rent\ntype flat\nnext\nset bathrooms 21\nnext\nsteps\nexit\n")
        .assert()
        .success()
        .stdout(contains("City is required"))
        .stdout(contains("[>] 2. Location & Pricing"));
}

#[test]
fn unknown_command_gets_a_suggestion() {
    let home = TempDir::new().unwrap();
    wizard(&home)
        .write_stdin("nxt\nexit\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `nxt`"))
        .stdout(contains("Suggestion: `next`?"));
}

#[test]
fn memory_backend_keeps_nothing_on_disk() {
    let home = TempDir::new().unwrap();
    wizard(&home)
        .arg("--memory")
        .write_stdin("listings\nexit\n")
        .assert()
        .success()
        .stdout(contains("kept in memory"));
    assert!(!home.path().join("listings").exists());
}
