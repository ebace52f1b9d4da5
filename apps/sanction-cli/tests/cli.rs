// cli.rs — Drive the `sanction` binary through a full review.
//
//   1. Import an assistant reply from a file
//   2. `proposal show --json` surfaces it
//   3. `proposal approve` writes the files under the project root
//   4. A second approve fails with a non-zero exit
//   5. `audit verify` reports an intact chain

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const REPLY: &str = r#"<sanction-chat-summary>Add greeting</sanction-chat-summary>
<sanction-write path="src/hello.txt" description="Greeting file">
hello
</sanction-write>"#;

fn sanction(project: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sanction"))
        .arg("--project-root")
        .arg(project)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn import_show_approve_verify() {
    let project = tempfile::tempdir().unwrap();
    let reply = project.path().join("reply.txt");
    fs::write(&reply, REPLY).unwrap();

    let imported = sanction(
        project.path(),
        &[
            "message",
            "import",
            "--conversation",
            "5",
            "--file",
            reply.to_str().unwrap(),
        ],
    );
    assert!(imported.status.success(), "{imported:?}");
    let message_id = stdout(&imported);

    let shown = sanction(
        project.path(),
        &["proposal", "show", "--conversation", "5", "--json"],
    );
    assert!(shown.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&shown)).unwrap();
    assert_eq!(json["messageId"].to_string(), message_id);
    assert_eq!(json["proposal"]["title"], "Add greeting");
    assert_eq!(json["proposal"]["filesChanged"][0]["displayName"], "hello.txt");

    let approve_args = [
        "proposal",
        "approve",
        "--conversation",
        "5",
        "--message",
        message_id.as_str(),
    ];
    let approved = sanction(project.path(), &approve_args);
    assert!(approved.status.success(), "{approved:?}");
    assert_eq!(
        fs::read_to_string(project.path().join("src/hello.txt")).unwrap(),
        "hello"
    );

    let again = sanction(project.path(), &approve_args);
    assert!(!again.status.success());
    assert!(String::from_utf8_lossy(&again.stderr).contains("already been approved"));

    let verified = sanction(project.path(), &["audit", "verify"]);
    assert!(verified.status.success());
    assert!(stdout(&verified).contains("2 event(s), hash chain intact"));
}

#[test]
fn parse_reports_directives_and_anomalies() {
    let project = tempfile::tempdir().unwrap();
    let input = project.path().join("input.txt");
    fs::write(
        &input,
        "<sanction-write description=\"no path\">x</sanction-write>\n\
         <sanction-write path=\"a.txt\">a</sanction-write>",
    )
    .unwrap();

    let output = sanction(
        project.path(),
        &["parse", "--json", "--file", input.to_str().unwrap()],
    );
    assert!(output.status.success(), "{output:?}");

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["directives"].as_array().unwrap().len(), 1);
    assert_eq!(report["directives"][0]["path"], "a.txt");
    assert_eq!(report["anomalies"][0]["anomaly"], "missing_attribute");
}

#[test]
fn message_list_shows_review_state() {
    let project = tempfile::tempdir().unwrap();
    let reply = project.path().join("reply.txt");
    fs::write(&reply, REPLY).unwrap();

    let imported = sanction(
        project.path(),
        &["message", "import", "--conversation", "3", "--file", reply.to_str().unwrap()],
    );
    assert!(imported.status.success(), "{imported:?}");
    let message_id = stdout(&imported);

    let rejected = sanction(
        project.path(),
        &["proposal", "reject", "--conversation", "3", "--message", message_id.as_str()],
    );
    assert!(rejected.status.success(), "{rejected:?}");

    let listed = sanction(
        project.path(),
        &["message", "list", "--conversation", "3", "--json"],
    );
    assert!(listed.status.success(), "{listed:?}");
    let messages: serde_json::Value = serde_json::from_str(&stdout(&listed)).unwrap();
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["id"].to_string(), message_id);
    assert_eq!(messages[0]["role"], "assistant");
    assert_eq!(messages[0]["approval_state"], "rejected");

    let table = sanction(project.path(), &["message", "list", "--conversation", "3"]);
    assert!(stdout(&table).contains("rejected"));
}
