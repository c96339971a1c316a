//! CLI argument parsing tests for the ipset command.
//!
//! These tests only exercise argument parsing, so they need neither
//! root privileges nor the ip_set kernel modules.

use assert_cmd::Command;
use predicates::prelude::*;

fn ipset_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ipset"))
}

mod global_flags {
    use super::*;

    #[test]
    fn test_help() {
        ipset_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("IP set administration tool"))
            .stdout(predicate::str::contains("--json"))
            .stdout(predicate::str::contains("--debug"));
    }

    #[test]
    fn test_version() {
        ipset_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("ipset"));
    }

    #[test]
    fn test_invalid_subcommand() {
        ipset_cmd()
            .arg("invalid_command")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn test_missing_subcommand() {
        ipset_cmd().assert().failure();
    }
}

mod create_command {
    use super::*;

    #[test]
    fn test_create_help() {
        ipset_cmd()
            .args(["create", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--timeout"))
            .stdout(predicate::str::contains("--with-counters"))
            .stdout(predicate::str::contains("--with-comments"))
            .stdout(predicate::str::contains("--with-skbinfo"))
            .stdout(predicate::str::contains("--hashsize"))
            .stdout(predicate::str::contains("--maxelem"))
            .stdout(predicate::str::contains("--replace"));
    }

    #[test]
    fn test_create_requires_type() {
        ipset_cmd()
            .args(["create", "blocklist"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("TYPE"));
    }

    #[test]
    fn test_create_rejects_bad_timeout() {
        ipset_cmd()
            .args(["create", "blocklist", "hash:ip", "--timeout", "soon"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value"));
    }

    #[test]
    fn test_create_alias() {
        ipset_cmd().args(["n", "--help"]).assert().success();
    }
}

mod element_commands {
    use super::*;

    #[test]
    fn test_add_help() {
        ipset_cmd()
            .args(["add", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--comment"))
            .stdout(predicate::str::contains("--nomatch"))
            .stdout(predicate::str::contains("--replace"));
    }

    #[test]
    fn test_add_requires_entry() {
        ipset_cmd()
            .args(["add", "blocklist"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("<ENTRY>"));
    }

    #[test]
    fn test_add_counters_come_in_pairs() {
        ipset_cmd()
            .args(["add", "blocklist", "10.0.0.1", "--packets", "3"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--bytes"));
    }

    #[test]
    fn test_del_and_test_help() {
        ipset_cmd().args(["del", "--help"]).assert().success();
        ipset_cmd()
            .args(["test", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Test whether an entry is in a set"));
    }
}

mod set_commands {
    use super::*;

    #[test]
    fn test_rename_requires_two_names() {
        ipset_cmd().args(["rename", "old"]).assert().failure();
    }

    #[test]
    fn test_swap_requires_two_names() {
        ipset_cmd().args(["swap", "a"]).assert().failure();
    }

    #[test]
    fn test_list_help() {
        ipset_cmd()
            .args(["list", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--terse"));
    }

    #[test]
    fn test_destroy_requires_name() {
        ipset_cmd().args(["destroy"]).assert().failure();
    }
}
