use flagchain::{
    BoolFlag, ChoiceFlag, Choices, Command, Destination, FlagError, PathFlag, Uint64Flag,
};
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

fn args(s: &[&str]) -> Vec<String> {
    s.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Level {
    Low,
    High,
}

fn levels() -> Choices<Level> {
    Choices::new([("low", Level::Low), ("high", Level::High)])
}

#[test]
fn test_env_wins_over_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"7").unwrap();
    env::set_var("FLAGCHAIN_IT_WORKERS", "3");

    let mut cmd = Command::new("app").flag(Uint64Flag {
        env_vars: vec!["FLAGCHAIN_IT_WORKERS".to_string()],
        file_path: file.path().to_string_lossy().into_owned(),
        ..Uint64Flag::new("workers")
    });
    let ctx = cmd.prepare(&[], None).unwrap();

    assert!(ctx.is_set("workers"));
    assert_eq!(ctx.resolved("workers"), Some("3".to_string()));
    // Not given on the command line, so the lineage walk finds nothing.
    assert_eq!(ctx.uint64("workers"), 0);
}

#[test]
fn test_file_used_when_env_absent() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"/srv/data").unwrap();
    let missing = "/nonexistent/flagchain/it/path";

    let dest = Destination::new(String::new());
    let mut cmd = Command::new("app").flag(PathFlag {
        env_vars: vec!["FLAGCHAIN_IT_DATA_UNSET".to_string()],
        file_path: format!("{},{}", missing, file.path().display()),
        destination: Some(dest.clone()),
        ..PathFlag::new("data")
    });
    let ctx = cmd.prepare(&[], None).unwrap();

    assert!(ctx.is_set("data"));
    assert_eq!(dest.get(), "/srv/data");
}

#[test]
fn test_command_line_wins_over_env() {
    env::set_var("FLAGCHAIN_IT_TIMEOUT", "5");
    let dest = Destination::new(0u64);
    let mut cmd = Command::new("app").flag(Uint64Flag {
        env_vars: vec!["FLAGCHAIN_IT_TIMEOUT".to_string()],
        destination: Some(dest.clone()),
        value: 30,
        ..Uint64Flag::new("timeout")
    });
    let ctx = cmd.prepare(&args(&["--timeout=45"]), None).unwrap();

    assert_eq!(ctx.uint64("timeout"), 45);
    assert_eq!(dest.get(), 45);
}

#[test]
fn test_parent_child_lineage() {
    let mut root = Command::new("app")
        .flag(BoolFlag {
            aliases: vec!["d".to_string()],
            ..BoolFlag::new("debug")
        })
        .flag(ChoiceFlag {
            value: Some(Level::Low),
            ..ChoiceFlag::new("level", levels())
        });
    let mut child = Command::new("serve")
        .flag(ChoiceFlag::new("level", levels()))
        .flag(Uint64Flag::new("port"));

    let root_ctx = root
        .prepare(&args(&["-d", "--level", "high", "serve", "--port", "0x1F90"]), None)
        .unwrap();
    assert_eq!(root_ctx.args()[0], "serve");

    let rest = root_ctx.args()[1..].to_vec();
    let child_ctx = child.prepare(&rest, Some(&root_ctx)).unwrap();

    assert_eq!(child_ctx.lineage().len(), 2);
    assert_eq!(child_ctx.uint64("port"), 8080);
    assert!(child_ctx.bool("debug"));
    assert!(child_ctx.bool("d"));
    assert_eq!(child_ctx.choice("level", &levels()), Some(Level::High));
    assert!(child_ctx.is_set("level"));
    assert!(!child_ctx.is_set_locally("level"));
}

#[test]
fn test_child_shadows_parent_choice() {
    let mut root = Command::new("app").flag(ChoiceFlag::new("level", levels()));
    let mut child = Command::new("serve").flag(ChoiceFlag::new("level", levels()));

    let root_ctx = root
        .prepare(&args(&["--level", "high", "serve", "--level", "low"]), None)
        .unwrap();
    let rest = root_ctx.args()[1..].to_vec();
    let child_ctx = child.prepare(&rest, Some(&root_ctx)).unwrap();

    assert_eq!(root_ctx.choice("level", &levels()), Some(Level::High));
    assert_eq!(child_ctx.choice("level", &levels()), Some(Level::Low));
}

#[test]
fn test_child_required_not_satisfied_by_parent() {
    let mut root = Command::new("app").flag(PathFlag::new("config"));
    let mut child = Command::new("serve").flag(PathFlag {
        required: true,
        ..PathFlag::new("config")
    });

    let root_ctx = root
        .prepare(&args(&["--config", "a.toml", "serve"]), None)
        .unwrap();
    let result = child.prepare(&[], Some(&root_ctx));
    assert!(matches!(
        result,
        Err(FlagError::MissingRequired(names)) if names == vec!["config"]
    ));
}

#[test]
fn test_unknown_env_token_aborts_setup() {
    env::set_var("FLAGCHAIN_IT_LEVEL", "medium");
    let mut cmd = Command::new("app").flag(ChoiceFlag {
        env_vars: vec!["FLAGCHAIN_IT_LEVEL".to_string()],
        ..ChoiceFlag::new("level", levels())
    });
    let err = cmd.prepare(&[], None).unwrap_err();
    assert!(matches!(err, FlagError::InvalidValue { kind: "choice", .. }));
    assert!(err.to_string().contains("level"));
    assert!(err.to_string().contains("\"medium\""));
}

#[test]
fn test_busy_destination_aborts_setup() {
    let dest = Destination::new(0u64);
    let mut cmd = Command::new("app").flag(Uint64Flag {
        destination: Some(dest.clone()),
        ..Uint64Flag::new("port")
    });
    dest.with(|_| {
        let result = cmd.prepare(&[], None);
        assert!(matches!(result, Err(FlagError::DestinationUnavailable(name)) if name == "port"));
    });
}
