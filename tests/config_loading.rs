// tests/config_loading.rs

use std::collections::BTreeMap;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use checkset::config::{ConfigFile, load_and_validate, parse_and_validate, substitute};
use checkset::errors::ChecksetError;
use checkset::exec::Invocation;
use checkset_test_utils::builders::{CheckConfigBuilder, ChecksetConfigBuilder, ConfigFileBuilder};

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(toml: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{toml}")?;
    Ok(file)
}

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

const LINUX_CONFIG: &str = r#"
[config]
tools_dir = "tools"
max_workers = 3

[check."check:format"]
cmd = "python3 format.py -p ${platform}"

[check."check:build-clang"]
argv = ["make", "CC=${compiler}", "\\${literal}"]
stamp = "build_${platform}"

[check."check:test"]
cmd = "ctest ${unknown}"

[checkset.linux]
with = { platform = "linux", compiler = "clang" }

[checkset.linux.chains]
"check:format" = []
"check:build-${compiler}" = []
"check:test" = ["check:build-${compiler}"]
"#;

#[test]
fn loads_and_resolves_a_checkset() -> TestResult {
    let file = write_config(LINUX_CONFIG)?;
    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.config.tools_dir, PathBuf::from("tools"));
    assert_eq!(cfg.config.findings_dir, PathBuf::from("findings-build"));
    assert_eq!(cfg.config.max_workers.map(|n| n.get()), Some(3));
    assert_eq!(cfg.checkset_names().collect::<Vec<_>>(), vec!["linux"]);

    let plan = cfg.plan("linux")?;
    assert_eq!(plan.name, "linux");
    assert_eq!(plan.tasks.len(), 3);

    let build = &plan.tasks["check:build-clang"];
    assert_eq!(
        build.invocation,
        Invocation::Argv(vec![
            "make".to_string(),
            "CC=clang".to_string(),
            r"\${literal}".to_string(),
        ])
    );
    assert_eq!(build.stamp.as_deref(), Some("build_linux"));

    let test = &plan.tasks["check:test"];
    assert_eq!(test.deps, vec!["check:build-clang".to_string()]);
    assert_eq!(test.invocation, Invocation::Shell("ctest ${unknown}".to_string()));

    let format = &plan.tasks["check:format"];
    assert_eq!(
        format.invocation,
        Invocation::Shell("python3 format.py -p linux".to_string())
    );
    Ok(())
}

#[test]
fn unknown_checkset_is_a_structured_error() -> TestResult {
    let cfg = parse_and_validate(LINUX_CONFIG)?;

    match cfg.plan("windows") {
        Err(ChecksetError::UnknownCheckset(name)) => assert_eq!(name, "windows"),
        other => panic!("expected UnknownCheckset, got {other:?}"),
    }
    Ok(())
}

#[test]
fn chain_without_a_check_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_check("lint", CheckConfigBuilder::cmd("true").build())
        .with_checkset(
            "ci",
            ChecksetConfigBuilder::new()
                .chain("lint", &[])
                .chain("fmt", &["lint"])
                .build(),
        )
        .raw();

    match ConfigFile::try_from(raw) {
        Err(ChecksetError::UnknownCheck { checkset, chain }) => {
            assert_eq!(checkset, "ci");
            assert_eq!(chain, "fmt");
        }
        other => panic!("expected UnknownCheck, got {other:?}"),
    }
}

#[test]
fn config_without_checks_is_rejected() {
    let raw = ConfigFileBuilder::new().raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(ChecksetError::ConfigError(_))
    ));
}

#[test]
fn check_needs_exactly_one_command_form() {
    let mut both = CheckConfigBuilder::cmd("true").build();
    both.argv = Some(vec!["true".to_string()]);
    let raw = ConfigFileBuilder::new().with_check("x", both).raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(ChecksetError::InvalidCheck { check, .. }) if check == "x"
    ));

    let raw = ConfigFileBuilder::new()
        .with_check("x", CheckConfigBuilder::argv(&[]).build())
        .raw();
    let err = ConfigFile::try_from(raw).unwrap_err();
    assert_eq!(err.to_string(), "check 'x' has an empty `argv`");
}

#[test]
fn checkset_without_chains_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_check("x", CheckConfigBuilder::cmd("true").build())
        .with_checkset("empty", ChecksetConfigBuilder::new().build())
        .raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(ChecksetError::ConfigError(_))
    ));
}

#[test]
fn chains_colliding_after_substitution_are_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_check("build-gcc", CheckConfigBuilder::cmd("true").build())
        .with_checkset(
            "dup",
            ChecksetConfigBuilder::new()
                .with("cc", "gcc")
                .chain("build-${cc}", &[])
                .chain("build-gcc", &[])
                .build(),
        )
        .raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(ChecksetError::ConfigError(_))
    ));
}

#[test]
fn cycles_and_dangling_deps_load_and_show_in_the_graph() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_check("a", CheckConfigBuilder::cmd("true").build())
        .with_check("b", CheckConfigBuilder::cmd("true").build())
        .with_check("c", CheckConfigBuilder::cmd("true").build())
        .with_checkset(
            "loop",
            ChecksetConfigBuilder::new()
                .chain("a", &["b"])
                .chain("b", &["a"])
                .chain("c", &["nowhere"])
                .build(),
        )
        .build();

    let graph = cfg.plan("loop")?.graph();
    let cyclic: Vec<String> = graph.cyclic_tasks().into_iter().collect();
    assert_eq!(cyclic, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(graph.missing_dependencies_of("c"), vec!["nowhere"]);
    Ok(())
}

#[test]
fn malformed_toml_is_a_toml_error() -> TestResult {
    let file = write_config("[check.x\ncmd = ")?;
    assert!(matches!(
        load_and_validate(file.path()),
        Err(ChecksetError::TomlError(_))
    ));
    Ok(())
}

#[test]
fn unknown_fields_are_rejected() {
    let err = parse_and_validate("[check.x]\ncmd = \"true\"\nafter = [\"y\"]\n").unwrap_err();
    assert!(matches!(err, ChecksetError::TomlError(_)), "{err:?}");
}

#[test]
fn missing_file_reports_its_path() {
    let err = load_and_validate("/definitely/not/here/Checkset.toml").unwrap_err();
    assert!(format!("{err:#}").contains("/definitely/not/here/Checkset.toml"));
}

#[test]
fn substitution_rules() {
    let p = params(&[("platform", "linux"), ("empty", "")]);

    assert_eq!(substitute("run-${platform}", &p), "run-linux");
    assert_eq!(substitute("${platform}/${platform}", &p), "linux/linux");
    assert_eq!(substitute(r"keep \${platform}", &p), r"keep \${platform}");
    assert_eq!(
        substitute(r"\${platform}-${platform}", &p),
        r"\${platform}-linux"
    );
    assert_eq!(substitute("${missing}-x", &p), "${missing}-x");
    assert_eq!(substitute("a${empty}b", &p), "ab");
    assert_eq!(substitute("no placeholders", &p), "no placeholders");
}
