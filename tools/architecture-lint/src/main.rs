//! `architecture-lint` binary: lints `client/src` of the enclosing
//! workspace and exits non-zero on any violation.

use std::io::{self, Write};
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;

fn main() -> ExitCode {
    let Some(root) = workspace_root() else {
        report("unable to locate the workspace root (a Cargo.toml declaring [workspace])");
        return ExitCode::FAILURE;
    };
    match architecture_lint::lint_client_sources(&root.join("client")) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

fn report(message: &str) {
    let _ = writeln!(io::stderr().lock(), "{message}");
}

fn workspace_root() -> Option<Utf8PathBuf> {
    let candidates = [
        std::env::var("CARGO_WORKSPACE_DIR").ok().map(Utf8PathBuf::from),
        std::env::current_dir()
            .ok()
            .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok()),
        Some(Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|start| start.ancestors().find(|dir| declares_workspace(dir)).map(Utf8Path::to_owned))
}

fn declares_workspace(dir: &Utf8Path) -> bool {
    Dir::open_ambient_dir(dir, ambient_authority())
        .and_then(|dir| dir.read_to_string("Cargo.toml"))
        .is_ok_and(|manifest| manifest.contains("[workspace]"))
}
