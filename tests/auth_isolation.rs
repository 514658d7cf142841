// tests/auth_isolation.rs
// Fails if credential access leaks out of the auth module, or if runtime code
// panics on errors instead of propagating them.

use std::fs;
use std::path::{Path, PathBuf};

fn collect_rs_files(dir: &Path, files: &mut Vec<PathBuf>) {
    if let Ok(entries) = fs::read_dir(dir) {
        for e in entries.flatten() {
            let p = e.path();
            if p.is_dir() {
                collect_rs_files(&p, files);
            } else if p.extension().map(|s| s == "rs").unwrap_or(false) {
                files.push(p);
            }
        }
    }
}

fn is_auth_module(path: &Path) -> bool {
    let p = path.to_string_lossy();
    p.ends_with("/forecast/api/auth.rs") || p.ends_with("\\forecast\\api\\auth.rs")
}

/// Source up to the first `#[cfg(test)]` block.
fn runtime_part(content: &str) -> &str {
    match content.find("#[cfg(test)]") {
        Some(idx) => &content[..idx],
        None => content,
    }
}

fn source_files() -> Vec<PathBuf> {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let src_dir = Path::new(manifest_dir).join("src");
    let mut files = Vec::new();
    collect_rs_files(&src_dir, &mut files);
    assert!(!files.is_empty(), "no sources found under {:?}", src_dir);
    files
}

#[test]
fn only_auth_module_reads_credentials() {
    let bad_patterns = ["keyring::", "\"FORECAST_API_TOKEN\"", "TOKEN_ENV_VAR"];

    let mut offenders: Vec<(String, String)> = Vec::new();
    for file in source_files() {
        if is_auth_module(&file) {
            continue;
        }
        let content = match fs::read_to_string(&file) {
            Ok(c) => c,
            Err(_) => continue,
        };
        for pat in &bad_patterns {
            if content.contains(pat) {
                offenders.push((file.to_string_lossy().to_string(), pat.to_string()));
            }
        }
    }

    if !offenders.is_empty() {
        let mut msg = String::from("Credential access found outside forecast/api/auth.rs:\n");
        for (file, pat) in offenders {
            msg.push_str(&format!("  {} contains pattern '{}': take an AuthContext instead\n", file, pat));
        }
        panic!("{}", msg);
    }
}

#[test]
fn runtime_code_does_not_unwrap() {
    let bad_patterns = [".unwrap()", ".expect("];

    let mut offenders: Vec<(String, String)> = Vec::new();
    for file in source_files() {
        let content = match fs::read_to_string(&file) {
            Ok(c) => c,
            Err(_) => continue,
        };
        let runtime = runtime_part(&content);
        for pat in &bad_patterns {
            if runtime.contains(pat) {
                offenders.push((file.to_string_lossy().to_string(), pat.to_string()));
            }
        }
    }

    if !offenders.is_empty() {
        let mut msg = String::from("Panicking calls found in runtime code:\n");
        for (file, pat) in offenders {
            msg.push_str(&format!("  {} contains pattern '{}'\n", file, pat));
        }
        panic!("{}", msg);
    }
}
