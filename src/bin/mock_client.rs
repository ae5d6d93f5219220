//! Mock remote-execution client binary for integration testing
//!
//! Emulates just enough of the rex-call surface to exercise the harness
//! without a real deployment: config-file loading, the local fallback
//! modes, and a handful of execution functions. When the configured
//! master endpoint is unreachable it enters the retry loop and blocks
//! until killed, which is exactly what the deadline tests need.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

fn main() {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let mut config_dir: Option<PathBuf> = None;
    let mut local = false;
    let mut text_out = false;
    let mut show_doc = false;
    let mut rest: Vec<String> = Vec::new();

    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "--config-dir" => {
                i += 1;
                if i < argv.len() {
                    config_dir = Some(PathBuf::from(&argv[i]));
                }
            }
            "--local" => local = true,
            "--text-out" => text_out = true,
            "-d" => show_doc = true,
            other => rest.push(other.to_string()),
        }
        i += 1;
    }

    if rest.is_empty() {
        eprintln!("Usage: rex-call [options] <function> [arguments]");
        std::process::exit(2);
    }

    let function = rest[0].clone();
    let args = rest[1..].to_vec();

    // Documentation lookup is local-only and never touches the master
    if show_doc {
        print_doc(&function);
        return;
    }

    let config = load_config(config_dir.as_deref());

    let file_client_local = matches!(
        config.get("file_client"),
        Some(serde_yaml::Value::String(s)) if s == "local"
    );

    if !(local || file_client_local) {
        let master = config.get("master").and_then(value_str);
        // only the loopback master counts as reachable here
        if master.as_deref() != Some("localhost") {
            let name = master.unwrap_or_else(|| "rex".to_string());
            eprintln!(
                "WARNING: Master hostname: {} not found. Retrying in 30 seconds",
                name
            );
            loop {
                std::thread::sleep(Duration::from_secs(30));
            }
        }
    }

    match function.as_str() {
        "test.ping" => println!("local: True"),
        "test.fib" => run_fib(&args, text_out),
        "cmd.run" => run_cmd(&args),
        other => {
            eprintln!("'{}' is not available.", other);
            std::process::exit(1);
        }
    }
}

fn load_config(config_dir: Option<&Path>) -> BTreeMap<String, serde_yaml::Value> {
    let Some(dir) = config_dir else {
        return BTreeMap::new();
    };
    match std::fs::read_to_string(dir.join("node")) {
        Ok(text) => serde_yaml::from_str(&text).unwrap_or_default(),
        Err(_) => BTreeMap::new(),
    }
}

fn value_str(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn run_fib(args: &[String], text_out: bool) {
    let num: u64 = args.first().and_then(|s| s.parse().ok()).unwrap_or(10);

    let started = Instant::now();
    let mut seq = Vec::new();
    let (mut a, mut b) = (0u64, 1u64);
    while a < num {
        seq.push(a);
        let next = a + b;
        a = b;
        b = next;
    }
    let secs = started.elapsed().as_secs_f64();

    if text_out {
        if deprecated_text_out() {
            println!(
                "WARNING: The option --text-out is deprecated. \
                 Please consider using '--out text' instead."
            );
        }
        let items: Vec<String> = seq.iter().map(|n| n.to_string()).collect();
        println!("local: ([{}], {:e})", items.join(", "), secs);
    } else {
        println!("local: !!python/tuple");
        for (i, n) in seq.iter().enumerate() {
            if i == 0 {
                println!("- - {}", n);
            } else {
                println!("  - {}", n);
            }
        }
        // timing element of the returned tuple
        println!("- {:e}", secs);
    }
}

/// The --text-out flag grew a deprecation warning that was removed again
/// in 0.10.8
fn deprecated_text_out() -> bool {
    let version =
        std::env::var("REX_CALL_VERSION").unwrap_or_else(|_| "0.10.8".to_string());
    semver::Version::parse(&version)
        .map(|v| v < semver::Version::new(0, 10, 8))
        .unwrap_or(false)
}

fn run_cmd(args: &[String]) {
    let joined = args.join(" ");
    let command = joined.trim_matches(|c| c == '"' || c == '\'');
    match command.strip_prefix("echo ") {
        Some(output) => println!("local: {}", output),
        None => println!("local: "),
    }
}

fn print_doc(function: &str) {
    match function {
        "user.delete" => {
            println!("user.delete:");
            println!();
            println!("    Remove a user from the system");
            println!();
            println!("    CLI Example:");
            println!();
            println!("        rex '*' user.delete name remove=True force=True");
        }
        other => println!("{}: no documentation available", other),
    }
}
