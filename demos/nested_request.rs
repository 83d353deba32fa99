//! Nested request example.
//!
//! Compiles a schema with repeated nested messages into a flag tree, prints
//! its boundary names, and binds a few command lines against it.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p protoflag-demos --example nested_request
//! ```

use protoflag_args::bind;
use protoflag_core::compile;
use protoflag_demos::{DEPLOY_REQUEST, deploy_schema};

fn main() {
    let schema = deploy_schema();
    let tree = match compile(&schema, DEPLOY_REQUEST) {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    println!("{} compiled to {} level(s)", tree.message, tree.depth());
    println!("  boundaries: {:?}", tree.boundary_names());
    for leaf in tree.leaves() {
        println!("  --{:<12} {}", leaf.name, leaf.kind.name());
    }
    println!();

    let command_lines: [&[&str]; 3] = [
        &[
            "--service",
            "api",
            "--not_before",
            "2024-06-01T08:00:00Z",
            "target",
            "--region",
            "eu-west",
            "--tier",
            "TIER_CANARY",
            "--zones",
            "a,b",
            "target",
            "--region",
            "us-east",
            "--tier",
            "2",
            "check",
            "--path",
            "/ready",
            "--interval",
            "30s",
        ],
        &["--service", "api", "--dry_run"],
        &[
            "--service",
            "api",
            "target",
            "--region",
            "eu",
            "--tier",
            "TIER_UNKNOWN",
        ],
    ];

    for tokens in command_lines {
        println!("$ deploy {}", tokens.join(" "));
        match bind(&tree, tokens) {
            Ok(message) => match serde_json::to_string_pretty(&message.to_json()) {
                Ok(json) => println!("{json}"),
                Err(err) => eprintln!("error: {err}"),
            },
            Err(err) => println!("error: {err}"),
        }
        println!();
    }
}
