//! Host integration example.
//!
//! A clap application owns the command name and its own options, and hands
//! every trailing token to protoflag. The flag tree is compiled once and
//! reused for each invocation.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p protoflag-demos --example host_subcommand -- \
//!     deploy --service api target --region eu-west --zones a,b
//! ```

use clap::{Parser, Subcommand};
use protoflag_args::bind;
use protoflag_core::compile;
use protoflag_demos::{DEPLOY_REQUEST, deploy_schema};

#[derive(Debug, Parser)]
#[command(name = "host")]
struct Host {
    /// Print the bound request without sending it.
    #[arg(long, global = true)]
    echo: bool,
    #[command(subcommand)]
    command: HostCommand,
}

#[derive(Debug, Subcommand)]
enum HostCommand {
    /// Deploy a service; arguments follow the DeployRequest schema.
    Deploy {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        request: Vec<String>,
    },
}

fn main() {
    let host = Host::parse();
    let tree = match compile(&deploy_schema(), DEPLOY_REQUEST) {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let HostCommand::Deploy { request } = host.command;
    match bind(&tree, &request) {
        Ok(message) => {
            let json = message.to_json();
            if host.echo {
                match serde_json::to_string_pretty(&json) {
                    Ok(text) => println!("{text}"),
                    Err(err) => {
                        eprintln!("error: {err}");
                        std::process::exit(1);
                    }
                }
            } else {
                let targets = json["target"].as_array().map_or(0, Vec::len);
                println!("deploying {} to {targets} target(s)", json["service"]);
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    }
}
