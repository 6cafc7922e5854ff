//! `vmfc`: view-model factory verifier CLI.

use std::path::Path;

use vmfc::commands::{check_snapshot, emit_snapshot, explain_error, fix_snapshot};
use vmfc::{init_tracing, parse_cli_options, CliError};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];
    let (options, positional) = parse_cli_options(&args[2..]);

    let result = match command.as_str() {
        "check" => {
            let Some(path) = positional.first() else {
                eprintln!("Usage: vmfc check <snapshot.json> [--format=terminal|json]");
                std::process::exit(1);
            };
            check_snapshot(Path::new(path), &options, &mut std::io::stderr())
        }
        "emit" => {
            let Some(path) = positional.first() else {
                eprintln!("Usage: vmfc emit <snapshot.json> [-o <path>]");
                std::process::exit(1);
            };
            emit_snapshot(
                Path::new(path),
                &options,
                &mut std::io::stdout(),
                &mut std::io::stderr(),
            )
        }
        "fix" => {
            let Some(path) = positional.first() else {
                eprintln!("Usage: vmfc fix <snapshot.json> [-o <path>] [--prefer=TYPE@OFFSET]");
                std::process::exit(1);
            };
            fix_snapshot(Path::new(path), &options, &mut std::io::stderr()).map(|summary| {
                for title in &summary.applied {
                    println!("fixed: {title}");
                }
                summary.remaining > 0
            })
        }
        "--explain" | "explain" => {
            let Some(code) = positional.first() else {
                eprintln!("Usage: vmfc explain <ERROR_CODE>");
                eprintln!("Example: vmfc explain VMF002");
                std::process::exit(1);
            };
            explain_error(code, &mut std::io::stdout()).map(|()| false)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(false)
        }
        "version" | "--version" | "-V" => {
            println!("vmfc {}", env!("CARGO_PKG_VERSION"));
            Ok(false)
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    match result {
        Ok(false) => {}
        Ok(true) => std::process::exit(1),
        Err(e) => {
            report_error(&e);
            std::process::exit(1);
        }
    }
}

fn report_error(error: &CliError) {
    eprintln!("error: {error}");
    if let CliError::UnknownCode(_) = error {
        eprintln!();
        eprintln!("Codes have the format VMFXXX where X is a digit.");
        eprintln!("Examples: VMF001, VMF003");
    }
}

fn print_usage() {
    println!("vmfc: view-model factory verifier");
    println!();
    println!("Usage: vmfc <command> <snapshot.json> [options]");
    println!();
    println!("Commands:");
    println!("  check <snapshot>     Report wiring problems (exit 1 on errors)");
    println!("  emit <snapshot>      Print the generated factory functions");
    println!("  fix <snapshot>       Apply fixes and write the snapshot back");
    println!("  explain <code>       Explain an error code (e.g., VMF002)");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Options:");
    println!("  --format=<fmt>       Diagnostic format: terminal (default), json");
    println!("  --color=<mode>       Colors: auto (default), always, never");
    println!("  --threads=<n>        Collection threads (default: all cores)");
    println!("  -o <path>            Output file (emit: generated code, fix: snapshot)");
    println!("  --no-keep-adjacent   Append fixed registrations instead of pairing them");
    println!("  --prefer=TYPE@OFFSET Settle an ambiguity with the constructor at OFFSET");
    println!();
    println!("Examples:");
    println!("  vmfc check app.json");
    println!("  vmfc check app.json --format=json");
    println!("  vmfc emit app.json -o Generated.cs");
    println!("  vmfc fix app.json --prefer=DetailViewModel@1110");
    println!("  vmfc explain VMF003");
    println!();
    println!("Set RUST_LOG=vmf_analysis=debug for tracing output.");
}
