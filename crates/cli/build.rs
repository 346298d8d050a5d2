extern crate chrono;

// Build script for the chatstats CLI crate

fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    let platform = match target_os.as_str() {
        "macos" | "linux" | "windows" => target_os.as_str(),
        _ => {
            println!("cargo:warning=Unknown CLI target OS: {}", target_os);
            "unknown"
        }
    };
    println!("cargo:rustc-env=CLI_PLATFORM={}", platform);

    // Build timestamp
    println!(
        "cargo:rustc-env=CLI_BUILD_TIMESTAMP={}",
        chrono::Utc::now().to_rfc3339()
    );

    // Re-run triggers
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
}
