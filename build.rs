//! Collects information about the build environment and the version of the
//! engine from Git. The results are written to the output directory and are
//! reported by the engine on startup and in response to `uci`.

use std::path::Path;
use std::{env, fs};

fn generate_file(filename: &str, contents: &str) -> std::io::Result<()> {
    let out_dir = env::var_os("OUT_DIR").expect("cargo always sets OUT_DIR for build scripts");
    fs::write(Path::new(&out_dir).join(filename), contents)
}

fn generate_build_info() -> std::io::Result<()> {
    let features = format!(
        "{}popcnt {}debug_assertions",
        if cfg!(target_feature = "popcnt") {
            "+"
        } else {
            "-"
        },
        if cfg!(debug_assertions) { "+" } else { "-" },
    );
    generate_file("features", &features)
}

fn main() -> shadow_rs::SdResult<()> {
    generate_build_info()?;
    shadow_rs::new()
}
