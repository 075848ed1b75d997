//! Build script for the storefront crate.
//!
//! Fingerprints static assets so templates can reference immutable,
//! content-addressed copies under `static/derived/`.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    hash_asset("static/css/main.css", "CSS_HASH");
    hash_asset("static/js/cart-badge.js", "JS_HASH");
}

/// Hash an asset and copy it to `static/derived/{stem}.{hash}.{ext}`.
///
/// Sets `env_name` for use with `env!()`. A missing asset yields an empty hash.
fn hash_asset(relative: &str, env_name: &str) {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let asset_path = Path::new(&manifest_dir).join(relative);

    println!("cargo:rerun-if-changed={}", asset_path.display());

    let content = match fs::read(&asset_path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {relative}: {e}");
            println!("cargo:rustc-env={env_name}=");
            return;
        }
    };

    // First 8 hex chars of SHA-256
    let mut hasher = Sha256::new();
    hasher.update(&content);
    let hash = format!("{:x}", hasher.finalize());
    let short_hash = &hash[..8];

    println!("cargo:rustc-env={env_name}={short_hash}");

    let stem = asset_path
        .file_stem()
        .and_then(|s| s.to_str())
        .expect("asset has a UTF-8 file stem");
    let ext = asset_path
        .extension()
        .and_then(|s| s.to_str())
        .expect("asset has a UTF-8 extension");

    let derived_dir = Path::new(&manifest_dir).join("static/derived");
    fs::create_dir_all(&derived_dir).expect("Failed to create derived asset directory");
    fs::copy(&asset_path, derived_dir.join(format!("{stem}.{short_hash}.{ext}")))
        .expect("Failed to copy asset to derived directory");
}
