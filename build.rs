fn main() {
    println!("cargo:rerun-if-env-changed=GLYPHFALL_BUILD");

    let build_id = std::env::var("GLYPHFALL_BUILD")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(target_build_id);

    println!("cargo:rustc-env=GLYPHFALL_BUILD={}", build_id);
}

fn target_build_id() -> String {
    let os = match std::env::var("CARGO_CFG_TARGET_OS").as_deref() {
        Ok("macos") => "darwin".to_string(),
        Ok(other) => other.to_string(),
        Err(_) => "unknown".to_string(),
    };
    let arch = std::env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_else(|_| "unknown".to_string());
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());
    format!("{os}-{arch}-{profile}")
}
