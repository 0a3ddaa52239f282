pub fn main() {
    println!("cargo:rerun-if-env-changed=VERSION");

    if let Ok(version) = std::env::var("VERSION") {
        println!("cargo:rustc-env=SELFUP_VERSION={}", version);
    } else {
        let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.1".to_string());
        println!("cargo:rustc-env=SELFUP_VERSION={}", version);
    }
}
