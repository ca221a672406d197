fn main() {
    let now = chrono::Utc::now();

    // shown in the footer
    println!("cargo:rustc-env=SITE_BUILD_DATE={}", now.format("%Y-%m-%d"));
    println!("cargo:rustc-env=SITE_BUILD_YEAR={}", now.format("%Y"));

    // scene.json is embedded at compile time
    println!("cargo:rerun-if-changed=config");
    println!("cargo:rerun-if-changed=build.rs");
}
