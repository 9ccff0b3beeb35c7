fn main() {
    println!("cargo:rerun-if-changed=src/cli/mod.rs");
}
