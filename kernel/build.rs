//! Build script for the kernel.
//!
//! The kernel is linked with a custom script placing the boot sections at
//! their physical load address and the rest of the image in the higher half.

use std::{env, path::PathBuf};

fn main() {
	let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
	let linker_script = manifest_dir.join("linker.ld");
	println!("cargo:rerun-if-changed={}", linker_script.display());
	println!("cargo:rustc-link-arg=-T{}", linker_script.display());
}
