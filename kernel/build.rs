use std::{env, fs, path::PathBuf};

use config::mm::{BOOT_STACK_SIZE, KERNEL_START_PHYS};

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let out_dir = env::var("OUT_DIR").unwrap();
    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap();

    println!("cargo:rerun-if-changed=linker.ld");
    if target_arch != "riscv64" {
        return;
    }

    // Generate the linker script.
    let link_script = fs::read_to_string(PathBuf::from(manifest_dir).join("linker.ld"))
        .unwrap()
        .replace("%RAM_START%", &KERNEL_START_PHYS.to_string())
        .replace("%STACK_SIZE%", &BOOT_STACK_SIZE.to_string());

    let linker_script_dest = PathBuf::from(out_dir).join("linker.ld");
    fs::write(&linker_script_dest, link_script).unwrap();
    println!("cargo:rustc-link-arg=-T{}", linker_script_dest.display());
}
