fn main() {
    // Host builds (`--no-default-features`) have no ESP-IDF toolchain to
    // export; only the firmware build needs the sysenv passthrough.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
