fn main() {
    // Only the desktop shell needs Tauri's context generation; the library
    // and its tests build without the webview toolchain.
    #[cfg(feature = "desktop")]
    tauri_build::build();
}
