use log::error;
use std::panic;

pub fn initialize_panic_handler() {
    #[cfg(debug_assertions)]
    better_panic::install();

    #[cfg(not(debug_assertions))]
    setup_human_panic();

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            error!("Panic: {msg}");
        } else if let Some(msg) = panic_info.payload().downcast_ref::<String>() {
            error!("Panic: {msg}");
        } else {
            error!("Panic with unknown payload");
        }
        if let Some(location) = panic_info.location() {
            error!("  at {}:{}", location.file(), location.line());
        }
        default_hook(panic_info);
    }));
}

/// Initialize human-panic metadata for release builds
#[cfg(not(debug_assertions))]
use human_panic::Metadata;

#[cfg(not(debug_assertions))]
fn setup_human_panic() {
    human_panic::setup_panic!(Metadata::new(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ));
}
